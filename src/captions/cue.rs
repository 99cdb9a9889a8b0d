/*!
 * Core caption data model: time spans, clip windows, cues and words.
 *
 * Cue text is kept raw. Inline word timestamps (`<HH:MM:SS.mmm>`) and style
 * tags (`<c>`, `</c>`, ...) are exposed through a tokenizer instead of being
 * parsed out eagerly, so clipping can rewrite markers in place.
 */

use std::fmt;

use crate::captions::timecode;
use crate::errors::CaptionError;

/// A millisecond interval with `end_ms >= start_ms`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSpan {
    start_ms: u64,
    end_ms: u64,
}

impl TimeSpan {
    /// Create a span; an end before the start collapses onto the start
    pub fn new(start_ms: u64, end_ms: u64) -> Self {
        Self {
            start_ms,
            end_ms: end_ms.max(start_ms),
        }
    }

    pub fn start_ms(&self) -> u64 {
        self.start_ms
    }

    pub fn end_ms(&self) -> u64 {
        self.end_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }

    /// Strict overlap: spans that only touch at a boundary do not overlap
    pub fn overlaps(&self, other: &TimeSpan) -> bool {
        self.end_ms > other.start_ms && self.start_ms < other.end_ms
    }

    /// Overlapping part of two spans, if any
    pub fn intersect(&self, other: &TimeSpan) -> Option<TimeSpan> {
        self.overlaps(other).then(|| TimeSpan {
            start_ms: self.start_ms.max(other.start_ms),
            end_ms: self.end_ms.min(other.end_ms),
        })
    }

    /// Clamp an instant into `[start_ms, end_ms]`
    pub fn clamp_point(&self, ms: u64) -> u64 {
        ms.clamp(self.start_ms, self.end_ms)
    }

    /// Shift the span so that `origin_ms` becomes zero
    pub fn rebase(&self, origin_ms: u64) -> TimeSpan {
        TimeSpan {
            start_ms: self.start_ms.saturating_sub(origin_ms),
            end_ms: self.end_ms.saturating_sub(origin_ms),
        }
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} --> {}",
            timecode::format_millis(self.start_ms),
            timecode::format_millis(self.end_ms)
        )
    }
}

/// The half-open `[start, end)` interval of the source being extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipWindow {
    span: TimeSpan,
}

impl ClipWindow {
    /// Create a window; the end must be strictly after the start
    pub fn new(start_ms: u64, end_ms: u64) -> Result<Self, CaptionError> {
        if end_ms <= start_ms {
            return Err(CaptionError::InvalidWindow { start_ms, end_ms });
        }
        Ok(Self {
            span: TimeSpan { start_ms, end_ms },
        })
    }

    /// Build a window from an `HH:MM:SS.mmm` start and a duration in seconds.
    ///
    /// The duration is truncated to whole milliseconds.
    pub fn from_start_and_duration(start: &str, duration_secs: f64) -> Result<Self, CaptionError> {
        let start_ms = timecode::parse(start)?;
        let duration_ms = if duration_secs.is_finite() && duration_secs > 0.0 {
            (duration_secs * 1000.0) as u64
        } else {
            0
        };
        Self::new(start_ms, start_ms.saturating_add(duration_ms))
    }

    pub fn start_ms(&self) -> u64 {
        self.span.start_ms
    }

    pub fn end_ms(&self) -> u64 {
        self.span.end_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.span.duration_ms()
    }

    pub fn span(&self) -> TimeSpan {
        self.span
    }
}

/// One caption entry: a time span and its raw text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    /// Display interval
    pub span: TimeSpan,

    /// Raw text, possibly multi-line, with inline markers and style tags intact
    pub text: String,
}

impl Cue {
    /// Creates a cue without validation - used by tests and the clipper
    pub fn new(span: TimeSpan, text: impl Into<String>) -> Self {
        Cue {
            span,
            text: text.into(),
        }
    }

    /// Creates a cue only if the span is non-degenerate and the text non-blank
    pub fn try_new(start_ms: u64, end_ms: u64, text: &str) -> Option<Self> {
        let text = text.trim();
        if end_ms <= start_ms || text.is_empty() {
            return None;
        }
        Some(Cue {
            span: TimeSpan { start_ms, end_ms },
            text: text.to_string(),
        })
    }

    pub fn start_ms(&self) -> u64 {
        self.span.start_ms
    }

    pub fn end_ms(&self) -> u64 {
        self.span.end_ms
    }

    /// Tokenize the raw text into plain runs, inline markers and style tags
    pub fn tokens(&self) -> CueTokens<'_> {
        Self::tokenize(&self.text)
    }

    /// Tokenize arbitrary cue text
    pub fn tokenize(text: &str) -> CueTokens<'_> {
        CueTokens::new(text)
    }

    /// Plain text runs with their preceding inline timestamp, tags removed.
    ///
    /// The first segment holds the text before any marker and has no anchor.
    pub fn segments(&self) -> Vec<TextSegment> {
        let mut segments = vec![TextSegment::default()];
        for token in self.tokens() {
            match token {
                CueToken::Text(text) => {
                    if let Some(last) = segments.last_mut() {
                        last.text.push_str(text);
                    }
                }
                CueToken::StyleTag(_) => {}
                CueToken::Marker(ms) => segments.push(TextSegment {
                    anchor_ms: Some(ms),
                    text: String::new(),
                }),
            }
        }
        segments
    }

    /// Whether the text carries per-word timing
    pub fn has_inline_markers(&self) -> bool {
        self.tokens().any(|t| matches!(t, CueToken::Marker(_)))
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.span)?;
        writeln!(f, "{}", self.text)
    }
}

/// A timed word produced by the karaoke segmenter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// Highlight interval
    pub span: TimeSpan,

    /// Word text, never empty
    pub text: String,

    /// Visual line inside the cue
    pub line: usize,
}

impl Word {
    pub fn new(span: TimeSpan, text: impl Into<String>, line: usize) -> Self {
        Word {
            span,
            text: text.into(),
            line,
        }
    }
}

/// Text between two inline markers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSegment {
    /// Absolute marker time, `None` for text before the first marker
    pub anchor_ms: Option<u64>,
    pub text: String,
}

/// A lexical piece of raw cue text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueToken<'a> {
    /// Plain text, possibly containing newlines and character references
    Text(&'a str),

    /// Absolute inline timestamp in ms
    Marker(u64),

    /// Any other angle-bracket tag, kept verbatim
    StyleTag(&'a str),
}

/// Single forward pass over cue text
#[derive(Debug, Clone)]
pub struct CueTokens<'a> {
    rest: &'a str,
}

impl<'a> CueTokens<'a> {
    pub fn new(text: &'a str) -> Self {
        CueTokens { rest: text }
    }

    fn take(&mut self, len: usize) -> &'a str {
        let (head, tail) = self.rest.split_at(len);
        self.rest = tail;
        head
    }
}

impl<'a> Iterator for CueTokens<'a> {
    type Item = CueToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        match self.rest.find('<') {
            Some(0) => match (self.rest.find('>'), self.rest[1..].find('<')) {
                // a second '<' before the closing '>' means this one is literal
                (Some(close), Some(next_open)) if next_open + 1 < close => {
                    Some(CueToken::Text(self.take(next_open + 1)))
                }
                // "<>" carries no tag name; treat it as text
                (Some(close), _) if close > 1 => {
                    let tag = self.take(close + 1);
                    let inner = &tag[1..tag.len() - 1];
                    Some(match timecode::parse_exact(inner) {
                        Ok(ms) => CueToken::Marker(ms),
                        Err(_) => CueToken::StyleTag(tag),
                    })
                }
                (Some(close), _) => Some(CueToken::Text(self.take(close + 1))),
                (None, _) => Some(CueToken::Text(self.take(self.rest.len()))),
            },
            Some(open) => Some(CueToken::Text(self.take(open))),
            None => Some(CueToken::Text(self.take(self.rest.len()))),
        }
    }
}
