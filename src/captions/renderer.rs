/*!
 * Karaoke caption rendering (Advanced SubStation Alpha).
 *
 * Every retained cue becomes one `Dialogue` event on a 1080x1920 canvas.
 * Words carry `{\kN}` durations in centiseconds so the renderer can
 * highlight them progressively.
 */

use std::fmt::Write as _;

use log::debug;

use crate::captions::cue::Cue;
use crate::captions::karaoke::{KaraokeLine, KaraokeSegmenter, TimingRegime};
use crate::captions::style::CaptionStyle;
use crate::captions::timecode;

/// Canvas width
pub const PLAY_RES_X: u32 = 1080;

/// Canvas height
pub const PLAY_RES_Y: u32 = 1920;

/// Name of the single style every event uses
pub const STYLE_NAME: &str = "Default";

const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, \
    OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, \
    Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";

const EVENT_FORMAT: &str =
    "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// Opaque box behind the text
const BORDER_STYLE_BOX: u8 = 3;

/// A rendered caption document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCaptions {
    /// Full ASS text, newline-terminated
    pub document: String,

    /// Number of `Dialogue` lines
    pub event_count: usize,
}

impl RenderedCaptions {
    pub fn is_empty(&self) -> bool {
        self.event_count == 0
    }
}

/// Renders clipped cues with one style
#[derive(Debug, Clone)]
pub struct CaptionRenderer {
    style: CaptionStyle,
}

impl CaptionRenderer {
    pub fn new(style: CaptionStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &CaptionStyle {
        &self.style
    }

    /// Render cues into an ASS document. Cues yielding no words emit no event.
    pub fn render(&self, cues: &[Cue]) -> RenderedCaptions {
        let mut document = self.header();
        let mut event_count = 0;

        for cue in cues {
            let line = KaraokeSegmenter::segment(cue);
            if line.is_empty() {
                continue;
            }
            document.push_str(&Self::dialogue(&line));
            document.push('\n');
            event_count += 1;
        }

        debug!("Rendered {} caption events from {} cues", event_count, cues.len());

        RenderedCaptions {
            document,
            event_count,
        }
    }

    /// Script info, style and event format sections
    pub fn header(&self) -> String {
        let style = &self.style;
        let mut header = String::new();

        header.push_str("[Script Info]\n");
        header.push_str("ScriptType: v4.00+\n");
        let _ = writeln!(header, "PlayResX: {}", PLAY_RES_X);
        let _ = writeln!(header, "PlayResY: {}", PLAY_RES_Y);
        header.push_str("ScaledBorderAndShadow: yes\n\n");

        header.push_str("[V4+ Styles]\n");
        header.push_str(STYLE_FORMAT);
        header.push('\n');
        let _ = writeln!(
            header,
            "Style: {},{},{},{},{},{},{},{},0,0,0,100,100,0,0,{},{},{},{},{},{},{},1",
            STYLE_NAME,
            style_field(&style.font_name),
            style.font_size,
            style.primary_color.to_ass(),
            style.secondary_color.to_ass(),
            style.outline_color.to_ass(),
            style.background_color.to_ass(),
            u8::from(style.bold),
            BORDER_STYLE_BOX,
            style.outline_width,
            style.shadow_depth,
            style.alignment,
            style.margin_horizontal,
            style.margin_horizontal,
            style.margin_vertical,
        );
        header.push('\n');

        header.push_str("[Events]\n");
        header.push_str(EVENT_FORMAT);
        header.push('\n');

        header
    }

    /// One `Dialogue` line, without the trailing newline
    pub fn dialogue(line: &KaraokeLine) -> String {
        format!(
            "Dialogue: 0,{},{},{},,0,0,0,,{}",
            timecode::format_centiseconds(line.span.start_ms()),
            timecode::format_centiseconds(line.span.end_ms()),
            STYLE_NAME,
            Self::event_text(line)
        )
    }

    /// Karaoke-tagged text of one event
    pub fn event_text(line: &KaraokeLine) -> String {
        match line.regime {
            TimingRegime::PerWord => line
                .words
                .iter()
                .map(|word| {
                    format!(
                        "{{\\k{}}}{}",
                        karaoke_centiseconds(word.span.duration_ms()),
                        escape_ass_text(&word.text)
                    )
                })
                .collect::<Vec<_>>()
                .join(" "),
            TimingRegime::WholeCue => {
                let mut text = format!("{{\\k{}}}", karaoke_centiseconds(line.span.duration_ms()));
                let mut previous_line = None;
                for word in &line.words {
                    match previous_line {
                        Some(prev) if prev != word.line => text.push_str("\\N"),
                        Some(_) => text.push(' '),
                        None => {}
                    }
                    text.push_str(&escape_ass_text(&word.text));
                    previous_line = Some(word.line);
                }
                text
            }
        }
    }
}

/// Render cues with `style` in one call
pub fn render(cues: &[Cue], style: &CaptionStyle) -> RenderedCaptions {
    CaptionRenderer::new(style.clone()).render(cues)
}

/// `\k` duration: rounded centiseconds, at least 1
pub fn karaoke_centiseconds(duration_ms: u64) -> u64 {
    timecode::millis_to_centiseconds(duration_ms).max(1)
}

/// Joins a literal backslash to a following letter without forming an escape
const WORD_JOINER: char = '\u{2060}';

/// Escape override braces and turn newlines into hard line breaks.
///
/// A literal backslash followed by `N`, `n` or `h` would be read as a break
/// or a hard space, so a word joiner is placed between them.
pub fn escape_ass_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '{' => escaped.push_str("\\{"),
            '}' => escaped.push_str("\\}"),
            '\n' => escaped.push_str("\\N"),
            '\r' => {}
            '\\' => {
                escaped.push('\\');
                if matches!(chars.peek(), Some('N' | 'n' | 'h')) {
                    escaped.push(WORD_JOINER);
                }
            }
            other => escaped.push(other),
        }
    }
    escaped
}

/// A value safe inside the comma-separated `Style:` line
fn style_field(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !matches!(ch, '\n' | '\r'))
        .map(|ch| if ch == ',' { ' ' } else { ch })
        .collect()
}
