/*!
 * Per-word karaoke timing.
 *
 * Cues carrying inline timestamps are split into words whose start is the
 * nearest preceding marker and whose end is the next word's start. Cues
 * without usable per-word timing fall back to a single whole-cue highlight.
 */

use std::borrow::Cow;

use crate::captions::cue::{Cue, CueToken, TimeSpan, Word};

/// Floor applied when neighbouring markers would give a word a negative duration
pub const MIN_WORD_DURATION_MS: u64 = 120;

/// How a cue's words are timed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingRegime {
    /// Each word is highlighted at its own inline timestamp
    PerWord,
    /// No per-word signal; every word spans the whole cue
    WholeCue,
}

/// Words of one cue together with the regime that produced them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KaraokeLine {
    /// Span of the source cue
    pub span: TimeSpan,
    pub regime: TimingRegime,
    /// Words in display order
    pub words: Vec<Word>,
}

impl KaraokeLine {
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Splits cue text into timed words
pub struct KaraokeSegmenter;

impl KaraokeSegmenter {
    /// Segment a cue into words.
    ///
    /// Never fails: out-of-range markers are clamped into the cue and
    /// inverted neighbours are repaired with `MIN_WORD_DURATION_MS`.
    pub fn segment(cue: &Cue) -> KaraokeLine {
        if cue.has_inline_markers() {
            let anchored = Self::anchored_words(cue);
            if anchored.len() >= 2 {
                return KaraokeLine {
                    span: cue.span,
                    regime: TimingRegime::PerWord,
                    words: Self::timed_words(cue, anchored),
                };
            }
        }

        KaraokeLine {
            span: cue.span,
            regime: TimingRegime::WholeCue,
            words: Self::whole_cue_words(cue),
        }
    }

    /// `(anchor, word)` pairs in text order, anchors clamped into the cue
    fn anchored_words(cue: &Cue) -> Vec<(u64, String)> {
        let mut words = Vec::new();
        // tags never split a word: "wo<c>rd" reads as "word"
        for segment in cue.segments() {
            let anchor = segment
                .anchor_ms
                .map_or(cue.start_ms(), |ms| cue.span.clamp_point(ms));
            Self::flush_run(&mut words, anchor, &segment.text);
        }
        words
    }

    fn flush_run(words: &mut Vec<(u64, String)>, anchor: u64, run: &str) {
        let decoded = decode_character_references(run);
        words.extend(
            decoded
                .split_whitespace()
                .map(|word| (anchor, word.to_string())),
        );
    }

    fn timed_words(cue: &Cue, anchored: Vec<(u64, String)>) -> Vec<Word> {
        let next_starts: Vec<u64> = anchored
            .iter()
            .skip(1)
            .map(|(start, _)| *start)
            .chain(std::iter::once(cue.end_ms()))
            .collect();

        anchored
            .into_iter()
            .zip(next_starts)
            .map(|((start, text), next_start)| {
                let end = if next_start < start {
                    start + MIN_WORD_DURATION_MS
                } else {
                    next_start
                };
                Word::new(TimeSpan::new(start, end), text, 0)
            })
            .collect()
    }

    fn whole_cue_words(cue: &Cue) -> Vec<Word> {
        let plain: String = cue
            .tokens()
            .filter_map(|token| match token {
                CueToken::Text(text) => Some(text),
                _ => None,
            })
            .collect();
        let decoded = decode_character_references(&plain);

        decoded
            .lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>())
            .filter(|line| !line.is_empty())
            .enumerate()
            .flat_map(|(line_idx, line)| {
                line.into_iter()
                    .map(move |word| Word::new(cue.span, word, line_idx))
            })
            .collect()
    }
}

/// Decode the handful of character references caption tracks actually use
pub fn decode_character_references(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    Cow::Owned(
        text.replace("&nbsp;", " ")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&apos;", "'")
            .replace("&amp;", "&"),
    )
}
