/*!
 * Window clipping and rebasing of cues.
 */

use log::debug;

use crate::captions::cue::{ClipWindow, Cue, CueToken};
use crate::captions::timecode;

/// Clips cues to a window and shifts them to window-relative time
pub struct WindowClipper {
    window: ClipWindow,
}

impl WindowClipper {
    pub fn new(window: ClipWindow) -> Self {
        Self { window }
    }

    /// Clip every cue against the window, preserving order.
    ///
    /// A cue is retained only if it strictly overlaps the half-open window.
    /// Retained cues may end up without renderable words; that is decided by
    /// the segmenter, not here.
    pub fn clip(&self, cues: &[Cue]) -> Vec<Cue> {
        let clipped: Vec<Cue> = cues.iter().filter_map(|cue| self.clip_cue(cue)).collect();

        debug!(
            "Clipped {} of {} cues to window {}..{}",
            clipped.len(),
            cues.len(),
            timecode::format_millis(self.window.start_ms()),
            timecode::format_millis(self.window.end_ms())
        );

        clipped
    }

    /// Clip a single cue, or `None` if it lies outside the window
    pub fn clip_cue(&self, cue: &Cue) -> Option<Cue> {
        let span = cue.span.intersect(&self.window.span())?;
        Some(Cue::new(
            span.rebase(self.window.start_ms()),
            self.rebase_inline_markers(&cue.text),
        ))
    }

    /// Clamp every inline marker into the window and re-encode it rebased.
    ///
    /// Text and style tags are copied through unchanged.
    pub fn rebase_inline_markers(&self, text: &str) -> String {
        let window = self.window.span();
        let mut out = String::with_capacity(text.len());

        for token in Cue::tokenize(text) {
            match token {
                CueToken::Text(run) | CueToken::StyleTag(run) => out.push_str(run),
                CueToken::Marker(ms) => {
                    let rebased = window.clamp_point(ms) - window.start_ms();
                    out.push('<');
                    out.push_str(&timecode::format_millis(rebased));
                    out.push('>');
                }
            }
        }

        out
    }
}

/// Clip cues to `window` in one call
pub fn clip(cues: &[Cue], window: ClipWindow) -> Vec<Cue> {
    WindowClipper::new(window).clip(cues)
}
