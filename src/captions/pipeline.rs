/*!
 * End-to-end caption processing: parse, clip, render.
 */

use log::{debug, warn};

use crate::captions::clipper::WindowClipper;
use crate::captions::cue::{ClipWindow, Cue};
use crate::captions::parser::{CueParser, ParsedDocument};
use crate::captions::renderer::{CaptionRenderer, RenderedCaptions};
use crate::captions::style::CaptionStyle;

/// Turns a full caption track into karaoke captions for one window
#[derive(Debug, Clone)]
pub struct CaptionPipeline {
    renderer: CaptionRenderer,
}

impl CaptionPipeline {
    pub fn new(style: CaptionStyle) -> Self {
        Self {
            renderer: CaptionRenderer::new(style),
        }
    }

    /// Run the whole pipeline.
    ///
    /// Returns `None` when no caption event survives, which callers treat as
    /// "no captions available" rather than a failure.
    pub fn run(&self, document: &str, window: ClipWindow) -> Option<RenderedCaptions> {
        let clipped = self.clip_document(document, window);
        let rendered = self.renderer.render(&clipped);

        if rendered.is_empty() {
            warn!("No caption events inside the requested window");
            return None;
        }
        Some(rendered)
    }

    /// Parse and clip without rendering, e.g. to write a trimmed track
    pub fn clip_document(&self, document: &str, window: ClipWindow) -> Vec<Cue> {
        let parsed = CueParser::parse_with_report(document);
        Self::report_quality(&parsed);
        WindowClipper::new(window).clip(&parsed.cues)
    }

    fn report_quality(parsed: &ParsedDocument) {
        if parsed.is_mostly_malformed() {
            warn!(
                "Caption track looks damaged: {} of {} timing lines could not be parsed",
                parsed.malformed_timings,
                parsed.timing_lines()
            );
        } else if parsed.malformed_timings > 0 {
            debug!("Ignored {} malformed timing lines", parsed.malformed_timings);
        }
    }
}

impl Default for CaptionPipeline {
    fn default() -> Self {
        Self::new(CaptionStyle::default())
    }
}
