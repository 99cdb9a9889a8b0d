/*!
 * Cue document parsing.
 *
 * The document is classified line by line into tagged variants and folded
 * into cues in a single forward pass. Malformed timing lines, degenerate
 * spans and empty cues are dropped and counted rather than failing the
 * whole document: real-world caption tracks are routinely imperfect.
 */

use log::{debug, warn};

use crate::captions::cue::Cue;
use crate::captions::timecode;

/// Separator between start and end time on a timing line
pub const CUE_TIME_SEPARATOR: &str = "-->";

/// Classification of a single document line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueLine<'a> {
    /// `start --> end [settings]` with both times valid
    Timing { start_ms: u64, end_ms: u64 },
    /// Contains the separator but the times do not parse
    MalformedTiming,
    /// Whitespace only
    Blank,
    /// Anything else, untrimmed
    Text(&'a str),
}

impl<'a> CueLine<'a> {
    /// Classify one line of a caption document
    pub fn classify(line: &'a str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return CueLine::Blank;
        }

        let Some((left, right)) = trimmed.split_once(CUE_TIME_SEPARATOR) else {
            return CueLine::Text(line);
        };

        // positioning directives after the end time are cosmetic
        let end = right.split_whitespace().next().unwrap_or_default();
        match (timecode::parse(left), timecode::parse(end)) {
            (Ok(start_ms), Ok(end_ms)) => CueLine::Timing { start_ms, end_ms },
            _ => CueLine::MalformedTiming,
        }
    }
}

/// Parsed cues plus counters describing what was dropped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    /// Retained cues in document order
    pub cues: Vec<Cue>,
    /// Timing lines whose times did not parse
    pub malformed_timings: usize,
    /// Cues whose end was not after their start
    pub degenerate_cues: usize,
    /// Cues without any text
    pub empty_cues: usize,
}

impl ParsedDocument {
    /// Number of timing lines encountered, valid or not
    pub fn timing_lines(&self) -> usize {
        self.cues.len() + self.malformed_timings + self.degenerate_cues + self.empty_cues
    }

    /// Whether most timing lines in the document were unusable
    pub fn is_mostly_malformed(&self) -> bool {
        let total = self.timing_lines();
        total > 0 && self.malformed_timings * 2 > total
    }
}

/// Caption document parser
pub struct CueParser;

impl CueParser {
    /// Parse a caption document into ordered cues
    pub fn parse(document: &str) -> Vec<Cue> {
        Self::parse_with_report(document).cues
    }

    /// Parse a caption document, keeping counts of dropped input
    pub fn parse_with_report(document: &str) -> ParsedDocument {
        let document = document.strip_prefix('\u{feff}').unwrap_or(document);
        let mut report = ParsedDocument::default();

        // (start, end, accumulated lines) of the cue being read
        let mut current: Option<(u64, u64, Vec<&str>)> = None;

        for (line_no, line) in document.lines().enumerate() {
            if let Some((_, _, body)) = current.as_mut() {
                if !line.trim().is_empty() {
                    body.push(line);
                    continue;
                }
                if let Some((start_ms, end_ms, body)) = current.take() {
                    Self::finish_cue(&mut report, start_ms, end_ms, &body);
                }
                continue;
            }

            match CueLine::classify(line) {
                CueLine::Timing { start_ms, end_ms } => {
                    current = Some((start_ms, end_ms, Vec::new()));
                }
                CueLine::MalformedTiming => {
                    debug!("Skipping malformed cue timing at line {}: {}", line_no + 1, line.trim());
                    report.malformed_timings += 1;
                }
                CueLine::Blank | CueLine::Text(_) => {}
            }
        }

        if let Some((start_ms, end_ms, body)) = current.take() {
            Self::finish_cue(&mut report, start_ms, end_ms, &body);
        }

        if report.cues.is_empty() {
            warn!("No usable cues found in caption document");
        }
        debug!(
            "Parsed {} cues ({} malformed timings, {} degenerate, {} empty)",
            report.cues.len(),
            report.malformed_timings,
            report.degenerate_cues,
            report.empty_cues
        );

        report
    }

    fn finish_cue(report: &mut ParsedDocument, start_ms: u64, end_ms: u64, body: &[&str]) {
        let text = body.join("\n");
        match Cue::try_new(start_ms, end_ms, &text) {
            Some(cue) => report.cues.push(cue),
            None if end_ms <= start_ms => report.degenerate_cues += 1,
            None => report.empty_cues += 1,
        }
    }
}
