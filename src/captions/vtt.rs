/*!
 * WebVTT serialization of (clipped) cues.
 */

use std::fmt::Write as _;

use crate::captions::cue::Cue;

/// Writes cues back as a WebVTT caption track
pub struct CueWriter;

impl CueWriter {
    /// Serialize cues with a `Kind`/`Language` header.
    ///
    /// Inline markers are written as they are, so a clipped track keeps its
    /// rebased per-word timing.
    pub fn write_vtt(cues: &[Cue], language: &str) -> String {
        let mut out = String::from("WEBVTT\nKind: captions\n");
        let _ = writeln!(out, "Language: {}", language);
        out.push('\n');

        for cue in cues {
            // Display writes "span\ntext\n"
            let _ = write!(out, "{}", cue);
            out.push('\n');
        }

        out
    }
}

/// Serialize cues in one call
pub fn write_vtt(cues: &[Cue], language: &str) -> String {
    CueWriter::write_vtt(cues, language)
}
