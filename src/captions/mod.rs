/*!
 * Caption retiming and karaoke rendering engine.
 *
 * - `timecode`: `HH:MM:SS.mmm` and centisecond conversions
 * - `cue`: time spans, clip windows, cues, words and the inline tokenizer
 * - `parser`: caption document parsing
 * - `clipper`: window clipping and rebasing
 * - `karaoke`: per-word timing
 * - `style`: caption style configuration
 * - `renderer`: karaoke subtitle document output
 * - `vtt`: trimmed track output
 * - `pipeline`: parse, clip and render in one pass
 *
 * Everything in here is synchronous and free of I/O.
 */

// Re-export main types for easier usage
pub use self::clipper::WindowClipper;
pub use self::cue::{ClipWindow, Cue, CueToken, TextSegment, TimeSpan, Word};
pub use self::karaoke::{KaraokeLine, KaraokeSegmenter, TimingRegime};
pub use self::parser::{CueParser, ParsedDocument};
pub use self::pipeline::CaptionPipeline;
pub use self::renderer::{CaptionRenderer, RenderedCaptions};
pub use self::style::{CaptionColor, CaptionStyle};
pub use self::vtt::CueWriter;

// Submodules
pub mod clipper;
pub mod cue;
pub mod karaoke;
pub mod parser;
pub mod pipeline;
pub mod renderer;
pub mod style;
pub mod timecode;
pub mod vtt;
