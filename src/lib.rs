/*!
 * # clipsub - vertical clips with karaoke captions
 *
 * A Rust library for turning long-form caption tracks into word-synchronized
 * karaoke subtitles for short vertical clips.
 *
 * ## Features
 *
 * - Parse WebVTT caption tracks, including per-word inline timestamps
 * - Clip cues to a time window and rebase them to zero
 * - Time every word from its inline timestamp, with a whole-cue fallback
 * - Render Advanced SubStation Alpha documents with `\k` karaoke tags
 * - Write trimmed WebVTT tracks
 * - Drive yt-dlp and ffmpeg to download sources and encode 9:16 clips
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `captions`: the caption engine (pure, synchronous, no I/O):
 *   - `captions::timecode`: time-code conversions
 *   - `captions::parser`: caption document parsing
 *   - `captions::clipper`: window clipping
 *   - `captions::karaoke`: per-word timing
 *   - `captions::style`: caption colors and style block
 *   - `captions::renderer`: karaoke subtitle output
 *   - `captions::vtt`: trimmed track output
 *   - `captions::pipeline`: parse, clip and render in one call
 * - `media`: adapters for the external download and encoding tools
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod captions;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod media;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use captions::{CaptionPipeline, CaptionStyle, ClipWindow, Cue, CueParser, RenderedCaptions};
pub use errors::{AppError, CaptionError, MediaError};
pub use language_utils::{get_language_name, normalize_to_part1_or_part2t};
