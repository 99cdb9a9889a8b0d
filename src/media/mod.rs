/*!
 * Adapters for the external media tools.
 *
 * - `downloader`: source videos and caption tracks via yt-dlp
 * - `transcoder`: clip encoding via ffmpeg
 * - `process`: running a tool with a deadline
 * - `lock`: per-video lock files shared between processes
 *
 * The caption engine never depends on this module; the controller wires the
 * two together behind the `MediaDownloader` and `Transcoder` traits.
 */

// Re-export main types for easier usage
pub use self::downloader::{MediaDownloader, VideoId, YtDlpDownloader};
pub use self::transcoder::{ClipRequest, FfmpegTranscoder, Transcoder};

// Submodules
pub mod downloader;
pub mod lock;
pub mod process;
pub mod transcoder;
