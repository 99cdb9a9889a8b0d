/*!
 * Error types for the clipsub application.
 *
 * The caption engine reports a small set of recoverable errors; the
 * collaborator adapters (yt-dlp, ffmpeg) report process failures. Both are
 * wrapped by `AppError` at the application boundary.
 */

use thiserror::Error;

/// Errors raised by the caption engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptionError {
    /// Text that does not follow the `HH:MM:SS.mmm` grammar
    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),

    /// Clip window whose end is not after its start
    #[error("Invalid clip window: end {end_ms}ms must be after start {start_ms}ms")]
    InvalidWindow {
        /// Window start in ms
        start_ms: u64,
        /// Window end in ms
        end_ms: u64,
    },

    /// Color specification that cannot be decoded
    #[error("Invalid color: {0}")]
    InvalidColor(String),
}

/// Errors that can occur while driving the external media tools
#[derive(Error, Debug)]
pub enum MediaError {
    /// The tool could not be started at all
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        /// Program name
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool exited with a failure status
    #[error("{program} failed: {stderr}")]
    CommandFailed {
        /// Program name
        program: String,
        /// Filtered stderr output
        stderr: String,
    },

    /// The tool did not finish in time
    #[error("{program} timed out after {secs} seconds")]
    Timeout {
        /// Program name
        program: String,
        /// Configured timeout
        secs: u64,
    },

    /// The remote side refused the request after every retry
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// The tool succeeded but did not leave the expected file behind
    #[error("Expected output missing: {0}")]
    MissingOutput(String),

    /// Local file handling around a tool run failed
    #[error("Filesystem error: {0}")]
    Filesystem(String),

    /// Identifier unsafe for use in paths or command arguments
    #[error("Invalid video id: {0}")]
    InvalidVideoId(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the caption engine
    #[error("Caption error: {0}")]
    Caption(#[from] CaptionError),

    /// Error from a media collaborator
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
