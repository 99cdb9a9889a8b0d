/*!
 * Tests for error types
 */

use std::io;
use clipsub::errors::{AppError, CaptionError, MediaError};

/// Test caption error messages
#[test]
fn test_caption_error_display_shouldDescribeProblem() {
    assert_eq!(
        CaptionError::InvalidTimeFormat("1:00".to_string()).to_string(),
        "Invalid time format: 1:00"
    );
    assert_eq!(
        CaptionError::InvalidWindow { start_ms: 5_000, end_ms: 5_000 }.to_string(),
        "Invalid clip window: end 5000ms must be after start 5000ms"
    );
}

/// Test media error messages
#[test]
fn test_media_error_display_shouldNameTheTool() {
    let timeout = MediaError::Timeout { program: "ffmpeg".to_string(), secs: 30 };
    assert_eq!(timeout.to_string(), "ffmpeg timed out after 30 seconds");

    let failed = MediaError::CommandFailed {
        program: "yt-dlp".to_string(),
        stderr: "ERROR: Video unavailable".to_string(),
    };
    assert_eq!(failed.to_string(), "yt-dlp failed: ERROR: Video unavailable");

    let spawn = MediaError::Spawn {
        program: "ffmpeg".to_string(),
        source: io::Error::new(io::ErrorKind::NotFound, "not found"),
    };
    assert!(spawn.to_string().starts_with("Failed to execute ffmpeg"));
    assert!(std::error::Error::source(&spawn).is_some());
}

/// Test conversions into the application error
#[test]
fn test_app_error_from_shouldWrapSources() {
    let caption: AppError = CaptionError::InvalidColor("violet".to_string()).into();
    assert!(matches!(caption, AppError::Caption(CaptionError::InvalidColor(_))));
    assert_eq!(caption.to_string(), "Caption error: Invalid color: violet");

    let media: AppError = MediaError::InvalidVideoId("../x".to_string()).into();
    assert_eq!(media.to_string(), "Media error: Invalid video id: ../x");

    let file: AppError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
    assert!(matches!(file, AppError::File(_)));

    let other: AppError = anyhow::anyhow!("boom").into();
    assert_eq!(other.to_string(), "Unknown error: boom");
}
