/*!
 * Fake media collaborators for testing
 *
 * These implement the downloader and transcoder traits without spawning
 * any external tool. Every call is recorded so tests can assert on what the
 * controller asked for.
 */

use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use clipsub::errors::MediaError;
use clipsub::media::{ClipRequest, MediaDownloader, Transcoder, VideoId};

/// Downloader serving prepared files
#[derive(Debug, Default)]
pub struct MockDownloader {
    /// Video returned by `ensure_video`, or a failure when unset
    pub video: Option<PathBuf>,
    /// Caption tracks by language
    pub captions: HashMap<String, PathBuf>,
    /// Log of calls, e.g. `video:abc` or `captions:abc:fr`
    pub calls: Mutex<Vec<String>>,
}

impl MockDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_video(mut self, path: PathBuf) -> Self {
        self.video = Some(path);
        self
    }

    pub fn with_captions(mut self, language: &str, path: PathBuf) -> Self {
        self.captions.insert(language.to_string(), path);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaDownloader for MockDownloader {
    async fn ensure_video(&self, video_id: &VideoId) -> Result<PathBuf, MediaError> {
        self.calls.lock().unwrap().push(format!("video:{}", video_id));
        self.video
            .clone()
            .ok_or_else(|| MediaError::MissingOutput(format!("no video for {}", video_id)))
    }

    async fn fetch_captions(&self, video_id: &VideoId, language: &str) -> Result<PathBuf, MediaError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("captions:{}:{}", video_id, language));
        self.captions
            .get(language)
            .cloned()
            .ok_or_else(|| MediaError::MissingOutput(format!("no '{}' captions", language)))
    }
}

/// What the fake transcoder saw for one request
#[derive(Debug, Clone)]
pub struct RecordedClip {
    pub request: ClipRequest,
    /// Content of the caption file at encode time
    pub captions: Option<String>,
}

/// Transcoder that writes a placeholder output file
#[derive(Debug, Default)]
pub struct MockTranscoder {
    pub clips: Mutex<Vec<RecordedClip>>,
    pub fail: bool,
}

impl MockTranscoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn clips(&self) -> Vec<RecordedClip> {
        self.clips.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    async fn transcode(&self, request: &ClipRequest) -> Result<(), MediaError> {
        let captions = request
            .captions
            .as_ref()
            .map(|path| fs::read_to_string(path).unwrap_or_default());
        self.clips.lock().unwrap().push(RecordedClip {
            request: request.clone(),
            captions,
        });

        if self.fail {
            return Err(MediaError::CommandFailed {
                program: "ffmpeg".to_string(),
                stderr: "Conversion failed!".to_string(),
            });
        }

        fs::write(&request.output, b"fake mp4")
            .map_err(|e| MediaError::Filesystem(e.to_string()))
    }
}
