/*!
 * Source video and caption track download through yt-dlp.
 */

use std::fmt;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use url::Url;

use crate::app_config::{DownloaderConfig, PathsConfig};
use crate::errors::MediaError;
use crate::file_utils::FileManager;
use crate::media::lock::DownloadLock;
use crate::media::process::{run_tool, tail_lines, ToolOutput};

const WATCH_URL: &str = "https://www.youtube.com/watch";

/// Directory under `raw_dir` holding per-video download locks
pub const LOCK_DIR_NAME: &str = ".locks";

/// Longest accepted video id
pub const MAX_VIDEO_ID_LEN: usize = 64;

/// A video id checked to be safe for file names and tool arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    /// Accepts 1 to 64 characters from `[A-Za-z0-9_-]`
    pub fn parse(raw: &str) -> Result<Self, MediaError> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_VIDEO_ID_LEN
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(MediaError::InvalidVideoId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Public watch page of the video
    pub fn watch_url(&self) -> Result<Url, MediaError> {
        Url::parse_with_params(WATCH_URL, &[("v", self.as_str())])
            .map_err(|e| MediaError::InvalidVideoId(format!("{}: {}", self.0, e)))
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fetches source videos and caption tracks
#[async_trait]
pub trait MediaDownloader: Send + Sync + Debug {
    /// Make sure the source video is available locally and return its path
    async fn ensure_video(&self, video_id: &VideoId) -> Result<PathBuf, MediaError>;

    /// Download the caption track for one language and return its path
    async fn fetch_captions(&self, video_id: &VideoId, language: &str) -> Result<PathBuf, MediaError>;

    /// Try each language in order and return the first track found
    async fn fetch_captions_with_fallback(
        &self,
        video_id: &VideoId,
        languages: &[String],
    ) -> Result<(String, PathBuf), MediaError> {
        let mut last_error = None;

        for language in languages {
            match self.fetch_captions(video_id, language).await {
                Ok(path) => return Ok((language.clone(), path)),
                Err(e) => {
                    warn!("No '{}' captions for {}: {}", language, video_id, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            MediaError::MissingOutput(format!("no caption language requested for {}", video_id))
        }))
    }
}

/// Downloader backed by the `yt-dlp` executable
#[derive(Debug, Clone)]
pub struct YtDlpDownloader {
    config: DownloaderConfig,
    raw_dir: PathBuf,
    subs_dir: PathBuf,
}

impl YtDlpDownloader {
    pub fn new(config: DownloaderConfig, paths: &PathsConfig) -> Self {
        Self {
            config,
            raw_dir: paths.raw_dir.clone(),
            subs_dir: paths.subs_dir.clone(),
        }
    }

    /// Where the source video of `video_id` is kept
    pub fn video_path(&self, video_id: &VideoId) -> PathBuf {
        self.raw_dir.join(format!("{}.mp4", video_id))
    }

    /// Lock file serializing downloads of `video_id`
    pub fn lock_path(&self, video_id: &VideoId) -> PathBuf {
        self.raw_dir.join(LOCK_DIR_NAME).join(Self::lock_name(video_id))
    }

    fn lock_name(video_id: &VideoId) -> String {
        format!("dl-{}", video_id)
    }

    fn is_downloaded(&self, target: &Path) -> bool {
        FileManager::file_size(target) > self.config.min_video_bytes
    }

    /// Arguments for downloading the merged mp4 of a video
    pub fn video_args(&self, video_id: &VideoId) -> Result<Vec<String>, MediaError> {
        let template = self.raw_dir.join(format!("{}.%(ext)s", video_id));
        Ok(vec![
            "--force-overwrites".to_string(),
            "--no-part".to_string(),
            "--retries".to_string(),
            "10".to_string(),
            "--fragment-retries".to_string(),
            "10".to_string(),
            "--concurrent-fragments".to_string(),
            "1".to_string(),
            "-f".to_string(),
            "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best".to_string(),
            "--merge-output-format".to_string(),
            "mp4".to_string(),
            "-o".to_string(),
            template.to_string_lossy().into_owned(),
            video_id.watch_url()?.to_string(),
        ])
    }

    /// Arguments for downloading manual or automatic captions of one language
    pub fn caption_args(&self, video_id: &VideoId, language: &str) -> Result<Vec<String>, MediaError> {
        let template = self.subs_dir.join(format!("{}.%(ext)s", video_id));
        Ok(vec![
            "--skip-download".to_string(),
            "--write-subs".to_string(),
            "--write-auto-subs".to_string(),
            "--sub-format".to_string(),
            "vtt".to_string(),
            "--sub-langs".to_string(),
            language.to_string(),
            "--output".to_string(),
            template.to_string_lossy().into_owned(),
            video_id.watch_url()?.to_string(),
        ])
    }

    /// Whether a failure looks like the remote side throttling us
    pub fn is_rate_limited(stderr: &str) -> bool {
        let lower = stderr.to_lowercase();
        lower.contains("http error 429") || lower.contains("too many requests") || lower.contains(" 429")
    }

    /// Sleep before retry number `attempt` (0-based)
    pub fn backoff_for(&self, attempt: usize) -> Duration {
        let schedule = &self.config.rate_limit_backoff_secs;
        let secs = schedule
            .get(attempt)
            .or_else(|| schedule.last())
            .copied()
            .unwrap_or(0);
        Duration::from_secs(secs)
    }

    async fn run(&self, args: &[String]) -> Result<ToolOutput, MediaError> {
        run_tool(
            &self.config.program,
            args,
            Duration::from_secs(self.config.timeout_secs),
        )
        .await
    }

    fn failure(&self, output: &ToolOutput) -> MediaError {
        MediaError::CommandFailed {
            program: self.config.program.clone(),
            stderr: tail_lines(&output.stderr, 20),
        }
    }

    /// `abc.` so that `abc.f137.mp4` matches but `abcd.mp4` does not
    fn file_prefix(video_id: &VideoId) -> String {
        format!("{}.", video_id)
    }

    fn ensure_dir(dir: &Path) -> Result<(), MediaError> {
        FileManager::ensure_dir(dir).map_err(|e| MediaError::Filesystem(e.to_string()))
    }
}

#[async_trait]
impl MediaDownloader for YtDlpDownloader {
    async fn ensure_video(&self, video_id: &VideoId) -> Result<PathBuf, MediaError> {
        let target = self.video_path(video_id);
        if self.is_downloaded(&target) {
            debug!("Reusing downloaded video {:?}", target);
            return Ok(target);
        }

        Self::ensure_dir(&self.raw_dir)?;
        let _lock = DownloadLock::acquire(
            &self.raw_dir.join(LOCK_DIR_NAME),
            &Self::lock_name(video_id),
            Duration::from_secs(self.config.lock_stale_secs),
        )
        .await?;

        // another process may have finished while we waited
        if self.is_downloaded(&target) {
            debug!("Video {} was downloaded while waiting for the lock", video_id);
            return Ok(target);
        }

        info!("Downloading video {}", video_id);

        let output = self.run(&self.video_args(video_id)?).await?;
        if !output.success {
            return Err(self.failure(&output));
        }

        let candidates = FileManager::files_matching(&self.raw_dir, &Self::file_prefix(video_id), ".mp4")
            .map_err(|e| MediaError::Filesystem(e.to_string()))?;
        let largest = candidates
            .into_iter()
            .max_by_key(|path| FileManager::file_size(path))
            .ok_or_else(|| MediaError::MissingOutput(format!("no mp4 produced for {}", video_id)))?;

        if largest != target {
            FileManager::move_file(&largest, &target)
                .map_err(|e| MediaError::Filesystem(e.to_string()))?;
        }

        if FileManager::file_size(&target) < self.config.min_video_bytes {
            return Err(MediaError::MissingOutput(format!(
                "downloaded video {:?} is too small",
                target
            )));
        }

        Ok(target)
    }

    async fn fetch_captions(&self, video_id: &VideoId, language: &str) -> Result<PathBuf, MediaError> {
        Self::ensure_dir(&self.subs_dir)?;
        let suffix = format!(".{}.vtt", language);

        let prefix = Self::file_prefix(video_id);
        let removed = FileManager::remove_matching(&self.subs_dir, &prefix, &suffix)
            .map_err(|e| MediaError::Filesystem(e.to_string()))?;
        if removed > 0 {
            debug!("Removed {} stale caption files for {}", removed, video_id);
        }

        let args = self.caption_args(video_id, language)?;
        let attempts = self.config.caption_attempts.max(1) as usize;

        for attempt in 0..attempts {
            let output = self.run(&args).await?;

            if output.success {
                return FileManager::files_matching(&self.subs_dir, &prefix, &suffix)
                    .map_err(|e| MediaError::Filesystem(e.to_string()))?
                    .into_iter()
                    .next()
                    .ok_or_else(|| {
                        MediaError::MissingOutput(format!("no '{}' captions for {}", language, video_id))
                    });
            }

            if !Self::is_rate_limited(&output.stderr) {
                return Err(self.failure(&output));
            }

            if attempt + 1 == attempts {
                return Err(MediaError::RateLimited(tail_lines(&output.stderr, 5)));
            }

            let delay = self.backoff_for(attempt);
            warn!(
                "Rate limited while fetching captions for {} (attempt {}/{}), retrying in {}s",
                video_id,
                attempt + 1,
                attempts,
                delay.as_secs()
            );
            tokio::time::sleep(delay).await;
        }

        Err(MediaError::RateLimited(format!("captions for {}", video_id)))
    }
}
