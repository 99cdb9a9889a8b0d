use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::captions::timecode;
use crate::captions::CaptionStyle;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Caption languages to try, in order of preference (ISO)
    #[serde(default = "default_caption_languages")]
    pub caption_languages: Vec<String>,

    /// Caption style
    #[serde(default)]
    pub captions: CaptionStyle,

    /// Clip defaults
    #[serde(default)]
    pub clip: ClipConfig,

    /// Video transcoder settings
    #[serde(default)]
    pub transcoder: TranscoderConfig,

    /// Media downloader settings
    #[serde(default)]
    pub downloader: DownloaderConfig,

    /// Working directories
    #[serde(default)]
    pub paths: PathsConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Defaults applied to clip requests
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClipConfig {
    /// Default window start (`HH:MM:SS.mmm`)
    #[serde(default = "default_clip_start")]
    pub default_start: String,

    /// Default window duration in seconds
    #[serde(default = "default_clip_duration_secs")]
    pub default_duration_secs: f64,

    /// Burn captions into the clip when a track is available
    #[serde(default = "default_true")]
    pub burn_captions: bool,

    /// Fail the request instead of rendering without captions when none survive
    #[serde(default)]
    pub require_captions: bool,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            default_start: default_clip_start(),
            default_duration_secs: default_clip_duration_secs(),
            burn_captions: true,
            require_captions: false,
        }
    }
}

/// Settings of the external video transcoder
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranscoderConfig {
    /// Executable name or path
    #[serde(default = "default_ffmpeg_program")]
    pub program: String,

    /// Output width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Output height in pixels
    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    #[serde(default = "default_preset")]
    pub preset: String,

    /// Constant rate factor (0-51, lower is better)
    #[serde(default = "default_crf")]
    pub crf: u8,

    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,

    /// Kill the transcoder after this many seconds
    #[serde(default = "default_transcode_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            program: default_ffmpeg_program(),
            width: default_width(),
            height: default_height(),
            video_codec: default_video_codec(),
            preset: default_preset(),
            crf: default_crf(),
            audio_codec: default_audio_codec(),
            audio_bitrate: default_audio_bitrate(),
            timeout_secs: default_transcode_timeout_secs(),
        }
    }
}

/// Settings of the external media downloader
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DownloaderConfig {
    /// Executable name or path
    #[serde(default = "default_ytdlp_program")]
    pub program: String,

    /// Caption download attempts, including the first one
    #[serde(default = "default_caption_attempts")]
    pub caption_attempts: u32,

    /// Sleep before each retry after a rate-limit failure, in seconds.
    /// The last value is reused when there are more retries than entries.
    #[serde(default = "default_rate_limit_backoff_secs")]
    pub rate_limit_backoff_secs: Vec<u64>,

    /// Downloads smaller than this are treated as broken
    #[serde(default = "default_min_video_bytes")]
    pub min_video_bytes: u64,

    /// Kill the downloader after this many seconds
    #[serde(default = "default_download_timeout_secs")]
    pub timeout_secs: u64,

    /// Age after which another process's download lock is taken over.
    /// Must not be shorter than `timeout_secs`.
    #[serde(default = "default_lock_stale_secs")]
    pub lock_stale_secs: u64,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            program: default_ytdlp_program(),
            caption_attempts: default_caption_attempts(),
            rate_limit_backoff_secs: default_rate_limit_backoff_secs(),
            min_video_bytes: default_min_video_bytes(),
            timeout_secs: default_download_timeout_secs(),
            lock_stale_secs: default_lock_stale_secs(),
        }
    }
}

/// Working directories
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PathsConfig {
    /// Downloaded source videos
    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,

    /// Downloaded caption tracks and scratch caption files
    #[serde(default = "default_subs_dir")]
    pub subs_dir: PathBuf,

    /// Finished clips
    #[serde(default = "default_final_dir")]
    pub final_dir: PathBuf,

    /// Optional directory every finished clip is also copied into
    #[serde(default)]
    pub publish_dir: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_dir: default_raw_dir(),
            subs_dir: default_subs_dir(),
            final_dir: default_final_dir(),
            publish_dir: None,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_caption_languages() -> Vec<String> {
    vec!["fr".to_string(), "en".to_string()]
}

fn default_clip_start() -> String {
    "00:00:30.000".to_string()
}

fn default_clip_duration_secs() -> f64 {
    90.0
}

fn default_true() -> bool {
    true
}

fn default_ffmpeg_program() -> String {
    "ffmpeg".to_string()
}

fn default_width() -> u32 {
    1080
}

fn default_height() -> u32 {
    1920
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_preset() -> String {
    "veryfast".to_string()
}

fn default_crf() -> u8 {
    23
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_audio_bitrate() -> String {
    "128k".to_string()
}

fn default_transcode_timeout_secs() -> u64 {
    3600
}

fn default_ytdlp_program() -> String {
    "yt-dlp".to_string()
}

fn default_caption_attempts() -> u32 {
    4
}

fn default_rate_limit_backoff_secs() -> Vec<u64> {
    vec![5, 15, 45, 90]
}

fn default_min_video_bytes() -> u64 {
    1024 * 1024
}

fn default_download_timeout_secs() -> u64 {
    1800
}

fn default_lock_stale_secs() -> u64 {
    2100
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("clipsub")
}

fn default_raw_dir() -> PathBuf {
    default_data_dir().join("raw")
}

fn default_subs_dir() -> PathBuf {
    default_data_dir().join("subs")
}

fn default_final_dir() -> PathBuf {
    default_data_dir().join("final")
}

impl Config {
    /// Load a configuration file, or create it with defaults when missing
    pub fn load_or_create(path: &Path) -> Result<(Self, bool)> {
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok((config, false));
        }

        let config = Config::default();
        config.save(path)?;
        Ok((config, true))
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        if self.caption_languages.is_empty() {
            return Err(anyhow!("At least one caption language is required"));
        }
        for language in &self.caption_languages {
            let _name = crate::language_utils::get_language_name(language)?;
        }

        // Validate clip defaults
        timecode::parse(&self.clip.default_start).map_err(|e| {
            anyhow!("Invalid clip.default_start '{}': {}", self.clip.default_start, e)
        })?;
        if !self.clip.default_duration_secs.is_finite() || self.clip.default_duration_secs <= 0.0 {
            return Err(anyhow!(
                "clip.default_duration_secs must be positive, got {}",
                self.clip.default_duration_secs
            ));
        }

        // Validate caption style
        if self.captions.font_name.trim().is_empty() {
            return Err(anyhow!("captions.font_name must not be empty"));
        }
        if self.captions.font_name.contains([',', '\n', '\r']) {
            return Err(anyhow!(
                "captions.font_name must not contain commas or line breaks, got {:?}",
                self.captions.font_name
            ));
        }
        if self.captions.font_size == 0 {
            return Err(anyhow!("captions.font_size must be positive"));
        }
        if !(1..=9).contains(&self.captions.alignment) {
            return Err(anyhow!(
                "captions.alignment must be between 1 and 9, got {}",
                self.captions.alignment
            ));
        }

        // Validate transcoder
        let transcoder = &self.transcoder;
        if transcoder.width == 0 || transcoder.height == 0 {
            return Err(anyhow!("transcoder.width and transcoder.height must be positive"));
        }
        if transcoder.width % 2 != 0 || transcoder.height % 2 != 0 {
            return Err(anyhow!(
                "transcoder output size must be even, got {}x{}",
                transcoder.width,
                transcoder.height
            ));
        }
        if transcoder.crf > 51 {
            return Err(anyhow!("transcoder.crf must be between 0 and 51, got {}", transcoder.crf));
        }
        if transcoder.timeout_secs == 0 {
            return Err(anyhow!("transcoder.timeout_secs must be positive"));
        }

        // Validate downloader
        if self.downloader.caption_attempts == 0 {
            return Err(anyhow!("downloader.caption_attempts must be at least 1"));
        }
        if self.downloader.timeout_secs == 0 {
            return Err(anyhow!("downloader.timeout_secs must be positive"));
        }
        if self.downloader.lock_stale_secs < self.downloader.timeout_secs {
            return Err(anyhow!(
                "downloader.lock_stale_secs ({}) must not be shorter than downloader.timeout_secs ({})",
                self.downloader.lock_stale_secs,
                self.downloader.timeout_secs
            ));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            caption_languages: default_caption_languages(),
            captions: CaptionStyle::default(),
            clip: ClipConfig::default(),
            transcoder: TranscoderConfig::default(),
            downloader: DownloaderConfig::default(),
            paths: PathsConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
