/*!
 * Vertical clip encoding through ffmpeg.
 */

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};

use crate::app_config::TranscoderConfig;
use crate::errors::MediaError;
use crate::media::process::run_tool;

/// One clip to cut from a source video
#[derive(Debug, Clone, PartialEq)]
pub struct ClipRequest {
    /// Source video
    pub source: PathBuf,

    /// Seek position, `HH:MM:SS.mmm`
    pub start: String,

    /// Clip length in seconds
    pub duration_secs: f64,

    /// Rendered karaoke captions to burn in, if any
    pub captions: Option<PathBuf>,

    /// Output video
    pub output: PathBuf,
}

/// Encodes clips
#[async_trait]
pub trait Transcoder: Send + Sync + Debug {
    /// Cut, reframe and encode one clip
    async fn transcode(&self, request: &ClipRequest) -> Result<(), MediaError>;
}

/// Transcoder backed by the `ffmpeg` executable
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    config: TranscoderConfig,
}

impl FfmpegTranscoder {
    pub fn new(config: TranscoderConfig) -> Self {
        Self { config }
    }

    /// Scale-to-cover and center-crop to the output size, then burn captions
    pub fn video_filter(&self, captions: Option<&Path>) -> String {
        let (width, height) = (self.config.width, self.config.height);
        let mut filter = format!(
            "scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h}",
            w = width,
            h = height
        );
        if let Some(path) = captions {
            filter.push_str(&format!(",subtitles='{}'", escape_filter_path(path)));
        }
        filter
    }

    /// Full ffmpeg argument vector for a request
    pub fn build_args(&self, request: &ClipRequest) -> Vec<String> {
        let config = &self.config;
        vec![
            "-y".to_string(),
            "-ss".to_string(),
            request.start.clone(),
            "-i".to_string(),
            request.source.to_string_lossy().into_owned(),
            "-t".to_string(),
            request.duration_secs.to_string(),
            "-vf".to_string(),
            self.video_filter(request.captions.as_deref()),
            "-map".to_string(),
            "0:v:0?".to_string(),
            "-map".to_string(),
            "0:a:0?".to_string(),
            "-c:v".to_string(),
            config.video_codec.clone(),
            "-preset".to_string(),
            config.preset.clone(),
            "-crf".to_string(),
            config.crf.to_string(),
            "-c:a".to_string(),
            config.audio_codec.clone(),
            "-b:a".to_string(),
            config.audio_bitrate.clone(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            request.output.to_string_lossy().into_owned(),
        ]
    }

    /// Drop banner, stream listing and metadata lines from ffmpeg stderr
    pub fn filter_ffmpeg_stderr(stderr: &str) -> String {
        let noise_prefixes = [
            "ffmpeg version",
            "built with",
            "configuration:",
            "lib",
            "Input #",
            "Metadata:",
            "Duration:",
            "Chapter",
            "Stream #",
            "title",
            "encoder",
            "handler_name",
            "major_brand",
            "minor_version",
            "compatible_brands",
            "creation_time",
            "Output #",
            "Stream mapping:",
            "Press [q]",
            "frame=",
            "size=",
        ];

        let meaningful: Vec<&str> = stderr
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| !noise_prefixes.iter().any(|p| line.starts_with(p)))
            .collect();

        if meaningful.is_empty() {
            "unknown ffmpeg error (stderr was empty after filtering)".to_string()
        } else {
            meaningful.join("\n")
        }
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, request: &ClipRequest) -> Result<(), MediaError> {
        let args = self.build_args(request);
        debug!("Video filter: {}", self.video_filter(request.captions.as_deref()));

        let output = run_tool(
            &self.config.program,
            &args,
            Duration::from_secs(self.config.timeout_secs),
        )
        .await?;

        if !output.success {
            let filtered = Self::filter_ffmpeg_stderr(&output.stderr);
            error!("Clip encoding failed: {}", filtered);
            return Err(MediaError::CommandFailed {
                program: self.config.program.clone(),
                stderr: filtered,
            });
        }

        if !request.output.is_file() {
            return Err(MediaError::MissingOutput(format!("{:?}", request.output)));
        }

        Ok(())
    }
}

/// Quote a path for use inside a single-quoted filter argument
pub fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
}
