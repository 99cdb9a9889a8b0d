use anyhow::{anyhow, bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::app_config::Config;
use crate::captions::{timecode, CaptionPipeline, ClipWindow, CueWriter};
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::media::{
    ClipRequest, FfmpegTranscoder, MediaDownloader, Transcoder, VideoId, YtDlpDownloader,
};

// @module: Application controller for caption rendering and clipping

/// Suffix of tracks written by `trim_captions`
const TRIM_SUFFIX: &str = "trim";

/// What happened to one caption file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptionOutput {
    /// The output was written
    Written { path: PathBuf, event_count: usize },
    /// The output already existed and overwriting was not requested
    Skipped(PathBuf),
    /// No cue survived the window; nothing was written
    NoCaptions,
}

/// Counts reported after a directory batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub empty: usize,
    pub errors: usize,
}

/// Parameters of a clip request; unset values fall back to the configuration
#[derive(Debug, Clone, Default)]
pub struct ClipOptions {
    /// Local video file or video id
    pub source: String,
    pub start: Option<String>,
    pub duration_secs: Option<f64>,
    /// Caption track to use instead of downloading one
    pub captions: Option<PathBuf>,
    /// Skip captions entirely
    pub no_burn: bool,
}

/// Result of a clip request
#[derive(Debug, Clone, PartialEq)]
pub struct ClipOutcome {
    pub output: PathBuf,
    pub published: Option<PathBuf>,
    pub captions_burned: bool,
    pub caption_track: Option<PathBuf>,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    pipeline: CaptionPipeline,
    downloader: Arc<dyn MediaDownloader>,
    transcoder: Arc<dyn Transcoder>,
}

impl Controller {
    // @method: Create a controller driving yt-dlp and ffmpeg
    pub fn with_config(config: Config) -> Result<Self> {
        let downloader = Arc::new(YtDlpDownloader::new(config.downloader.clone(), &config.paths));
        let transcoder = Arc::new(FfmpegTranscoder::new(config.transcoder.clone()));
        Ok(Self::with_collaborators(config, downloader, transcoder))
    }

    /// Create a controller with explicit collaborators
    pub fn with_collaborators(
        config: Config,
        downloader: Arc<dyn MediaDownloader>,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        let pipeline = CaptionPipeline::new(config.captions.clone());
        Self {
            config,
            pipeline,
            downloader,
            transcoder,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the clip window, using configured defaults for missing values
    pub fn window(&self, start: Option<&str>, duration_secs: Option<f64>) -> Result<ClipWindow> {
        let start = start.unwrap_or(&self.config.clip.default_start);
        let duration = duration_secs.unwrap_or(self.config.clip.default_duration_secs);
        ClipWindow::from_start_and_duration(start, duration)
            .with_context(|| format!("Invalid clip window: start {} duration {}s", start, duration))
    }

    /// Render one caption track to a karaoke subtitle file
    pub fn render_captions(
        &self,
        input_file: &Path,
        output_file: Option<&Path>,
        window: ClipWindow,
        force_overwrite: bool,
    ) -> Result<CaptionOutput> {
        let output_path = match output_file {
            Some(path) => path.to_path_buf(),
            None => FileManager::generate_output_path(input_file, Self::parent_dir(input_file), "", "ass"),
        };

        if output_path.exists() && !force_overwrite {
            warn!("Skipping {:?}, output already exists (use -f to force overwrite)", output_path);
            return Ok(CaptionOutput::Skipped(output_path));
        }

        let document = FileManager::read_to_string(input_file)?;
        let Some(rendered) = self.pipeline.run(&document, window) else {
            warn!("No captions inside the window for {:?}", input_file);
            return Ok(CaptionOutput::NoCaptions);
        };

        FileManager::write_to_file(&output_path, &rendered.document)?;
        info!("Wrote {} caption events to {:?}", rendered.event_count, output_path);

        Ok(CaptionOutput::Written {
            path: output_path,
            event_count: rendered.event_count,
        })
    }

    /// Render every caption track under a directory next to its source
    pub fn render_folder(&self, input_dir: &Path, window: ClipWindow, force_overwrite: bool) -> Result<BatchSummary> {
        let start_time = std::time::Instant::now();

        if !input_dir.is_dir() {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let tracks: Vec<PathBuf> = FileManager::find_files(input_dir, "vtt")?
            .into_iter()
            .filter(|track| !Self::is_trim_output(track))
            .collect();
        if tracks.is_empty() {
            return Err(anyhow!("No caption files found in directory: {:?}", input_dir));
        }

        let folder_pb = ProgressBar::new(tracks.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));

        let mut summary = BatchSummary::default();

        for track in &tracks {
            let file_name = track
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Rendering: {}", file_name));

            match self.render_captions(track, None, window, force_overwrite) {
                Ok(CaptionOutput::Written { .. }) => summary.processed += 1,
                Ok(CaptionOutput::Skipped(_)) => summary.skipped += 1,
                Ok(CaptionOutput::NoCaptions) => summary.empty += 1,
                Err(e) => {
                    error!("Error rendering {}: {}", file_name, e);
                    summary.errors += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_and_clear();

        info!(
            "Folder rendering completed in {}: {} rendered, {} skipped, {} without captions, {} errors",
            Self::format_duration(start_time.elapsed()),
            summary.processed,
            summary.skipped,
            summary.empty,
            summary.errors
        );

        Ok(summary)
    }

    /// Whether a track is the default output of an earlier trim
    fn is_trim_output(track: &Path) -> bool {
        track
            .file_stem()
            .and_then(|stem| Path::new(stem).extension())
            .is_some_and(|ext| ext == TRIM_SUFFIX)
    }

    /// Write the clipped, rebased caption track as WebVTT
    pub fn trim_captions(
        &self,
        input_file: &Path,
        output_file: Option<&Path>,
        window: ClipWindow,
        language: Option<&str>,
        force_overwrite: bool,
    ) -> Result<CaptionOutput> {
        let language = self.caption_language(language)?;
        let output_path = match output_file {
            Some(path) => path.to_path_buf(),
            None => FileManager::generate_output_path(input_file, Self::parent_dir(input_file), TRIM_SUFFIX, "vtt"),
        };

        if output_path.exists() && !force_overwrite {
            warn!("Skipping {:?}, output already exists (use -f to force overwrite)", output_path);
            return Ok(CaptionOutput::Skipped(output_path));
        }

        let document = FileManager::read_to_string(input_file)?;
        let cues = self.pipeline.clip_document(&document, window);
        if cues.is_empty() {
            warn!("No cues inside the window for {:?}", input_file);
            return Ok(CaptionOutput::NoCaptions);
        }

        FileManager::write_to_file(&output_path, &CueWriter::write_vtt(&cues, &language))?;
        info!("Wrote {} trimmed cues to {:?}", cues.len(), output_path);

        Ok(CaptionOutput::Written {
            path: output_path,
            event_count: cues.len(),
        })
    }

    /// Download a caption track, trying the requested languages in order
    pub async fn fetch_captions(&self, video_id: &str, languages: &[String]) -> Result<(String, PathBuf)> {
        let video_id = VideoId::parse(video_id)?;
        let languages = if languages.is_empty() {
            self.config.caption_languages.clone()
        } else {
            languages.to_vec()
        };
        let languages = languages
            .iter()
            .map(|code| language_utils::normalize_to_part1_or_part2t(code))
            .collect::<Result<Vec<_>>>()?;

        let (language, path) = self
            .downloader
            .fetch_captions_with_fallback(&video_id, &languages)
            .await
            .with_context(|| format!("No captions could be downloaded for {}", video_id))?;

        info!("Downloaded '{}' captions for {} to {:?}", language, video_id, path);
        Ok((language, path))
    }

    /// Cut a vertical clip, burning karaoke captions when available
    pub async fn clip(&self, options: &ClipOptions) -> Result<ClipOutcome> {
        let start_time = std::time::Instant::now();
        let window = self.window(options.start.as_deref(), options.duration_secs)?;
        let duration_secs = options
            .duration_secs
            .unwrap_or(self.config.clip.default_duration_secs);

        let local = Path::new(&options.source);
        let (source, stem, video_id) = if local.is_file() {
            let stem = local
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "clip".to_string());
            (local.to_path_buf(), stem, None)
        } else {
            let video_id = VideoId::parse(&options.source)
                .with_context(|| format!("Source is neither a file nor a video id: {}", options.source))?;
            let source = self
                .downloader
                .ensure_video(&video_id)
                .await
                .with_context(|| format!("Failed to download video {}", video_id))?;
            (source, video_id.to_string(), Some(video_id))
        };

        let burn = !options.no_burn && self.config.clip.burn_captions;
        let caption_track = if burn {
            self.resolve_caption_track(options.captions.as_deref(), video_id.as_ref()).await
        } else {
            None
        };

        // kept alive until the transcoder is done with it
        let scratch = match &caption_track {
            Some(track) => self.render_scratch_captions(track, window, &stem)?,
            None => None,
        };

        if burn && scratch.is_none() {
            if self.config.clip.require_captions {
                bail!("No captions available for {} and clip.require_captions is set", options.source);
            }
            warn!("No captions available for {}, rendering without captions", options.source);
        }

        FileManager::ensure_dir(&self.config.paths.final_dir)?;
        let output = self.config.paths.final_dir.join(format!(
            "{}_{}_9x16.mp4",
            stem,
            Uuid::new_v4().simple()
        ));

        let request = ClipRequest {
            source,
            start: timecode::format_millis(window.start_ms()),
            duration_secs,
            captions: scratch.as_ref().map(|file| file.path().to_path_buf()),
            output: output.clone(),
        };

        let spinner = Self::spinner(format!("Encoding {}", stem));
        let result = self.transcoder.transcode(&request).await;
        spinner.finish_and_clear();
        result.with_context(|| format!("Failed to encode clip from {:?}", request.source))?;

        let published = match &self.config.paths.publish_dir {
            Some(dir) => {
                let file_name = output
                    .file_name()
                    .ok_or_else(|| anyhow!("Output has no file name: {:?}", output))?;
                let target = dir.join(file_name);
                FileManager::copy_file(&output, &target)?;
                Some(target)
            }
            None => None,
        };

        info!(
            "Clip written to {:?} in {}",
            output,
            Self::format_duration(start_time.elapsed())
        );

        Ok(ClipOutcome {
            output,
            published,
            captions_burned: scratch.is_some(),
            caption_track,
        })
    }

    async fn resolve_caption_track(&self, explicit: Option<&Path>, video_id: Option<&VideoId>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            if path.is_file() {
                return Some(path.to_path_buf());
            }
            warn!("Caption track {:?} does not exist", path);
            return None;
        }

        let video_id = video_id?;
        match self
            .downloader
            .fetch_captions_with_fallback(video_id, &self.config.caption_languages)
            .await
        {
            Ok((language, path)) => {
                debug!("Using '{}' captions {:?}", language, path);
                Some(path)
            }
            Err(e) => {
                warn!("Could not download captions for {}: {}", video_id, e);
                None
            }
        }
    }

    /// Render captions into a scratch file deleted when dropped
    fn render_scratch_captions(
        &self,
        track: &Path,
        window: ClipWindow,
        stem: &str,
    ) -> Result<Option<tempfile::NamedTempFile>> {
        let document = FileManager::read_to_string(track)?;
        let Some(rendered) = self.pipeline.run(&document, window) else {
            return Ok(None);
        };

        FileManager::ensure_dir(&self.config.paths.subs_dir)?;
        let mut scratch = tempfile::Builder::new()
            .prefix(&format!("kara_{}_", stem))
            .suffix(".ass")
            .tempfile_in(&self.config.paths.subs_dir)
            .context("Failed to create scratch caption file")?;
        scratch
            .write_all(rendered.document.as_bytes())
            .context("Failed to write scratch caption file")?;
        scratch.flush()?;

        debug!("Rendered {} caption events to {:?}", rendered.event_count, scratch.path());
        Ok(Some(scratch))
    }

    fn spinner(message: String) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }

    fn caption_language(&self, requested: Option<&str>) -> Result<String> {
        let code = requested
            .or_else(|| self.config.caption_languages.first().map(String::as_str))
            .unwrap_or("en");
        language_utils::normalize_to_part1_or_part2t(code)
    }

    fn parent_dir(path: &Path) -> &Path {
        path.parent().unwrap_or(Path::new("."))
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
