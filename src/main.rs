// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use clipsub::app_config::{self, Config};
use clipsub::app_controller::{CaptionOutput, ClipOptions, Controller};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// Caption window shared by the caption commands
#[derive(Args, Debug, Clone)]
struct WindowArgs {
    /// Window start (HH:MM:SS.mmm), defaults to clip.default_start
    #[arg(short, long)]
    start: Option<String>,

    /// Window duration in seconds, defaults to clip.default_duration_secs
    #[arg(short, long)]
    duration: Option<f64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a caption track (or every .vtt under a directory) to karaoke .ass
    Render {
        /// Caption file or directory
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[command(flatten)]
        window: WindowArgs,

        /// Output file (single input only)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Force overwrite of existing output files
        #[arg(short, long)]
        force_overwrite: bool,
    },

    /// Write the clipped, rebased caption track as WebVTT
    Trim {
        /// Caption file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[command(flatten)]
        window: WindowArgs,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Language written into the track header
        #[arg(short, long)]
        language: Option<String>,

        /// Force overwrite of existing output files
        #[arg(short, long)]
        force_overwrite: bool,
    },

    /// Cut a vertical clip from a local video or a video id
    Clip {
        /// Video file or video id
        #[arg(value_name = "SOURCE")]
        source: String,

        #[command(flatten)]
        window: WindowArgs,

        /// Caption track to burn instead of downloading one
        #[arg(long)]
        captions: Option<PathBuf>,

        /// Do not burn captions
        #[arg(long)]
        no_burn: bool,
    },

    /// Download a caption track, falling back through the languages
    Fetch {
        /// Video id
        #[arg(value_name = "VIDEO_ID")]
        video_id: String,

        /// Languages to try in order, defaults to caption_languages
        #[arg(short, long, value_delimiter = ',')]
        language: Vec<String>,
    },

    /// Generate shell completions for clipsub
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// clipsub - vertical clips with word-synchronized karaoke captions
#[derive(Parser, Debug)]
#[command(name = "clipsub")]
#[command(version)]
#[command(about = "Vertical short-form clipping with karaoke captions")]
#[command(long_about = "clipsub clips caption tracks to a time window, renders them as word-by-word
highlighted karaoke subtitles and burns them into vertical 9:16 clips.

EXAMPLES:
    clipsub render talk.fr.vtt -s 00:01:00.000 -d 45     # Karaoke .ass for one window
    clipsub render captions/ -s 00:00:10.000 -d 30 -f    # Every .vtt under a directory
    clipsub trim talk.fr.vtt -s 00:01:00.000 -d 45       # Clipped, rebased .vtt
    clipsub fetch dQw4w9WgXcQ -l fr,en                   # Download captions
    clipsub clip dQw4w9WgXcQ -s 00:00:30.000 -d 90       # Download, caption and encode
    clipsub clip talk.mp4 --captions talk.fr.vtt         # Local video with a local track
    clipsub completions bash > clipsub.bash              # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json", env = "CLIPSUB_CONFIG")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and marker for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "❌ "),
            Level::Warn => ("\x1B[1;33m", "🚧 "),
            Level::Info => ("\x1B[1;32m", " "),
            Level::Debug => ("\x1B[1;36m", "🔍 "),
            Level::Trace => ("\x1B[1;35m", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, marker) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                color,
                now,
                marker,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set with set_max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "clipsub", &mut std::io::stdout());
        return Ok(());
    }

    // If log level is set via command line, apply it immediately
    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config = load_config(&cli.config_path, cli.log_level.clone())?;

    if cli.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let controller = Controller::with_config(config)?;
    run_command(&controller, cli.command).await
}

fn load_config(config_path: &Path, log_level: Option<CliLogLevel>) -> Result<Config> {
    let (mut config, created) = Config::load_or_create(config_path)?;
    if created {
        warn!("Config file not found at {:?}, created a default one.", config_path);
    }

    // Update log level in config if specified via command line
    if let Some(log_level) = log_level {
        config.log_level = log_level.into();
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

async fn run_command(controller: &Controller, command: Commands) -> Result<()> {
    match command {
        Commands::Render {
            input,
            window,
            output,
            force_overwrite,
        } => {
            let window = controller.window(window.start.as_deref(), window.duration)?;
            if input.is_dir() {
                if output.is_some() {
                    return Err(anyhow!("--output cannot be used with a directory input"));
                }
                controller.render_folder(&input, window, force_overwrite)?;
            } else if input.is_file() {
                report(controller.render_captions(&input, output.as_deref(), window, force_overwrite)?);
            } else {
                return Err(anyhow!("Input path does not exist: {:?}", input));
            }
        }
        Commands::Trim {
            input,
            window,
            output,
            language,
            force_overwrite,
        } => {
            if !input.is_file() {
                return Err(anyhow!("Input file does not exist: {:?}", input));
            }
            let window = controller.window(window.start.as_deref(), window.duration)?;
            report(controller.trim_captions(
                &input,
                output.as_deref(),
                window,
                language.as_deref(),
                force_overwrite,
            )?);
        }
        Commands::Clip {
            source,
            window,
            captions,
            no_burn,
        } => {
            let options = ClipOptions {
                source,
                start: window.start,
                duration_secs: window.duration,
                captions,
                no_burn,
            };
            let outcome = controller.clip(&options).await?;
            println!("{}", outcome.output.display());
            if let Some(published) = outcome.published {
                info!("Published to {:?}", published);
            }
        }
        Commands::Fetch { video_id, language } => {
            let (language, path) = controller.fetch_captions(&video_id, &language).await?;
            info!("Captions language: {}", language);
            println!("{}", path.display());
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

fn report(output: CaptionOutput) {
    match output {
        CaptionOutput::Written { path, .. } => println!("{}", path.display()),
        CaptionOutput::Skipped(path) => info!("Unchanged: {:?}", path),
        CaptionOutput::NoCaptions => warn!("No captions inside the requested window"),
    }
}
