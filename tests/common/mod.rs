/*!
 * Common test utilities for the clipsub test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use clipsub::app_config::Config;

// Re-export the fake media collaborators
pub mod mock_media;

/// Auto-caption style track: rolling two-line cues with inline word timestamps
pub const SAMPLE_VTT: &str = "WEBVTT
Kind: captions
Language: fr

00:00:01.000 --> 00:00:05.000 align:start position:0%
intro<00:00:02.000><c> before</c><00:00:03.000><c> window</c>

00:00:08.200 --> 00:00:11.300 align:start position:0%
Hello<00:00:09.000><c> world</c>

00:00:11.300 --> 00:00:13.000 align:start position:0%
Hello world
and<00:00:12.000><c> more</c><00:00:12.500><c> words</c>

00:00:13.000 --> 00:00:15.000
plain {braced} cue
";

/// Route library logs to the test output; set RUST_LOG to see them
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates the sample caption track in the specified directory
pub fn create_sample_vtt(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, SAMPLE_VTT)
}

/// Default configuration with every working directory inside `root`
pub fn config_in(root: &Path) -> Config {
    let mut config = Config::default();
    config.paths.raw_dir = root.join("raw");
    config.paths.subs_dir = root.join("subs");
    config.paths.final_dir = root.join("final");
    config.paths.publish_dir = None;
    config
}
