/*!
 * Tests for the yt-dlp downloader against a scripted stand-in tool
 */

#![cfg(unix)]

use anyhow::Result;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use clipsub::media::{MediaDownloader, VideoId, YtDlpDownloader};
use crate::common;

/// Writes an executable that logs each run, sleeps, then writes a 4 KiB mp4
fn create_fake_ytdlp(dir: &Path, run_log: &Path) -> Result<PathBuf> {
    let script = format!(
        "#!/bin/sh\n\
         out=\"\"\n\
         while [ $# -gt 0 ]; do\n\
         \x20 if [ \"$1\" = \"-o\" ]; then out=\"$2\"; fi\n\
         \x20 shift\n\
         done\n\
         echo run >> \"{}\"\n\
         sleep 1\n\
         head -c 4096 /dev/zero > \"$(echo \"$out\" | sed 's/%(ext)s/mp4/')\"\n",
        run_log.display()
    );
    let path = common::create_test_file(dir, "fake-yt-dlp", &script)?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

fn fake_downloader(root: &Path, program: &Path) -> YtDlpDownloader {
    let mut config = common::config_in(root);
    config.downloader.program = program.to_string_lossy().into_owned();
    config.downloader.min_video_bytes = 1024;
    config.downloader.timeout_secs = 30;
    YtDlpDownloader::new(config.downloader, &config.paths)
}

/// Test that concurrent requests for one video download it once
#[tokio::test]
async fn test_ensure_video_withConcurrentRequests_shouldDownloadOnce() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let run_log = temp_dir.path().join("runs.log");
    let program = create_fake_ytdlp(temp_dir.path(), &run_log)?;
    let first = fake_downloader(temp_dir.path(), &program);
    let second = fake_downloader(temp_dir.path(), &program);
    let id = VideoId::parse("abc")?;

    let (a, b) = tokio::join!(first.ensure_video(&id), second.ensure_video(&id));
    let expected = temp_dir.path().join("raw").join("abc.mp4");
    assert_eq!(a?, expected);
    assert_eq!(b?, expected);

    assert_eq!(fs::read_to_string(&run_log)?.lines().count(), 1);
    assert_eq!(fs::metadata(&expected)?.len(), 4096);
    assert!(!first.lock_path(&id).exists());

    Ok(())
}

/// Test that a lock left behind by a dead process is taken over
#[tokio::test]
async fn test_ensure_video_withStaleLock_shouldDownload() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let run_log = temp_dir.path().join("runs.log");
    let program = create_fake_ytdlp(temp_dir.path(), &run_log)?;

    let mut config = common::config_in(temp_dir.path());
    config.downloader.program = program.to_string_lossy().into_owned();
    config.downloader.min_video_bytes = 1024;
    config.downloader.timeout_secs = 30;
    config.downloader.lock_stale_secs = 0;
    let downloader = YtDlpDownloader::new(config.downloader, &config.paths);

    let id = VideoId::parse("abc")?;
    let lock_path = downloader.lock_path(&id);
    fs::create_dir_all(lock_path.parent().unwrap_or(temp_dir.path()))?;
    fs::write(&lock_path, "99999")?;

    let video = tokio::time::timeout(std::time::Duration::from_secs(10), downloader.ensure_video(&id)).await??;
    assert_eq!(fs::metadata(&video)?.len(), 4096);
    assert_eq!(fs::read_to_string(&run_log)?.lines().count(), 1);
    assert!(!lock_path.exists());

    Ok(())
}
