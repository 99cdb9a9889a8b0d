/*!
 * Advisory lock files serializing work on one source across processes.
 *
 * A lock is a file created with `create_new`, holding the owner's pid. It is
 * removed when the guard is dropped. A lock file older than the staleness
 * limit is assumed to belong to a dead process and is taken over.
 */

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use log::{debug, warn};

use crate::errors::MediaError;

/// Delay between attempts while another process holds the lock
pub const POLL_INTERVAL: Duration = Duration::from_millis(400);

/// Held lock; the file is removed on drop
#[derive(Debug)]
pub struct DownloadLock {
    path: PathBuf,
}

impl DownloadLock {
    /// Wait for the lock `<dir>/<name>`, creating `dir` if needed
    pub async fn acquire(dir: &Path, name: &str, stale_after: Duration) -> Result<Self, MediaError> {
        fs::create_dir_all(dir)
            .map_err(|e| MediaError::Filesystem(format!("cannot create {:?}: {}", dir, e)))?;
        let path = dir.join(name);
        let mut announced = false;

        loop {
            match Self::try_create(&path) {
                Ok(lock) => {
                    debug!("Acquired lock {:?}", lock.path);
                    return Ok(lock);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => {
                    return Err(MediaError::Filesystem(format!("cannot create lock {:?}: {}", path, e)));
                }
            }

            match lock_age(&path) {
                Some(age) if age > stale_after => {
                    warn!("Breaking stale lock {:?} ({}s old)", path, age.as_secs());
                    if let Err(e) = fs::remove_file(&path) {
                        if e.kind() != ErrorKind::NotFound {
                            return Err(MediaError::Filesystem(format!(
                                "cannot remove stale lock {:?}: {}",
                                path, e
                            )));
                        }
                    }
                    continue;
                }
                // released between the two calls
                None => continue,
                Some(_) => {}
            }

            if !announced {
                debug!("Waiting for lock {:?}", path);
                announced = true;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    fn try_create(path: &Path) -> std::io::Result<Self> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        let lock = Self {
            path: path.to_path_buf(),
        };
        write!(file, "{}", std::process::id())?;
        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DownloadLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("Failed to release lock {:?}: {}", self.path, e);
        }
    }
}

/// Time since the lock file was last written, `None` when it is gone
fn lock_age(path: &Path) -> Option<Duration> {
    let modified = fs::metadata(path).and_then(|meta| meta.modified()).ok()?;
    Some(SystemTime::now().duration_since(modified).unwrap_or_default())
}
