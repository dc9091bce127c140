//! Advisory per-root lock held across load-decide-persist.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use tracing::{debug, warn};

/// Exclusive advisory lock on a record's `.lock` file. Released on drop.
#[derive(Debug)]
pub struct RecordLock {
    file: File,
    path: PathBuf,
}

impl RecordLock {
    /// Block until the lock at `path` is held.
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create lock directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("open lock file {}", path.display()))?;
        FileExt::lock_exclusive(&file).with_context(|| format!("lock {}", path.display()))?;
        debug!(path = %path.display(), "record lock acquired");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }
}

impl Drop for RecordLock {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %err, "failed to release record lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn second_holder_waits_for_release() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("states").join("root.lock");
        let first = RecordLock::acquire(&path).expect("first lock");
        assert!(path.is_file());

        let (tx, rx) = mpsc::channel();
        let contender_path = path.clone();
        let handle = thread::spawn(move || {
            let _second = RecordLock::acquire(&contender_path).expect("second lock");
            tx.send(()).expect("send");
        });

        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        drop(first);
        rx.recv_timeout(Duration::from_secs(5))
            .expect("second lock acquired after release");
        handle.join().expect("join");
    }
}
