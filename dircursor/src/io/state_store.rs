//! Progress record storage, one JSON file per root.
//!
//! Loading never fails: missing, unreadable and unparseable files all yield a
//! fresh record (the anomaly is logged). Saving is atomic (temp file +
//! rename), so a crash mid-write leaves the previous record intact.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::core::migration::StoredRecord;
use crate::core::types::{ProgressRecord, WorkRoot};
use crate::io::lock::RecordLock;

const SLUG_MAX_LEN: usize = 32;

/// Where a loaded record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSource {
    /// No record on disk yet.
    Fresh,
    /// Read from the hashed record file.
    File,
    /// Read from a record file named by an earlier version of the tool.
    LegacyFile,
    /// A file existed but could not be read or parsed.
    Recovered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedRecord {
    pub stored: StoredRecord,
    pub source: RecordSource,
}

impl LoadedRecord {
    /// True if the on-disk file already holds a current-shape record.
    pub fn is_canonical(&self) -> bool {
        self.source == RecordSource::File && self.stored.is_current()
    }
}

#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn record_path(&self, root: &WorkRoot) -> PathBuf {
        self.dir.join(record_file_name(&root.key))
    }

    pub fn lock_path(&self, root: &WorkRoot) -> PathBuf {
        self.record_path(root).with_extension("lock")
    }

    /// File name used by earlier versions: separators and `:` become `_`.
    ///
    /// Those versions keyed the file on the path exactly as the user typed
    /// it, so `raw` is the unnormalized input.
    pub fn legacy_record_path(&self, raw: &str) -> PathBuf {
        let safe: String = raw
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        self.dir.join(format!("directory_state_{safe}.json"))
    }

    /// Legacy file names to try for `root`: the raw input first, then the key.
    fn legacy_candidates(&self, root: &WorkRoot, raw: &str) -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(2);
        if !raw.is_empty() {
            paths.push(self.legacy_record_path(raw));
        }
        let by_key = self.legacy_record_path(&root.key);
        if !paths.contains(&by_key) {
            paths.push(by_key);
        }
        paths
    }

    pub fn lock(&self, root: &WorkRoot) -> Result<RecordLock> {
        RecordLock::acquire(&self.lock_path(root))
    }

    /// Load the record for `root`, requested as `raw`. Never fails.
    pub fn load(&self, root: &WorkRoot, raw: &str) -> LoadedRecord {
        let path = self.record_path(root);
        if path.exists() {
            return read_record(&path, root, RecordSource::File);
        }
        if let Some(legacy) = self
            .legacy_candidates(root, raw)
            .into_iter()
            .find(|path| path.exists())
        {
            debug!(path = %legacy.display(), "falling back to legacy record file");
            return read_record(&legacy, root, RecordSource::LegacyFile);
        }
        debug!(root = %root.key, "no progress record yet");
        LoadedRecord {
            stored: StoredRecord::fresh(&root.key),
            source: RecordSource::Fresh,
        }
    }

    /// Atomically write the record for `root`.
    pub fn save(&self, root: &WorkRoot, record: &ProgressRecord) -> Result<()> {
        let path = self.record_path(root);
        debug!(
            path = %path.display(),
            consumed = record.consumed.len(),
            exhausted = record.exhausted,
            "writing progress record"
        );
        let mut buf = serde_json::to_string_pretty(record).context("serialize progress record")?;
        buf.push('\n');
        super::write_atomic(&path, &buf)
    }

    /// Delete the record (and any legacy record) for `root`, requested as `raw`.
    ///
    /// Returns true if anything was removed.
    pub fn remove(&self, root: &WorkRoot, raw: &str) -> Result<bool> {
        let mut removed = false;
        let mut paths = vec![self.record_path(root)];
        paths.extend(self.legacy_candidates(root, raw));
        for path in paths {
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!(path = %path.display(), "removed progress record");
                    removed = true;
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(err).with_context(|| format!("remove {}", path.display()));
                }
            }
        }
        Ok(removed)
    }
}

/// `progress_<slug>_<hash>.json` for a root key.
///
/// The hash (first 16 bytes of SHA-256, hex) carries the identity; the slug
/// is the final path component reduced to filesystem-safe characters.
pub fn record_file_name(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    let hash = hex::encode(&digest[..16]);
    let slug = slug(key);
    if slug.is_empty() {
        format!("progress_{hash}.json")
    } else {
        format!("progress_{slug}_{hash}.json")
    }
}

fn slug(key: &str) -> String {
    let last = key
        .rsplit(['/', '\\'])
        .find(|part| !part.is_empty())
        .unwrap_or("");
    last.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .take(SLUG_MAX_LEN)
        .collect()
}

fn read_record(path: &Path, root: &WorkRoot, source: RecordSource) -> LoadedRecord {
    let recovered = || LoadedRecord {
        stored: StoredRecord::fresh(&root.key),
        source: RecordSource::Recovered,
    };
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "unreadable progress record; starting fresh"
            );
            return recovered();
        }
    };
    match serde_json::from_str::<StoredRecord>(&contents) {
        Ok(stored) => {
            if !stored.is_current() {
                warn!(
                    path = %path.display(),
                    kind = stored.kind(),
                    "upgrading legacy progress record"
                );
            }
            LoadedRecord { stored, source }
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "corrupt progress record; starting fresh");
            recovered()
        }
    }
}
