//! Directory snapshot scanner.
//!
//! Lists eligible files under a root, filtered by extension and sorted by
//! path string. Read-only.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::core::types::{Item, Snapshot, WorkRoot};

/// Structural scan failures. Any of these means the root is unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("root does not exist: {}", .0.display())]
    RootMissing(PathBuf),
    #[error("root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("permission denied reading root: {}", .0.display())]
    PermissionDenied(PathBuf),
}

/// Case-insensitive extension allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSet {
    exts: BTreeSet<String>,
}

impl ExtensionSet {
    pub fn new<S: AsRef<str>>(exts: &[S]) -> Self {
        Self {
            exts: exts
                .iter()
                .map(|ext| ext.as_ref().trim().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.exts.contains(&ext.to_ascii_lowercase()))
    }
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub recurse: bool,
    pub max_depth: usize,
    pub follow_links: bool,
    pub extensions: ExtensionSet,
}

/// Normalize a user-supplied root path.
///
/// Existing paths are canonicalized; anything else is made absolute so the
/// key stays stable until the directory appears.
pub fn resolve_root(raw: &str) -> Result<WorkRoot, ScanError> {
    if raw.is_empty() {
        return Err(ScanError::RootMissing(PathBuf::new()));
    }
    let path = fs::canonicalize(raw)
        .or_else(|_| std::path::absolute(raw))
        .map_err(|_| ScanError::RootMissing(PathBuf::from(raw)))?;
    Ok(WorkRoot::from_normalized(path))
}

/// Scan `root` and return its snapshot.
pub fn scan(root: &WorkRoot, options: &ScanOptions) -> Result<Snapshot, ScanError> {
    check_root(root)?;

    let depth = if options.recurse { options.max_depth } else { 1 };
    let mut items = Vec::new();
    for entry in WalkDir::new(&root.path)
        .min_depth(1)
        .max_depth(depth)
        .follow_links(options.follow_links)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(root = %root.path.display(), error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if is_file(&entry) && options.extensions.matches(entry.path()) {
            items.push(Item::from_path(entry.into_path()));
        }
    }

    let snapshot = Snapshot::new(items);
    debug!(
        root = %root.path.display(),
        recurse = options.recurse,
        items = snapshot.len(),
        "scanned root"
    );
    Ok(snapshot)
}

/// Fail unless `root` is an existing, listable directory.
pub fn check_root(root: &WorkRoot) -> Result<(), ScanError> {
    let path = root.path.as_path();
    let meta = fs::metadata(path).map_err(|err| classify(path, &err))?;
    if !meta.is_dir() {
        return Err(ScanError::NotADirectory(path.to_path_buf()));
    }
    fs::read_dir(path).map_err(|err| classify(path, &err))?;
    Ok(())
}

fn classify(path: &Path, err: &io::Error) -> ScanError {
    match err.kind() {
        io::ErrorKind::PermissionDenied => ScanError::PermissionDenied(path.to_path_buf()),
        io::ErrorKind::NotADirectory => ScanError::NotADirectory(path.to_path_buf()),
        _ => ScanError::RootMissing(path.to_path_buf()),
    }
}

/// Regular files, plus symlinks that resolve to regular files.
fn is_file(entry: &DirEntry) -> bool {
    if entry.file_type().is_file() {
        return true;
    }
    entry.path_is_symlink() && entry.path().is_file()
}
