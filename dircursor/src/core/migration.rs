//! Versioned record schema and the one-time upgrade to [`ProgressRecord`].
//!
//! Earlier versions of the tool persisted two other shapes:
//!
//! - a filename-keyed record (`directory_path`, `processed_files`, `completed`)
//! - a numeric-index record (`current_index`), predating identity tracking
//!
//! Both are accepted on load and upgraded once; the next save writes the
//! current shape.

use std::path::Path;

use serde::Deserialize;

use crate::core::types::{ProgressRecord, Snapshot};

/// Filename-keyed record written by earlier versions.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NamedRecord {
    #[serde(default)]
    pub directory_path: Option<String>,
    pub processed_files: Vec<String>,
    #[serde(default)]
    pub completed: bool,
}

/// Index-based record: "the first N items of the sorted listing are done".
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct IndexedRecord {
    pub current_index: u64,
    #[serde(default)]
    pub directory_path: Option<String>,
}

/// Any record shape found on disk.
///
/// Variant order matters: serde tries them top to bottom, so a record that
/// carries both `processed_files` and `current_index` is read as `Named`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum StoredRecord {
    Current(ProgressRecord),
    Named(NamedRecord),
    Indexed(IndexedRecord),
}

impl StoredRecord {
    pub fn fresh(root: &str) -> Self {
        Self::Current(ProgressRecord::new(root))
    }

    pub fn is_current(&self) -> bool {
        matches!(self, Self::Current(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Current(_) => "current",
            Self::Named(_) => "named",
            Self::Indexed(_) => "indexed",
        }
    }

    /// Convert to the current shape.
    ///
    /// Legacy records are adopted by `root`: their `directory_path` is the raw
    /// string the user typed, not a normalized key, so it is not compared.
    /// Processed paths recorded under that raw string are rebased onto `root`.
    /// An index-based record marks the first `current_index` snapshot items
    /// consumed, or every present item when the snapshot is shorter.
    pub fn upgrade(self, root: &str, snapshot: &Snapshot) -> ProgressRecord {
        match self {
            Self::Current(record) => record,
            Self::Named(named) => {
                let mut record = ProgressRecord::new(root);
                let typed = named.directory_path.as_deref();
                record.consumed.extend(
                    named
                        .processed_files
                        .into_iter()
                        .map(|file| rebase(&file, typed, root)),
                );
                record.exhausted = named.completed;
                record
            }
            Self::Indexed(indexed) => {
                let mut record = ProgressRecord::new(root);
                let count = usize::try_from(indexed.current_index).unwrap_or(usize::MAX);
                for item in snapshot.iter().take(count) {
                    record.mark_consumed(&item.id);
                }
                record
            }
        }
    }
}

/// Re-anchor `file` from the typed directory onto the normalized root.
fn rebase(file: &str, typed: Option<&str>, root: &str) -> String {
    let Some(typed) = typed.filter(|typed| !typed.is_empty()) else {
        return file.to_string();
    };
    match Path::new(file).strip_prefix(typed) {
        Ok(rel) if !rel.as_os_str().is_empty() => {
            Path::new(root).join(rel).to_string_lossy().into_owned()
        }
        _ => file.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::core::types::Item;

    fn snapshot(names: &[&str]) -> Snapshot {
        Snapshot::new(
            names
                .iter()
                .map(|name| Item::from_path(PathBuf::from(format!("/d/{name}"))))
                .collect(),
        )
    }

    #[test]
    fn parses_current_shape() {
        let stored: StoredRecord =
            serde_json::from_str(r#"{"root":"/d","consumed":["/d/a.png"],"exhausted":false}"#)
                .expect("parse");
        assert!(stored.is_current());
        let record = stored.upgrade("/d", &Snapshot::default());
        assert!(record.is_consumed("/d/a.png"));
    }

    #[test]
    fn named_record_keeps_processed_files() {
        let stored: StoredRecord = serde_json::from_str(
            r#"{"processed_files":["/d/b.png"],"directory_path":"d","completed":false}"#,
        )
        .expect("parse");
        assert_eq!(stored.kind(), "named");
        let record = stored.upgrade("/d", &snapshot(&["a.png", "b.png"]));
        assert_eq!(record.root, "/d");
        assert_eq!(record.consumed.len(), 1);
        assert!(record.is_consumed("/d/b.png"));
    }

    #[test]
    fn named_record_paths_are_rebased_from_typed_directory() {
        let stored: StoredRecord = serde_json::from_str(
            r#"{"processed_files":["pics/a.png","/elsewhere/z.png"],"directory_path":"pics/"}"#,
        )
        .expect("parse");
        let record = stored.upgrade("/d", &Snapshot::default());
        assert!(record.is_consumed("/d/a.png"));
        assert!(record.is_consumed("/elsewhere/z.png"));
    }

    #[test]
    fn indexed_record_consumes_first_n() {
        let stored: StoredRecord =
            serde_json::from_str(r#"{"current_index":2,"directory_path":"/d"}"#).expect("parse");
        assert_eq!(stored.kind(), "indexed");
        let record = stored.upgrade("/d", &snapshot(&["c.png", "a.png", "b.png"]));
        assert!(record.is_consumed("/d/a.png"));
        assert!(record.is_consumed("/d/b.png"));
        assert!(!record.is_consumed("/d/c.png"));
    }

    #[test]
    fn indexed_record_beyond_snapshot_consumes_everything() {
        let stored: StoredRecord = serde_json::from_str(r#"{"current_index":10}"#).expect("parse");
        let record = stored.upgrade("/d", &snapshot(&["a.png", "b.png"]));
        assert_eq!(record.consumed.len(), 2);
    }

    #[test]
    fn unknown_shape_fails_to_parse() {
        let parsed = serde_json::from_str::<StoredRecord>(r#"{"something":"else"}"#);
        assert!(parsed.is_err());
    }
}
