//! Shared deterministic types for the cursor core.
//!
//! These types define the contracts between the scanner, the state store and
//! the selection logic. They do not touch the filesystem.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A directory under iteration, identified by its normalized absolute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkRoot {
    /// Normalized absolute path used for scanning.
    pub path: PathBuf,
    /// Stable string key used for persistence and record self-description.
    pub key: String,
}

impl WorkRoot {
    /// Build a root from an already-normalized absolute path.
    pub fn from_normalized(path: PathBuf) -> Self {
        let key = path.to_string_lossy().into_owned();
        Self { path, key }
    }
}

/// A single eligible file under a root. Identity is the path string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    pub id: String,
    pub path: PathBuf,
}

impl Item {
    pub fn from_path(path: PathBuf) -> Self {
        let id = path.to_string_lossy().into_owned();
        Self { id, path }
    }

    /// Final path component, used for status messages.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.id.clone())
    }
}

/// Items present under a root at scan time, in a stable total order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    items: Vec<Item>,
}

impl Snapshot {
    /// Sort by identity (byte order) and drop duplicates so re-scans compare equal.
    pub fn new(mut items: Vec<Item>) -> Self {
        items.sort();
        items.dedup_by(|a, b| a.id == b.id);
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items
            .binary_search_by(|item| item.id.as_str().cmp(id))
            .is_ok()
    }
}

/// Persisted progress for one root (`progress_<slug>_<hash>.json`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressRecord {
    /// Root key this record describes.
    pub root: String,
    /// Item identities already handed out. Only grows between resets.
    pub consumed: BTreeSet<String>,
    /// Derived cache: no unconsumed items were left at the last tick.
    #[serde(default)]
    pub exhausted: bool,
}

impl ProgressRecord {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            consumed: BTreeSet::new(),
            exhausted: false,
        }
    }

    /// Clear progress and rebind the record to `root`.
    pub fn reset(&mut self, root: &str) {
        self.root = root.to_string();
        self.consumed.clear();
        self.exhausted = false;
    }

    pub fn is_consumed(&self, id: &str) -> bool {
        self.consumed.contains(id)
    }

    /// Returns true if the id was not already consumed.
    pub fn mark_consumed(&mut self, id: &str) -> bool {
        self.consumed.insert(id.to_string())
    }

    /// Number of snapshot items this record has consumed.
    ///
    /// Entries for files that have since disappeared are not counted, so the
    /// result never exceeds `snapshot.len()`.
    pub fn processed_in(&self, snapshot: &Snapshot) -> usize {
        snapshot
            .iter()
            .filter(|item| self.is_consumed(&item.id))
            .count()
    }
}

/// Why a tick produced no item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyReason {
    NoItemsFound,
    AllConsumed,
    InvalidRoot,
    AllRemainingUnreadable,
}

/// The item handed out by a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextItem {
    pub item: Item,
    /// 1-based position: number of snapshot items consumed including this one.
    pub ordinal: usize,
    /// Snapshot size.
    pub total: usize,
    /// Snapshot items still unconsumed after this tick.
    pub remaining: usize,
}

/// Per-tick engine output. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Next(NextItem),
    Empty {
        reason: EmptyReason,
        processed: usize,
        total: usize,
    },
}

impl Decision {
    pub fn empty(reason: EmptyReason, processed: usize, total: usize) -> Self {
        Self::Empty {
            reason,
            processed,
            total,
        }
    }

    pub fn invalid_root() -> Self {
        Self::empty(EmptyReason::InvalidRoot, 0, 0)
    }

    pub fn has_item(&self) -> bool {
        matches!(self, Self::Next(_))
    }

    pub fn empty_reason(&self) -> Option<EmptyReason> {
        match self {
            Self::Next(_) => None,
            Self::Empty { reason, .. } => Some(*reason),
        }
    }
}

/// Read-only view of a root's progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub root: String,
    pub processed: usize,
    pub total: usize,
    pub remaining: usize,
    /// First unconsumed item in snapshot order, not probed.
    pub next: Option<Item>,
    pub exhausted: bool,
}
