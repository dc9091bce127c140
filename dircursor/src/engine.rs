//! Orchestration for a single tick: lock, load, scan, decide, persist.
//!
//! The engine never aborts the host workflow. Every failure mode is folded
//! into the returned [`Decision`]; only a failed persist is logged at error,
//! since it risks handing the same item out again on the next tick.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::core::selector::{decide, progress};
use crate::core::types::{Decision, Progress, ProgressRecord, WorkRoot};
use crate::io::config::EngineConfig;
use crate::io::lock::RecordLock;
use crate::io::probe::{ItemProbe, ReadableProbe};
use crate::io::scanner::{check_root, resolve_root, scan};
use crate::io::state_store::StateStore;

/// Inputs for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceRequest {
    pub root: String,
    pub recurse: bool,
    pub reset_on_root_change: bool,
    pub reset_requested: bool,
}

/// Result of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    pub decision: Decision,
    /// False when the updated record could not be written.
    pub durable: bool,
}

pub struct Engine<P = ReadableProbe> {
    config: EngineConfig,
    store: StateStore,
    probe: P,
}

impl Engine<ReadableProbe> {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_probe(config, ReadableProbe)
    }
}

impl<P: ItemProbe> Engine<P> {
    pub fn with_probe(config: EngineConfig, probe: P) -> Self {
        let store = StateStore::new(config.state_dir.clone());
        Self {
            config,
            store,
            probe,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Hand out the next unconsumed item under `request.root`.
    pub fn advance(&self, request: &AdvanceRequest) -> Advance {
        let root = match resolve_root(&request.root).and_then(|root| {
            check_root(&root)?;
            Ok(root)
        }) {
            Ok(root) => root,
            Err(err) => {
                warn!(root = %request.root, error = %err, "invalid root");
                return Advance {
                    decision: Decision::invalid_root(),
                    durable: true,
                };
            }
        };
        let _lock = self.lock(&root);

        let loaded = self.store.load(&root, &request.root);
        let snapshot = match scan(&root, &self.config.scan_options(request.recurse)) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(root = %root.key, error = %err, "invalid root");
                return Advance {
                    decision: Decision::invalid_root(),
                    durable: true,
                };
            }
        };

        let canonical = loaded.is_canonical();
        let mut record = loaded.stored.upgrade(&root.key, &snapshot);
        let before = record.clone();

        let mut reset = request.reset_requested;
        if request.reset_on_root_change && record.root != root.key {
            info!(
                recorded = %record.root,
                root = %root.key,
                "record belongs to another root; resetting"
            );
            reset = true;
        }
        if reset {
            info!(root = %root.key, "resetting progress");
            record.reset(&root.key);
        }

        let decision = decide(&snapshot, &mut record, |item| match self.probe.probe(item) {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    path = %item.path.display(),
                    error = %format!("{err:#}"),
                    "skipping unloadable item"
                );
                false
            }
        });

        let durable = if reset || !canonical || record != before {
            self.persist(&root, &record)
        } else {
            true
        };

        match &decision {
            Decision::Next(next) => info!(
                root = %root.key,
                path = %next.item.path.display(),
                ordinal = next.ordinal,
                total = next.total,
                remaining = next.remaining,
                "selected item"
            ),
            Decision::Empty {
                reason,
                processed,
                total,
            } => info!(
                root = %root.key,
                ?reason,
                processed,
                total,
                "no item selected"
            ),
        }

        Advance { decision, durable }
    }

    /// Report progress for `root` without consuming anything.
    pub fn peek(&self, raw: &str, recurse: bool) -> Result<Progress> {
        let root = resolve_root(raw)?;
        let loaded = self.store.load(&root, raw);
        let snapshot = scan(&root, &self.config.scan_options(recurse))?;
        let record = loaded.stored.upgrade(&root.key, &snapshot);
        Ok(progress(&snapshot, &record))
    }

    /// Replace the record for `root` with an empty one.
    pub fn reset(&self, root: &str) -> Result<PathBuf> {
        let root = resolve_root(root)?;
        let _lock = self.lock(&root);
        self.store
            .save(&root, &ProgressRecord::new(root.key.clone()))
            .with_context(|| format!("reset progress for {}", root.key))?;
        info!(root = %root.key, "progress reset");
        Ok(self.store.record_path(&root))
    }

    /// Delete the record for `root`. Returns true if one existed.
    ///
    /// The `.lock` file is never removed; waiters may already hold its inode.
    pub fn forget(&self, raw: &str) -> Result<bool> {
        let root = resolve_root(raw)?;
        let _lock = self.lock(&root);
        self.store
            .remove(&root, raw)
            .with_context(|| format!("forget progress for {}", root.key))
    }

    /// Path of the record file for `root`.
    pub fn record_path(&self, root: &str) -> Result<PathBuf> {
        let root = resolve_root(root)?;
        Ok(self.store.record_path(&root))
    }

    fn lock(&self, root: &WorkRoot) -> Option<RecordLock> {
        if !self.config.lock {
            return None;
        }
        match self.store.lock(root) {
            Ok(lock) => Some(lock),
            Err(err) => {
                warn!(
                    root = %root.key,
                    error = %format!("{err:#}"),
                    "proceeding without record lock"
                );
                None
            }
        }
    }

    fn persist(&self, root: &WorkRoot, record: &ProgressRecord) -> bool {
        match self.store.save(root, record) {
            Ok(()) => true,
            Err(err) => {
                error!(
                    root = %root.key,
                    error = %format!("{err:#}"),
                    "failed to persist progress; this tick is not durable"
                );
                false
            }
        }
    }
}
