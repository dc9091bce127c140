//! Test-only helpers: scratch roots and scripted probes.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tempfile::TempDir;

use crate::core::types::Item;
use crate::engine::{AdvanceRequest, Engine};
use crate::io::config::EngineConfig;
use crate::io::probe::ItemProbe;

/// A temporary workspace with an item root and a separate state directory.
pub struct TestRoot {
    temp: TempDir,
    root: PathBuf,
}

impl TestRoot {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir()?;
        let root = temp.path().join("items");
        fs::create_dir_all(&root)?;
        Ok(Self { temp, root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_dir(&self) -> PathBuf {
        self.temp.path().join("states")
    }

    pub fn config(&self) -> EngineConfig {
        EngineConfig {
            state_dir: self.state_dir(),
            ..EngineConfig::default()
        }
    }

    pub fn engine(&self) -> Engine {
        Engine::new(self.config())
    }

    /// Create `rel` under the root (parents included) with placeholder bytes.
    pub fn add(&self, rel: &str) -> Result<PathBuf> {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, b"item")?;
        Ok(path)
    }

    pub fn remove(&self, rel: &str) -> Result<()> {
        fs::remove_file(self.root.join(rel))?;
        Ok(())
    }

    pub fn request(&self) -> AdvanceRequest {
        AdvanceRequest {
            root: self.root.to_string_lossy().into_owned(),
            recurse: false,
            reset_on_root_change: true,
            reset_requested: false,
        }
    }
}

/// Probe that rejects items by file name and records every call.
#[derive(Default)]
pub struct ScriptedProbe {
    rejected: BTreeSet<String>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedProbe {
    pub fn rejecting(names: &[&str]) -> Self {
        Self {
            rejected: names.iter().map(|name| name.to_string()).collect(),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// File names probed so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl ItemProbe for ScriptedProbe {
    fn probe(&self, item: &Item) -> Result<()> {
        let name = item.file_name();
        self.calls.borrow_mut().push(name.clone());
        if self.rejected.contains(&name) {
            bail!("scripted rejection for {name}");
        }
        Ok(())
    }
}
