//! Engine configuration stored in `.dircursor/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::io::scanner::{ExtensionSet, ScanOptions};

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".dircursor/config.toml";

/// Engine configuration (TOML).
///
/// Intended to be edited by humans. Missing fields fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding one progress record per root.
    pub state_dir: PathBuf,

    /// Recognized item extensions, compared case-insensitively, without dots.
    pub extensions: Vec<String>,

    /// Traversal depth cap for recursive scans.
    pub max_depth: usize,

    /// Follow symbolic links to directories while scanning.
    pub follow_links: bool,

    /// Default for the host's "reset on root change" input.
    pub reset_on_root_change: bool,

    /// Hold an advisory lock on the record for the whole tick.
    pub lock: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from(".dircursor/states"),
            extensions: ["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp", "gif"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            max_depth: 64,
            follow_links: false,
            reset_on_root_change: true,
            lock: true,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.extensions.is_empty() {
            return Err(anyhow!("extensions must be a non-empty array"));
        }
        for ext in &self.extensions {
            if ext.trim().is_empty() {
                return Err(anyhow!("extensions must not contain blank entries"));
            }
            if ext.starts_with('.') {
                return Err(anyhow!("extension {ext:?} must be given without a leading dot"));
            }
        }
        if self.max_depth == 0 {
            return Err(anyhow!("max_depth must be > 0"));
        }
        if self.state_dir.as_os_str().is_empty() {
            return Err(anyhow!("state_dir must not be empty"));
        }
        Ok(())
    }

    pub fn scan_options(&self, recurse: bool) -> ScanOptions {
        ScanOptions {
            recurse,
            max_depth: self.max_depth,
            follow_links: self.follow_links,
            extensions: ExtensionSet::new(&self.extensions),
        }
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `EngineConfig::default()`.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    if !path.exists() {
        let cfg = EngineConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: EngineConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &EngineConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    super::write_atomic(path, &buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, EngineConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        let cfg = EngineConfig::default();
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "extensions = [\"png\", \"JXL\"]\nmax_depth = 3\n").expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.extensions, vec!["png".to_string(), "JXL".to_string()]);
        assert_eq!(cfg.max_depth, 3);
        assert!(cfg.reset_on_root_change);
        assert_eq!(cfg.state_dir, EngineConfig::default().state_dir);
    }

    #[test]
    fn rejects_dotted_extension() {
        let cfg = EngineConfig {
            extensions: vec![".png".to_string()],
            ..EngineConfig::default()
        };
        let err = cfg.validate().expect_err("dotted extension");
        assert!(err.to_string().contains("leading dot"));
    }

    #[test]
    fn rejects_zero_depth() {
        let cfg = EngineConfig {
            max_depth: 0,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
