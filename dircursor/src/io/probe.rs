//! Loadability checks applied to candidates before they are handed out.
//!
//! The [`ItemProbe`] trait lets a host substitute a stronger check (for
//! example a full decode) for the default filesystem-level one. Tests use
//! scripted probes that reject chosen paths.

use std::fs::File;

use anyhow::{Context, Result, bail};

use crate::core::types::Item;

pub trait ItemProbe {
    /// Return `Ok` if the item can be handed to the payload loader.
    fn probe(&self, item: &Item) -> Result<()>;
}

/// Item exists, is a regular file, and can be opened for reading.
pub struct ReadableProbe;

impl ItemProbe for ReadableProbe {
    fn probe(&self, item: &Item) -> Result<()> {
        let file =
            File::open(&item.path).with_context(|| format!("open {}", item.path.display()))?;
        let meta = file
            .metadata()
            .with_context(|| format!("stat {}", item.path.display()))?;
        if !meta.is_file() {
            bail!("{} is not a regular file", item.path.display());
        }
        Ok(())
    }
}
