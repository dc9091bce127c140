//! Host-facing invocation adapter.
//!
//! A pull-based host (one that memoizes node outputs and re-evaluates only
//! when inputs change) would otherwise call the engine once and cache the
//! result forever. Every [`IterationOutput`] therefore carries a fresh
//! [`tick_token`] in `tick`; hosts of that kind treat it as a changing input,
//! so each tick is observably distinct and the engine runs once per tick.
//!
//! The adapter also owns the one-shot reset flag: after an invocation the
//! flag is cleared, so a forgotten toggle does not reset every later call.

use serde::Serialize;

use crate::core::status::status_message;
use crate::core::types::{Decision, EmptyReason};
use crate::engine::{AdvanceRequest, Engine};
use crate::io::probe::ItemProbe;

/// Host inputs for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub root_path: String,
    pub recurse: bool,
    pub reset_on_root_change: bool,
    pub reset_requested: bool,
}

impl Invocation {
    pub fn new(root_path: impl Into<String>) -> Self {
        Self {
            root_path: root_path.into(),
            recurse: false,
            reset_on_root_change: true,
            reset_requested: false,
        }
    }
}

/// Host outputs for one tick. The host loads the payload from `selected_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IterationOutput {
    pub selected_path: String,
    pub filename: String,
    pub ordinal: usize,
    pub total: usize,
    pub has_item: bool,
    pub status_message: String,
    /// Set when no item was selected.
    pub empty_reason: Option<EmptyReason>,
    /// False when progress for this tick could not be persisted.
    pub durable: bool,
    /// Liveness value, fresh on every tick.
    pub tick: u64,
}

impl IterationOutput {
    pub fn from_decision(decision: &Decision, durable: bool) -> Self {
        let status_message = status_message(decision);
        let tick = tick_token();
        match decision {
            Decision::Next(next) => Self {
                selected_path: next.item.id.clone(),
                filename: next.item.file_name(),
                ordinal: next.ordinal,
                total: next.total,
                has_item: true,
                status_message,
                empty_reason: None,
                durable,
                tick,
            },
            Decision::Empty {
                reason,
                processed,
                total,
            } => Self {
                selected_path: String::new(),
                filename: String::new(),
                ordinal: *processed,
                total: *total,
                has_item: false,
                status_message,
                empty_reason: Some(*reason),
                durable,
                tick,
            },
        }
    }
}

pub struct Adapter<P> {
    engine: Engine<P>,
}

impl<P: ItemProbe> Adapter<P> {
    pub fn new(engine: Engine<P>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Engine<P> {
        &self.engine
    }

    /// Run one tick and clear the one-shot reset flag.
    pub fn invoke(&self, invocation: &mut Invocation) -> IterationOutput {
        let request = AdvanceRequest {
            root: invocation.root_path.clone(),
            recurse: invocation.recurse,
            reset_on_root_change: invocation.reset_on_root_change,
            reset_requested: invocation.reset_requested,
        };
        invocation.reset_requested = false;
        let advance = self.engine.advance(&request);
        IterationOutput::from_decision(&advance.decision, advance.durable)
    }
}

/// Fresh per-tick liveness value for memoizing hosts.
pub fn tick_token() -> u64 {
    rand::random()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::io::config::EngineConfig;

    fn adapter(state_dir: &std::path::Path) -> Adapter<crate::io::probe::ReadableProbe> {
        Adapter::new(Engine::new(EngineConfig {
            state_dir: state_dir.to_path_buf(),
            ..EngineConfig::default()
        }))
    }

    #[test]
    fn reset_flag_is_one_shot() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("root");
        fs::create_dir(&root).expect("mkdir");
        fs::write(root.join("a.png"), b"x").expect("write");
        fs::write(root.join("b.png"), b"x").expect("write");
        let adapter = adapter(&temp.path().join("states"));

        let mut invocation = Invocation::new(root.to_string_lossy());
        assert_eq!(adapter.invoke(&mut invocation).filename, "a.png");

        invocation.reset_requested = true;
        let out = adapter.invoke(&mut invocation);
        assert_eq!(out.filename, "a.png");
        assert!(!invocation.reset_requested);

        assert_eq!(adapter.invoke(&mut invocation).filename, "b.png");
    }

    #[test]
    fn empty_outputs_have_blank_paths() {
        let temp = tempfile::tempdir().expect("tempdir");
        let adapter = adapter(&temp.path().join("states"));
        let mut invocation = Invocation::new(temp.path().join("nope").to_string_lossy());

        let out = adapter.invoke(&mut invocation);
        assert_eq!(
            out,
            IterationOutput {
                selected_path: String::new(),
                filename: String::new(),
                ordinal: 0,
                total: 0,
                has_item: false,
                status_message: "Invalid directory path".to_string(),
                empty_reason: Some(EmptyReason::InvalidRoot),
                durable: true,
                tick: out.tick,
            }
        );
    }

    #[test]
    fn every_invocation_carries_a_fresh_tick() {
        let temp = tempfile::tempdir().expect("tempdir");
        let adapter = adapter(&temp.path().join("states"));
        let mut invocation = Invocation::new(temp.path().to_string_lossy());

        let ticks: std::collections::HashSet<u64> = (0..8)
            .map(|_| adapter.invoke(&mut invocation).tick)
            .collect();
        assert!(ticks.len() > 1);
    }

    #[test]
    fn tick_tokens_differ() {
        let tokens: std::collections::HashSet<u64> = (0..8).map(|_| tick_token()).collect();
        assert!(tokens.len() > 1);
    }
}
