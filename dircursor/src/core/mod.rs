//! Deterministic, pure logic shared by the cursor engine.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! snapshots and records and return deterministic outputs suitable for tests.

pub mod migration;
pub mod selector;
pub mod status;
pub mod types;
