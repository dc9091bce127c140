//! Persistent directory work-queue.
//!
//! Each tick hands out the next unprocessed file under a directory and
//! records it as consumed, so repeated, externally triggered invocations walk
//! the directory exactly once across process restarts. The architecture
//! keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (selection, migration, status
//!   rendering). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (scanning, record storage, locks,
//!   loadability probes).
//!
//! [`engine`] coordinates core logic with I/O for one tick; [`adapter`] maps
//! host inputs and outputs onto the engine.

pub mod adapter;
pub mod core;
pub mod engine;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
