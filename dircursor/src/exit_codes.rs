//! Stable exit codes for dircursor CLI commands.

use crate::core::types::{Decision, EmptyReason};

/// Command succeeded or an item was selected.
pub const OK: i32 = 0;
/// Invalid root, config, or other error.
pub const INVALID: i32 = 1;
/// `dircursor next` found every item already consumed.
pub const EXHAUSTED: i32 = 2;
/// `dircursor next` found no eligible items.
pub const NO_ITEMS: i32 = 3;
/// `dircursor next` could not load any remaining item.
pub const UNREADABLE: i32 = 4;

pub fn for_decision(decision: &Decision) -> i32 {
    for_reason(decision.empty_reason())
}

pub fn for_reason(reason: Option<EmptyReason>) -> i32 {
    match reason {
        None => OK,
        Some(EmptyReason::InvalidRoot) => INVALID,
        Some(EmptyReason::AllConsumed) => EXHAUSTED,
        Some(EmptyReason::NoItemsFound) => NO_ITEMS,
        Some(EmptyReason::AllRemainingUnreadable) => UNREADABLE,
    }
}
