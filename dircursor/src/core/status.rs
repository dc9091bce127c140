//! Canonical human-readable status lines for a tick.

use crate::core::types::{Decision, EmptyReason};

pub fn status_message(decision: &Decision) -> String {
    match decision {
        Decision::Next(next) => format!(
            "Processing: {} ({}/{} processed, {} remaining)",
            next.item.file_name(),
            next.ordinal,
            next.total,
            next.remaining
        ),
        Decision::Empty {
            reason,
            processed,
            total,
        } => match reason {
            EmptyReason::NoItemsFound => "No items found in directory".to_string(),
            EmptyReason::InvalidRoot => "Invalid directory path".to_string(),
            EmptyReason::AllConsumed => {
                format!("All items processed. Processed {total} total items.")
            }
            EmptyReason::AllRemainingUnreadable => format!(
                "All remaining items failed to load. Processed {processed}/{total} items."
            ),
        },
    }
}
