//! Deterministic selection of the next unconsumed item.

use crate::core::types::{
    Decision, EmptyReason, Item, NextItem, Progress, ProgressRecord, Snapshot,
};

/// Unconsumed snapshot items, in snapshot order.
pub fn remaining<'a>(snapshot: &'a Snapshot, record: &ProgressRecord) -> Vec<&'a Item> {
    snapshot
        .iter()
        .filter(|item| !record.is_consumed(&item.id))
        .collect()
}

/// Decide the tick outcome and apply it to `record`.
///
/// `loadable` is consulted for each candidate in snapshot order. Candidates it
/// rejects are marked consumed as well, so a permanently broken file can never
/// block the queue. `record.exhausted` is recomputed from the snapshot.
pub fn decide<F>(snapshot: &Snapshot, record: &mut ProgressRecord, mut loadable: F) -> Decision
where
    F: FnMut(&Item) -> bool,
{
    let total = snapshot.len();
    if snapshot.is_empty() {
        return Decision::empty(EmptyReason::NoItemsFound, 0, 0);
    }

    let candidates: Vec<Item> = remaining(snapshot, record).into_iter().cloned().collect();
    if candidates.is_empty() {
        record.exhausted = true;
        return Decision::empty(EmptyReason::AllConsumed, total, total);
    }

    let mut selected = None;
    for candidate in candidates {
        record.mark_consumed(&candidate.id);
        if loadable(&candidate) {
            selected = Some(candidate);
            break;
        }
    }

    let processed = record.processed_in(snapshot);
    let left = total - processed;
    record.exhausted = left == 0;

    match selected {
        Some(item) => Decision::Next(NextItem {
            item,
            ordinal: processed,
            total,
            remaining: left,
        }),
        None => Decision::empty(EmptyReason::AllRemainingUnreadable, processed, total),
    }
}

/// Summarize progress without mutating anything.
pub fn progress(snapshot: &Snapshot, record: &ProgressRecord) -> Progress {
    let pending = remaining(snapshot, record);
    Progress {
        root: record.root.clone(),
        processed: snapshot.len() - pending.len(),
        total: snapshot.len(),
        remaining: pending.len(),
        next: pending.first().map(|item| (*item).clone()),
        exhausted: pending.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn snapshot(names: &[&str]) -> Snapshot {
        Snapshot::new(
            names
                .iter()
                .map(|name| Item::from_path(PathBuf::from(format!("/d/{name}"))))
                .collect(),
        )
    }

    #[test]
    fn empty_snapshot_reports_no_items() {
        let mut record = ProgressRecord::new("/d");
        let decision = decide(&Snapshot::default(), &mut record, |_| true);
        assert_eq!(decision, Decision::empty(EmptyReason::NoItemsFound, 0, 0));
        assert!(!record.exhausted);
    }

    #[test]
    fn selects_first_unconsumed_in_order() {
        let snap = snapshot(&["c.png", "a.png", "b.png"]);
        let mut record = ProgressRecord::new("/d");
        record.mark_consumed("/d/a.png");

        let decision = decide(&snap, &mut record, |_| true);
        let Decision::Next(next) = decision else {
            panic!("expected next item");
        };
        assert_eq!(next.item.id, "/d/b.png");
        assert_eq!((next.ordinal, next.total, next.remaining), (2, 3, 1));
        assert!(record.is_consumed("/d/b.png"));
        assert!(!record.exhausted);
    }

    #[test]
    fn unloadable_candidates_are_consumed_and_skipped() {
        let snap = snapshot(&["a.png", "b.png", "c.png"]);
        let mut record = ProgressRecord::new("/d");

        let decision = decide(&snap, &mut record, |item| item.id.ends_with("c.png"));
        let Decision::Next(next) = decision else {
            panic!("expected next item");
        };
        assert_eq!(next.item.id, "/d/c.png");
        assert_eq!((next.ordinal, next.total, next.remaining), (3, 3, 0));
        assert_eq!(record.consumed.len(), 3);
        assert!(record.exhausted);
    }

    #[test]
    fn all_unloadable_reports_unreadable_and_drains() {
        let snap = snapshot(&["a.png", "b.png"]);
        let mut record = ProgressRecord::new("/d");

        let decision = decide(&snap, &mut record, |_| false);
        assert_eq!(
            decision,
            Decision::empty(EmptyReason::AllRemainingUnreadable, 2, 2)
        );

        let decision = decide(&snap, &mut record, |_| false);
        assert_eq!(decision, Decision::empty(EmptyReason::AllConsumed, 2, 2));
        assert!(record.exhausted);
    }

    #[test]
    fn exhausted_cache_never_hides_new_items() {
        let mut record = ProgressRecord::new("/d");
        record.mark_consumed("/d/a.png");
        record.exhausted = true;

        let decision = decide(&snapshot(&["a.png", "b.png"]), &mut record, |_| true);
        assert!(decision.has_item());
    }

    #[test]
    fn progress_reports_next_without_mutation() {
        let snap = snapshot(&["a.png", "b.png"]);
        let mut record = ProgressRecord::new("/d");
        record.mark_consumed("/d/a.png");
        let before = record.clone();

        let progress = progress(&snap, &record);
        assert_eq!(progress.processed, 1);
        assert_eq!(progress.remaining, 1);
        assert_eq!(progress.next.map(|item| item.id), Some("/d/b.png".to_string()));
        assert!(!progress.exhausted);
        assert_eq!(record, before);
    }
}
