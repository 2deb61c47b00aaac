//! Reconciliation of freshly ingested workouts with the stored history.
//!
//! The device only keeps a bounded buffer of sessions and may report
//! recomputed totals for a session still in that buffer, so a newer reading
//! of the same `(date, minutes)` session replaces the older one.

use std::collections::HashSet;

use tracing::debug;

use crate::table::{HistoryTable, WorkoutRecord};

/// Keep only the last occurrence of each key, at that occurrence's position.
pub fn dedup_keep_last<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: std::hash::Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::with_capacity(items.len());
    let mut kept: Vec<T> = items
        .into_iter()
        .rev()
        .filter(|item| seen.insert(key(item)))
        .collect();
    kept.reverse();
    kept
}

/// Merge `new_table` into `old_table`.
///
/// Old rows are placed before new ones, the result is stably sorted by date,
/// then deduplicated on `(workout_date, workout_time)` keeping the last
/// occurrence, so new data wins over history for the same session.
pub fn merge(new_table: HistoryTable, old_table: HistoryTable) -> HistoryTable {
    if old_table.is_empty() {
        return new_table.sorted_by_date();
    }
    if new_table.is_empty() {
        return old_table.sorted_by_date();
    }

    let incoming = new_table.len();
    let mut combined = old_table.into_rows();
    combined.extend(new_table);
    let combined = HistoryTable::from_rows(combined).sorted_by_date();
    let before = combined.len();

    let merged = HistoryTable::from_rows(dedup_keep_last(
        combined.into_rows(),
        |r: &WorkoutRecord| r.key(),
    ));
    debug!(
        incoming,
        duplicates = before - merged.len(),
        rows = merged.len(),
        "merged history"
    );
    merged
}
