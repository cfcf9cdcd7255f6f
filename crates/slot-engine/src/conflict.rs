//! Detect committed intervals that overlap a candidate window.
//!
//! Overlap is half-open: an interval ending exactly when the candidate starts
//! (or starting exactly when it ends) is NOT a conflict.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::interval::{CommittedInterval, Window};

/// A committed interval that collides with a candidate window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub interval: CommittedInterval,
    pub overlap_start: NaiveDateTime,
    pub overlap_end: NaiveDateTime,
    pub overlap_minutes: i64,
}

/// Two ranges overlap iff `a_start < b_end && a_end > b_start`.
///
/// Symmetric in its two ranges. Adjacent ranges (`a_end == b_start`) do not
/// overlap.
pub fn overlaps(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Every interval overlapping `candidate`, in input order.
///
/// The overlap bounds are `max(candidate.start, interval.start)` ..
/// `min(candidate.end, interval.end)`, so they always lie inside both the
/// candidate and the interval.
pub fn conflicts_for(candidate: Window, intervals: &[CommittedInterval]) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    for interval in intervals {
        if overlaps(candidate.start, candidate.end, interval.start, interval.end) {
            let overlap_start = candidate.start.max(interval.start);
            let overlap_end = candidate.end.min(interval.end);

            conflicts.push(Conflict {
                interval: interval.clone(),
                overlap_start,
                overlap_end,
                overlap_minutes: (overlap_end - overlap_start).num_minutes(),
            });
        }
    }

    conflicts
}

/// Cheaper form of [`conflicts_for`] for callers that only need a yes/no.
pub fn is_free(candidate: Window, intervals: &[CommittedInterval]) -> bool {
    !intervals
        .iter()
        .any(|i| overlaps(candidate.start, candidate.end, i.start, i.end))
}
