//! Greedy forward scan for free windows inside working hours.
//!
//! Walks a cursor from the start of the range. Outside working hours the cursor
//! jumps to the next day's opening time; on a collision it jumps to the end of
//! the blocking interval; otherwise the candidate window is emitted and the
//! cursor moves to its end. The scan is a heuristic: it proposes the earliest
//! back-to-back windows, not an optimal packing.

use chrono::{Days, Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::config::WorkingHours;
use crate::interval::CommittedInterval;

/// A free time slot of the requested duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FreeSlot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_minutes: i64,
}

impl FreeSlot {
    pub fn window(&self) -> crate::interval::Window {
        crate::interval::Window::new(self.start, self.end)
    }
}

/// Intervals that touch `[range_start, range_end]`, sorted by start time.
fn relevant_intervals(
    intervals: &[CommittedInterval],
    range_start: NaiveDateTime,
    range_end: NaiveDateTime,
) -> Vec<&CommittedInterval> {
    let mut relevant: Vec<&CommittedInterval> = intervals
        .iter()
        .filter(|i| i.start <= range_end && i.end >= range_start)
        .collect();
    relevant.sort_by_key(|i| (i.start, i.end));
    relevant
}

/// Opening time of the calendar day after `cursor`, `None` past the end of
/// the representable calendar.
fn next_opening(cursor: NaiveDateTime, hours: &WorkingHours) -> Option<NaiveDateTime> {
    cursor
        .date()
        .checked_add_days(Days::new(1))
        .map(|tomorrow| hours.opening(tomorrow))
}

/// Find up to `limit` free windows of `duration_minutes` within
/// `[range_start, range_end)`.
///
/// Only windows lying entirely inside `hours` on a single day are emitted.
/// When the cursor sits outside working hours (before opening or after
/// closing) it moves to the opening time of the next calendar day.
///
/// `duration_minutes` must be positive; the planner validates it before
/// calling in.
pub fn scan_free_slots(
    intervals: &[CommittedInterval],
    duration_minutes: i64,
    range_start: NaiveDateTime,
    range_end: NaiveDateTime,
    hours: &WorkingHours,
    limit: usize,
) -> Vec<FreeSlot> {
    let relevant = relevant_intervals(intervals, range_start, range_end);
    let duration = Duration::minutes(duration_minutes);

    let mut slots = Vec::new();
    let mut cursor = range_start;

    while cursor < range_end && slots.len() < limit {
        let candidate_end = cursor + duration;

        // Outside working hours, or the window would outlast the working day.
        if !hours.contains_hour(cursor.hour()) || candidate_end > hours.closing(cursor.date()) {
            match next_opening(cursor, hours) {
                Some(next) => cursor = next,
                None => break,
            }
            continue;
        }

        // First blocking interval in start order; resume from its end.
        if let Some(blocking) = relevant
            .iter()
            .find(|i| i.start < candidate_end && i.end > cursor)
        {
            cursor = blocking.end;
            continue;
        }

        if candidate_end > range_end {
            break;
        }

        slots.push(FreeSlot {
            start: cursor,
            end: candidate_end,
            duration_minutes,
        });
        cursor = candidate_end;
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, day)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    #[test]
    fn early_morning_cursor_jumps_to_next_day() {
        let slots = scan_free_slots(
            &[],
            60,
            at(6, 7, 0),
            at(8, 0, 0),
            &WorkingHours::default(),
            1,
        );
        assert_eq!(slots[0].start, at(7, 9, 0));
    }

    #[test]
    fn next_opening_crosses_month_end() {
        let cursor = NaiveDate::from_ymd_opt(2025, 1, 31)
            .unwrap()
            .and_hms_opt(19, 0, 0)
            .unwrap();
        let expected = NaiveDate::from_ymd_opt(2025, 2, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert_eq!(next_opening(cursor, &WorkingHours::default()), Some(expected));
    }

    #[test]
    fn irrelevant_intervals_are_dropped() {
        let far = CommittedInterval::new(1, at(20, 9, 0), at(20, 10, 0));
        let near = CommittedInterval::new(1, at(6, 9, 0), at(6, 10, 0));
        let intervals = [far, near.clone()];
        let kept = relevant_intervals(&intervals, at(6, 0, 0), at(7, 0, 0));
        assert_eq!(kept, vec![&near]);
    }
}
