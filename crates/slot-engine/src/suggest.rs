//! Heuristic time suggestions that ignore calendar occupancy.
//!
//! The ranker proposes a small fixed menu of start times and scores sooner
//! days higher. It never reads committed intervals, so a suggestion may well
//! collide with an existing task: callers wanting a guarantee should use
//! [`crate::scanner::scan_free_slots`] or confirm with
//! [`crate::conflict::conflicts_for`].

use chrono::{Days, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::group::candidate_grid;

/// Days covered by the menu, starting today.
pub const SUGGESTION_DAYS: u64 = 3;

/// Maximum number of suggestions returned.
pub const SUGGESTION_LIMIT: usize = 3;

/// Score of today's candidates; each later day loses [`SCORE_STEP_PER_DAY`].
pub const BASE_SCORE: u8 = 90;
pub const SCORE_STEP_PER_DAY: u8 = 10;

/// Fallback emitted when every candidate is already in the past.
pub const FALLBACK_HOUR: u32 = 14;
pub const FALLBACK_SCORE: u8 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionReason {
    /// Regular menu entry.
    Productivity,
    /// Nothing on the menu was still ahead of "now".
    TomorrowFallback,
}

impl SuggestionReason {
    pub fn describe(&self) -> &'static str {
        match self {
            SuggestionReason::Productivity => "Preferred time based on productivity",
            SuggestionReason::TomorrowFallback => "Fallback option for tomorrow",
        }
    }
}

/// A proposed start time. Carries no occupancy guarantee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_minutes: i64,
    pub score: u8,
    pub reason: SuggestionReason,
}

/// Suggest up to three start times for a task of `duration_minutes`.
///
/// Enumerates `{today, +1d, +2d} × {10:00, 14:00, 16:00}`, drops candidates at
/// or before `now`, scores `90 - 10 * day_offset` and keeps the first three in
/// generation order. If nothing survives, returns tomorrow at 14:00 scored 80.
pub fn suggest_times(duration_minutes: i64, now: NaiveDateTime) -> Vec<Suggestion> {
    let duration = Duration::minutes(duration_minutes);

    let mut suggestions: Vec<Suggestion> = candidate_grid(now.date(), SUGGESTION_DAYS)
        .into_iter()
        .filter(|(_, start)| *start > now)
        .take(SUGGESTION_LIMIT)
        .map(|(offset, start)| Suggestion {
            date: start.date(),
            start,
            end: start + duration,
            duration_minutes,
            score: BASE_SCORE.saturating_sub(SCORE_STEP_PER_DAY.saturating_mul(offset as u8)),
            reason: SuggestionReason::Productivity,
        })
        .collect();

    if suggestions.is_empty() {
        let tomorrow = now
            .date()
            .checked_add_days(Days::new(1))
            .and_then(|d| d.and_hms_opt(FALLBACK_HOUR, 0, 0));
        if let Some(start) = tomorrow {
            suggestions.push(Suggestion {
                date: start.date(),
                start,
                end: start + duration,
                duration_minutes,
                score: FALLBACK_SCORE,
                reason: SuggestionReason::TomorrowFallback,
            });
        }
    }

    suggestions
}
