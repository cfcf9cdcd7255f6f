//! Group availability: time windows usable by several members at once.
//!
//! Two searches are offered:
//!
//! - [`analyze_group_schedule`] checks a fixed grid of candidate starts and
//!   keeps those where a quorum of members has no conflict.
//! - [`find_common_slots`] intersects each member's own free slots, first
//!   strictly ([`intersect_exact`]) and, when that finds nothing, with a wider
//!   tolerance and a quorum ([`intersect_relaxed`]).
//!
//! Pure intersection is usually empty for groups larger than two or three on
//! sparse calendars, so both searches degrade to partial-quorum results rather
//! than returning nothing.

use std::collections::BTreeSet;

use chrono::{Days, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::config::{GroupPolicy, WorkingHours, CANDIDATE_HOURS, MAX_HORIZON_DAYS};
use crate::conflict;
use crate::interval::{CommittedInterval, EntityId, Window};
use crate::scanner::{self, FreeSlot};

/// One member's committed intervals, as fetched for a single request.
#[derive(Debug, Clone)]
pub struct MemberSchedule {
    pub member_id: EntityId,
    /// `None` when the lookup failed. Such a member is counted in the group
    /// total but never as available.
    pub intervals: Option<Vec<CommittedInterval>>,
}

impl MemberSchedule {
    pub fn new(member_id: EntityId, intervals: Vec<CommittedInterval>) -> Self {
        Self {
            member_id,
            intervals: Some(intervals),
        }
    }

    pub fn unavailable(member_id: EntityId) -> Self {
        Self {
            member_id,
            intervals: None,
        }
    }

    fn is_free(&self, window: Window) -> bool {
        self.intervals
            .as_deref()
            .is_some_and(|intervals| conflict::is_free(window, intervals))
    }
}

/// A candidate window together with who can attend it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSlot {
    pub slot: FreeSlot,
    pub available_member_ids: BTreeSet<EntityId>,
    pub total_members: usize,
    pub score_percent: u8,
}

impl GroupSlot {
    fn new(slot: FreeSlot, available_member_ids: BTreeSet<EntityId>, total_members: usize) -> Self {
        let score_percent = score_percent(available_member_ids.len(), total_members);
        Self {
            slot,
            available_member_ids,
            total_members,
            score_percent,
        }
    }
}

/// `round(available / total * 100)`; an empty group scores 0.
pub fn score_percent(available: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (available as f64 / total as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

/// The fixed candidate grid: `days` consecutive dates from `today`, each at
/// [`CANDIDATE_HOURS`]. Yields `(day_offset, start)` in day-then-hour order,
/// lazily, and stops at the end of the representable calendar.
pub(crate) fn candidate_grid(
    today: NaiveDate,
    days: u64,
) -> impl Iterator<Item = (u64, NaiveDateTime)> {
    (0..days)
        .map_while(move |offset| today.checked_add_days(Days::new(offset)).map(|d| (offset, d)))
        .flat_map(|(offset, date)| {
            CANDIDATE_HOURS
                .iter()
                .filter_map(move |&hour| date.and_hms_opt(hour, 0, 0).map(|start| (offset, start)))
        })
}

/// `policy.horizon_days`, capped at [`MAX_HORIZON_DAYS`].
fn horizon_days(policy: &GroupPolicy) -> i64 {
    policy.horizon_days.min(MAX_HORIZON_DAYS)
}

// ─────────────────────────────────────────────────────────────────────────────
// Full-quorum search
// ─────────────────────────────────────────────────────────────────────────────

/// Check `{today, +1d, +2d} × {10:00, 14:00, 16:00}` and keep the candidates
/// at which at least `policy.quorum` of the members have no conflict.
///
/// Candidates already in the past are still checked. Stops after
/// `policy.full_quorum_limit` accepted candidates.
pub fn analyze_group_schedule(
    members: &[MemberSchedule],
    duration_minutes: i64,
    now: NaiveDateTime,
    policy: &GroupPolicy,
) -> Vec<GroupSlot> {
    let total = members.len();
    let days = u64::try_from(horizon_days(policy)).unwrap_or(0);
    let mut accepted = Vec::new();

    for (_, start) in candidate_grid(now.date(), days) {
        let window = Window::starting_at(start, duration_minutes);

        let available: BTreeSet<EntityId> = members
            .iter()
            .filter(|m| m.is_free(window))
            .map(|m| m.member_id)
            .collect();

        if policy.meets_quorum(available.len(), total) {
            let slot = FreeSlot {
                start: window.start,
                end: window.end,
                duration_minutes,
            };
            accepted.push(GroupSlot::new(slot, available, total));
            if accepted.len() >= policy.full_quorum_limit {
                break;
            }
        }
    }

    accepted
}

// ─────────────────────────────────────────────────────────────────────────────
// Member-slot intersection search
// ─────────────────────────────────────────────────────────────────────────────

/// One member's individually computed free slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSlots {
    pub member_id: EntityId,
    pub slots: Vec<FreeSlot>,
}

/// `candidate` stands in for `base` when it contains it, or when it starts
/// strictly less than `tolerance_minutes` away from it.
fn matches_base(candidate: &FreeSlot, base: &FreeSlot, tolerance_minutes: i64) -> bool {
    if candidate.window().contains(&base.window()) {
        return true;
    }
    let distance = (candidate.start - base.start).num_seconds().abs();
    distance < tolerance_minutes * 60
}

fn has_match(member: &MemberSlots, base: &FreeSlot, tolerance_minutes: i64) -> bool {
    member
        .slots
        .iter()
        .any(|slot| matches_base(slot, base, tolerance_minutes))
}

/// Base slots (the first member's) matched by every other member within
/// `policy.exact_proximity_minutes`. With distinct member ids each result
/// scores 100.
pub fn intersect_exact(per_member: &[MemberSlots], policy: &GroupPolicy) -> Vec<GroupSlot> {
    let Some((first, others)) = per_member.split_first() else {
        return Vec::new();
    };
    let total = per_member.len();
    let everyone: BTreeSet<EntityId> = per_member.iter().map(|m| m.member_id).collect();

    first
        .slots
        .iter()
        .filter(|base| {
            others
                .iter()
                .all(|m| has_match(m, base, policy.exact_proximity_minutes))
        })
        .map(|base| GroupSlot::new(*base, everyone.clone(), total))
        .collect()
}

/// Base slots matched, within `policy.relaxed_proximity_minutes`, by enough
/// members (the first member included) to meet `policy.quorum`.
///
/// Evaluated independently of [`intersect_exact`]: a base slot rejected there
/// may be accepted here.
pub fn intersect_relaxed(per_member: &[MemberSlots], policy: &GroupPolicy) -> Vec<GroupSlot> {
    let Some((first, others)) = per_member.split_first() else {
        return Vec::new();
    };
    let total = per_member.len();

    first
        .slots
        .iter()
        .filter_map(|base| {
            let mut available = BTreeSet::from([first.member_id]);
            available.extend(
                others
                    .iter()
                    .filter(|m| has_match(m, base, policy.relaxed_proximity_minutes))
                    .map(|m| m.member_id),
            );
            policy
                .meets_quorum(available.len(), total)
                .then(|| GroupSlot::new(*base, available, total))
        })
        .collect()
}

/// Find windows usable by the whole group, falling back to a quorum.
///
/// Each member's free slots are computed over `[now, now + horizon)` with
/// [`scanner::scan_free_slots`]. The first member's slots are the base set.
/// Groups with fewer than two members return an empty list.
pub fn find_common_slots(
    members: &[MemberSchedule],
    duration_minutes: i64,
    now: NaiveDateTime,
    hours: &WorkingHours,
    policy: &GroupPolicy,
) -> Vec<GroupSlot> {
    if members.len() < 2 {
        return Vec::new();
    }

    let Some(range_end) =
        Duration::try_days(horizon_days(policy)).and_then(|h| now.checked_add_signed(h))
    else {
        tracing::warn!(
            horizon_days = policy.horizon_days,
            "Search horizon out of range; no common slots"
        );
        return Vec::new();
    };
    let per_member: Vec<MemberSlots> = members
        .iter()
        .map(|m| MemberSlots {
            member_id: m.member_id,
            slots: m
                .intervals
                .as_deref()
                .map(|intervals| {
                    scanner::scan_free_slots(
                        intervals,
                        duration_minutes,
                        now,
                        range_end,
                        hours,
                        policy.member_slot_limit,
                    )
                })
                .unwrap_or_default(),
        })
        .collect();

    let mut common = intersect_exact(&per_member, policy);
    if common.is_empty() {
        tracing::debug!(
            members = members.len(),
            "No exact common slot; falling back to quorum pass"
        );
        common = intersect_relaxed(&per_member, policy);
    }

    common.truncate(policy.common_slot_limit);
    common
}
