//! Tests for the full-quorum and member-intersection group searches.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use slot_engine::config::{GroupPolicy, WorkingHours};
use slot_engine::group::{
    analyze_group_schedule, find_common_slots, intersect_exact, intersect_relaxed,
    MemberSchedule, MemberSlots,
};
use slot_engine::interval::CommittedInterval;
use slot_engine::scanner::FreeSlot;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn at(day: u32, hour: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, day)
        .unwrap()
        .and_hms_opt(hour, min, 0)
        .unwrap()
}

fn free(id: u64) -> MemberSchedule {
    MemberSchedule::new(id, vec![])
}

fn busy(id: u64, start: NaiveDateTime, end: NaiveDateTime) -> MemberSchedule {
    MemberSchedule::new(id, vec![CommittedInterval::new(id, start, end)])
}

fn slot(start: NaiveDateTime, minutes: i64) -> FreeSlot {
    FreeSlot {
        start,
        end: start + chrono::Duration::minutes(minutes),
        duration_minutes: minutes,
    }
}

fn ids(values: &[u64]) -> BTreeSet<u64> {
    values.iter().copied().collect()
}

// ── analyze_group_schedule ──────────────────────────────────────────────────

#[test]
fn full_quorum_skips_candidate_below_threshold() {
    // Member 3 is busy at 10:00 on day one: 2 of 3 < 70%, so that candidate drops.
    let members = vec![free(1), free(2), busy(3, at(6, 10, 0), at(6, 11, 0))];

    let slots = analyze_group_schedule(&members, 60, at(6, 8, 0), &GroupPolicy::default());

    assert_eq!(slots.len(), 3);
    assert_eq!(slots[0].slot.start, at(6, 14, 0));
    assert_eq!(slots[1].slot.start, at(6, 16, 0));
    assert_eq!(slots[2].slot.start, at(7, 10, 0));
    assert!(slots.iter().all(|s| s.score_percent == 100));
    assert!(slots.iter().all(|s| s.total_members == 3));
}

#[test]
fn two_of_three_scores_sixty_seven() {
    let members = vec![free(1), free(2), busy(3, at(6, 10, 0), at(6, 11, 0))];
    let policy = GroupPolicy {
        quorum: 0.6,
        ..GroupPolicy::default()
    };

    let slots = analyze_group_schedule(&members, 60, at(6, 8, 0), &policy);

    assert_eq!(slots[0].slot.start, at(6, 10, 0));
    assert_eq!(slots[0].slot.end, at(6, 11, 0));
    assert_eq!(slots[0].available_member_ids, ids(&[1, 2]));
    assert_eq!(slots[0].score_percent, 67);
}

#[test]
fn adjacent_commitment_does_not_block_candidate() {
    // Busy 09:00-10:00 ends exactly when the 10:00 candidate starts.
    let members = vec![busy(1, at(6, 9, 0), at(6, 10, 0)), free(2)];

    let slots = analyze_group_schedule(&members, 30, at(6, 8, 0), &GroupPolicy::default());

    assert_eq!(slots[0].slot.start, at(6, 10, 0));
    assert_eq!(slots[0].available_member_ids, ids(&[1, 2]));
}

#[test]
fn past_candidates_are_still_checked() {
    // "Now" is late evening; today's grid is still evaluated.
    let slots = analyze_group_schedule(
        &[free(1), free(2)],
        60,
        at(6, 22, 0),
        &GroupPolicy::default(),
    );
    assert_eq!(slots[0].slot.start, at(6, 10, 0));
}

#[test]
fn unreachable_member_counts_against_quorum() {
    let members = vec![free(1), free(2), MemberSchedule::unavailable(3)];

    let slots = analyze_group_schedule(&members, 60, at(6, 8, 0), &GroupPolicy::default());

    assert!(slots.is_empty(), "2 of 3 never meets a 70% quorum");
}

#[test]
fn whole_horizon_exhausted_when_nobody_is_free() {
    let members = vec![
        busy(1, at(6, 0, 0), at(9, 0, 0)),
        busy(2, at(6, 0, 0), at(9, 0, 0)),
    ];
    let slots = analyze_group_schedule(&members, 60, at(6, 8, 0), &GroupPolicy::default());
    assert!(slots.is_empty());
}

#[test]
fn empty_group_accepts_vacuously_with_zero_score() {
    let slots = analyze_group_schedule(&[], 60, at(6, 8, 0), &GroupPolicy::default());
    assert_eq!(slots.len(), 3);
    assert!(slots.iter().all(|s| s.score_percent == 0 && s.total_members == 0));
}

// ── find_common_slots ───────────────────────────────────────────────────────

#[test]
fn single_member_group_has_no_common_slots() {
    let slots = find_common_slots(
        &[free(1)],
        60,
        at(6, 9, 0),
        &WorkingHours::default(),
        &GroupPolicy::default(),
    );
    assert!(slots.is_empty());
}

#[test]
fn two_free_members_share_every_base_slot() {
    let slots = find_common_slots(
        &[free(1), free(2)],
        60,
        at(6, 9, 0),
        &WorkingHours::default(),
        &GroupPolicy::default(),
    );

    assert_eq!(slots.len(), 3);
    assert_eq!(slots[0].slot, slot(at(6, 9, 0), 60));
    assert_eq!(slots[1].slot, slot(at(6, 10, 0), 60));
    assert_eq!(slots[2].slot, slot(at(6, 11, 0), 60));
    for s in &slots {
        assert_eq!(s.score_percent, 100);
        assert_eq!(s.available_member_ids, ids(&[1, 2]));
    }
}

#[test]
fn falls_back_to_quorum_when_exact_pass_is_empty() {
    // Member 2 is busy until 12:30, so their slots start at 12:30, 13:30, 14:30.
    let members = vec![
        free(1),
        busy(2, at(6, 9, 0), at(6, 12, 30)),
        free(3),
        free(4),
    ];

    let slots = find_common_slots(
        &members,
        60,
        at(6, 9, 0),
        &WorkingHours::default(),
        &GroupPolicy::default(),
    );

    assert_eq!(slots.len(), 3);
    // 09:00 and 10:00: member 2 is more than two hours away → 3 of 4.
    assert_eq!(slots[0].slot.start, at(6, 9, 0));
    assert_eq!(slots[0].available_member_ids, ids(&[1, 3, 4]));
    assert_eq!(slots[0].score_percent, 75);
    assert_eq!(slots[1].slot.start, at(6, 10, 0));
    assert_eq!(slots[1].score_percent, 75);
    // 11:00: member 2's 12:30 slot is within two hours → everyone.
    assert_eq!(slots[2].slot.start, at(6, 11, 0));
    assert_eq!(slots[2].available_member_ids, ids(&[1, 2, 3, 4]));
    assert_eq!(slots[2].score_percent, 100);
}

#[test]
fn result_cap_applies() {
    let policy = GroupPolicy {
        member_slot_limit: 10,
        ..GroupPolicy::default()
    };
    let slots = find_common_slots(
        &[free(1), free(2)],
        30,
        at(6, 9, 0),
        &WorkingHours::default(),
        &policy,
    );
    assert_eq!(slots.len(), 5);
}

#[test]
fn unreachable_second_member_leaves_pair_without_quorum() {
    let slots = find_common_slots(
        &[free(1), MemberSchedule::unavailable(2)],
        60,
        at(6, 9, 0),
        &WorkingHours::default(),
        &GroupPolicy::default(),
    );
    assert!(slots.is_empty(), "1 of 2 is below a 70% quorum");
}

// ── Pass independence ───────────────────────────────────────────────────────

#[test]
fn relaxed_pass_accepts_base_slot_rejected_by_exact_pass() {
    // Member 2's only slot starts 90 minutes after the base slot: outside the
    // one-hour tolerance, inside the two-hour one.
    let per_member = vec![
        MemberSlots {
            member_id: 1,
            slots: vec![slot(at(6, 9, 0), 60)],
        },
        MemberSlots {
            member_id: 2,
            slots: vec![slot(at(6, 10, 30), 60)],
        },
    ];
    let policy = GroupPolicy::default();

    assert!(intersect_exact(&per_member, &policy).is_empty());

    let relaxed = intersect_relaxed(&per_member, &policy);
    assert_eq!(relaxed.len(), 1);
    assert_eq!(relaxed[0].slot.start, at(6, 9, 0));
    assert_eq!(relaxed[0].score_percent, 100);
}

#[test]
fn containing_slot_matches_regardless_of_distance() {
    let per_member = vec![
        MemberSlots {
            member_id: 1,
            slots: vec![slot(at(6, 15, 0), 30)],
        },
        MemberSlots {
            member_id: 2,
            // Starts six hours earlier but covers the base slot.
            slots: vec![FreeSlot {
                start: at(6, 9, 0),
                end: at(6, 16, 0),
                duration_minutes: 420,
            }],
        },
    ];

    let exact = intersect_exact(&per_member, &GroupPolicy::default());
    assert_eq!(exact.len(), 1);
}

#[test]
fn exact_pass_requires_every_other_member() {
    let per_member = vec![
        MemberSlots {
            member_id: 1,
            slots: vec![slot(at(6, 9, 0), 60)],
        },
        MemberSlots {
            member_id: 2,
            slots: vec![slot(at(6, 9, 30), 60)],
        },
        MemberSlots {
            member_id: 3,
            slots: vec![],
        },
    ];
    assert!(intersect_exact(&per_member, &GroupPolicy::default()).is_empty());
}

#[test]
fn proximity_tolerances_are_configurable() {
    let per_member = vec![
        MemberSlots {
            member_id: 1,
            slots: vec![slot(at(6, 9, 0), 60)],
        },
        MemberSlots {
            member_id: 2,
            slots: vec![slot(at(6, 10, 30), 60)],
        },
    ];
    let wide = GroupPolicy {
        exact_proximity_minutes: 120,
        ..GroupPolicy::default()
    };
    assert_eq!(intersect_exact(&per_member, &wide).len(), 1);
}

// ── Horizon bounds ──────────────────────────────────────────────────────────

#[test]
fn oversized_horizon_is_capped_not_fatal() {
    let policy = GroupPolicy {
        horizon_days: i64::MAX,
        ..GroupPolicy::default()
    };

    let common = find_common_slots(
        &[free(1), free(2)],
        60,
        at(6, 9, 0),
        &WorkingHours::default(),
        &policy,
    );
    assert_eq!(common.len(), 3);
    assert_eq!(common[0].slot.start, at(6, 9, 0));

    // Nobody is ever free, so the whole (capped) grid is walked.
    let never = vec![
        MemberSchedule::unavailable(1),
        MemberSchedule::unavailable(2),
    ];
    assert!(analyze_group_schedule(&never, 60, at(6, 8, 0), &policy).is_empty());
}

#[test]
fn negative_horizon_finds_nothing() {
    let policy = GroupPolicy {
        horizon_days: i64::MIN,
        ..GroupPolicy::default()
    };
    let common = find_common_slots(
        &[free(1), free(2)],
        60,
        at(6, 9, 0),
        &WorkingHours::default(),
        &policy,
    );
    assert!(common.is_empty());
    assert!(analyze_group_schedule(&[free(1)], 60, at(6, 8, 0), &policy).is_empty());
}
