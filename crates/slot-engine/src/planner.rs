//! Request-level entry points.
//!
//! [`Planner`] binds a [`ScheduleSource`], a [`Clock`] and a
//! [`PlannerConfig`]. Each operation validates its arguments, fetches one
//! snapshot of the relevant intervals, and hands them to the pure
//! algorithms in [`crate::conflict`], [`crate::scanner`], [`crate::group`]
//! and [`crate::suggest`]. The planner is advisory: it reserves nothing, so
//! two concurrent callers may both be offered the same slot.

use chrono::NaiveDateTime;

use crate::config::PlannerConfig;
use crate::conflict::{self, Conflict};
use crate::error::{PlannerError, Result};
use crate::group::{self, GroupSlot, MemberSchedule};
use crate::interval::{CommittedInterval, EntityId, GroupId, Window};
use crate::model::Priority;
use crate::scanner::{self, FreeSlot};
use crate::store::ScheduleSource;
use crate::suggest::{self, Suggestion};
use crate::time::{validate_duration, validate_fits_working_day, validate_window};

/// Source of "now" for the relative searches.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

pub struct Planner<S, C = SystemClock> {
    source: S,
    clock: C,
    config: PlannerConfig,
}

impl<S: ScheduleSource> Planner<S, SystemClock> {
    pub fn new(source: S) -> Self {
        Self::with_clock(source, SystemClock)
    }
}

impl<S: ScheduleSource, C: Clock> Planner<S, C> {
    pub fn with_clock(source: S, clock: C) -> Self {
        Self {
            source,
            clock,
            config: PlannerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Committed intervals for `entity`, minus any with `end < start`.
    fn intervals(&self, entity: EntityId) -> Result<Vec<CommittedInterval>> {
        let mut intervals = self.source.committed_intervals(entity)?;
        intervals.retain(|interval| {
            let ok = interval.is_well_formed();
            if !ok {
                tracing::warn!(
                    entity,
                    start = %interval.start,
                    end = %interval.end,
                    "Skipping interval that ends before it starts"
                );
            }
            ok
        });
        Ok(intervals)
    }

    /// Per-member snapshots for `group_id`. A member whose lookup fails is kept
    /// as unavailable rather than failing the request.
    fn member_schedules(&self, group_id: GroupId) -> Result<Vec<MemberSchedule>> {
        let members = self.source.group_members(group_id)?;
        Ok(members
            .into_iter()
            .map(|member| match self.intervals(member) {
                Ok(intervals) => MemberSchedule::new(member, intervals),
                Err(err) => {
                    tracing::warn!(
                        group_id,
                        member,
                        error = %err,
                        "Member lookup failed; counting as unavailable"
                    );
                    MemberSchedule::unavailable(member)
                }
            })
            .collect())
    }

    /// Up to `free_slot_limit` (3) free windows of `duration_minutes` inside
    /// `[range_start, range_end)` and working hours. Durations longer than the
    /// working day are rejected.
    pub fn find_free_slots(
        &self,
        entity: EntityId,
        duration_minutes: i64,
        range_start: NaiveDateTime,
        range_end: NaiveDateTime,
    ) -> Result<Vec<FreeSlot>> {
        validate_duration(duration_minutes)?;
        validate_fits_working_day(duration_minutes, &self.config.working_hours)?;
        validate_window(range_start, range_end)?;
        tracing::debug!(entity, duration_minutes, %range_start, %range_end, "find_free_slots");

        let intervals = self.intervals(entity)?;
        Ok(scanner::scan_free_slots(
            &intervals,
            duration_minutes,
            range_start,
            range_end,
            &self.config.working_hours,
            self.config.free_slot_limit,
        ))
    }

    /// Every committed interval of `entity` overlapping `[start, end)`.
    pub fn check_conflicts(
        &self,
        entity: EntityId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Conflict>> {
        validate_window(start, end)?;
        tracing::debug!(entity, %start, %end, "check_conflicts");

        let intervals = self.intervals(entity)?;
        Ok(conflict::conflicts_for(Window::new(start, end), &intervals))
    }

    /// Fixed-grid candidates where a quorum of `group_id` is free (≤ 3).
    pub fn analyze_group_schedule(
        &self,
        group_id: GroupId,
        duration_minutes: i64,
    ) -> Result<Vec<GroupSlot>> {
        validate_duration(duration_minutes)?;
        tracing::debug!(group_id, duration_minutes, "analyze_group_schedule");

        let members = self.member_schedules(group_id)?;
        Ok(group::analyze_group_schedule(
            &members,
            duration_minutes,
            self.clock.now(),
            &self.config.group,
        ))
    }

    /// Intersection of members' own free slots, with quorum fallback (≤ 5).
    pub fn find_common_slots(
        &self,
        group_id: GroupId,
        duration_minutes: i64,
    ) -> Result<Vec<GroupSlot>> {
        validate_duration(duration_minutes)?;
        validate_fits_working_day(duration_minutes, &self.config.working_hours)?;
        tracing::debug!(group_id, duration_minutes, "find_common_slots");

        let members = self.member_schedules(group_id)?;
        Ok(group::find_common_slots(
            &members,
            duration_minutes,
            self.clock.now(),
            &self.config.working_hours,
            &self.config.group,
        ))
    }

    /// Heuristic start times for a new task (≤ 3).
    ///
    /// `priority` is parsed (unknown values become medium) but does not
    /// affect scoring. The suggestions ignore `entity`'s calendar and carry
    /// no occupancy guarantee.
    pub fn suggest_optimal_time(
        &self,
        entity: EntityId,
        duration_minutes: i64,
        priority: &str,
    ) -> Result<Vec<Suggestion>> {
        validate_duration(duration_minutes)?;
        let priority = Priority::parse_or_default(priority);
        tracing::debug!(entity, duration_minutes, ?priority, "suggest_optimal_time");

        if !self.source.entity_exists(entity) {
            return Err(PlannerError::user_not_found(entity));
        }
        Ok(suggest::suggest_times(duration_minutes, self.clock.now()))
    }
}
