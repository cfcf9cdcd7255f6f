//! Committed intervals and candidate windows.
//!
//! Every timestamp in this crate is a naive wall-clock `NaiveDateTime`; no
//! time zone is attached or inferred.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::conflict;

/// Identifier of a user (or any entity that owns committed time).
pub type EntityId = u64;

/// Identifier of a group of users.
pub type GroupId = u64;

/// Which kind of record produced a committed interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Task,
    Event,
}

/// Back-reference from an interval to the task or event it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub kind: SourceKind,
    pub id: u64,
    pub title: String,
}

/// A fixed, already-scheduled block of time attributable to one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub owner_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,
}

impl CommittedInterval {
    pub fn new(owner_id: EntityId, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end,
            owner_id,
            source: None,
        }
    }

    pub fn with_source(mut self, kind: SourceKind, id: u64, title: impl Into<String>) -> Self {
        self.source = Some(SourceRef {
            kind,
            id,
            title: title.into(),
        });
        self
    }

    /// `start <= end`. Intervals failing this are dropped by the planner.
    pub fn is_well_formed(&self) -> bool {
        self.start <= self.end
    }

    pub fn window(&self) -> Window {
        Window {
            start: self.start,
            end: self.end,
        }
    }
}

/// A half-open `[start, end)` time window under evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Window {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// A window of `minutes` starting at `start`.
    pub fn starting_at(start: NaiveDateTime, minutes: i64) -> Self {
        Self {
            start,
            end: start + Duration::minutes(minutes),
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn overlaps(&self, other: &Window) -> bool {
        conflict::overlaps(self.start, self.end, other.start, other.end)
    }

    /// True when `other` lies entirely inside this window.
    pub fn contains(&self, other: &Window) -> bool {
        self.start <= other.start && self.end >= other.end
    }
}
