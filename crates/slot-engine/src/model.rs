//! Stored entities: users, groups, tasks and events.
//!
//! The planner never reads these directly; it sees them only as
//! [`CommittedInterval`]s through [`crate::store::ScheduleSource`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::interval::{CommittedInterval, EntityId, GroupId, SourceKind};
use crate::time::validate_duration;

// ─────────────────────────────────────────────────────────────────────────────
// Closed tag enums
// ─────────────────────────────────────────────────────────────────────────────

/// Task priority. Unrecognised input parses as [`Priority::Medium`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn parse_or_default(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "low" => Priority::Low,
            "medium" => Priority::Medium,
            "high" => Priority::High,
            other => {
                tracing::debug!(value = other, "Unrecognised priority; using medium");
                Priority::default()
            }
        }
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        Priority::parse_or_default(&value)
    }
}

/// Task lifecycle. Unrecognised input parses as [`TaskStatus::New`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum TaskStatus {
    #[default]
    New,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn parse_or_default(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "new" => TaskStatus::New,
            "in_progress" => TaskStatus::InProgress,
            "completed" => TaskStatus::Completed,
            other => {
                tracing::debug!(value = other, "Unrecognised task status; using new");
                TaskStatus::default()
            }
        }
    }
}

impl From<String> for TaskStatus {
    fn from(value: String) -> Self {
        TaskStatus::parse_or_default(&value)
    }
}

/// Account role. Unrecognised input parses as [`UserRole::Participant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum UserRole {
    #[default]
    Participant,
    Organizer,
    Admin,
}

impl UserRole {
    pub fn parse_or_default(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "participant" => UserRole::Participant,
            "organizer" => UserRole::Organizer,
            "admin" => UserRole::Admin,
            _ => UserRole::default(),
        }
    }
}

impl From<String> for UserRole {
    fn from(value: String) -> Self {
        UserRole::parse_or_default(&value)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Entities
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub role: UserRole,
}

pub const DEFAULT_MAX_MEMBERS: usize = 10;

fn default_max_members() -> usize {
    DEFAULT_MAX_MEMBERS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub organizer_id: EntityId,
    /// Member ids in join order; the organizer comes first.
    #[serde(default)]
    pub members: Vec<EntityId>,
    #[serde(default = "default_max_members")]
    pub max_members: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Unscheduled tasks have no start or end and block no time.
    #[serde(default)]
    pub start_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub end_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub deadline: Option<NaiveDateTime>,
    pub duration_minutes: i64,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    pub creator_id: EntityId,
    #[serde(default)]
    pub assigned_users: Vec<EntityId>,
}

impl Task {
    pub fn involves(&self, user: EntityId) -> bool {
        self.creator_id == user || self.assigned_users.contains(&user)
    }

    /// The time this task blocks for `owner`, if it is scheduled.
    pub fn committed_interval(&self, owner: EntityId) -> Option<CommittedInterval> {
        let (start, end) = (self.start_time?, self.end_time?);
        Some(CommittedInterval::new(owner, start, end).with_source(
            SourceKind::Task,
            self.id,
            self.title.clone(),
        ))
    }

    fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(PlannerError::InvalidArgument(
                "task title must not be empty".to_string(),
            ));
        }
        validate_duration(self.duration_minutes)?;
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if end < start {
                return Err(PlannerError::InvalidArgument(format!(
                    "task end {end} precedes start {start}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub title: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub owner_id: EntityId,
    #[serde(default)]
    pub participants: Vec<EntityId>,
}

impl Event {
    pub fn involves(&self, user: EntityId) -> bool {
        self.owner_id == user || self.participants.contains(&user)
    }

    pub fn committed_interval(&self, owner: EntityId) -> CommittedInterval {
        CommittedInterval::new(owner, self.start_time, self.end_time).with_source(
            SourceKind::Event,
            self.id,
            self.title.clone(),
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Partial update
// ─────────────────────────────────────────────────────────────────────────────

/// Field-by-field task update. `None` leaves a field untouched; for nullable
/// fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<Option<NaiveDateTime>>,
    pub end_time: Option<Option<NaiveDateTime>>,
    pub deadline: Option<Option<NaiveDateTime>>,
    pub duration_minutes: Option<i64>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub assigned_users: Option<Vec<EntityId>>,
}

impl TaskUpdate {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn schedule(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.start_time = Some(Some(start));
        self.end_time = Some(Some(end));
        self
    }

    pub fn unschedule(mut self) -> Self {
        self.start_time = Some(None);
        self.end_time = Some(None);
        self
    }

    pub fn deadline(mut self, deadline: Option<NaiveDateTime>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn duration_minutes(mut self, minutes: i64) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn assigned_users(mut self, users: Vec<EntityId>) -> Self {
        self.assigned_users = Some(users);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == TaskUpdate::default()
    }

    /// Apply every present field to `task`. Either all fields apply or, on a
    /// validation error, `task` is left unchanged.
    pub fn apply_to(&self, task: &mut Task) -> Result<()> {
        let mut next = task.clone();

        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(PlannerError::InvalidArgument(
                    "task title must not be empty".to_string(),
                ));
            }
            next.title = title.clone();
        }
        if let Some(description) = &self.description {
            next.description = description.clone();
        }
        if let Some(start) = self.start_time {
            next.start_time = start;
        }
        if let Some(end) = self.end_time {
            next.end_time = end;
        }
        if let Some(deadline) = self.deadline {
            next.deadline = deadline;
        }
        if let Some(minutes) = self.duration_minutes {
            validate_duration(minutes)?;
            next.duration_minutes = minutes;
        }
        if let Some(priority) = self.priority {
            next.priority = priority;
        }
        if let Some(status) = self.status {
            next.status = status;
        }
        if let Some(users) = &self.assigned_users {
            next.assigned_users = users.clone();
        }

        // Start/end are checked together once both are applied.
        next.validate()?;
        *task = next;
        Ok(())
    }
}

pub(crate) fn validate_new_task(task: &Task) -> Result<()> {
    task.validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 6)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn task() -> Task {
        Task {
            id: 1,
            title: "Write report".to_string(),
            description: String::new(),
            start_time: None,
            end_time: None,
            deadline: None,
            duration_minutes: 60,
            priority: Priority::Medium,
            status: TaskStatus::New,
            creator_id: 7,
            assigned_users: vec![],
        }
    }

    #[test]
    fn unknown_tags_fall_back() {
        assert_eq!(Priority::parse_or_default("URGENT"), Priority::Medium);
        assert_eq!(Priority::parse_or_default(" High "), Priority::High);
        assert_eq!(TaskStatus::parse_or_default("in progress"), TaskStatus::InProgress);
        assert_eq!(TaskStatus::parse_or_default("archived"), TaskStatus::New);
        assert_eq!(UserRole::parse_or_default("root"), UserRole::Participant);
    }

    #[test]
    fn tags_deserialize_with_fallback() {
        let p: Priority = serde_json::from_str("\"bogus\"").unwrap();
        assert_eq!(p, Priority::Medium);
        assert_eq!(serde_json::to_string(&TaskStatus::InProgress).unwrap(), "\"in_progress\"");
    }

    #[test]
    fn unscheduled_task_blocks_nothing() {
        assert!(task().committed_interval(7).is_none());
    }

    #[test]
    fn update_applies_only_present_fields() {
        let mut t = task();
        TaskUpdate::default()
            .schedule(at(9), at(10))
            .priority(Priority::High)
            .apply_to(&mut t)
            .unwrap();
        assert_eq!(t.start_time, Some(at(9)));
        assert_eq!(t.end_time, Some(at(10)));
        assert_eq!(t.priority, Priority::High);
        assert_eq!(t.title, "Write report");
        assert_eq!(t.status, TaskStatus::New);
    }

    #[test]
    fn invalid_update_leaves_task_untouched() {
        let mut t = task();
        let before = t.clone();
        let err = TaskUpdate::default()
            .title("Renamed")
            .schedule(at(11), at(10))
            .apply_to(&mut t)
            .unwrap_err();
        assert!(matches!(err, PlannerError::InvalidArgument(_)));
        assert_eq!(t, before);

        assert!(TaskUpdate::default().duration_minutes(0).apply_to(&mut t).is_err());
        assert!(TaskUpdate::default().title("  ").apply_to(&mut t).is_err());
        assert_eq!(t, before);
    }

    #[test]
    fn clearing_schedule_with_unschedule() {
        let mut t = task();
        TaskUpdate::default().schedule(at(9), at(10)).apply_to(&mut t).unwrap();
        TaskUpdate::default().unschedule().apply_to(&mut t).unwrap();
        assert_eq!(t.start_time, None);
        assert!(TaskUpdate::default().is_empty());
    }
}
