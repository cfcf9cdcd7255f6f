//! Read interface consumed by the planner, plus an in-memory implementation.
//!
//! The planner only needs two queries, "committed intervals for an entity"
//! and "members of a group", expressed by [`ScheduleSource`]. [`MemoryStore`]
//! is a process-owned store behind an `RwLock`; share it with `Arc` and hand
//! the planner a reference.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::interval::{CommittedInterval, EntityId, GroupId};
use crate::model::{validate_new_task, Event, Group, Task, TaskUpdate, User, DEFAULT_MAX_MEMBERS};

/// Query interface over stored schedules.
///
/// Implementations return a consistent snapshot per call; the planner does no
/// locking of its own.
pub trait ScheduleSource {
    /// Every scheduled interval blocking `entity`'s time. Unknown entities are
    /// `NotFound`.
    fn committed_intervals(&self, entity: EntityId) -> Result<Vec<CommittedInterval>>;

    /// Member ids of `group`. Unknown groups are `NotFound`.
    fn group_members(&self, group: GroupId) -> Result<Vec<EntityId>>;

    fn entity_exists(&self, entity: EntityId) -> bool {
        self.committed_intervals(entity).is_ok()
    }
}

impl<T: ScheduleSource + ?Sized> ScheduleSource for &T {
    fn committed_intervals(&self, entity: EntityId) -> Result<Vec<CommittedInterval>> {
        (**self).committed_intervals(entity)
    }

    fn group_members(&self, group: GroupId) -> Result<Vec<EntityId>> {
        (**self).group_members(group)
    }

    fn entity_exists(&self, entity: EntityId) -> bool {
        (**self).entity_exists(entity)
    }
}

impl<T: ScheduleSource + ?Sized> ScheduleSource for Arc<T> {
    fn committed_intervals(&self, entity: EntityId) -> Result<Vec<CommittedInterval>> {
        (**self).committed_intervals(entity)
    }

    fn group_members(&self, group: GroupId) -> Result<Vec<EntityId>> {
        (**self).group_members(group)
    }

    fn entity_exists(&self, entity: EntityId) -> bool {
        (**self).entity_exists(entity)
    }
}

/// Serializable dump of a store's contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub users: Vec<User>,
    pub groups: Vec<Group>,
    pub tasks: Vec<Task>,
    pub events: Vec<Event>,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| PlannerError::InvalidArgument(format!("invalid snapshot JSON: {e}")))
    }
}

#[derive(Debug, Default)]
struct Inner {
    users: BTreeMap<EntityId, User>,
    groups: BTreeMap<GroupId, Group>,
    tasks: BTreeMap<u64, Task>,
    events: BTreeMap<u64, Event>,
    next_group_id: GroupId,
    next_task_id: u64,
    next_event_id: u64,
}

impl Inner {
    fn require_user(&self, id: EntityId) -> Result<&User> {
        self.users.get(&id).ok_or(PlannerError::user_not_found(id))
    }
}

/// Drop repeated member ids, keeping the first occurrence.
fn dedup_members(mut group: Group) -> Group {
    let mut seen = BTreeSet::new();
    group.members.retain(|id| seen.insert(*id));
    group
}

/// Thread-safe in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a snapshot. Ids are kept as given; later inserts
    /// continue after the highest id seen. Repeated group members are dropped.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut inner = Inner::default();
        for user in snapshot.users {
            inner.users.insert(user.id, user);
        }
        for group in snapshot.groups {
            inner.next_group_id = inner.next_group_id.max(group.id);
            inner.groups.insert(group.id, dedup_members(group));
        }
        for task in snapshot.tasks {
            inner.next_task_id = inner.next_task_id.max(task.id);
            inner.tasks.insert(task.id, task);
        }
        for event in snapshot.events {
            inner.next_event_id = inner.next_event_id.max(event.id);
            inner.events.insert(event.id, event);
        }
        tracing::debug!(
            users = inner.users.len(),
            groups = inner.groups.len(),
            tasks = inner.tasks.len(),
            events = inner.events.len(),
            "Store loaded from snapshot"
        );
        Self {
            inner: RwLock::new(inner),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let inner = self.inner.read();
        Snapshot {
            users: inner.users.values().cloned().collect(),
            groups: inner.groups.values().cloned().collect(),
            tasks: inner.tasks.values().cloned().collect(),
            events: inner.events.values().cloned().collect(),
        }
    }

    // ── Users ───────────────────────────────────────────────────────────────

    pub fn add_user(&self, user: User) {
        self.inner.write().users.insert(user.id, user);
    }

    pub fn user(&self, id: EntityId) -> Result<User> {
        self.inner.read().require_user(id).cloned()
    }

    // ── Groups ──────────────────────────────────────────────────────────────

    /// Create a group with `organizer` as its first member.
    pub fn add_group(
        &self,
        name: impl Into<String>,
        organizer: EntityId,
        max_members: Option<usize>,
    ) -> Result<Group> {
        let mut inner = self.inner.write();
        inner.require_user(organizer)?;

        inner.next_group_id += 1;
        let group = Group {
            id: inner.next_group_id,
            name: name.into(),
            organizer_id: organizer,
            members: vec![organizer],
            max_members: max_members.unwrap_or(DEFAULT_MAX_MEMBERS),
        };
        inner.groups.insert(group.id, group.clone());
        tracing::debug!(group = group.id, organizer, "Group created");
        Ok(group)
    }

    pub fn join_group(&self, user: EntityId, group: GroupId) -> Result<Group> {
        let mut inner = self.inner.write();
        inner.require_user(user)?;
        let entry = inner
            .groups
            .get_mut(&group)
            .ok_or(PlannerError::group_not_found(group))?;

        if entry.members.contains(&user) {
            return Err(PlannerError::InvalidArgument(format!(
                "user {user} is already a member of group {group}"
            )));
        }
        if entry.members.len() >= entry.max_members {
            return Err(PlannerError::InvalidArgument(format!(
                "group {group} is full ({} members maximum)",
                entry.max_members
            )));
        }
        entry.members.push(user);
        Ok(entry.clone())
    }

    /// Remove `user` from `group`. The organizer cannot leave.
    pub fn leave_group(&self, user: EntityId, group: GroupId) -> Result<Group> {
        let mut inner = self.inner.write();
        let entry = inner
            .groups
            .get_mut(&group)
            .ok_or(PlannerError::group_not_found(group))?;

        if entry.organizer_id == user {
            return Err(PlannerError::InvalidArgument(format!(
                "organizer {user} cannot leave group {group}"
            )));
        }
        entry.members.retain(|&m| m != user);
        Ok(entry.clone())
    }

    pub fn groups_for_user(&self, user: EntityId) -> Vec<Group> {
        self.inner
            .read()
            .groups
            .values()
            .filter(|g| g.members.contains(&user))
            .cloned()
            .collect()
    }

    // ── Tasks and events ────────────────────────────────────────────────────

    /// Insert a task, assigning it a fresh id.
    pub fn add_task(&self, mut task: Task) -> Result<Task> {
        validate_new_task(&task)?;
        let mut inner = self.inner.write();
        inner.require_user(task.creator_id)?;

        inner.next_task_id += 1;
        task.id = inner.next_task_id;
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    pub fn update_task(&self, id: u64, update: &TaskUpdate) -> Result<Task> {
        let mut inner = self.inner.write();
        let task = inner
            .tasks
            .get_mut(&id)
            .ok_or(PlannerError::task_not_found(id))?;
        update.apply_to(task)?;
        Ok(task.clone())
    }

    pub fn remove_task(&self, id: u64) -> bool {
        self.inner.write().tasks.remove(&id).is_some()
    }

    /// Insert an event, assigning it a fresh id.
    pub fn add_event(&self, mut event: Event) -> Result<Event> {
        if event.end_time < event.start_time {
            return Err(PlannerError::InvalidArgument(format!(
                "event end {} precedes start {}",
                event.end_time, event.start_time
            )));
        }
        let mut inner = self.inner.write();
        inner.require_user(event.owner_id)?;

        inner.next_event_id += 1;
        event.id = inner.next_event_id;
        inner.events.insert(event.id, event.clone());
        Ok(event)
    }
}

impl ScheduleSource for MemoryStore {
    fn committed_intervals(&self, entity: EntityId) -> Result<Vec<CommittedInterval>> {
        let inner = self.inner.read();
        inner.require_user(entity)?;

        let tasks = inner
            .tasks
            .values()
            .filter(|t| t.involves(entity))
            .filter_map(|t| t.committed_interval(entity));
        let events = inner
            .events
            .values()
            .filter(|e| e.involves(entity))
            .map(|e| e.committed_interval(entity));

        Ok(tasks.chain(events).collect())
    }

    fn group_members(&self, group: GroupId) -> Result<Vec<EntityId>> {
        self.inner
            .read()
            .groups
            .get(&group)
            .map(|g| g.members.clone())
            .ok_or(PlannerError::group_not_found(group))
    }

    fn entity_exists(&self, entity: EntityId) -> bool {
        self.inner.read().users.contains_key(&entity)
    }
}
