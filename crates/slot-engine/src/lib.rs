//! # slot-engine
//!
//! Time-availability computation for personal and group schedules.
//!
//! Given the committed intervals (scheduled tasks and events) of a user or of
//! every member of a group, the engine finds free slots, lists conflicts,
//! scores candidate meeting times and finds windows several people can use
//! at once. All computations are synchronous and pure over a snapshot
//! supplied by a [`store::ScheduleSource`]; timestamps are naive local time.
//!
//! ## Modules
//!
//! - [`interval`]: Committed intervals and candidate windows
//! - [`conflict`]: Half-open overlap test and per-window conflict listing
//! - [`scanner`]: Greedy free-slot scan bounded by working hours
//! - [`group`]: Full-quorum and member-intersection group searches
//! - [`suggest`]: Occupancy-blind suggestion menu
//! - [`planner`]: Request-level façade over a schedule source
//! - [`store`]: `ScheduleSource` trait and the in-memory store
//! - [`model`]: Users, groups, tasks, events, partial task updates
//! - [`config`]: Working hours and group heuristics, loadable from TOML
//! - [`time`]: Timestamp parsing and argument validation
//! - [`error`]: Error types

pub mod config;
pub mod conflict;
pub mod error;
pub mod group;
pub mod interval;
pub mod model;
pub mod planner;
pub mod scanner;
pub mod store;
pub mod suggest;
pub mod time;

pub use config::{GroupPolicy, PlannerConfig, WorkingHours};
pub use conflict::{conflicts_for, overlaps, Conflict};
pub use error::PlannerError;
pub use group::{analyze_group_schedule, find_common_slots, GroupSlot, MemberSchedule};
pub use interval::{CommittedInterval, EntityId, GroupId, SourceKind, SourceRef, Window};
pub use model::{Event, Group, Priority, Task, TaskStatus, TaskUpdate, User, UserRole};
pub use planner::{Clock, FixedClock, Planner, SystemClock};
pub use scanner::{scan_free_slots, FreeSlot};
pub use store::{MemoryStore, ScheduleSource, Snapshot};
pub use suggest::{suggest_times, Suggestion, SuggestionReason};
pub use time::parse_timestamp;
