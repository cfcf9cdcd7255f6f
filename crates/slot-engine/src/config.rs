//! Planner configuration: working hours, group heuristics and result caps.
//!
//! Every tunable has a named default below. A TOML file may override any
//! subset of them; missing keys keep their defaults and unknown keys are
//! ignored.
//!
//! ```toml
//! free_slot_limit = 3
//!
//! [working_hours]
//! start_hour = 9
//! end_hour = 18
//!
//! [group]
//! quorum = 0.7
//! exact_proximity_minutes = 60
//! relaxed_proximity_minutes = 120
//!
//! [logging]
//! level = "debug"
//! ```

use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

// =============================================================================
// Defaults
// =============================================================================

/// First eligible hour of the working day (inclusive).
pub const DEFAULT_WORK_START_HOUR: u32 = 9;

/// End of the working day (exclusive).
pub const DEFAULT_WORK_END_HOUR: u32 = 18;

/// Fraction of members that must be free for a partial-quorum match.
pub const DEFAULT_QUORUM: f64 = 0.7;

/// A member slot starting strictly within this many minutes of the base slot
/// counts as matching in the exact intersection pass.
pub const DEFAULT_EXACT_PROXIMITY_MINUTES: i64 = 60;

/// Proximity tolerance of the relaxed (quorum) pass.
pub const DEFAULT_RELAXED_PROXIMITY_MINUTES: i64 = 120;

/// Days searched by group queries, starting today.
pub const DEFAULT_HORIZON_DAYS: i64 = 3;

/// Largest accepted `[group] horizon_days`.
pub const MAX_HORIZON_DAYS: i64 = 366;

/// Cap on single-user free-slot results.
pub const DEFAULT_FREE_SLOT_LIMIT: usize = 3;

/// Cap on full-quorum group results.
pub const DEFAULT_FULL_QUORUM_LIMIT: usize = 3;

/// Cap on member-slot intersection results.
pub const DEFAULT_COMMON_SLOT_LIMIT: usize = 5;

/// Free slots computed per member before intersecting.
pub const DEFAULT_MEMBER_SLOT_LIMIT: usize = 3;

/// Hours of the day at which fixed candidates are proposed.
pub const CANDIDATE_HOURS: [u32; 3] = [10, 14, 16];

/// Longest accepted duration for any request.
pub const MAX_DURATION_MINUTES: i64 = 24 * 60;

// =============================================================================
// Sections
// =============================================================================

/// The daily eligibility window `[start_hour, end_hour)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkingHours {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start_hour: DEFAULT_WORK_START_HOUR,
            end_hour: DEFAULT_WORK_END_HOUR,
        }
    }
}

impl WorkingHours {
    pub fn contains_hour(&self, hour: u32) -> bool {
        self.start_hour <= hour && hour < self.end_hour
    }

    /// Length of the working day; no emitted slot can be longer.
    pub fn day_minutes(&self) -> i64 {
        i64::from(self.end_hour.saturating_sub(self.start_hour)) * 60
    }

    /// Opening time on `date`.
    pub fn opening(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(chrono::NaiveTime::MIN) + Duration::hours(i64::from(self.start_hour))
    }

    /// Closing time on `date`. An `end_hour` of 24 closes at the next midnight.
    pub fn closing(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(chrono::NaiveTime::MIN) + Duration::hours(i64::from(self.end_hour))
    }

    fn validate(&self) -> Result<()> {
        if self.start_hour >= self.end_hour || self.end_hour > 24 {
            return Err(PlannerError::InvalidConfig(format!(
                "[working_hours] must satisfy start_hour < end_hour <= 24, got {}..{}",
                self.start_hour, self.end_hour
            )));
        }
        Ok(())
    }
}

/// Tuning constants for the group searches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupPolicy {
    pub quorum: f64,
    pub exact_proximity_minutes: i64,
    pub relaxed_proximity_minutes: i64,
    pub horizon_days: i64,
    pub full_quorum_limit: usize,
    pub common_slot_limit: usize,
    pub member_slot_limit: usize,
}

impl Default for GroupPolicy {
    fn default() -> Self {
        Self {
            quorum: DEFAULT_QUORUM,
            exact_proximity_minutes: DEFAULT_EXACT_PROXIMITY_MINUTES,
            relaxed_proximity_minutes: DEFAULT_RELAXED_PROXIMITY_MINUTES,
            horizon_days: DEFAULT_HORIZON_DAYS,
            full_quorum_limit: DEFAULT_FULL_QUORUM_LIMIT,
            common_slot_limit: DEFAULT_COMMON_SLOT_LIMIT,
            member_slot_limit: DEFAULT_MEMBER_SLOT_LIMIT,
        }
    }
}

impl GroupPolicy {
    /// Compared on the real-valued threshold; fractional members are not rounded.
    pub fn meets_quorum(&self, available: usize, total: usize) -> bool {
        available as f64 >= self.quorum * total as f64
    }

    fn validate(&self) -> Result<()> {
        if !(self.quorum > 0.0 && self.quorum <= 1.0) {
            return Err(PlannerError::InvalidConfig(format!(
                "[group] quorum must be in (0, 1], got {}",
                self.quorum
            )));
        }
        if self.exact_proximity_minutes <= 0 || self.relaxed_proximity_minutes <= 0 {
            return Err(PlannerError::InvalidConfig(
                "[group] proximity tolerances must be positive".to_string(),
            ));
        }
        if !(1..=MAX_HORIZON_DAYS).contains(&self.horizon_days) {
            return Err(PlannerError::InvalidConfig(format!(
                "[group] horizon_days must be between 1 and {MAX_HORIZON_DAYS}, got {}",
                self.horizon_days
            )));
        }
        if self.full_quorum_limit == 0 || self.common_slot_limit == 0 || self.member_slot_limit == 0
        {
            return Err(PlannerError::InvalidConfig(
                "[group] result limits must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// `[logging]` section; consumed by the CLI when installing the subscriber.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// "error", "warn", "info", "debug" or "trace".
    pub level: Option<String>,
}

// =============================================================================
// Top level
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub free_slot_limit: usize,
    pub working_hours: WorkingHours,
    pub group: GroupPolicy,
    pub logging: LoggingSection,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            free_slot_limit: DEFAULT_FREE_SLOT_LIMIT,
            working_hours: WorkingHours::default(),
            group: GroupPolicy::default(),
            logging: LoggingSection::default(),
        }
    }
}

impl PlannerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PlannerConfig =
            toml::from_str(content).map_err(|e| PlannerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PlannerError::InvalidConfig(format!("could not read '{}': {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.free_slot_limit == 0 {
            return Err(PlannerError::InvalidConfig(
                "free_slot_limit must be non-zero".to_string(),
            ));
        }
        self.working_hours.validate()?;
        self.group.validate()
    }
}
