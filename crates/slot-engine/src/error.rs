//! Error types for slot-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlannerError {
    /// A user or group id that the schedule source does not know.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u64 },

    /// Rejected before any scan begins (bad duration, empty window, malformed date).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PlannerError {
    pub fn user_not_found(id: u64) -> Self {
        PlannerError::NotFound { kind: "user", id }
    }

    pub fn group_not_found(id: u64) -> Self {
        PlannerError::NotFound { kind: "group", id }
    }

    pub fn task_not_found(id: u64) -> Self {
        PlannerError::NotFound { kind: "task", id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PlannerError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
