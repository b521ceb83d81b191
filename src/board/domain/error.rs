//! Error types for board domain validation and parsing.

use super::TaskId;
use thiserror::Error;

/// Errors returned while constructing or mutating domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardDomainError {
    /// A board or category name is empty after trimming.
    #[error("name must not be empty")]
    EmptyName,

    /// A task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// Target counts start at one.
    #[error("invalid target count {0}, expected at least 1")]
    InvalidTargetCount(u32),

    /// Habits live for at least one day.
    #[error("invalid habit duration {0}, expected at least 1 day")]
    InvalidDuration(u32),

    /// Habits repeat at least every day.
    #[error("invalid habit interval {0}, expected at least 1 day")]
    InvalidInterval(u32),

    /// Notes carry no lifecycle status.
    #[error("task {0} is a note and has no status")]
    NoteHasNoStatus(TaskId),

    /// The history backfill only applies to tasks with no history.
    #[error("task {task_id} already has {entries} history entries")]
    HistoryAlreadyPresent {
        /// Task whose history was not empty.
        task_id: TaskId,
        /// Number of existing entries.
        entries: usize,
    },
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
