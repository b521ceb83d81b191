//! Task status lanes, task kinds and swipe directions.

use super::ParseTaskStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a `task`-kind item.
///
/// Storage names keep the board's original vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Not started ("to-do" lane).
    #[default]
    #[serde(rename = "pendiente")]
    Pending,
    /// Started but not finished.
    #[serde(rename = "en_progreso")]
    InProgress,
    /// Done.
    #[serde(rename = "completado")]
    Completed,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pendiente",
            Self::InProgress => "en_progreso",
            Self::Completed => "completado",
        }
    }

    /// Returns the human-readable lane label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In progress",
            Self::Completed => "Completed",
        }
    }

    /// Returns the lane one step forward, if any.
    #[must_use]
    pub const fn advanced(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::InProgress),
            Self::InProgress => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    /// Returns the lane one step back, if any.
    #[must_use]
    pub const fn retreated(self) -> Option<Self> {
        match self {
            Self::Pending => None,
            Self::InProgress => Some(Self::Pending),
            Self::Completed => Some(Self::InProgress),
        }
    }

    /// Returns the lane reached by swiping in `direction`, if any.
    #[must_use]
    pub const fn swiped(self, direction: SwipeDirection) -> Option<Self> {
        match direction {
            SwipeDirection::Forward => self.advanced(),
            SwipeDirection::Backward => self.retreated(),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pendiente" => Ok(Self::Pending),
            "en_progreso" => Ok(Self::InProgress),
            "completado" => Ok(Self::Completed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Kind of board item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Actionable item with a status lane.
    #[default]
    Task,
    /// Free-form note without status semantics.
    Note,
}

impl TaskKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Note => "note",
        }
    }
}

/// Horizontal swipe gesture on a task card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwipeDirection {
    /// Towards completion.
    Forward,
    /// Back towards the to-do lane.
    Backward,
}
