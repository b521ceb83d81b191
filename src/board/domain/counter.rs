//! Repetition counter carried by every task.

use super::{BoardDomainError, TaskStatus};
use serde::{Deserialize, Serialize};

/// Progress towards a task's target repetition count.
///
/// Only tasks with a target above one are "counter tasks"; for the rest the
/// current count is cosmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskCounter {
    #[serde(rename = "target_count", default = "single_target")]
    target: u32,
    #[serde(rename = "current_count", default)]
    current: u32,
}

const fn single_target() -> u32 {
    1
}

impl TaskCounter {
    /// Counter of a plain single-repetition task.
    pub const SINGLE: Self = Self {
        target: 1,
        current: 0,
    };

    /// Creates a fresh counter with a validated target.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::InvalidTargetCount`] when `target` is zero.
    pub const fn new(target: u32) -> Result<Self, BoardDomainError> {
        if target == 0 {
            return Err(BoardDomainError::InvalidTargetCount(target));
        }
        Ok(Self { target, current: 0 })
    }

    /// Rebuilds a counter from stored values.
    ///
    /// A missing or zero target is read as one.
    #[must_use]
    pub fn from_persisted(target: Option<u32>, current: Option<u32>) -> Self {
        Self {
            target: target.filter(|value| *value > 0).unwrap_or(1),
            current: current.unwrap_or_default(),
        }
    }

    /// Returns the number of repetitions required.
    #[must_use]
    pub const fn target(self) -> u32 {
        self.target
    }

    /// Returns the repetitions performed so far.
    #[must_use]
    pub const fn current(self) -> u32 {
        self.current
    }

    /// Returns whether the task needs more than one repetition.
    #[must_use]
    pub const fn is_counter(self) -> bool {
        self.target > 1
    }

    /// Returns whether the target has been reached.
    #[must_use]
    pub const fn is_satisfied(self) -> bool {
        self.current >= self.target
    }

    /// Returns the counter after one more repetition.
    #[must_use]
    pub const fn consumed(self) -> Self {
        Self {
            target: self.target,
            current: self.current.saturating_add(1),
        }
    }

    /// Returns the counter moved by `delta`, or `None` when it would go
    /// negative.
    #[must_use]
    pub fn offset(self, delta: i64) -> Option<Self> {
        let moved = i64::from(self.current).checked_add(delta)?;
        let current = u32::try_from(moved).ok()?;
        Some(Self {
            target: self.target,
            current,
        })
    }

    /// Status implied by the count alone.
    #[must_use]
    pub const fn derived_status(self) -> TaskStatus {
        if self.is_satisfied() {
            TaskStatus::Completed
        } else if self.current == 0 {
            TaskStatus::Pending
        } else {
            TaskStatus::InProgress
        }
    }
}

impl Default for TaskCounter {
    fn default() -> Self {
        Self::SINGLE
    }
}
