//! Service layer for task creation, status changes, counters and edits.
//!
//! Every command follows the same shape: copy the task, apply the pure domain
//! transition, persist the copy, and only then hand it back. A failed write
//! therefore leaves the caller's copy untouched.

use crate::board::{
    domain::{
        BoardDomainError, CountAdjustment, NewTask, Task, TaskEdit, TaskId, TaskStatus,
        TransitionOutcome,
    },
    ports::{RepositoryError, TaskRepository},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] BoardDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Outcome of a status change request.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChangeResult {
    /// The task after the request.
    pub task: Task,
    /// The status the task ended in, which differs from the requested one
    /// when a counter task bounces.
    pub effective_status: TaskStatus,
    /// What the lifecycle rules did.
    pub outcome: TransitionOutcome,
}

/// Outcome of a counter adjustment.
#[derive(Debug, Clone, PartialEq)]
pub struct CountAdjustmentResult {
    /// The task after the adjustment.
    pub task: Task,
    /// What the counter rules did.
    pub adjustment: CountAdjustment,
}

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<C>
where
    C: Clock + Send + Sync,
{
    tasks: Arc<dyn TaskRepository>,
    clock: Arc<C>,
}

impl<C> TaskLifecycleService<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub fn new(tasks: Arc<dyn TaskRepository>, clock: Arc<C>) -> Self {
        Self { tasks, clock }
    }

    /// Creates and persists a task or note.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when validation fails, before
    /// anything is written, or [`TaskLifecycleError::Repository`] when the
    /// insert fails.
    pub async fn create(&self, new_task: NewTask) -> TaskLifecycleResult<Task> {
        let task = Task::new(new_task, &*self.clock)?;
        Ok(self.tasks.insert(&task).await?)
    }

    /// Requests a status change, applying counter gating.
    ///
    /// Requests that change nothing are answered without a store call.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for notes or
    /// [`TaskLifecycleError::Repository`] when the update fails.
    pub async fn change_status(
        &self,
        task: &Task,
        requested: TaskStatus,
    ) -> TaskLifecycleResult<StatusChangeResult> {
        let mut updated = task.clone();
        let outcome = updated.request_status_change(requested, &*self.clock)?;
        if outcome.is_change() {
            self.tasks.update(&updated).await?;
            tracing::debug!(
                task_id = %updated.id(),
                requested = %requested,
                effective = %updated.status(),
                count = updated.counter().current(),
                ?outcome,
                "task status changed"
            );
        }
        Ok(StatusChangeResult {
            effective_status: updated.status(),
            task: updated,
            outcome,
        })
    }

    /// Moves a task's repetition count by `delta`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for notes or
    /// [`TaskLifecycleError::Repository`] when the update fails.
    pub async fn adjust_count(
        &self,
        task: &Task,
        delta: i64,
    ) -> TaskLifecycleResult<CountAdjustmentResult> {
        let mut updated = task.clone();
        let adjustment = updated.adjust_count(delta, &*self.clock)?;
        if adjustment.is_change() {
            self.tasks.update(&updated).await?;
        }
        Ok(CountAdjustmentResult {
            task: updated,
            adjustment,
        })
    }

    /// Applies audited field edits.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for a blank title or
    /// [`TaskLifecycleError::Repository`] when the update fails.
    pub async fn edit(&self, task: &Task, edit: TaskEdit) -> TaskLifecycleResult<Task> {
        let mut updated = task.clone();
        let appended = updated.apply_edit(edit, &*self.clock)?;
        if appended > 0 {
            self.tasks.update(&updated).await?;
        }
        Ok(updated)
    }

    /// Persists a new column position.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the update fails.
    pub async fn reposition(&self, task: &Task, position: f64) -> TaskLifecycleResult<Task> {
        let mut updated = task.clone();
        updated.set_position(position);
        self.tasks.update(&updated).await?;
        Ok(updated)
    }

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the delete fails.
    pub async fn delete(&self, task_id: TaskId) -> TaskLifecycleResult<()> {
        Ok(self.tasks.delete(task_id).await?)
    }

    /// Seeds a creation entry into every task whose history is empty.
    ///
    /// One-time migration for tasks recorded before the audit trail existed.
    /// Returns the migrated tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when listing or an update
    /// fails; tasks migrated before the failure stay migrated.
    pub async fn backfill_history(&self) -> TaskLifecycleResult<Vec<Task>> {
        let pending = self.tasks.list_without_history().await?;
        let mut migrated = Vec::with_capacity(pending.len());
        for mut task in pending {
            task.backfill_history()?;
            self.tasks.update(&task).await?;
            migrated.push(task);
        }
        if !migrated.is_empty() {
            tracing::info!(count = migrated.len(), "backfilled task history");
        }
        Ok(migrated)
    }
}
