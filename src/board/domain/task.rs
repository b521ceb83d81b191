//! Task aggregate root and its lifecycle rules.
//!
//! The task owns its status, repetition counter and audit history. Every
//! status mutation appends exactly one status-change entry; every edited
//! title, description or due date appends one field-edit entry. Operations
//! that change nothing append nothing.

use super::{
    BoardDomainError, BoardId, CategoryId, DueUrgency, EditedField, HabitId, StatusHistory,
    TaskCounter, TaskId, TaskKind, TaskStatus,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::mem;

/// Result of a status change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionOutcome {
    /// The task already had the requested status; nothing was recorded.
    Unchanged,
    /// The requested status was applied directly.
    Applied,
    /// A counter repetition was consumed and the task reached its target.
    CounterCompleted,
    /// A counter repetition was consumed but the target is still ahead, so
    /// the task went back to pending.
    Bounced,
}

impl TransitionOutcome {
    /// Returns whether the task was mutated.
    #[must_use]
    pub const fn is_change(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Result of a counter adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountAdjustment {
    /// Zero delta, or a delta that would make the count negative.
    NoOp,
    /// The count moved.
    Adjusted {
        /// Whether the derived status differed from the previous one.
        status_changed: bool,
    },
}

impl CountAdjustment {
    /// Returns whether the task was mutated.
    #[must_use]
    pub const fn is_change(self) -> bool {
        matches!(self, Self::Adjusted { .. })
    }
}

/// Parameter object for creating a task or note.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    /// Owning board.
    pub board_id: BoardId,
    /// Owning category.
    pub category_id: CategoryId,
    /// Title; must not be blank.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Task or note.
    pub kind: TaskKind,
    /// Optional deadline.
    pub due_date: Option<DateTime<Utc>>,
    /// Repetitions required before completion.
    pub target_count: u32,
    /// Habit this task was generated from.
    pub recurring_task_id: Option<HabitId>,
    /// Sort key within the column.
    pub position: f64,
}

impl NewTask {
    /// Creates a single-repetition task with no deadline at position zero.
    #[must_use]
    pub fn new(board_id: BoardId, category_id: CategoryId, title: impl Into<String>) -> Self {
        Self {
            board_id,
            category_id,
            title: title.into(),
            description: String::new(),
            kind: TaskKind::Task,
            due_date: None,
            target_count: 1,
            recurring_task_id: None,
            position: 0.0,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: TaskKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.due_date = due_date;
        self
    }

    /// Sets the target repetition count.
    #[must_use]
    pub const fn with_target_count(mut self, target_count: u32) -> Self {
        self.target_count = target_count;
        self
    }

    /// Links the task to the habit it was generated from.
    #[must_use]
    pub const fn with_habit(mut self, habit_id: HabitId) -> Self {
        self.recurring_task_id = Some(habit_id);
        self
    }

    /// Sets the position within the column.
    #[must_use]
    pub const fn with_position(mut self, position: f64) -> Self {
        self.position = position;
        self
    }
}

/// Partial edit of the audited task fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    /// New title, if editing it.
    pub title: Option<String>,
    /// New description, if editing it.
    pub description: Option<String>,
    /// New due date (`Some(None)` clears it), if editing it.
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TaskEdit {
    /// Sets the new title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the new description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets or clears the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedTaskData {
    /// Persisted identifier.
    pub id: TaskId,
    /// Persisted board reference.
    pub board_id: BoardId,
    /// Persisted category reference.
    pub category_id: CategoryId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: String,
    /// Persisted kind.
    pub kind: TaskKind,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted column position.
    pub position: f64,
    /// Persisted due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Persisted habit reference.
    pub recurring_task_id: Option<HabitId>,
    /// Persisted counter.
    pub counter: TaskCounter,
    /// Persisted audit trail.
    pub status_history: StatusHistory,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    board_id: BoardId,
    category_id: CategoryId,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "type", default)]
    kind: TaskKind,
    #[serde(default)]
    status: TaskStatus,
    position: f64,
    due_date: Option<DateTime<Utc>>,
    recurring_task_id: Option<HabitId>,
    #[serde(flatten)]
    counter: TaskCounter,
    #[serde(default)]
    status_history: StatusHistory,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a pending task with its creation history entry.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyTitle`] for a blank title or
    /// [`BoardDomainError::InvalidTargetCount`] for a zero target.
    pub fn new(new_task: NewTask, clock: &impl Clock) -> Result<Self, BoardDomainError> {
        let title = validated_title(&new_task.title)?;
        let counter = TaskCounter::new(new_task.target_count)?;
        let timestamp = clock.utc();
        let status = TaskStatus::Pending;

        Ok(Self {
            id: TaskId::new(),
            board_id: new_task.board_id,
            category_id: new_task.category_id,
            title,
            description: new_task.description.trim().to_owned(),
            kind: new_task.kind,
            status,
            position: new_task.position,
            due_date: new_task.due_date,
            recurring_task_id: new_task.recurring_task_id,
            counter,
            status_history: StatusHistory::created(status, timestamp),
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            board_id: data.board_id,
            category_id: data.category_id,
            title: data.title,
            description: data.description,
            kind: data.kind,
            status: data.status,
            position: data.position,
            due_date: data.due_date,
            recurring_task_id: data.recurring_task_id,
            counter: data.counter,
            status_history: data.status_history,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning board.
    #[must_use]
    pub const fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Returns the owning category.
    #[must_use]
    pub const fn category_id(&self) -> CategoryId {
        self.category_id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the kind.
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the position within the column.
    #[must_use]
    pub const fn position(&self) -> f64 {
        self.position
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the habit this task was generated from, if any.
    #[must_use]
    pub const fn recurring_task_id(&self) -> Option<HabitId> {
        self.recurring_task_id
    }

    /// Returns the repetition counter.
    #[must_use]
    pub const fn counter(&self) -> TaskCounter {
        self.counter
    }

    /// Returns the audit trail.
    #[must_use]
    pub const fn status_history(&self) -> &StatusHistory {
        &self.status_history
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Buckets the due date relative to `now`; `None` without a due date.
    #[must_use]
    pub fn urgency(&self, now: DateTime<Utc>) -> Option<DueUrgency> {
        self.due_date.map(|due| DueUrgency::classify(due, now))
    }

    /// Requests a move to `requested`, applying counter gating.
    ///
    /// Counter tasks short of their target consume one repetition when moved
    /// to [`TaskStatus::Completed`]; they complete only if that repetition
    /// reaches the target and otherwise go back to [`TaskStatus::Pending`].
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::NoteHasNoStatus`] for notes.
    pub fn request_status_change(
        &mut self,
        requested: TaskStatus,
        clock: &impl Clock,
    ) -> Result<TransitionOutcome, BoardDomainError> {
        self.ensure_has_status()?;
        if requested == self.status {
            return Ok(TransitionOutcome::Unchanged);
        }

        let gated = requested == TaskStatus::Completed
            && self.counter.is_counter()
            && !self.counter.is_satisfied();
        if !gated {
            self.record_status(requested, clock);
            return Ok(TransitionOutcome::Applied);
        }

        self.counter = self.counter.consumed();
        if self.counter.is_satisfied() {
            self.record_status(TaskStatus::Completed, clock);
            Ok(TransitionOutcome::CounterCompleted)
        } else {
            self.record_status(TaskStatus::Pending, clock);
            Ok(TransitionOutcome::Bounced)
        }
    }

    /// Moves the repetition count by `delta` and re-derives the status.
    ///
    /// A delta that would make the count negative leaves the task untouched.
    /// A history entry is appended only when the derived status differs from
    /// the current one.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::NoteHasNoStatus`] for notes.
    pub fn adjust_count(
        &mut self,
        delta: i64,
        clock: &impl Clock,
    ) -> Result<CountAdjustment, BoardDomainError> {
        self.ensure_has_status()?;
        if delta == 0 {
            return Ok(CountAdjustment::NoOp);
        }
        let Some(counter) = self.counter.offset(delta) else {
            return Ok(CountAdjustment::NoOp);
        };

        self.counter = counter;
        let derived = counter.derived_status();
        let status_changed = derived != self.status;
        if status_changed {
            self.record_status(derived, clock);
        } else {
            self.touch(clock);
        }
        Ok(CountAdjustment::Adjusted { status_changed })
    }

    /// Applies title, description and due date edits.
    ///
    /// Returns the number of history entries appended, one per field whose
    /// value actually changed.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyTitle`] for a blank title; nothing is
    /// changed in that case.
    pub fn apply_edit(
        &mut self,
        edit: TaskEdit,
        clock: &impl Clock,
    ) -> Result<usize, BoardDomainError> {
        let title = edit.title.as_deref().map(validated_title).transpose()?;
        let now = clock.utc();
        let before = self.status_history.len();
        let mut history = mem::take(&mut self.status_history);

        if let Some(new_title) = title.filter(|value| *value != self.title) {
            let old_title = mem::replace(&mut self.title, new_title.clone());
            history = history.with_field_edit(
                EditedField::Title,
                Some(old_title),
                Some(new_title),
                now,
            );
        }
        if let Some(new_description) = edit
            .description
            .map(|value| value.trim().to_owned())
            .filter(|value| *value != self.description)
        {
            let old_description = mem::replace(&mut self.description, new_description.clone());
            history = history.with_field_edit(
                EditedField::Description,
                Some(old_description),
                Some(new_description),
                now,
            );
        }
        if let Some(new_due) = edit.due_date.filter(|value| *value != self.due_date) {
            let old_due = mem::replace(&mut self.due_date, new_due);
            history = history.with_field_edit(
                EditedField::DueDate,
                old_due.map(|due| due.to_rfc3339()),
                new_due.map(|due| due.to_rfc3339()),
                now,
            );
        }

        self.status_history = history;
        let appended = self.status_history.len() - before;
        if appended > 0 {
            self.updated_at = now;
        }
        Ok(appended)
    }

    /// Moves the task within its column.
    pub const fn set_position(&mut self, position: f64) {
        self.position = position;
    }

    /// Seeds an empty history with a creation entry dated at `created_at`.
    ///
    /// Used once when migrating tasks recorded before the audit trail
    /// existed.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::HistoryAlreadyPresent`] when the history
    /// is not empty.
    pub fn backfill_history(&mut self) -> Result<(), BoardDomainError> {
        if !self.status_history.is_empty() {
            return Err(BoardDomainError::HistoryAlreadyPresent {
                task_id: self.id,
                entries: self.status_history.len(),
            });
        }
        self.status_history = StatusHistory::created(self.status, self.created_at);
        Ok(())
    }

    const fn ensure_has_status(&self) -> Result<(), BoardDomainError> {
        match self.kind {
            TaskKind::Task => Ok(()),
            TaskKind::Note => Err(BoardDomainError::NoteHasNoStatus(self.id)),
        }
    }

    fn record_status(&mut self, status: TaskStatus, clock: &impl Clock) {
        let now = clock.utc();
        self.status_history =
            mem::take(&mut self.status_history).with_status_change(status, Some(self.status), now);
        self.status = status;
        self.updated_at = now;
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

/// Trims a title and rejects it when nothing is left.
fn validated_title(value: &str) -> Result<String, BoardDomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BoardDomainError::EmptyTitle);
    }
    Ok(trimmed.to_owned())
}
