//! Habit creation and lazy daily instance generation.
//!
//! Generation has no scheduler behind it: it runs when a board is opened and
//! creates at most one instance per habit and calendar day. The
//! `last_generated_date` guard is the only protection against duplicates.

use crate::board::{
    domain::{BoardDomainError, BoardId, CategoryId, Habit, HabitId, NewHabit, Task},
    ports::{HabitRepository, RepositoryError, TaskRepository},
};
use crate::clock::today;
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for creating a habit and its first instance.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateHabitRequest {
    board_id: BoardId,
    category_id: CategoryId,
    title: String,
    description: String,
    due_date: Option<DateTime<Utc>>,
    duration_days: Option<u32>,
    interval: u32,
    target_count: u32,
    position: f64,
}

impl CreateHabitRequest {
    /// Creates a request with required fields.
    #[must_use]
    pub fn new(board_id: BoardId, category_id: CategoryId, title: impl Into<String>) -> Self {
        Self {
            board_id,
            category_id,
            title: title.into(),
            description: String::new(),
            due_date: None,
            duration_days: None,
            interval: 1,
            target_count: 1,
            position: 0.0,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the first instance's due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.due_date = due_date;
        self
    }

    /// Sets the habit lifetime; the configured default applies otherwise.
    #[must_use]
    pub const fn with_duration_days(mut self, duration_days: u32) -> Self {
        self.duration_days = Some(duration_days);
        self
    }

    /// Sets the number of days between generated instances.
    #[must_use]
    pub const fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the per-instance repetition target.
    #[must_use]
    pub const fn with_target_count(mut self, target_count: u32) -> Self {
        self.target_count = target_count;
        self
    }

    /// Sets the first instance's column position.
    #[must_use]
    pub const fn with_position(mut self, position: f64) -> Self {
        self.position = position;
        self
    }
}

/// Service-level errors for recurrence operations.
#[derive(Debug, Error)]
pub enum RecurrenceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] BoardDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    /// The habit was stored but its first instance was not.
    #[error("habit {habit_id} was created without its first instance: {source}")]
    HabitWithoutInstance {
        /// The stored habit.
        habit_id: HabitId,
        /// Why the instance insert failed.
        #[source]
        source: RepositoryError,
    },
}

/// Result type for recurrence service operations.
pub type RecurrenceResult<T> = Result<T, RecurrenceError>;

/// A habit together with the instance created alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedHabit {
    /// The stored habit.
    pub habit: Habit,
    /// Its first task instance.
    pub first_instance: Task,
}

/// What a generation pass did for one board and date.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    /// Calendar date generated for.
    pub date: NaiveDate,
    /// Instances inserted.
    pub generated: Vec<Task>,
    /// Habits whose `last_generated_date` now equals `date`.
    pub advanced: Vec<HabitId>,
    /// Habits whose instance was inserted but whose date update failed.
    pub not_advanced: Vec<HabitId>,
    /// Habits moved to completed because their window elapsed.
    pub retired: Vec<HabitId>,
}

impl GenerationReport {
    const fn new(date: NaiveDate) -> Self {
        Self {
            date,
            generated: Vec::new(),
            advanced: Vec::new(),
            not_advanced: Vec::new(),
            retired: Vec::new(),
        }
    }
}

/// Habit orchestration service.
#[derive(Clone)]
pub struct RecurrenceService<C>
where
    C: Clock + Send + Sync,
{
    tasks: Arc<dyn TaskRepository>,
    habits: Arc<dyn HabitRepository>,
    clock: Arc<C>,
    default_duration_days: u32,
}

impl<C> RecurrenceService<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a new recurrence service.
    #[must_use]
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        habits: Arc<dyn HabitRepository>,
        clock: Arc<C>,
        default_duration_days: u32,
    ) -> Self {
        Self {
            tasks,
            habits,
            clock,
            default_duration_days,
        }
    }

    /// Stores a habit, then its first instance.
    ///
    /// The two writes are independent. Both values are validated before
    /// either is written.
    ///
    /// # Errors
    ///
    /// Returns [`RecurrenceError::Domain`] when validation fails,
    /// [`RecurrenceError::Repository`] when the habit insert fails, or
    /// [`RecurrenceError::HabitWithoutInstance`] when only the habit was
    /// stored.
    pub async fn create_habit(
        &self,
        request: CreateHabitRequest,
    ) -> RecurrenceResult<CreatedHabit> {
        let new_habit = NewHabit::new(
            request.board_id,
            request.category_id,
            request.title,
            request.duration_days.unwrap_or(self.default_duration_days),
        )
        .with_description(request.description)
        .with_interval(request.interval)
        .with_target_count(request.target_count);
        let habit = Habit::new(new_habit, &*self.clock)?;
        let instance = habit.first_instance(request.due_date, request.position, &*self.clock)?;

        let habit = self.habits.insert(&habit).await?;
        let first_instance = self.tasks.insert(&instance).await.map_err(|source| {
            tracing::error!(
                habit_id = %habit.id(),
                error = %source,
                "habit stored without first instance"
            );
            RecurrenceError::HabitWithoutInstance {
                habit_id: habit.id(),
                source,
            }
        })?;

        Ok(CreatedHabit {
            habit,
            first_instance,
        })
    }

    /// Generates today's instances for every due habit on a board.
    ///
    /// Instances are inserted in one batch. Only after the batch succeeds is
    /// each habit's `last_generated_date` advanced, one update per habit;
    /// failed advances are reported, not retried. Habits whose window has
    /// elapsed are retired instead of generated.
    ///
    /// # Errors
    ///
    /// Returns [`RecurrenceError`] when listing habits or the batch insert
    /// fails; no habit is advanced in that case.
    pub async fn generate_for_board(
        &self,
        board_id: BoardId,
    ) -> RecurrenceResult<GenerationReport> {
        let date = today(&*self.clock);
        let mut report = GenerationReport::new(date);
        let (expired, due): (Vec<Habit>, Vec<Habit>) = self
            .habits
            .list_active_by_board(board_id)
            .await?
            .into_iter()
            .filter(|habit| habit.has_expired_on(date) || habit.is_due_on(date))
            .partition(|habit| habit.has_expired_on(date));

        report.retired = self.retire(expired).await;
        if due.is_empty() {
            return Ok(report);
        }

        let instances = due
            .iter()
            .map(|habit| habit.instantiate(&*self.clock))
            .collect::<Result<Vec<Task>, BoardDomainError>>()?;
        report.generated = self.tasks.insert_many(&instances).await.inspect_err(|err| {
            tracing::warn!(
                board_id = %board_id,
                %date,
                error = %err,
                "habit instance batch insert failed"
            );
        })?;

        for mut habit in due {
            habit.mark_generated(date);
            match self.habits.update(&habit).await {
                Ok(()) => report.advanced.push(habit.id()),
                Err(err) => {
                    tracing::warn!(
                        habit_id = %habit.id(),
                        %date,
                        error = %err,
                        "failed to advance habit generation date"
                    );
                    report.not_advanced.push(habit.id());
                }
            }
        }

        tracing::info!(
            board_id = %board_id,
            %date,
            generated = report.generated.len(),
            "generated habit instances"
        );
        Ok(report)
    }

    async fn retire(&self, expired: Vec<Habit>) -> Vec<HabitId> {
        let mut retired = Vec::with_capacity(expired.len());
        for mut habit in expired {
            habit.complete();
            match self.habits.update(&habit).await {
                Ok(()) => retired.push(habit.id()),
                Err(err) => tracing::warn!(
                    habit_id = %habit.id(),
                    error = %err,
                    "failed to retire expired habit"
                ),
            }
        }
        retired
    }
}
