//! Recurring habit definitions and their generation schedule.

use super::{BoardDomainError, BoardId, CategoryId, HabitId, NewTask, Task};
use chrono::{DateTime, Days, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a habit definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitStatus {
    /// Generates instances.
    Active,
    /// No longer generates instances.
    Completed,
}

impl HabitStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for HabitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repetition frequency. Only daily habits exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitFrequency {
    /// One instance per `interval` days.
    #[default]
    Daily,
}

/// Parameter object for creating a habit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHabit {
    /// Owning board.
    pub board_id: BoardId,
    /// Category receiving generated instances.
    pub category_id: CategoryId,
    /// Title copied to every instance.
    pub title: String,
    /// Description copied to every instance.
    pub description: String,
    /// Number of days the habit stays active.
    pub duration_days: u32,
    /// Repetitions required per instance.
    pub target_count: u32,
    /// Days between instances.
    pub interval: u32,
}

impl NewHabit {
    /// Creates a daily, single-repetition habit.
    #[must_use]
    pub fn new(
        board_id: BoardId,
        category_id: CategoryId,
        title: impl Into<String>,
        duration_days: u32,
    ) -> Self {
        Self {
            board_id,
            category_id,
            title: title.into(),
            description: String::new(),
            duration_days,
            target_count: 1,
            interval: 1,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the per-instance repetition target.
    #[must_use]
    pub const fn with_target_count(mut self, target_count: u32) -> Self {
        self.target_count = target_count;
        self
    }

    /// Sets the number of days between instances.
    #[must_use]
    pub const fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }
}

/// Template that spawns task instances on a daily schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    id: HabitId,
    board_id: BoardId,
    category_id: CategoryId,
    title: String,
    description: String,
    frequency: HabitFrequency,
    interval: u32,
    duration_days: u32,
    target_count: u32,
    start_date: NaiveDate,
    last_generated_date: Option<NaiveDate>,
    status: HabitStatus,
    created_at: DateTime<Utc>,
}

impl Habit {
    /// Creates an active habit starting today.
    ///
    /// Today counts as generated because the first instance is created
    /// together with the habit.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError`] for a blank title, a zero duration,
    /// interval or target count.
    pub fn new(new_habit: NewHabit, clock: &impl Clock) -> Result<Self, BoardDomainError> {
        let title = new_habit.title.trim();
        if title.is_empty() {
            return Err(BoardDomainError::EmptyTitle);
        }
        if new_habit.duration_days == 0 {
            return Err(BoardDomainError::InvalidDuration(new_habit.duration_days));
        }
        if new_habit.interval == 0 {
            return Err(BoardDomainError::InvalidInterval(new_habit.interval));
        }
        if new_habit.target_count == 0 {
            return Err(BoardDomainError::InvalidTargetCount(new_habit.target_count));
        }

        let created_at = clock.utc();
        let today = created_at.date_naive();
        Ok(Self {
            id: HabitId::new(),
            board_id: new_habit.board_id,
            category_id: new_habit.category_id,
            title: title.to_owned(),
            description: new_habit.description.trim().to_owned(),
            frequency: HabitFrequency::Daily,
            interval: new_habit.interval,
            duration_days: new_habit.duration_days,
            target_count: new_habit.target_count,
            start_date: today,
            last_generated_date: Some(today),
            status: HabitStatus::Active,
            created_at,
        })
    }

    /// Returns the habit identifier.
    #[must_use]
    pub const fn id(&self) -> HabitId {
        self.id
    }

    /// Returns the owning board.
    #[must_use]
    pub const fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Returns the category receiving instances.
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

    /// Returns the frequency.
    #[must_use]
    pub const fn frequency(&self) -> HabitFrequency {
        self.frequency
    }

    /// Returns the number of days between instances.
    #[must_use]
    pub const fn interval(&self) -> u32 {
        self.interval
    }

    /// Returns the lifetime in days.
    #[must_use]
    pub const fn duration_days(&self) -> u32 {
        self.duration_days
    }

    /// Returns the per-instance repetition target.
    #[must_use]
    pub const fn target_count(&self) -> u32 {
        self.target_count
    }

    /// Returns the first active day.
    #[must_use]
    pub const fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Returns the last date an instance was generated for.
    #[must_use]
    pub const fn last_generated_date(&self) -> Option<NaiveDate> {
        self.last_generated_date
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> HabitStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// First date on which the habit no longer runs.
    #[must_use]
    pub fn expires_on(&self) -> Option<NaiveDate> {
        self.start_date
            .checked_add_days(Days::new(u64::from(self.duration_days)))
    }

    /// Returns whether the habit's window has elapsed by `date`.
    #[must_use]
    pub fn has_expired_on(&self, date: NaiveDate) -> bool {
        self.expires_on().is_some_and(|end| date >= end)
    }

    /// Returns whether an instance should be generated for `date`.
    ///
    /// With the default one-day interval this is
    /// `last_generated_date < date`.
    #[must_use]
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        if self.status != HabitStatus::Active {
            return false;
        }
        self.last_generated_date.is_none_or(|last| {
            last.checked_add_days(Days::new(u64::from(self.interval)))
                .is_some_and(|next| date >= next)
        })
    }

    /// Builds the instance generated on a scheduled day.
    ///
    /// Generated instances start pending at the top of the column with no
    /// due date and a zero count.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError`] if the copied title or target count fails
    /// task validation.
    pub fn instantiate(&self, clock: &impl Clock) -> Result<Task, BoardDomainError> {
        Task::new(self.instance_template(), clock)
    }

    /// Builds the instance created together with the habit.
    ///
    /// Unlike scheduled instances it keeps the caller's due date and column
    /// position.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError`] if the copied title or target count fails
    /// task validation.
    pub fn first_instance(
        &self,
        due_date: Option<DateTime<Utc>>,
        position: f64,
        clock: &impl Clock,
    ) -> Result<Task, BoardDomainError> {
        let template = self
            .instance_template()
            .with_due_date(due_date)
            .with_position(position);
        Task::new(template, clock)
    }

    /// Records that the instance for `date` exists.
    pub const fn mark_generated(&mut self, date: NaiveDate) {
        self.last_generated_date = Some(date);
    }

    /// Stops further generation.
    pub const fn complete(&mut self) {
        self.status = HabitStatus::Completed;
    }

    fn instance_template(&self) -> NewTask {
        NewTask::new(self.board_id, self.category_id, self.title.clone())
            .with_description(self.description.clone())
            .with_target_count(self.target_count)
            .with_habit(self.id)
    }
}
