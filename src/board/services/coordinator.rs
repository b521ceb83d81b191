//! Board aggregate coordinator: the command surface driven by the UI.
//!
//! The coordinator owns the in-memory [`BoardProjection`]. Each command
//! validates against the projection, delegates to the lifecycle or recurrence
//! services, awaits the store, and applies the projection change only after
//! the write succeeded. Failures are logged and returned; nothing is retried.

use crate::board::{
    domain::{
        Board, BoardChanges, BoardDomainError, BoardId, BoardSummary, Category, CategoryId, NewTask,
        PositionSpacing, ReorderPlan, SwipeDirection, Task, TaskEdit, TaskId, TaskKind,
        TaskStatus, TransitionOutcome, plan_reorder,
    },
    ports::{KaiRepositories, RepositoryError},
    services::{
        BoardProjection, BoardView, CountAdjustmentResult, CreateHabitRequest, GenerationReport,
        RecurrenceError, RecurrenceService, StatusChangeResult, TaskLifecycleError,
        TaskLifecycleService,
    },
};
use crate::config::KaiConfig;
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Commands refused by product policy.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PolicyViolation {
    /// At least one board must always exist.
    #[error("the last remaining board cannot be deleted")]
    LastBoard,
    /// Reordering is limited to tasks sharing a category and a status.
    #[error("task {moved} cannot be dropped onto task {target} in another lane")]
    CrossLaneReorder {
        /// Task being dragged.
        moved: TaskId,
        /// Task it was dropped onto.
        target: TaskId,
    },
}

/// Coordinator-level errors.
#[derive(Debug, Error)]
pub enum BoardCoordinatorError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] BoardDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    /// Task lifecycle operation failed.
    #[error(transparent)]
    Lifecycle(#[from] TaskLifecycleError),
    /// Habit operation failed.
    #[error(transparent)]
    Recurrence(#[from] RecurrenceError),
    /// The command was refused by policy.
    #[error(transparent)]
    Policy(#[from] PolicyViolation),
    /// The command needs an open board.
    #[error("no board is open")]
    NoOpenBoard,
    /// The board is not in the board list.
    #[error("board {0} not found")]
    BoardNotFound(BoardId),
    /// The category is not on the open board.
    #[error("category {0} not found on the open board")]
    CategoryNotFound(CategoryId),
    /// The task is not on the open board.
    #[error("task {0} not found on the open board")]
    TaskNotFound(TaskId),
}

impl BoardCoordinatorError {
    /// Returns whether the error came from the store rather than from
    /// validation or policy.
    #[must_use]
    pub const fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Self::Repository(_)
                | Self::Lifecycle(TaskLifecycleError::Repository(_))
                | Self::Recurrence(
                    RecurrenceError::Repository(_) | RecurrenceError::HabitWithoutInstance { .. }
                )
        )
    }
}

/// Result type for coordinator commands.
pub type BoardCoordinatorResult<T> = Result<T, BoardCoordinatorError>;

/// Tunables the coordinator reads from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardSettings {
    /// Lane position spacing.
    pub spacing: PositionSpacing,
    /// Habit lifetime used when a request does not give one.
    pub default_habit_duration_days: u32,
}

impl BoardSettings {
    /// Reads settings from loaded configuration.
    #[must_use]
    pub const fn from_config(config: &KaiConfig) -> Self {
        Self {
            spacing: PositionSpacing::new(config.board.reorder_gap, config.board.min_position_gap),
            default_habit_duration_days: config.habits.default_duration_days,
        }
    }
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self::from_config(&KaiConfig::default())
    }
}

/// Makes a new task a habit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Recurrence {
    duration_days: Option<u32>,
    interval_days: Option<u32>,
}

impl Recurrence {
    /// Daily habit lasting the configured default number of days.
    #[must_use]
    pub const fn daily() -> Self {
        Self {
            duration_days: None,
            interval_days: None,
        }
    }

    /// Daily habit lasting `duration_days`.
    #[must_use]
    pub const fn for_days(duration_days: u32) -> Self {
        Self {
            duration_days: Some(duration_days),
            interval_days: None,
        }
    }

    /// Generates one instance every `interval_days` days instead of daily.
    #[must_use]
    pub const fn every(mut self, interval_days: u32) -> Self {
        self.interval_days = Some(interval_days);
        self
    }
}

/// Request payload for adding a task or note to the open board.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTaskRequest {
    category_id: CategoryId,
    title: String,
    description: String,
    kind: TaskKind,
    due_date: Option<DateTime<Utc>>,
    target_count: u32,
    recurrence: Option<Recurrence>,
}

impl CreateTaskRequest {
    /// Creates a request for a plain task.
    #[must_use]
    pub fn new(category_id: CategoryId, title: impl Into<String>) -> Self {
        Self {
            category_id,
            title: title.into(),
            description: String::new(),
            kind: TaskKind::Task,
            due_date: None,
            target_count: 1,
            recurrence: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Creates a note instead of a task.
    #[must_use]
    pub const fn as_note(mut self) -> Self {
        self.kind = TaskKind::Note;
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the repetition target.
    #[must_use]
    pub const fn with_target_count(mut self, target_count: u32) -> Self {
        self.target_count = target_count;
        self
    }

    /// Makes the task a habit; habits are always task-kind.
    #[must_use]
    pub const fn recurring(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = Some(recurrence);
        self
    }
}

/// Read/write façade over boards, categories, tasks and habits.
pub struct BoardCoordinator<C>
where
    C: Clock + Send + Sync,
{
    repositories: KaiRepositories,
    lifecycle: TaskLifecycleService<C>,
    recurrence: RecurrenceService<C>,
    clock: Arc<C>,
    settings: BoardSettings,
    projection: BoardProjection,
}

impl<C> BoardCoordinator<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a coordinator with an empty projection.
    #[must_use]
    pub fn new(repositories: KaiRepositories, clock: Arc<C>, settings: BoardSettings) -> Self {
        let lifecycle = TaskLifecycleService::new(repositories.tasks.clone(), clock.clone());
        let recurrence = RecurrenceService::new(
            repositories.tasks.clone(),
            repositories.habits.clone(),
            clock.clone(),
            settings.default_habit_duration_days,
        );
        Self {
            repositories,
            lifecycle,
            recurrence,
            clock,
            settings,
            projection: BoardProjection::default(),
        }
    }

    /// Returns the current projection.
    #[must_use]
    pub const fn projection(&self) -> &BoardProjection {
        &self.projection
    }

    /// Returns the open board view.
    #[must_use]
    pub const fn open_board(&self) -> Option<&BoardView> {
        self.projection.open_board()
    }

    /// Reloads the board list with category and task counts.
    ///
    /// # Errors
    ///
    /// Returns [`BoardCoordinatorError::Repository`] when the store fails.
    pub async fn load_boards(&mut self) -> BoardCoordinatorResult<()> {
        let boards = logged("load boards", self.repositories.boards.list_summaries().await)?;
        self.projection.set_boards(boards);
        Ok(())
    }

    /// Opens a board: loads its categories and tasks, then generates due
    /// habit instances.
    ///
    /// Generation failures do not fail the command; they are logged and the
    /// next open retries. Returns the generation report when generation ran.
    ///
    /// # Errors
    ///
    /// Returns [`BoardCoordinatorError::BoardNotFound`] for unknown boards or
    /// [`BoardCoordinatorError::Repository`] when loading fails.
    pub async fn select_board(
        &mut self,
        board_id: BoardId,
    ) -> BoardCoordinatorResult<Option<GenerationReport>> {
        if self.projection.board(board_id).is_none() {
            self.load_boards().await?;
        }
        if self.projection.board(board_id).is_none() {
            return Err(BoardCoordinatorError::BoardNotFound(board_id));
        }

        let categories = logged(
            "load categories",
            self.repositories.categories.list_by_board(board_id).await,
        )?;
        let tasks = logged(
            "load tasks",
            self.repositories.tasks.list_by_board(board_id).await,
        )?;
        self.projection
            .open(BoardView::new(board_id, categories, tasks));
        tracing::info!(board_id = %board_id, "board opened");

        match self.recurrence.generate_for_board(board_id).await {
            Ok(report) => {
                self.projection.insert_tasks(report.generated.iter().cloned());
                Ok(Some(report))
            }
            Err(err) => {
                tracing::warn!(
                    board_id = %board_id,
                    error = %err,
                    "habit generation failed; retrying on next open"
                );
                Ok(None)
            }
        }
    }

    /// Closes the open board and refreshes the board list counts.
    ///
    /// # Errors
    ///
    /// Returns [`BoardCoordinatorError::Repository`] when reloading fails;
    /// the board is closed regardless.
    pub async fn close_board(&mut self) -> BoardCoordinatorResult<()> {
        self.projection.close();
        self.load_boards().await
    }

    /// Creates a board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardCoordinatorError::Domain`] for a blank name or
    /// [`BoardCoordinatorError::Repository`] when the insert fails.
    pub async fn create_board(
        &mut self,
        name: &str,
        description: &str,
    ) -> BoardCoordinatorResult<Board> {
        let board = logged("create board", Board::new(name, description, &*self.clock))?;
        let stored = logged("create board", self.repositories.boards.insert(&board).await)?;
        self.projection.add_board(BoardSummary::empty(stored.clone()));
        Ok(stored)
    }

    /// Renames a board or changes its description.
    ///
    /// # Errors
    ///
    /// Returns [`BoardCoordinatorError::BoardNotFound`],
    /// [`BoardCoordinatorError::Domain`] for a blank name, or
    /// [`BoardCoordinatorError::Repository`] when the update fails.
    pub async fn update_board(
        &mut self,
        board_id: BoardId,
        changes: BoardChanges,
    ) -> BoardCoordinatorResult<Board> {
        let mut board = self
            .projection
            .board(board_id)
            .map(|summary| summary.board.clone())
            .ok_or(BoardCoordinatorError::BoardNotFound(board_id))?;
        logged("update board", board.apply(changes))?;
        logged("update board", self.repositories.boards.update(&board).await)?;
        self.projection.replace_board(board.clone());
        Ok(board)
    }

    /// Deletes a board with its categories, tasks and habits.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyViolation::LastBoard`] when it is the only board,
    /// [`BoardCoordinatorError::BoardNotFound`], or
    /// [`BoardCoordinatorError::Repository`] when the delete fails.
    pub async fn delete_board(&mut self, board_id: BoardId) -> BoardCoordinatorResult<()> {
        if self.projection.board(board_id).is_none() {
            return Err(BoardCoordinatorError::BoardNotFound(board_id));
        }
        if self.projection.boards().len() <= 1 {
            return logged("delete board", Err(PolicyViolation::LastBoard));
        }
        logged("delete board", self.repositories.boards.delete(board_id).await)?;
        self.projection.remove_board(board_id);
        Ok(())
    }

    /// Adds a category at the end of the open board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardCoordinatorError::NoOpenBoard`],
    /// [`BoardCoordinatorError::Domain`] for a blank name, or
    /// [`BoardCoordinatorError::Repository`] when the insert fails.
    pub async fn create_category(&mut self, name: &str) -> BoardCoordinatorResult<Category> {
        let view = self.view()?;
        let position = u32::try_from(view.categories().len()).unwrap_or(u32::MAX);
        let category = logged("create category", Category::new(view.board_id(), name, position))?;
        let stored = logged(
            "create category",
            self.repositories.categories.insert(&category).await,
        )?;
        self.projection.insert_category(stored.clone());
        Ok(stored)
    }

    /// Renames a category on the open board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardCoordinatorError::CategoryNotFound`],
    /// [`BoardCoordinatorError::Domain`] for a blank name, or
    /// [`BoardCoordinatorError::Repository`] when the update fails.
    pub async fn rename_category(
        &mut self,
        category_id: CategoryId,
        name: &str,
    ) -> BoardCoordinatorResult<Category> {
        let mut category = self.category(category_id)?.clone();
        logged("rename category", category.rename(name))?;
        logged(
            "rename category",
            self.repositories.categories.update(&category).await,
        )?;
        self.projection.replace_category(category.clone());
        Ok(category)
    }

    /// Deletes a category and its tasks.
    ///
    /// # Errors
    ///
    /// Returns [`BoardCoordinatorError::CategoryNotFound`] or
    /// [`BoardCoordinatorError::Repository`] when the delete fails.
    pub async fn delete_category(&mut self, category_id: CategoryId) -> BoardCoordinatorResult<()> {
        self.category(category_id)?;
        logged(
            "delete category",
            self.repositories.categories.delete(category_id).await,
        )?;
        self.projection.remove_category(category_id);
        Ok(())
    }

    /// Adds a task, note or habit to a category of the open board.
    ///
    /// Plain items go to the end of the column. A recurring request stores
    /// the habit first and then its first instance.
    ///
    /// # Errors
    ///
    /// Returns [`BoardCoordinatorError::CategoryNotFound`], validation
    /// errors, or store errors; a habit stored without its instance is
    /// reported as [`RecurrenceError::HabitWithoutInstance`].
    pub async fn create_task(
        &mut self,
        request: CreateTaskRequest,
    ) -> BoardCoordinatorResult<Task> {
        let category = self.category(request.category_id)?;
        let board_id = category.board_id();
        let count = self.view()?.task_count(request.category_id);
        let position = f64::from(u32::try_from(count).unwrap_or(u32::MAX));

        let task = if let Some(recurrence) = request.recurrence {
            let mut habit_request =
                CreateHabitRequest::new(board_id, request.category_id, request.title)
                    .with_description(request.description)
                    .with_due_date(request.due_date)
                    .with_target_count(request.target_count)
                    .with_position(position);
            if let Some(days) = recurrence.duration_days {
                habit_request = habit_request.with_duration_days(days);
            }
            if let Some(days) = recurrence.interval_days {
                habit_request = habit_request.with_interval(days);
            }
            logged("create habit", self.recurrence.create_habit(habit_request).await)?
                .first_instance
        } else {
            let new_task = NewTask::new(board_id, request.category_id, request.title)
                .with_description(request.description)
                .with_kind(request.kind)
                .with_due_date(request.due_date)
                .with_target_count(request.target_count)
                .with_position(position);
            logged("create task", self.lifecycle.create(new_task).await)?
        };

        self.projection.insert_tasks([task.clone()]);
        Ok(task)
    }

    /// Edits a task's title, description or due date.
    ///
    /// # Errors
    ///
    /// Returns [`BoardCoordinatorError::TaskNotFound`], validation errors, or
    /// store errors.
    pub async fn edit_task(
        &mut self,
        task_id: TaskId,
        edit: TaskEdit,
    ) -> BoardCoordinatorResult<Task> {
        let task = self.task(task_id)?;
        let updated = logged("edit task", self.lifecycle.edit(task, edit).await)?;
        self.projection.replace_task(updated.clone());
        Ok(updated)
    }

    /// Deletes a task or note.
    ///
    /// # Errors
    ///
    /// Returns [`BoardCoordinatorError::TaskNotFound`] or store errors.
    pub async fn delete_task(&mut self, task_id: TaskId) -> BoardCoordinatorResult<()> {
        self.task(task_id)?;
        logged("delete task", self.lifecycle.delete(task_id).await)?;
        self.projection.remove_task(task_id);
        Ok(())
    }

    /// Requests a status change, with counter gating.
    ///
    /// # Errors
    ///
    /// Returns [`BoardCoordinatorError::TaskNotFound`], a domain error for
    /// notes, or store errors.
    pub async fn change_task_status(
        &mut self,
        task_id: TaskId,
        requested: TaskStatus,
    ) -> BoardCoordinatorResult<StatusChangeResult> {
        let task = self.task(task_id)?;
        let result = logged(
            "change task status",
            self.lifecycle.change_status(task, requested).await,
        )?;
        if result.outcome.is_change() {
            self.projection.replace_task(result.task.clone());
        }
        Ok(result)
    }

    /// Moves a task one lane forward or back; past either end nothing
    /// happens.
    ///
    /// # Errors
    ///
    /// Same as [`BoardCoordinator::change_task_status`].
    pub async fn swipe_task(
        &mut self,
        task_id: TaskId,
        direction: SwipeDirection,
    ) -> BoardCoordinatorResult<StatusChangeResult> {
        let task = self.task(task_id)?;
        match task.status().swiped(direction) {
            Some(requested) => self.change_task_status(task_id, requested).await,
            None => Ok(StatusChangeResult {
                effective_status: task.status(),
                task: task.clone(),
                outcome: TransitionOutcome::Unchanged,
            }),
        }
    }

    /// Moves a task's repetition count by `delta`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardCoordinatorError::TaskNotFound`], a domain error for
    /// notes, or store errors.
    pub async fn increment_task_count(
        &mut self,
        task_id: TaskId,
        delta: i64,
    ) -> BoardCoordinatorResult<CountAdjustmentResult> {
        let task = self.task(task_id)?;
        let result = logged(
            "increment task count",
            self.lifecycle.adjust_count(task, delta).await,
        )?;
        if result.adjustment.is_change() {
            self.projection.replace_task(result.task.clone());
        }
        Ok(result)
    }

    /// Drops `moved` onto the slot held by `target` in the same lane.
    ///
    /// Returns the tasks whose positions were written, which is empty when
    /// the task is dropped onto itself.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyViolation::CrossLaneReorder`] when the tasks differ in
    /// category or status, [`BoardCoordinatorError::TaskNotFound`], or store
    /// errors. Positions written before a store failure are kept.
    pub async fn reorder_task(
        &mut self,
        moved: TaskId,
        target: TaskId,
    ) -> BoardCoordinatorResult<Vec<Task>> {
        let moved_task = self.task(moved)?;
        let target_task = self.task(target)?;
        if moved_task.status() != target_task.status()
            || moved_task.category_id() != target_task.category_id()
        {
            return logged(
                "reorder task",
                Err(PolicyViolation::CrossLaneReorder { moved, target }),
            );
        }

        let lane = self
            .view()?
            .lane_slots(moved_task.category_id(), moved_task.status());
        let writes = match plan_reorder(&lane, moved, target, self.settings.spacing) {
            None => Vec::new(),
            Some(ReorderPlan::Move { task_id, position }) => vec![(task_id, position)],
            Some(ReorderPlan::Renumber(slots)) => {
                tracing::debug!(
                    category_id = %moved_task.category_id(),
                    "renumbering lane positions"
                );
                slots
                    .into_iter()
                    .map(|slot| (slot.task_id, slot.position))
                    .collect()
            }
        };

        let mut updated = Vec::with_capacity(writes.len());
        for (task_id, position) in writes {
            let task = self.task(task_id)?;
            let repositioned = logged(
                "reorder task",
                self.lifecycle.reposition(task, position).await,
            )?;
            self.projection.replace_task(repositioned.clone());
            updated.push(repositioned);
        }
        Ok(updated)
    }

    /// Runs the one-time history backfill and refreshes migrated tasks on
    /// the open board.
    ///
    /// # Errors
    ///
    /// Returns store errors; tasks migrated before the failure stay migrated.
    pub async fn backfill_history(&mut self) -> BoardCoordinatorResult<usize> {
        let migrated = logged("backfill history", self.lifecycle.backfill_history().await)?;
        let count = migrated.len();
        for task in migrated {
            self.projection.replace_task(task);
        }
        Ok(count)
    }

    fn view(&self) -> BoardCoordinatorResult<&BoardView> {
        self.projection
            .open_board()
            .ok_or(BoardCoordinatorError::NoOpenBoard)
    }

    fn category(&self, category_id: CategoryId) -> BoardCoordinatorResult<&Category> {
        self.view()?
            .category(category_id)
            .ok_or(BoardCoordinatorError::CategoryNotFound(category_id))
    }

    fn task(&self, task_id: TaskId) -> BoardCoordinatorResult<&Task> {
        self.view()?
            .task(task_id)
            .ok_or(BoardCoordinatorError::TaskNotFound(task_id))
    }
}

/// Converts a step result and logs it on failure.
///
/// Store failures are logged as errors; validation and policy rejections at
/// debug level.
fn logged<T, E>(operation: &'static str, result: Result<T, E>) -> BoardCoordinatorResult<T>
where
    E: Into<BoardCoordinatorError>,
{
    result.map_err(Into::into).inspect_err(|err| {
        if err.is_store_failure() {
            tracing::error!(operation, error = %err, "board store operation failed");
        } else {
            tracing::debug!(operation, error = %err, "board command rejected");
        }
    })
}
