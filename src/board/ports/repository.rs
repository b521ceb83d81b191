//! Repository ports for boards, categories, tasks and habit definitions.
//!
//! Each port mirrors one record collection of the backing store. Inserts
//! return the rows as stored; updates replace a record keyed by its id.

use crate::board::domain::{
    Board, BoardId, BoardSummary, Category, CategoryId, Habit, HabitId, Task, TaskId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Board persistence contract.
#[async_trait]
pub trait BoardRepository: Send + Sync {
    /// Stores a new board and returns it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Duplicate`] when the id already exists.
    async fn insert(&self, board: &Board) -> RepositoryResult<Board>;

    /// Replaces an existing board.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when the board does not exist.
    async fn update(&self, board: &Board) -> RepositoryResult<()>;

    /// Deletes a board together with its categories, tasks and habits.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when the board does not exist.
    async fn delete(&self, id: BoardId) -> RepositoryResult<()>;

    /// Lists boards ordered by creation timestamp, with child counts.
    async fn list_summaries(&self) -> RepositoryResult<Vec<BoardSummary>>;
}

/// Category persistence contract.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Stores a new category and returns it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when the board does not exist,
    /// or [`RepositoryError::Duplicate`] when the id already exists.
    async fn insert(&self, category: &Category) -> RepositoryResult<Category>;

    /// Replaces an existing category.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when the category does not exist.
    async fn update(&self, category: &Category) -> RepositoryResult<()>;

    /// Deletes a category together with its tasks.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when the category does not exist.
    async fn delete(&self, id: CategoryId) -> RepositoryResult<()>;

    /// Lists a board's categories ordered by position.
    async fn list_by_board(&self, board_id: BoardId) -> RepositoryResult<Vec<Category>>;
}

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task and returns it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when the category does not exist,
    /// or [`RepositoryError::Duplicate`] when the id already exists.
    async fn insert(&self, task: &Task) -> RepositoryResult<Task>;

    /// Stores several tasks in one operation; either all or none are stored.
    ///
    /// # Errors
    ///
    /// Same conditions as [`TaskRepository::insert`], for any of the tasks.
    async fn insert_many(&self, tasks: &[Task]) -> RepositoryResult<Vec<Task>>;

    /// Replaces an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when the task does not exist.
    async fn update(&self, task: &Task) -> RepositoryResult<()>;

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when the task does not exist.
    async fn delete(&self, id: TaskId) -> RepositoryResult<()>;

    /// Finds a task by identifier.
    async fn find_by_id(&self, id: TaskId) -> RepositoryResult<Option<Task>>;

    /// Lists a board's tasks ordered by position.
    async fn list_by_board(&self, board_id: BoardId) -> RepositoryResult<Vec<Task>>;

    /// Lists tasks whose audit trail is empty, across all boards.
    async fn list_without_history(&self) -> RepositoryResult<Vec<Task>>;
}

/// Habit definition persistence contract.
#[async_trait]
pub trait HabitRepository: Send + Sync {
    /// Stores a new habit and returns it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when the category does not exist,
    /// or [`RepositoryError::Duplicate`] when the id already exists.
    async fn insert(&self, habit: &Habit) -> RepositoryResult<Habit>;

    /// Replaces an existing habit.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when the habit does not exist.
    async fn update(&self, habit: &Habit) -> RepositoryResult<()>;

    /// Finds a habit by identifier.
    async fn find_by_id(&self, id: HabitId) -> RepositoryResult<Option<Habit>>;

    /// Lists a board's active habits.
    async fn list_active_by_board(&self, board_id: BoardId) -> RepositoryResult<Vec<Habit>>;
}

/// Errors returned by repository implementations.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// A record with the same identifier already exists.
    #[error("duplicate {entity} identifier: {id}")]
    Duplicate {
        /// Collection name.
        entity: &'static str,
        /// Offending identifier.
        id: String,
    },

    /// The record was not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Collection name.
        entity: &'static str,
        /// Missing identifier.
        id: String,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl RepositoryError {
    /// Builds a not-found error for `entity`.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Builds a duplicate-id error for `entity`.
    pub fn duplicate(entity: &'static str, id: impl ToString) -> Self {
        Self::Duplicate {
            entity,
            id: id.to_string(),
        }
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

/// The four collections the board services work against.
#[derive(Clone)]
pub struct KaiRepositories {
    /// Board collection.
    pub boards: Arc<dyn BoardRepository>,
    /// Category collection.
    pub categories: Arc<dyn CategoryRepository>,
    /// Task collection.
    pub tasks: Arc<dyn TaskRepository>,
    /// Habit definition collection.
    pub habits: Arc<dyn HabitRepository>,
}

impl KaiRepositories {
    /// Uses one store for every collection.
    #[must_use]
    pub fn from_store<S>(store: &Arc<S>) -> Self
    where
        S: BoardRepository + CategoryRepository + TaskRepository + HabitRepository + 'static,
    {
        Self {
            boards: store.clone(),
            categories: store.clone(),
            tasks: store.clone(),
            habits: store.clone(),
        }
    }
}
