//! Thread-safe in-memory record store.
//!
//! Mirrors the relational store's foreign keys: children cannot be inserted
//! under a missing parent, and deletes cascade from boards to categories,
//! tasks and habits, and from categories to tasks and habits.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::board::{
    domain::{
        Board, BoardId, BoardSummary, Category, CategoryId, Habit, HabitId, HabitStatus, Task,
        TaskId,
    },
    ports::{
        BoardRepository, CategoryRepository, HabitRepository, RepositoryError, RepositoryResult,
        TaskRepository,
    },
};

const BOARD: &str = "board";
const CATEGORY: &str = "category";
const TASK: &str = "task";
const HABIT: &str = "habit";

/// In-memory store shared by all four board repositories.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKaiStore {
    state: Arc<RwLock<InMemoryKaiState>>,
}

#[derive(Debug, Default)]
struct InMemoryKaiState {
    boards: HashMap<BoardId, Board>,
    categories: HashMap<CategoryId, Category>,
    tasks: HashMap<TaskId, Task>,
    habits: HashMap<HabitId, Habit>,
}

impl InMemoryKaiStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, InMemoryKaiState>> {
        self.state
            .read()
            .map_err(|err| RepositoryError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, InMemoryKaiState>> {
        self.state
            .write()
            .map_err(|err| RepositoryError::persistence(std::io::Error::other(err.to_string())))
    }
}

impl InMemoryKaiState {
    fn check_task_insert(&self, task: &Task) -> RepositoryResult<()> {
        if self.tasks.contains_key(&task.id()) {
            return Err(RepositoryError::duplicate(TASK, task.id()));
        }
        if !self.categories.contains_key(&task.category_id()) {
            return Err(RepositoryError::not_found(CATEGORY, task.category_id()));
        }
        Ok(())
    }

    fn remove_category_children(&mut self, category_id: CategoryId) {
        self.tasks.retain(|_, task| task.category_id() != category_id);
        self.habits
            .retain(|_, habit| habit.category_id() != category_id);
    }
}

/// Orders tasks by position, then creation time, then id.
fn task_order(left: &Task, right: &Task) -> Ordering {
    left.position()
        .total_cmp(&right.position())
        .then_with(|| left.created_at().cmp(&right.created_at()))
        .then_with(|| left.id().cmp(&right.id()))
}

#[async_trait]
impl BoardRepository for InMemoryKaiStore {
    async fn insert(&self, board: &Board) -> RepositoryResult<Board> {
        let mut state = self.write()?;
        if state.boards.contains_key(&board.id()) {
            return Err(RepositoryError::duplicate(BOARD, board.id()));
        }
        state.boards.insert(board.id(), board.clone());
        Ok(board.clone())
    }

    async fn update(&self, board: &Board) -> RepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .boards
            .get_mut(&board.id())
            .ok_or_else(|| RepositoryError::not_found(BOARD, board.id()))?;
        *stored = board.clone();
        Ok(())
    }

    async fn delete(&self, id: BoardId) -> RepositoryResult<()> {
        let mut state = self.write()?;
        if state.boards.remove(&id).is_none() {
            return Err(RepositoryError::not_found(BOARD, id));
        }
        state.categories.retain(|_, category| category.board_id() != id);
        state.tasks.retain(|_, task| task.board_id() != id);
        state.habits.retain(|_, habit| habit.board_id() != id);
        Ok(())
    }

    async fn list_summaries(&self) -> RepositoryResult<Vec<BoardSummary>> {
        let state = self.read()?;
        let mut summaries: Vec<BoardSummary> = state
            .boards
            .values()
            .map(|board| BoardSummary {
                board: board.clone(),
                category_count: state
                    .categories
                    .values()
                    .filter(|category| category.board_id() == board.id())
                    .count(),
                task_count: state
                    .tasks
                    .values()
                    .filter(|task| task.board_id() == board.id())
                    .count(),
            })
            .collect();
        summaries.sort_by(|left, right| {
            left.board
                .created_at()
                .cmp(&right.board.created_at())
                .then_with(|| left.board.id().cmp(&right.board.id()))
        });
        Ok(summaries)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryKaiStore {
    async fn insert(&self, category: &Category) -> RepositoryResult<Category> {
        let mut state = self.write()?;
        if state.categories.contains_key(&category.id()) {
            return Err(RepositoryError::duplicate(CATEGORY, category.id()));
        }
        if !state.boards.contains_key(&category.board_id()) {
            return Err(RepositoryError::not_found(BOARD, category.board_id()));
        }
        state.categories.insert(category.id(), category.clone());
        Ok(category.clone())
    }

    async fn update(&self, category: &Category) -> RepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .categories
            .get_mut(&category.id())
            .ok_or_else(|| RepositoryError::not_found(CATEGORY, category.id()))?;
        *stored = category.clone();
        Ok(())
    }

    async fn delete(&self, id: CategoryId) -> RepositoryResult<()> {
        let mut state = self.write()?;
        if state.categories.remove(&id).is_none() {
            return Err(RepositoryError::not_found(CATEGORY, id));
        }
        state.remove_category_children(id);
        Ok(())
    }

    async fn list_by_board(&self, board_id: BoardId) -> RepositoryResult<Vec<Category>> {
        let state = self.read()?;
        let mut categories: Vec<Category> = state
            .categories
            .values()
            .filter(|category| category.board_id() == board_id)
            .cloned()
            .collect();
        categories.sort_by(|left, right| {
            left.position()
                .cmp(&right.position())
                .then_with(|| left.id().cmp(&right.id()))
        });
        Ok(categories)
    }
}

#[async_trait]
impl TaskRepository for InMemoryKaiStore {
    async fn insert(&self, task: &Task) -> RepositoryResult<Task> {
        let mut state = self.write()?;
        state.check_task_insert(task)?;
        state.tasks.insert(task.id(), task.clone());
        Ok(task.clone())
    }

    async fn insert_many(&self, tasks: &[Task]) -> RepositoryResult<Vec<Task>> {
        let mut state = self.write()?;
        for (index, task) in tasks.iter().enumerate() {
            state.check_task_insert(task)?;
            let repeated = tasks
                .iter()
                .take(index)
                .any(|earlier| earlier.id() == task.id());
            if repeated {
                return Err(RepositoryError::duplicate(TASK, task.id()));
            }
        }
        for task in tasks {
            state.tasks.insert(task.id(), task.clone());
        }
        Ok(tasks.to_vec())
    }

    async fn update(&self, task: &Task) -> RepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .tasks
            .get_mut(&task.id())
            .ok_or_else(|| RepositoryError::not_found(TASK, task.id()))?;
        *stored = task.clone();
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> RepositoryResult<()> {
        let mut state = self.write()?;
        state
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found(TASK, id))
    }

    async fn find_by_id(&self, id: TaskId) -> RepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn list_by_board(&self, board_id: BoardId) -> RepositoryResult<Vec<Task>> {
        let state = self.read()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.board_id() == board_id)
            .cloned()
            .collect();
        tasks.sort_by(task_order);
        Ok(tasks)
    }

    async fn list_without_history(&self) -> RepositoryResult<Vec<Task>> {
        let state = self.read()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.status_history().is_empty())
            .cloned()
            .collect();
        tasks.sort_by(task_order);
        Ok(tasks)
    }
}

#[async_trait]
impl HabitRepository for InMemoryKaiStore {
    async fn insert(&self, habit: &Habit) -> RepositoryResult<Habit> {
        let mut state = self.write()?;
        if state.habits.contains_key(&habit.id()) {
            return Err(RepositoryError::duplicate(HABIT, habit.id()));
        }
        if !state.categories.contains_key(&habit.category_id()) {
            return Err(RepositoryError::not_found(CATEGORY, habit.category_id()));
        }
        state.habits.insert(habit.id(), habit.clone());
        Ok(habit.clone())
    }

    async fn update(&self, habit: &Habit) -> RepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .habits
            .get_mut(&habit.id())
            .ok_or_else(|| RepositoryError::not_found(HABIT, habit.id()))?;
        *stored = habit.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: HabitId) -> RepositoryResult<Option<Habit>> {
        let state = self.read()?;
        Ok(state.habits.get(&id).cloned())
    }

    async fn list_active_by_board(&self, board_id: BoardId) -> RepositoryResult<Vec<Habit>> {
        let state = self.read()?;
        let mut habits: Vec<Habit> = state
            .habits
            .values()
            .filter(|habit| habit.board_id() == board_id && habit.status() == HabitStatus::Active)
            .cloned()
            .collect();
        habits.sort_by(|left, right| {
            left.created_at()
                .cmp(&right.created_at())
                .then_with(|| left.id().cmp(&right.id()))
        });
        Ok(habits)
    }
}
