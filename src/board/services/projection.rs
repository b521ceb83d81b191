//! In-memory projection of the board list and the open board.
//!
//! Mutators are plain state transitions; the coordinator only calls them
//! after the corresponding store write has succeeded.

use crate::board::domain::{
    Board, BoardId, BoardSummary, Category, CategoryId, LaneSlot, Task, TaskId, TaskStatus,
};

/// Number of tasks in each status lane of a category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LaneCounts {
    /// Tasks in the pending lane.
    pub pending: usize,
    /// Tasks in the in-progress lane.
    pub in_progress: usize,
    /// Tasks in the completed lane.
    pub completed: usize,
}

/// Categories and tasks of the open board.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    board_id: BoardId,
    categories: Vec<Category>,
    tasks: Vec<Task>,
}

impl BoardView {
    /// Creates a view from freshly loaded rows.
    #[must_use]
    pub const fn new(board_id: BoardId, categories: Vec<Category>, tasks: Vec<Task>) -> Self {
        Self {
            board_id,
            categories,
            tasks,
        }
    }

    /// Returns the open board's identifier.
    #[must_use]
    pub const fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Returns the categories ordered by position.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Returns every task and note on the board.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Finds a task.
    #[must_use]
    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == task_id)
    }

    /// Finds a category.
    #[must_use]
    pub fn category(&self, category_id: CategoryId) -> Option<&Category> {
        self.categories
            .iter()
            .find(|category| category.id() == category_id)
    }

    /// Returns the number of items in a category.
    #[must_use]
    pub fn task_count(&self, category_id: CategoryId) -> usize {
        self.tasks
            .iter()
            .filter(|task| task.category_id() == category_id)
            .count()
    }

    /// Returns the tasks of one lane, ordered by position.
    #[must_use]
    pub fn lane(&self, category_id: CategoryId, status: TaskStatus) -> Vec<&Task> {
        let mut lane: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|task| task.category_id() == category_id && task.status() == status)
            .collect();
        lane.sort_by(|left, right| left.position().total_cmp(&right.position()));
        lane
    }

    /// Returns the slots of one lane, ordered by position.
    #[must_use]
    pub fn lane_slots(&self, category_id: CategoryId, status: TaskStatus) -> Vec<LaneSlot> {
        self.lane(category_id, status)
            .into_iter()
            .map(|task| LaneSlot {
                task_id: task.id(),
                position: task.position(),
            })
            .collect()
    }

    /// Counts tasks per status lane in a category.
    #[must_use]
    pub fn lane_counts(&self, category_id: CategoryId) -> LaneCounts {
        self.tasks
            .iter()
            .filter(|task| task.category_id() == category_id)
            .fold(LaneCounts::default(), |mut counts, task| {
                match task.status() {
                    TaskStatus::Pending => counts.pending += 1,
                    TaskStatus::InProgress => counts.in_progress += 1,
                    TaskStatus::Completed => counts.completed += 1,
                }
                counts
            })
    }
}

/// Board list plus the open board, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardProjection {
    boards: Vec<BoardSummary>,
    open: Option<BoardView>,
}

impl BoardProjection {
    /// Returns the board list.
    #[must_use]
    pub fn boards(&self) -> &[BoardSummary] {
        &self.boards
    }

    /// Finds a board summary.
    #[must_use]
    pub fn board(&self, board_id: BoardId) -> Option<&BoardSummary> {
        self.boards
            .iter()
            .find(|summary| summary.board.id() == board_id)
    }

    /// Returns the open board view.
    #[must_use]
    pub const fn open_board(&self) -> Option<&BoardView> {
        self.open.as_ref()
    }

    /// Replaces the board list.
    pub fn set_boards(&mut self, boards: Vec<BoardSummary>) {
        self.boards = boards;
    }

    /// Appends a new board to the list.
    pub fn add_board(&mut self, summary: BoardSummary) {
        self.boards.push(summary);
    }

    /// Replaces a board's details, keeping its counts.
    pub fn replace_board(&mut self, board: Board) {
        if let Some(summary) = self
            .boards
            .iter_mut()
            .find(|summary| summary.board.id() == board.id())
        {
            summary.board = board;
        }
    }

    /// Removes a board, closing it if it is open.
    pub fn remove_board(&mut self, board_id: BoardId) {
        self.boards.retain(|summary| summary.board.id() != board_id);
        if self
            .open
            .as_ref()
            .is_some_and(|view| view.board_id == board_id)
        {
            self.open = None;
        }
    }

    /// Opens a board view.
    pub fn open(&mut self, view: BoardView) {
        self.open = Some(view);
    }

    /// Closes the open board view.
    pub fn close(&mut self) {
        self.open = None;
    }

    /// Adds a category to the open board.
    pub fn insert_category(&mut self, category: Category) {
        let board_id = category.board_id();
        if let Some(view) = self.open_for(board_id) {
            view.categories.push(category);
            self.bump_counts(board_id, 1, 0);
        }
    }

    /// Replaces a category on the open board.
    pub fn replace_category(&mut self, category: Category) {
        if let Some(stored) = self
            .open
            .as_mut()
            .and_then(|view| view.categories.iter_mut().find(|c| c.id() == category.id()))
        {
            *stored = category;
        }
    }

    /// Removes a category and its tasks from the open board.
    pub fn remove_category(&mut self, category_id: CategoryId) {
        let Some(view) = self.open.as_mut() else {
            return;
        };
        let board_id = view.board_id;
        view.categories.retain(|category| category.id() != category_id);
        let before = view.tasks.len();
        view.tasks.retain(|task| task.category_id() != category_id);
        let removed_tasks = before - view.tasks.len();
        self.drop_counts(board_id, 1, removed_tasks);
    }

    /// Adds tasks to the open board.
    pub fn insert_tasks(&mut self, tasks: impl IntoIterator<Item = Task>) {
        for task in tasks {
            let board_id = task.board_id();
            if let Some(view) = self.open_for(board_id) {
                view.tasks.push(task);
                self.bump_counts(board_id, 0, 1);
            }
        }
    }

    /// Replaces a task on the open board.
    pub fn replace_task(&mut self, task: Task) {
        if let Some(stored) = self
            .open
            .as_mut()
            .and_then(|view| view.tasks.iter_mut().find(|t| t.id() == task.id()))
        {
            *stored = task;
        }
    }

    /// Removes a task from the open board.
    pub fn remove_task(&mut self, task_id: TaskId) {
        let Some(view) = self.open.as_mut() else {
            return;
        };
        let board_id = view.board_id;
        let before = view.tasks.len();
        view.tasks.retain(|task| task.id() != task_id);
        let removed = before - view.tasks.len();
        self.drop_counts(board_id, 0, removed);
    }

    fn open_for(&mut self, board_id: BoardId) -> Option<&mut BoardView> {
        self.open.as_mut().filter(|view| view.board_id == board_id)
    }

    fn bump_counts(&mut self, board_id: BoardId, categories: usize, tasks: usize) {
        if let Some(summary) = self.summary_mut(board_id) {
            summary.category_count = summary.category_count.saturating_add(categories);
            summary.task_count = summary.task_count.saturating_add(tasks);
        }
    }

    fn drop_counts(&mut self, board_id: BoardId, categories: usize, tasks: usize) {
        if let Some(summary) = self.summary_mut(board_id) {
            summary.category_count = summary.category_count.saturating_sub(categories);
            summary.task_count = summary.task_count.saturating_sub(tasks);
        }
    }

    fn summary_mut(&mut self, board_id: BoardId) -> Option<&mut BoardSummary> {
        self.boards
            .iter_mut()
            .find(|summary| summary.board.id() == board_id)
    }
}
