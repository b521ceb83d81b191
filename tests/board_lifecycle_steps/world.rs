//! Shared world state for board lifecycle BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use eyre::eyre;
use kaiban::board::{
    adapters::memory::InMemoryKaiStore,
    domain::{CategoryId, Task, TaskId},
    ports::KaiRepositories,
    services::{BoardCoordinator, BoardCoordinatorError, BoardSettings},
};
use kaiban::clock::ManualClock;
use rstest::fixture;

/// Coordinator type used by the BDD world.
pub type TestCoordinator = BoardCoordinator<ManualClock>;

/// Scenario world for board lifecycle behaviour tests.
pub struct BoardWorld {
    pub coordinator: TestCoordinator,
    pub clock: Arc<ManualClock>,
    pub category_id: Option<CategoryId>,
    pub tasks: HashMap<String, TaskId>,
    pub last_error: Option<BoardCoordinatorError>,
}

impl BoardWorld {
    /// Creates a world over an empty store pinned to 1 March 2024.
    #[must_use]
    pub fn new() -> Self {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or_default();
        let clock = Arc::new(ManualClock::at_date(date));
        let repositories = KaiRepositories::from_store(&Arc::new(InMemoryKaiStore::new()));
        Self {
            coordinator: BoardCoordinator::new(
                repositories,
                clock.clone(),
                BoardSettings::default(),
            ),
            clock,
            category_id: None,
            tasks: HashMap::new(),
            last_error: None,
        }
    }

    /// Returns the category created by the background step.
    pub fn category_id(&self) -> Result<CategoryId, eyre::Report> {
        self.category_id
            .ok_or_else(|| eyre!("missing category in scenario world"))
    }

    /// Resolves a task created earlier in the scenario by title.
    pub fn task_id(&self, title: &str) -> Result<TaskId, eyre::Report> {
        self.tasks
            .get(title)
            .copied()
            .ok_or_else(|| eyre!("no task titled {title} in scenario world"))
    }

    /// Returns the open board's copy of a task.
    pub fn task(&self, title: &str) -> Result<&Task, eyre::Report> {
        let task_id = self.task_id(title)?;
        self.coordinator
            .open_board()
            .and_then(|view| view.task(task_id))
            .ok_or_else(|| eyre!("task {title} is not on the open board"))
    }
}

impl Default for BoardWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> BoardWorld {
    BoardWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
