//! Shared test helpers for in-memory store integration tests.

use std::sync::Arc;

use chrono::NaiveDate;
use kaiban::board::{
    adapters::memory::InMemoryKaiStore,
    domain::{BoardId, CategoryId},
    ports::KaiRepositories,
    services::{BoardCoordinator, BoardSettings},
};
use kaiban::clock::ManualClock;
use rstest::fixture;

/// Coordinator type used by integration tests.
pub type TestCoordinator = BoardCoordinator<ManualClock>;

/// Provides a clock pinned to midday on 1 March 2024.
#[fixture]
pub fn clock() -> Arc<ManualClock> {
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date");
    Arc::new(ManualClock::at_date(date))
}

/// Provides repositories over a fresh in-memory store.
#[fixture]
pub fn repositories() -> KaiRepositories {
    KaiRepositories::from_store(&Arc::new(InMemoryKaiStore::new()))
}

/// Creates a board with one category and opens it.
///
/// # Errors
///
/// Returns an error if any coordinator command fails.
pub async fn open_board_with_category(
    coordinator: &mut TestCoordinator,
    category: &str,
) -> Result<(BoardId, CategoryId), eyre::Report> {
    let board = coordinator.create_board("Personal", "").await?;
    coordinator.select_board(board.id()).await?;
    let created = coordinator.create_category(category).await?;
    Ok((board.id(), created.id()))
}

/// Builds a coordinator with default settings.
pub fn coordinator(repositories: KaiRepositories, clock: Arc<ManualClock>) -> TestCoordinator {
    BoardCoordinator::new(repositories, clock, BoardSettings::default())
}
