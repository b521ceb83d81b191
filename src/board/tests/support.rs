//! Shared fixtures for board unit tests.

use crate::board::{
    adapters::memory::InMemoryKaiStore,
    domain::{Board, Category},
    ports::KaiRepositories,
};
use crate::clock::ManualClock;
use chrono::NaiveDate;
use rstest::fixture;
use std::sync::Arc;

/// Repositories over a store holding one board with one category.
pub struct Seeded {
    pub repositories: KaiRepositories,
    pub clock: Arc<ManualClock>,
    pub board: Board,
    pub category: Category,
}

#[fixture]
pub fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::at_date(
        NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date"),
    ))
}

pub async fn seeded(clock: Arc<ManualClock>) -> Seeded {
    let repositories = KaiRepositories::from_store(&Arc::new(InMemoryKaiStore::new()));
    let board = Board::new("Home", "", &*clock).expect("valid board");
    let category = Category::new(board.id(), "Chores", 0).expect("valid category");
    repositories
        .boards
        .insert(&board)
        .await
        .expect("board insert should succeed");
    repositories
        .categories
        .insert(&category)
        .await
        .expect("category insert should succeed");
    Seeded {
        repositories,
        clock,
        board,
        category,
    }
}
