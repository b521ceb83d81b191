//! Port contracts for board persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by board services.

pub mod repository;

pub use repository::{
    BoardRepository, CategoryRepository, HabitRepository, KaiRepositories, RepositoryError,
    RepositoryResult, TaskRepository,
};
