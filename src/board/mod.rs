//! Personal kanban boards with counter tasks and daily habits.
//!
//! Boards hold ordered categories; each category shows its tasks in three
//! status lanes. Tasks may need several repetitions before they complete,
//! and habits spawn a fresh task instance each day the board is opened. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
