//! Kaiban: a personal kanban board with repetition counters and habits.
//!
//! # Architecture
//!
//! Kaiban follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the board store
//! - **Adapters**: Concrete implementations of ports
//!
//! # Modules
//!
//! - [`board`]: Boards, categories, tasks, habits and their lifecycle rules
//! - [`clock`]: Calendar helpers and a settable clock
//! - [`config`]: Layered configuration loading
//! - [`telemetry`]: Tracing subscriber setup

pub mod board;
pub mod clock;
pub mod config;
pub mod telemetry;
