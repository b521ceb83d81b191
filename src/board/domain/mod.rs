//! Domain model for boards, categories, tasks and habits.
//!
//! Everything here is pure: status transitions, counter gating, the history
//! ledger, habit scheduling and lane ordering take a clock or explicit values
//! and never touch storage.

mod board;
mod counter;
mod error;
mod habit;
mod history;
mod ids;
mod position;
mod status;
mod task;
mod urgency;

pub use board::{Board, BoardChanges, BoardSummary, Category};
pub use counter::TaskCounter;
pub use error::{BoardDomainError, ParseTaskStatusError};
pub use habit::{Habit, HabitFrequency, HabitStatus, NewHabit};
pub use history::{EditedField, FieldEdit, HistoryEntry, StatusChange, StatusHistory};
pub use ids::{BoardId, CategoryId, HabitId, TaskId};
pub use position::{LaneSlot, PositionSpacing, ReorderPlan, plan_reorder, renumbered};
pub use status::{SwipeDirection, TaskKind, TaskStatus};
pub use task::{CountAdjustment, NewTask, PersistedTaskData, Task, TaskEdit, TransitionOutcome};
pub use urgency::DueUrgency;
