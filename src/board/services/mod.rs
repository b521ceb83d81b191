//! Application services for board, task and habit orchestration.

mod coordinator;
mod lifecycle;
mod projection;
mod recurrence;

pub use coordinator::{
    BoardCoordinator, BoardCoordinatorError, BoardCoordinatorResult, BoardSettings,
    CreateTaskRequest, PolicyViolation, Recurrence,
};
pub use lifecycle::{
    CountAdjustmentResult, StatusChangeResult, TaskLifecycleError, TaskLifecycleResult,
    TaskLifecycleService,
};
pub use projection::{BoardProjection, BoardView, LaneCounts};
pub use recurrence::{
    CreateHabitRequest, CreatedHabit, GenerationReport, RecurrenceError, RecurrenceResult,
    RecurrenceService,
};
