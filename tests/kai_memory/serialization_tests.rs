//! Record shape tests for tasks, their audit trail and habits.

use std::sync::Arc;

use super::helpers::{clock, coordinator, open_board_with_category, repositories};
use eyre::ensure;
use kaiban::board::{
    domain::{HabitFrequency, Task, TaskStatus},
    ports::KaiRepositories,
    services::{CreateTaskRequest, Recurrence},
};
use kaiban::clock::ManualClock;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_records_use_board_field_names(
    repositories: KaiRepositories,
    clock: Arc<ManualClock>,
) -> Result<(), eyre::Report> {
    let mut kai = coordinator(repositories, clock);
    let (_, category_id) = open_board_with_category(&mut kai, "Health").await?;
    let task = kai
        .create_task(CreateTaskRequest::new(category_id, "Vitamins").with_target_count(2))
        .await?;
    let bounced = kai
        .change_task_status(task.id(), TaskStatus::Completed)
        .await?
        .task;

    let record = serde_json::to_value(&bounced)?;

    ensure!(record.get("type") == Some(&json!("task")), "type: {record}");
    ensure!(record.get("status") == Some(&json!("pendiente")), "status: {record}");
    ensure!(record.get("target_count") == Some(&json!(2)), "target: {record}");
    ensure!(record.get("current_count") == Some(&json!(1)), "current: {record}");
    ensure!(
        record.pointer("/status_history/1/previous_status") == Some(&json!("pendiente")),
        "history: {record}"
    );
    let decoded: Task = serde_json::from_value(record)?;
    ensure!(decoded == bounced, "decoded task differs");
    Ok(())
}

#[rstest]
fn legacy_records_default_missing_fields() -> Result<(), eyre::Report> {
    let record = json!({
        "id": "6f1c1e5e-2d43-4a0c-9c86-3f2d1f6c9a10",
        "board_id": "0b6f2a57-8a3b-4c3a-93f4-7f5f1d2a6b11",
        "category_id": "c3f0d8a2-1f7e-4f4e-b7c2-5a9d6e3b4c12",
        "title": "Old task",
        "position": 3.0,
        "due_date": null,
        "recurring_task_id": null,
        "created_at": "2023-01-01T00:00:00Z",
        "updated_at": "2023-01-01T00:00:00Z"
    });

    let task: Task = serde_json::from_value(record)?;

    ensure!(task.counter().target() == 1, "target defaults to one");
    ensure!(task.counter().current() == 0, "count defaults to zero");
    ensure!(task.status() == TaskStatus::Pending, "status defaults to pending");
    ensure!(task.status_history().is_empty(), "history defaults to empty");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn habit_records_carry_their_schedule(
    repositories: KaiRepositories,
    clock: Arc<ManualClock>,
) -> Result<(), eyre::Report> {
    let mut kai = coordinator(repositories.clone(), clock);
    let (board_id, category_id) = open_board_with_category(&mut kai, "Health").await?;
    kai.create_task(
        CreateTaskRequest::new(category_id, "Stretch").recurring(Recurrence::for_days(14).every(3)),
    )
    .await?;

    let habits = repositories.habits.list_active_by_board(board_id).await?;
    let habit = habits
        .first()
        .ok_or_else(|| eyre::eyre!("habit should be stored"))?;
    let record = serde_json::to_value(habit)?;

    ensure!(habit.frequency() == HabitFrequency::Daily, "frequency is fixed");
    ensure!(record.get("frequency") == Some(&json!("daily")), "frequency: {record}");
    ensure!(record.get("interval") == Some(&json!(3)), "interval: {record}");
    ensure!(record.get("duration_days") == Some(&json!(14)), "duration: {record}");
    ensure!(record.get("status") == Some(&json!("active")), "status: {record}");
    Ok(())
}
