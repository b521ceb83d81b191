//! In-memory integration tests for coordinator command flows.

use std::sync::Arc;

use super::helpers::{clock, coordinator, open_board_with_category, repositories};
use eyre::ensure;
use kaiban::board::{
    domain::{HistoryEntry, TaskEdit, TaskStatus},
    ports::KaiRepositories,
    services::{BoardCoordinatorError, CreateTaskRequest},
};
use kaiban::clock::ManualClock;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn closing_a_board_refreshes_counts_from_the_store(
    repositories: KaiRepositories,
    clock: Arc<ManualClock>,
) -> Result<(), eyre::Report> {
    let mut kai = coordinator(repositories, clock);
    let (board_id, category_id) = open_board_with_category(&mut kai, "Errands").await?;
    kai.create_task(CreateTaskRequest::new(category_id, "Post office"))
        .await?;
    kai.create_task(CreateTaskRequest::new(category_id, "Bank").as_note())
        .await?;

    kai.close_board().await?;

    ensure!(kai.open_board().is_none(), "board should be closed");
    let summary = kai
        .projection()
        .board(board_id)
        .ok_or_else(|| eyre::eyre!("board missing from list"))?;
    ensure!(summary.category_count == 1, "category count {}", summary.category_count);
    ensure!(summary.task_count == 2, "task count {}", summary.task_count);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_fresh_coordinator_sees_earlier_changes(
    repositories: KaiRepositories,
    clock: Arc<ManualClock>,
) -> Result<(), eyre::Report> {
    let mut first = coordinator(repositories.clone(), clock.clone());
    let (board_id, category_id) = open_board_with_category(&mut first, "Reading").await?;
    let task = first
        .create_task(CreateTaskRequest::new(category_id, "Dune").with_target_count(2))
        .await?;
    first
        .change_task_status(task.id(), TaskStatus::Completed)
        .await?;

    let mut second = coordinator(repositories, clock);
    second.load_boards().await?;
    second.select_board(board_id).await?;

    let reloaded = second
        .open_board()
        .and_then(|view| view.task(task.id()))
        .ok_or_else(|| eyre::eyre!("task missing after reload"))?;
    ensure!(reloaded.counter().current() == 1, "count was not persisted");
    ensure!(reloaded.status() == TaskStatus::Pending, "bounce was not persisted");
    ensure!(reloaded.status_history().len() == 2, "history was not persisted");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn edits_are_listed_in_the_timeline(
    repositories: KaiRepositories,
    clock: Arc<ManualClock>,
) -> Result<(), eyre::Report> {
    let mut kai = coordinator(repositories, clock);
    let (_, category_id) = open_board_with_category(&mut kai, "Admin").await?;
    let task = kai
        .create_task(CreateTaskRequest::new(category_id, "Renew passport"))
        .await?;

    let edited = kai
        .edit_task(
            task.id(),
            TaskEdit::default()
                .with_title("Renew passports")
                .with_description("Both adults"),
        )
        .await?;
    kai.change_task_status(task.id(), TaskStatus::InProgress)
        .await?;

    let timeline: Vec<String> = kai
        .open_board()
        .and_then(|view| view.task(edited.id()))
        .ok_or_else(|| eyre::eyre!("task missing"))?
        .status_history()
        .iter()
        .map(HistoryEntry::describe)
        .collect();
    ensure!(
        timeline
            == [
                "Task created",
                "Title updated",
                "Description updated",
                "Pending → In progress",
            ],
        "unexpected timeline: {timeline:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleted_tasks_leave_the_board(
    repositories: KaiRepositories,
    clock: Arc<ManualClock>,
) -> Result<(), eyre::Report> {
    let mut kai = coordinator(repositories, clock);
    let (_, category_id) = open_board_with_category(&mut kai, "Kitchen").await?;
    let task = kai
        .create_task(CreateTaskRequest::new(category_id, "Descale kettle"))
        .await?;

    kai.delete_task(task.id()).await?;
    let again = kai.delete_task(task.id()).await;

    ensure!(
        matches!(again, Err(BoardCoordinatorError::TaskNotFound(_))),
        "second delete should not find the task"
    );
    ensure!(
        kai.open_board().is_some_and(|view| view.tasks().is_empty()),
        "task still shown"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn renamed_categories_survive_a_reload(
    repositories: KaiRepositories,
    clock: Arc<ManualClock>,
) -> Result<(), eyre::Report> {
    let mut kai = coordinator(repositories, clock);
    let (board_id, category_id) = open_board_with_category(&mut kai, "Todo").await?;

    kai.rename_category(category_id, "Today").await?;
    kai.close_board().await?;
    kai.select_board(board_id).await?;

    let names: Vec<&str> = kai
        .open_board()
        .map(|view| view.categories().iter().map(|c| c.name()).collect())
        .unwrap_or_default();
    ensure!(names == ["Today"], "unexpected categories: {names:?}");
    Ok(())
}
