//! When steps for board lifecycle BDD scenarios.

use super::world::{BoardWorld, run_async};
use chrono::TimeDelta;
use eyre::{WrapErr, eyre};
use kaiban::board::domain::TaskStatus;
use rstest_bdd_macros::when;

#[when(r#"I request completion of "{title}""#)]
fn request_completion(world: &mut BoardWorld, title: String) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&title)?;
    run_async(
        world
            .coordinator
            .change_task_status(task_id, TaskStatus::Completed),
    )
    .wrap_err("request completion")?;
    Ok(())
}

#[when(r#"I move "{title}" to "{status}""#)]
fn move_to_status(
    world: &mut BoardWorld,
    title: String,
    status: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&title)?;
    let requested = TaskStatus::try_from(status.as_str())?;
    run_async(world.coordinator.change_task_status(task_id, requested))
        .wrap_err("move task")?;
    Ok(())
}

#[when(r#"I change the count of "{title}" by {delta:i64}"#)]
fn change_count(world: &mut BoardWorld, title: String, delta: i64) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&title)?;
    run_async(world.coordinator.increment_task_count(task_id, delta))
        .wrap_err("change count")?;
    Ok(())
}

#[when("the board is reopened the same day")]
fn reopen_same_day(world: &mut BoardWorld) -> Result<(), eyre::Report> {
    reopen(world)
}

#[when("the board is reopened the next day")]
fn reopen_next_day(world: &mut BoardWorld) -> Result<(), eyre::Report> {
    world.clock.advance(TimeDelta::days(1));
    reopen(world)
}

#[when(r#"I drop "{moved}" onto "{target}""#)]
fn drop_onto(world: &mut BoardWorld, moved: String, target: String) -> Result<(), eyre::Report> {
    let moved_id = world.task_id(&moved)?;
    let target_id = world.task_id(&target)?;
    if let Err(err) = run_async(world.coordinator.reorder_task(moved_id, target_id)) {
        world.last_error = Some(err);
    }
    Ok(())
}

fn reopen(world: &mut BoardWorld) -> Result<(), eyre::Report> {
    let board_id = world
        .coordinator
        .open_board()
        .map(|view| view.board_id())
        .ok_or_else(|| eyre!("no board is open"))?;
    run_async(world.coordinator.close_board()).wrap_err("close board")?;
    run_async(world.coordinator.select_board(board_id)).wrap_err("reopen board")?;
    Ok(())
}
