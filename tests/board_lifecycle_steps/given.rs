//! Given steps for board lifecycle BDD scenarios.

use super::world::{BoardWorld, run_async};
use eyre::WrapErr;
use kaiban::board::services::{CreateTaskRequest, Recurrence};
use rstest_bdd_macros::given;

#[given(r#"a board "{board}" with a category "{category}""#)]
fn board_with_category(
    world: &mut BoardWorld,
    board: String,
    category: String,
) -> Result<(), eyre::Report> {
    let created = run_async(world.coordinator.create_board(&board, ""))
        .wrap_err("create scenario board")?;
    run_async(world.coordinator.select_board(created.id())).wrap_err("open scenario board")?;
    let column = run_async(world.coordinator.create_category(&category))
        .wrap_err("create scenario category")?;
    world.category_id = Some(column.id());
    Ok(())
}

#[given(r#"a task "{title}" with target count {target:u32}"#)]
fn task_with_target(
    world: &mut BoardWorld,
    title: String,
    target: u32,
) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new(world.category_id()?, title.clone())
        .with_target_count(target);
    let task = run_async(world.coordinator.create_task(request)).wrap_err("create task")?;
    world.tasks.insert(title, task.id());
    Ok(())
}

#[given(r#"a daily habit "{title}" lasting {days:u32} days"#)]
fn daily_habit(world: &mut BoardWorld, title: String, days: u32) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new(world.category_id()?, title.clone())
        .recurring(Recurrence::for_days(days));
    let task = run_async(world.coordinator.create_task(request)).wrap_err("create habit")?;
    world.tasks.insert(title, task.id());
    Ok(())
}
