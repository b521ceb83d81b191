//! Then steps for board lifecycle BDD scenarios.

use super::world::BoardWorld;
use eyre::{ensure, eyre};
use kaiban::board::services::BoardCoordinatorError;
use rstest_bdd_macros::then;

#[then(r#""{title}" is "{status}" with count {count:u32}"#)]
fn task_status_and_count(
    world: &BoardWorld,
    title: String,
    status: String,
    count: u32,
) -> Result<(), eyre::Report> {
    let task = world.task(&title)?;
    ensure!(
        task.status().as_str() == status,
        "expected {title} to be {status}, found {}",
        task.status()
    );
    ensure!(
        task.counter().current() == count,
        "expected count {count}, found {}",
        task.counter().current()
    );
    Ok(())
}

#[then(r#""{title}" has {entries:usize} history entries"#)]
fn history_length(world: &BoardWorld, title: String, entries: usize) -> Result<(), eyre::Report> {
    let found = world.task(&title)?.status_history().len();
    ensure!(found == entries, "expected {entries} history entries, found {found}");
    Ok(())
}

#[then(r#"the board shows {count:usize} instances of "{title}""#)]
fn instance_count(world: &BoardWorld, count: usize, title: String) -> Result<(), eyre::Report> {
    let view = world
        .coordinator
        .open_board()
        .ok_or_else(|| eyre!("no board is open"))?;
    let found = view
        .tasks()
        .iter()
        .filter(|task| task.title() == title)
        .count();
    ensure!(found == count, "expected {count} instances of {title}, found {found}");
    Ok(())
}

#[then(r#""{title}" is at position {position:f64}"#)]
fn task_position(world: &BoardWorld, title: String, position: f64) -> Result<(), eyre::Report> {
    let found = world.task(&title)?.position();
    ensure!(
        found.total_cmp(&position).is_eq(),
        "expected {title} at {position}, found {found}"
    );
    Ok(())
}

#[then("the request is refused by policy")]
fn refused_by_policy(world: &BoardWorld) -> Result<(), eyre::Report> {
    match &world.last_error {
        Some(BoardCoordinatorError::Policy(_)) => Ok(()),
        other => Err(eyre!("expected a policy violation, found {other:?}")),
    }
}
