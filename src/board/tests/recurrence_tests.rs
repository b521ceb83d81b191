//! Service tests for habit creation and daily instance generation.

use super::support::{Seeded, clock, seeded};
use crate::board::{
    domain::{BoardId, Habit, HabitId, HabitStatus, NewHabit, Task, TaskId, TaskStatus},
    ports::{HabitRepository, RepositoryError, RepositoryResult, TaskRepository},
    services::{CreateHabitRequest, RecurrenceError, RecurrenceService},
};
use crate::clock::{ManualClock, today};
use async_trait::async_trait;
use chrono::TimeDelta;
use mockall::mock;
use mockable::Clock;
use rstest::rstest;
use std::sync::{Arc, Mutex};

mock! {
    Tasks {}

    #[async_trait]
    impl TaskRepository for Tasks {
        async fn insert(&self, task: &Task) -> RepositoryResult<Task>;
        async fn insert_many(&self, tasks: &[Task]) -> RepositoryResult<Vec<Task>>;
        async fn update(&self, task: &Task) -> RepositoryResult<()>;
        async fn delete(&self, id: TaskId) -> RepositoryResult<()>;
        async fn find_by_id(&self, id: TaskId) -> RepositoryResult<Option<Task>>;
        async fn list_by_board(&self, board_id: BoardId) -> RepositoryResult<Vec<Task>>;
        async fn list_without_history(&self) -> RepositoryResult<Vec<Task>>;
    }
}

mock! {
    Habits {}

    #[async_trait]
    impl HabitRepository for Habits {
        async fn insert(&self, habit: &Habit) -> RepositoryResult<Habit>;
        async fn update(&self, habit: &Habit) -> RepositoryResult<()>;
        async fn find_by_id(&self, id: HabitId) -> RepositoryResult<Option<Habit>>;
        async fn list_active_by_board(&self, board_id: BoardId) -> RepositoryResult<Vec<Habit>>;
    }
}

const DURATION_DAYS: u32 = 21;

fn service(seed: &Seeded) -> RecurrenceService<ManualClock> {
    RecurrenceService::new(
        seed.repositories.tasks.clone(),
        seed.repositories.habits.clone(),
        seed.clock.clone(),
        DURATION_DAYS,
    )
}

fn store_down() -> RepositoryError {
    RepositoryError::persistence(std::io::Error::other("store unavailable"))
}

async fn stored_habit(seed: &Seeded, habit: &Habit) -> Habit {
    seed.repositories
        .habits
        .find_by_id(habit.id())
        .await
        .expect("lookup should succeed")
        .expect("habit should be stored")
}

fn habit_on_day_one(seed: &Seeded, title: &str) -> Habit {
    Habit::new(
        NewHabit::new(seed.board.id(), seed.category.id(), title, DURATION_DAYS),
        &*seed.clock,
    )
    .expect("valid habit")
}

async fn stored_habit_on_day_one(seed: &Seeded) -> Habit {
    let habit = habit_on_day_one(seed, "Meditate");
    seed.repositories
        .habits
        .insert(&habit)
        .await
        .expect("habit insert should succeed")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_habit_stores_habit_and_first_instance(clock: Arc<ManualClock>) {
    let seed = seeded(clock.clone()).await;
    let due = clock.utc() + TimeDelta::hours(6);
    let request = CreateHabitRequest::new(seed.board.id(), seed.category.id(), "Run")
        .with_description("5k")
        .with_due_date(Some(due))
        .with_target_count(2)
        .with_position(4.0);

    let created = service(&seed)
        .create_habit(request)
        .await
        .expect("habit creation should succeed");

    assert_eq!(created.habit.duration_days(), DURATION_DAYS);
    assert_eq!(created.habit.last_generated_date(), Some(today(&*clock)));
    assert_eq!(created.first_instance.due_date(), Some(due));
    assert_eq!(created.first_instance.position(), 4.0);
    assert_eq!(created.first_instance.recurring_task_id(), Some(created.habit.id()));
    let tasks = seed
        .repositories
        .tasks
        .list_by_board(seed.board.id())
        .await
        .expect("listing should succeed");
    assert_eq!(tasks, vec![created.first_instance]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn generation_runs_once_per_day(clock: Arc<ManualClock>) {
    let seed = seeded(clock.clone()).await;
    let service = service(&seed);
    let habit = stored_habit_on_day_one(&seed).await;

    let same_day = service
        .generate_for_board(seed.board.id())
        .await
        .expect("generation should succeed");
    clock.advance(TimeDelta::days(1));
    let next_day = service
        .generate_for_board(seed.board.id())
        .await
        .expect("generation should succeed");
    let reopened = service
        .generate_for_board(seed.board.id())
        .await
        .expect("generation should succeed");

    assert!(same_day.generated.is_empty());
    assert_eq!(next_day.generated.len(), 1);
    assert_eq!(next_day.advanced, vec![habit.id()]);
    assert!(reopened.generated.is_empty());
    let instance = next_day.generated.first().expect("one instance");
    assert_eq!(instance.status(), TaskStatus::Pending);
    assert_eq!(instance.position(), 0.0);
    assert_eq!(
        stored_habit(&seed, &habit).await.last_generated_date(),
        Some(today(&*clock))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missed_days_produce_a_single_instance(clock: Arc<ManualClock>) {
    let seed = seeded(clock.clone()).await;
    stored_habit_on_day_one(&seed).await;
    clock.advance(TimeDelta::days(5));

    let report = service(&seed)
        .generate_for_board(seed.board.id())
        .await
        .expect("generation should succeed");

    assert_eq!(report.generated.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn expired_habit_is_retired_without_an_instance(clock: Arc<ManualClock>) {
    let seed = seeded(clock.clone()).await;
    let habit = stored_habit_on_day_one(&seed).await;
    clock.advance(TimeDelta::days(i64::from(DURATION_DAYS)));

    let report = service(&seed)
        .generate_for_board(seed.board.id())
        .await
        .expect("generation should succeed");

    assert!(report.generated.is_empty());
    assert_eq!(report.retired, vec![habit.id()]);
    assert_eq!(
        stored_habit(&seed, &habit).await.status(),
        HabitStatus::Completed
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_batch_leaves_habits_unadvanced(clock: Arc<ManualClock>) {
    let seed = seeded(clock.clone()).await;
    let habit = stored_habit_on_day_one(&seed).await;
    clock.advance(TimeDelta::days(1));
    let mut tasks = MockTasks::new();
    tasks
        .expect_insert_many()
        .times(1)
        .returning(|_| Err(store_down()));
    let service = RecurrenceService::new(
        Arc::new(tasks),
        seed.repositories.habits.clone(),
        clock.clone(),
        DURATION_DAYS,
    );

    let result = service.generate_for_board(seed.board.id()).await;

    assert!(matches!(result, Err(RecurrenceError::Repository(_))));
    assert_eq!(
        stored_habit(&seed, &habit).await.last_generated_date(),
        habit.last_generated_date()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_first_instance_is_reported_with_the_stored_habit(clock: Arc<ManualClock>) {
    let seed = seeded(clock.clone()).await;
    let mut tasks = MockTasks::new();
    tasks.expect_insert().times(1).returning(|_| Err(store_down()));
    let service = RecurrenceService::new(
        Arc::new(tasks),
        seed.repositories.habits.clone(),
        clock,
        DURATION_DAYS,
    );

    let result = service
        .create_habit(CreateHabitRequest::new(
            seed.board.id(),
            seed.category.id(),
            "Journal",
        ))
        .await;

    let Err(RecurrenceError::HabitWithoutInstance { habit_id, .. }) = result else {
        panic!("expected a habit without instance, got {result:?}");
    };
    let stored = seed
        .repositories
        .habits
        .find_by_id(habit_id)
        .await
        .expect("lookup should succeed");
    assert!(stored.is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_habit_is_rejected_before_writing(clock: Arc<ManualClock>) {
    let seed = seeded(clock).await;
    let service = service(&seed);

    let result = service
        .create_habit(
            CreateHabitRequest::new(seed.board.id(), seed.category.id(), "Swim")
                .with_duration_days(0),
        )
        .await;

    assert!(matches!(result, Err(RecurrenceError::Domain(_))));
    let active = seed
        .repositories
        .habits
        .list_active_by_board(seed.board.id())
        .await
        .expect("listing should succeed");
    assert!(active.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_habit_update_leaves_only_that_habit_unadvanced(clock: Arc<ManualClock>) {
    let seed = seeded(clock.clone()).await;
    let walk = habit_on_day_one(&seed, "Walk");
    let read = habit_on_day_one(&seed, "Read");
    clock.advance(TimeDelta::days(1));
    let written = Arc::new(Mutex::new(Vec::new()));
    let mut habits = MockHabits::new();
    let listed = vec![walk.clone(), read.clone()];
    habits
        .expect_list_active_by_board()
        .times(1)
        .returning(move |_| Ok(listed.clone()));
    let read_id = read.id();
    let recorded = Arc::clone(&written);
    habits.expect_update().times(2).returning(move |habit| {
        if habit.id() == read_id {
            return Err(store_down());
        }
        recorded.lock().expect("lock").push(habit.clone());
        Ok(())
    });
    let service = RecurrenceService::new(
        seed.repositories.tasks.clone(),
        Arc::new(habits),
        clock.clone(),
        DURATION_DAYS,
    );

    let report = service
        .generate_for_board(seed.board.id())
        .await
        .expect("batch insert should succeed");

    assert_eq!(report.generated.len(), 2);
    assert_eq!(report.advanced, vec![walk.id()]);
    assert_eq!(report.not_advanced, vec![read.id()]);
    let writes = written.lock().expect("lock").clone();
    assert_eq!(writes.len(), 1);
    let advanced = writes.first().expect("one habit written");
    assert_eq!(advanced.id(), walk.id());
    assert_eq!(advanced.last_generated_date(), Some(today(&*clock)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn interval_habit_waits_the_full_interval(clock: Arc<ManualClock>) {
    let seed = seeded(clock.clone()).await;
    let service = service(&seed);
    let created = service
        .create_habit(
            CreateHabitRequest::new(seed.board.id(), seed.category.id(), "Water cactus")
                .with_interval(2),
        )
        .await
        .expect("habit creation should succeed");

    clock.advance(TimeDelta::days(1));
    let day_two = service
        .generate_for_board(seed.board.id())
        .await
        .expect("generation should succeed");
    clock.advance(TimeDelta::days(1));
    let day_three = service
        .generate_for_board(seed.board.id())
        .await
        .expect("generation should succeed");

    assert_eq!(created.habit.interval(), 2);
    assert!(day_two.generated.is_empty());
    assert!(day_two.advanced.is_empty());
    assert_eq!(day_three.generated.len(), 1);
    assert_eq!(day_three.advanced, vec![created.habit.id()]);
    assert_eq!(
        stored_habit(&seed, &created.habit).await.last_generated_date(),
        Some(today(&*clock))
    );
}
