//! Shared services driven from parallel tasks.

use super::helpers::{Engine, engine};
use rstest::rstest;
use std::collections::BTreeSet;
use taskward::task::{
    domain::{TaskFilter, TaskStatus},
    ports::TaskRepository,
};
use taskward::user::domain::Role;
use tokio::task::JoinSet;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn parallel_creations_yield_distinct_tasks(engine: Engine) -> Result<(), eyre::Report> {
    let manager = engine.seed_user("Morgan", Role::Manager).await?;
    let mut workers = JoinSet::new();
    for index in 0..16 {
        let shared = engine.clone();
        let actor = manager.clone();
        workers.spawn(async move { shared.create_task(&actor, &format!("Job {index}"), &[]).await });
    }

    let mut ids = BTreeSet::new();
    while let Some(joined) = workers.join_next().await {
        ids.insert(joined??.id());
    }
    let listed = engine
        .task_service
        .list_tasks(&manager, TaskFilter::new(), 1, Some(100))
        .await?;

    eyre::ensure!(ids.len() == 16, "every creation gets its own id");
    eyre::ensure!(listed.total() == 16, "every creation is stored");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn racing_transitions_leave_one_final_status(engine: Engine) -> Result<(), eyre::Report> {
    let admin = engine.seed_user("Ada", Role::Admin).await?;
    let task = engine.create_task(&admin, "Contended", &[]).await?;
    let targets = [
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Cancelled,
        TaskStatus::Pending,
    ];

    let mut workers = JoinSet::new();
    for target in targets {
        let shared = engine.clone();
        let actor = admin.clone();
        let contended = task.clone();
        workers.spawn(async move { shared.move_task(&actor, &contended, target).await });
    }
    while let Some(joined) = workers.join_next().await {
        joined??;
    }

    let stored = engine
        .tasks
        .find_by_id(task.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task should still exist"))?;
    eyre::ensure!(
        targets.contains(&stored.status()),
        "final status is one of the requested targets"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn parallel_dependent_replacements_stay_consistent(
    engine: Engine,
) -> Result<(), eyre::Report> {
    let manager = engine.seed_user("Morgan", Role::Manager).await?;
    let parent = engine.create_task(&manager, "Parent", &[]).await?;
    let left = engine.create_task(&manager, "Left", &[]).await?;
    let right = engine.create_task(&manager, "Right", &[]).await?;

    let mut workers = JoinSet::new();
    for candidates in [vec![left.id()], vec![right.id()], vec![left.id(), right.id()]] {
        let shared = engine.clone();
        let actor = manager.clone();
        let id = parent.id();
        workers.spawn(async move {
            shared
                .task_service
                .set_dependents(&actor, id, candidates)
                .await
        });
    }
    while let Some(joined) = workers.join_next().await {
        joined??;
    }

    let dependents: BTreeSet<_> = engine
        .tasks
        .dependents_of(parent.id())
        .await?
        .iter()
        .map(|task| task.id())
        .collect();
    let allowed = [
        BTreeSet::from([left.id()]),
        BTreeSet::from([right.id()]),
        BTreeSet::from([left.id(), right.id()]),
    ];
    eyre::ensure!(
        allowed.contains(&dependents),
        "dependents match exactly one submitted set"
    );
    Ok(())
}
