//! When steps for task status transition scenarios.

use super::world::{TaskEngineWorld, run_async};
use rstest_bdd_macros::when;
use taskward::task::{
    domain::{StatusTransitionRequest, TaskFilter, TaskStatus},
    services::CreateTaskRequest,
};

#[when(r#""{name}" moves "{title}" to "{status}""#)]
fn moves_task_to(
    world: &mut TaskEngineWorld,
    name: String,
    title: String,
    status: String,
) -> Result<(), eyre::Report> {
    let target = TaskStatus::try_from(status.as_str())?;
    let actor = world.person(&name)?.clone();
    let id = world.task(&title)?.id();
    let outcome = run_async(
        world
            .service
            .change_status(&actor, StatusTransitionRequest::new(id, target)),
    );
    world.last_outcome = Some(outcome.map(|_| ()));
    Ok(())
}

#[when(r#""{name}" sets the dependents of "{title}" to "{others}""#)]
fn sets_dependents(
    world: &mut TaskEngineWorld,
    name: String,
    title: String,
    others: String,
) -> Result<(), eyre::Report> {
    let actor = world.person(&name)?.clone();
    let id = world.task(&title)?.id();
    let candidates = others
        .split(',')
        .map(str::trim)
        .map(|other| world.task(other).map(|task| task.id()))
        .collect::<Result<Vec<_>, _>>()?;
    let outcome = run_async(world.service.set_dependents(&actor, id, candidates));
    world.last_outcome = Some(outcome.map(|_| ()));
    Ok(())
}

#[when(r#""{name}" creates a task "{title}""#)]
fn creates_task(
    world: &mut TaskEngineWorld,
    name: String,
    title: String,
) -> Result<(), eyre::Report> {
    let actor = world.person(&name)?.clone();
    let outcome = run_async(
        world
            .service
            .create_task(&actor, CreateTaskRequest::new(title.as_str())),
    );
    match outcome {
        Ok(task) => {
            world.tasks_by_title.insert(title, task);
            world.last_outcome = Some(Ok(()));
        }
        Err(err) => world.last_outcome = Some(Err(err)),
    }
    Ok(())
}

#[when(r#""{name}" lists tasks"#)]
fn lists_tasks(world: &mut TaskEngineWorld, name: String) -> Result<(), eyre::Report> {
    let actor = world.person(&name)?.clone();
    let page = run_async(world.service.list_tasks(&actor, TaskFilter::new(), 1, Some(100)))?;
    world.visible_titles = page
        .items()
        .iter()
        .map(|task| task.title().as_ref().to_owned())
        .collect();
    Ok(())
}
