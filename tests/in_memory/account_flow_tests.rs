//! Registration and role changes feeding into task access.

use super::helpers::{Engine, engine};
use rstest::rstest;
use taskward::ErrorKind;
use taskward::task::{
    domain::{TaskFilter, TaskStatus},
    services::CreateTaskRequest,
};
use taskward::user::{
    domain::{Role, RoleChangeRequest},
    services::RegisterUserRequest,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn promoted_user_gains_task_management(engine: Engine) -> Result<(), eyre::Report> {
    let admin = engine.seed_user("Ada", Role::Admin).await?;
    let registered = engine
        .accounts
        .register(RegisterUserRequest::new("Casey", "casey@example.com"))
        .await?;
    eyre::ensure!(registered.role() == Role::User, "new accounts start as users");

    let refused = engine
        .task_service
        .create_task(&registered, CreateTaskRequest::new("Plan"))
        .await;
    eyre::ensure!(
        matches!(&refused, Err(err) if err.kind() == ErrorKind::PermissionDenied),
        "plain users may not create tasks"
    );

    let promoted = engine
        .accounts
        .change_role(&admin, RoleChangeRequest::new(registered.id(), Role::Manager))
        .await?;
    let created = engine.create_task(&promoted, "Plan", &[]).await?;
    eyre::ensure!(created.owner() == promoted.id(), "creator owns the task");
    eyre::ensure!(created.status() == TaskStatus::Pending, "tasks start pending");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn demoted_manager_sees_only_owned_or_assigned_work(
    engine: Engine,
) -> Result<(), eyre::Report> {
    let admin = engine.seed_user("Ada", Role::Admin).await?;
    let manager = engine.seed_user("Morgan", Role::Manager).await?;
    let other = engine.seed_user("Riley", Role::Manager).await?;
    let own = engine.create_task(&manager, "Own backlog", &[]).await?;
    engine.create_task(&other, "Someone else's", &[]).await?;

    let before = engine
        .task_service
        .list_tasks(&manager, TaskFilter::new(), 1, Some(50))
        .await?;
    eyre::ensure!(before.total() == 2, "managers see every task");

    let demoted = engine
        .accounts
        .change_role(&admin, RoleChangeRequest::new(manager.id(), Role::User))
        .await?;
    let after = engine
        .task_service
        .list_tasks(&demoted, TaskFilter::new(), 1, Some(50))
        .await?;
    let ids: Vec<_> = after.items().iter().map(|task| task.id()).collect();
    eyre::ensure!(ids == vec![own.id()], "demoted user keeps only owned tasks");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn registered_users_can_be_assigned(engine: Engine) -> Result<(), eyre::Report> {
    let manager = engine.seed_user("Morgan", Role::Manager).await?;
    let worker = engine
        .accounts
        .register(RegisterUserRequest::new("Jordan", "jordan@example.com"))
        .await?;
    let task = engine
        .create_task(&manager, "Write release notes", &[worker.id()])
        .await?;

    let seen = engine.task_service.get_task(&worker, task.id()).await?;
    eyre::ensure!(seen.is_assigned_to(worker.id()), "assignee recorded");

    let moved = engine
        .move_task(&worker, &task, TaskStatus::InProgress)
        .await?;
    eyre::ensure!(moved.status() == TaskStatus::InProgress, "assignee may progress");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn managers_cannot_reassign_roles(engine: Engine) -> Result<(), eyre::Report> {
    let manager = engine.seed_user("Morgan", Role::Manager).await?;
    let user = engine.seed_user("Alice", Role::User).await?;
    let result = engine
        .accounts
        .change_role(&manager, RoleChangeRequest::new(user.id(), Role::Manager))
        .await;
    eyre::ensure!(
        matches!(&result, Err(err) if err.kind() == ErrorKind::PermissionDenied),
        "only admins reassign roles"
    );
    Ok(())
}
