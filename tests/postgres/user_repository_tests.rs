//! User repository tests against a migrated `PostgreSQL` database.

use super::helpers::{TestDatabase, base_time, user_with_role};
use chrono::Duration;
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use taskward::user::{
    domain::{EmailAddress, PersistedUserData, Role, User, UserId, UserName},
    ports::{UserRepository, UserRepositoryError},
};

fn find(db: &TestDatabase<'_>, id: UserId) -> User {
    db.runtime
        .block_on(db.users.find_by_id(id))
        .expect("lookup should succeed")
        .expect("user should exist")
}

#[rstest]
fn stored_user_is_found_by_id_and_email(shared_test_cluster: &'static TestCluster) {
    let db = TestDatabase::create(shared_test_cluster, "user_lookup");
    let alice = db.seed_user("Alice", Role::Manager);
    let email = EmailAddress::new("ALICE@example.com").expect("valid email");

    let by_id = find(&db, alice.id());
    let by_email = db
        .runtime
        .block_on(db.users.find_by_email(&email))
        .expect("lookup should succeed")
        .expect("user should exist");

    assert_eq!(by_id, alice);
    assert_eq!(by_email.id(), alice.id());
    assert_eq!(by_email.role(), Role::Manager);
}

#[rstest]
fn duplicate_email_and_id_are_refused(shared_test_cluster: &'static TestCluster) {
    let db = TestDatabase::create(shared_test_cluster, "user_duplicates");
    let alice = db.seed_user("Alice", Role::User);
    let same_email = user_with_role("Alice", Role::Manager);
    let same_id = User::from_persisted(PersistedUserData {
        id: alice.id(),
        name: alice.name().clone(),
        email: EmailAddress::new("other@example.com").expect("valid email"),
        role: alice.role(),
        created_at: alice.created_at(),
        updated_at: alice.updated_at(),
    });

    let email_err = db
        .runtime
        .block_on(db.users.store(&same_email))
        .expect_err("duplicate email should fail");
    let id_err = db
        .runtime
        .block_on(db.users.store(&same_id))
        .expect_err("duplicate id should fail");

    assert!(matches!(email_err, UserRepositoryError::DuplicateEmail(_)));
    assert!(matches!(id_err, UserRepositoryError::DuplicateUser(id) if id == alice.id()));
}

#[rstest]
fn profile_write_from_stale_copy_keeps_role(shared_test_cluster: &'static TestCluster) {
    let db = TestDatabase::create(shared_test_cluster, "profile_role");
    let mut stale = db.seed_user("Alice", Role::User);
    db.runtime
        .block_on(db.users.update_role(
            stale.id(),
            Role::Manager,
            base_time() + Duration::minutes(1),
        ))
        .expect("role write should succeed");

    stale.rename(UserName::new("Alice Cooper").expect("valid name"), &DefaultClock);
    db.runtime
        .block_on(db.users.update_profile(&stale))
        .expect("profile write should succeed");
    let stored = find(&db, stale.id());

    assert_eq!(stored.name().as_str(), "Alice Cooper");
    assert_eq!(stored.role(), Role::Manager);
}

#[rstest]
fn profile_write_to_taken_email_is_refused(shared_test_cluster: &'static TestCluster) {
    let db = TestDatabase::create(shared_test_cluster, "profile_email");
    db.seed_user("Alice", Role::User);
    let mut bob = db.seed_user("Bob", Role::User);

    bob.change_email(
        EmailAddress::new("alice@example.com").expect("valid email"),
        &DefaultClock,
    );
    let err = db
        .runtime
        .block_on(db.users.update_profile(&bob))
        .expect_err("taken email should fail");

    assert!(matches!(err, UserRepositoryError::DuplicateEmail(_)));
    assert_eq!(find(&db, bob.id()).email().as_str(), "bob@example.com");
}

#[rstest]
fn writes_to_a_missing_user_are_not_found(shared_test_cluster: &'static TestCluster) {
    let db = TestDatabase::create(shared_test_cluster, "missing_user");
    let ghost = user_with_role("Ghost", Role::User);

    let profile_err = db
        .runtime
        .block_on(db.users.update_profile(&ghost))
        .expect_err("profile write should fail");
    let role_err = db
        .runtime
        .block_on(db.users.update_role(ghost.id(), Role::Manager, base_time()))
        .expect_err("role write should fail");

    assert!(matches!(profile_err, UserRepositoryError::NotFound(id) if id == ghost.id()));
    assert!(matches!(role_err, UserRepositoryError::NotFound(id) if id == ghost.id()));
}
