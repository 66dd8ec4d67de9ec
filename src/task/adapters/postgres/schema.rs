//! Diesel schema for task persistence.

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Optional free-form description.
        description -> Nullable<Text>,
        /// Task status.
        #[max_length = 50]
        status -> Varchar,
        /// Optional due date.
        due_date -> Nullable<Date>,
        /// Creating user.
        owner_id -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Task assignee memberships.
    task_assignees (task_id, user_id) {
        /// Assigned task.
        task_id -> Uuid,
        /// Assigned user.
        user_id -> Uuid,
    }
}

diesel::table! {
    /// Dependency edges: `dependent_id` depends on `dependency_id`.
    task_dependencies (dependency_id, dependent_id) {
        /// Task depended upon.
        dependency_id -> Uuid,
        /// Task that declared the dependency.
        dependent_id -> Uuid,
    }
}

diesel::joinable!(task_assignees -> tasks (task_id));

diesel::allow_tables_to_appear_in_same_query!(tasks, task_assignees, task_dependencies);
