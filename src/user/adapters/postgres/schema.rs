//! Diesel schema for user account persistence.

diesel::table! {
    /// User accounts and their single role.
    users (id) {
        /// User identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Lowercase email address, unique across accounts.
        #[max_length = 255]
        email -> Varchar,
        /// Role storage string.
        #[max_length = 50]
        role -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
