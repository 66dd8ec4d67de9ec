//! Application services for user accounts and role reassignment.

mod accounts;

pub use accounts::{
    RegisterUserRequest, UpdateProfileRequest, UserAccountError, UserAccountResult,
    UserAccountService,
};
