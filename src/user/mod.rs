//! User accounts and the role model for Taskward.
//!
//! Every engine entry point receives an authenticated [`domain::User`] as
//! its actor. This module owns the three roles, the capability predicates
//! derived from them, and the explicit role-change command that is the only
//! way a role is ever reassigned. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
