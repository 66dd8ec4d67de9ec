//! Task management: visibility, dependencies, and status transitions.
//!
//! Tasks are created by admins and managers, read by anyone whose
//! visibility scope admits them, and moved between statuses through a
//! guard that consults the authorization port and the task's direct
//! dependents. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
