//! Step definitions for task status transition scenarios.

pub mod when;
pub mod world;
