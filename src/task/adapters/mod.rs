//! Adapter implementations for task ports.

pub mod memory;
pub mod policy;
pub mod postgres;
