//! Outbound adapters implementing domain ports.
//!
//! - **persistence**: key-value storage for the registration state
//! - **submission**: the simulated signup submission round trip
//!
//! Adapters translate between domain types and storage or transport
//! representations. They contain no business logic.

pub mod persistence;
pub mod submission;
