//! Testing utilities for kafka-cloudevents
//!
//! Shared fixtures for the unit tests. Only compiled in test builds.
//!
//! # Organization
//! - `helpers.rs` - Event factories matching the binary-mode scenarios
//! - `mocks.rs` - Mock transport clients with scripted failures

#![cfg(test)]

pub mod helpers;
pub mod mocks;

// Re-export commonly used items
pub use helpers::{consumed, much_event, Much};
pub use mocks::RejectingProducer;
