//! Deterministic, pure logic shared by the campaign tracker.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod classifier;
pub mod filters;
pub mod invariants;
pub mod kind;
pub mod registry;
pub mod selector;
pub mod types;
pub mod view;
