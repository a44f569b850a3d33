//! Shared helpers used by ethprobe's integration and unit tests.
//!
//! This crate hosts deterministic fixtures and an in-memory node that need to
//! stay in sync across the harness unit tests and the end-to-end suite.

pub mod fake_node;
pub mod fixtures;

pub use fake_node::{FakeNode, FakeNodeBuilder};
