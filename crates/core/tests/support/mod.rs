//! Shared fixtures for `passiae-core` integration tests.

pub mod fixtures;
