//! Test Helper Utilities
//!
//! Shared utilities for testing mdash-layout

pub mod mock_store;

pub use mock_store::MockLayoutStore;
