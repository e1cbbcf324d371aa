//! # Metrics Dashboard Common Library
//!
//! Shared code for the dashboard layout services:
//! - Entity and metric row models
//! - Schema bootstrap and connection helpers
//! - Service configuration loading
//! - Common error type

pub mod config;
pub mod db;
pub mod error;
pub mod uuid_utils;

pub use error::{Error, Result};
