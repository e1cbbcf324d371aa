//! Database models and queries

pub mod init;
pub mod models;
pub mod seed;

pub use init::*;
pub use models::*;
pub use seed::*;
