//! Data models.

pub mod config;
pub mod summary;
pub mod transaction;
