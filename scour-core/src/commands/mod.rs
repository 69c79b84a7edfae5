//! Command implementations: clean, drop, create, info.

pub mod clean;
pub mod create;
pub mod drop;
pub mod info;
