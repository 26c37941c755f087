//! Storage backend implementations.
//!
//! - [`memory`] - in-process tables, always available
//! - [`sqlite`] - SQLite through an r2d2 pool (requires `sqlite` feature)

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;
