//! Worksmith Database — SurrealDB connection management, schema
//! migrations, number sequences, and repository implementations for
//! the `worksmith-core` traits.
//!
//! All mutual exclusion is expressed as conditional writes against the
//! database, never as in-process locks; the crate is safe to use from
//! any number of processes.

mod connection;
mod error;
pub mod repository;
mod schema;
pub mod sequence;

pub use connection::{DbConfig, connect};
pub use error::DbError;
pub use schema::run_migrations;
