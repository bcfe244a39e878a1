//! HARBOR - PostgreSQL access layer for backend services.
//!
//! One bounded connection pool, configured from the environment, behind a
//! small facade: run statements against the pool, lease a connection for
//! multi-statement sessions, probe liveness, and shut down cleanly at
//! process exit.

pub mod config;
pub mod database;
pub mod error;

pub use config::Config;
pub use database::{Database, DbPool, QueryOutput, SqlValue};
pub use error::{DbError, DbResult};
