//! Database connection setup and access facade.
//!
//! The pool is built once from [`crate::config::Config`] and handed to
//! consumers as an owned [`Database`] value; there is no implicit
//! module-level pool.

mod params;
mod postgres;

pub use params::*;
pub use postgres::*;

#[cfg(test)]
mod tests;
