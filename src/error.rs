use thiserror::Error;

/// Errors surfaced by the database facade.
///
/// Both variants carry the raw driver error as their source, so callers can
/// inspect the unclassified failure. The facade itself applies no retry or
/// backoff; every error is fatal to the operation that produced it.
#[derive(Debug, Error)]
pub enum DbError {
    /// A connection could not be established or leased from the pool.
    #[error("failed to acquire a database connection: {0}")]
    Acquire(#[source] sqlx::Error),

    /// A statement failed while executing against the database.
    #[error("database query error: {0}")]
    Query(#[source] sqlx::Error),
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn display_names_the_failing_operation() {
        let acquire = DbError::Acquire(sqlx::Error::PoolClosed);
        assert!(acquire
            .to_string()
            .starts_with("failed to acquire a database connection"));

        let query = DbError::Query(sqlx::Error::PoolClosed);
        assert!(query.to_string().starts_with("database query error"));
    }

    #[test]
    fn source_exposes_the_driver_error() {
        let err = DbError::Query(sqlx::Error::PoolClosed);
        assert!(err.source().is_some());
    }
}
