use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::database::params::SqlValue;
use crate::error::{DbError, DbResult};

pub type DbPool = PgPool;

/// Owned handle to a PostgreSQL connection pool.
///
/// Built once at startup with [`Database::connect`] and passed to consumers;
/// cloning is cheap and all clones share the same pool. Concurrency is
/// bounded by the pool itself: at most `max_connections` statements run at
/// once and excess acquisitions queue until the acquire timeout.
#[derive(Clone, Debug)]
pub struct Database {
    pool: PgPool,
    log_queries: bool,
}

/// Rows returned by a statement, in result-set order, with the row count.
pub struct QueryOutput {
    pub rows: Vec<PgRow>,
    pub row_count: u64,
}

// `PgRow` does not implement `Debug`, so derive is unavailable; summarise the
// result set by its row count instead of dumping every row.
impl std::fmt::Debug for QueryOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryOutput")
            .field("rows", &format_args!("[{} rows]", self.rows.len()))
            .field("row_count", &self.row_count)
            .finish()
    }
}

impl Database {
    /// Create the connection pool and verify connectivity.
    ///
    /// Pool sizing and timeouts come from [`Config`]; every newly
    /// established physical connection is logged.
    pub async fn connect(config: &Config) -> DbResult<Self> {
        let pool = pool_options(config)
            .connect(&config.database_url)
            .await
            .map_err(|err| {
                error!("Database connection error: {}", err);
                DbError::Acquire(err)
            })?;

        info!("Connected to PostgreSQL database");

        Ok(Self {
            pool,
            log_queries: config.is_development(),
        })
    }

    /// Create the pool without touching the network.
    ///
    /// Physical connections are established on first use, so an unreachable
    /// server only surfaces once an operation runs. Fails only on an
    /// unparseable connection URL.
    pub fn connect_lazy(config: &Config) -> DbResult<Self> {
        let pool = pool_options(config)
            .connect_lazy(&config.database_url)
            .map_err(|err| {
                error!("Database connection error: {}", err);
                DbError::Acquire(err)
            })?;

        Ok(Self {
            pool,
            log_queries: config.is_development(),
        })
    }

    /// Direct access to the underlying pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Execute a parameterized statement against the pool and collect its
    /// result set.
    ///
    /// Failures are logged and re-raised; the caller decides what to do with
    /// them.
    pub async fn query(&self, sql: &str, params: &[SqlValue]) -> DbResult<QueryOutput> {
        let start = Instant::now();

        let mut query = sqlx::query(sql);
        for param in params {
            query = param.bind_to(query);
        }

        let rows = query.fetch_all(&self.pool).await.map_err(|err| {
            error!("Database query error: {}", err);
            DbError::Query(err)
        })?;

        let output = QueryOutput {
            row_count: rows.len() as u64,
            rows,
        };

        if self.log_queries {
            debug!(
                "Query executed: duration={}ms rows={} command={}",
                start.elapsed().as_millis(),
                output.row_count,
                command_verb(sql)
            );
        }

        Ok(output)
    }

    /// Execute a statement that returns no rows, reporting how many rows it
    /// affected.
    pub async fn execute(&self, sql: &str, params: &[SqlValue]) -> DbResult<u64> {
        let start = Instant::now();

        let mut query = sqlx::query(sql);
        for param in params {
            query = param.bind_to(query);
        }

        let result = query.execute(&self.pool).await.map_err(|err| {
            error!("Database query error: {}", err);
            DbError::Query(err)
        })?;

        if self.log_queries {
            debug!(
                "Query executed: duration={}ms rows={} command={}",
                start.elapsed().as_millis(),
                result.rows_affected(),
                command_verb(sql)
            );
        }

        Ok(result.rows_affected())
    }

    /// Lease a single connection for multi-statement use, e.g. transactions.
    ///
    /// The connection returns to the pool when the handle is dropped.
    pub async fn get_client(&self) -> DbResult<PoolConnection<Postgres>> {
        self.pool.acquire().await.map_err(|err| {
            error!("Error getting database client: {}", err);
            DbError::Acquire(err)
        })
    }

    /// Probe connectivity with a liveness query.
    ///
    /// Leases a connection, asks the server for its current time, and
    /// releases the connection. Never errors: every failure is logged and
    /// collapsed into `false`, which makes this safe to call from health
    /// checks.
    pub async fn test_connection(&self) -> bool {
        let mut client = match self.pool.acquire().await {
            Ok(client) => client,
            Err(err) => {
                error!("Database connection failed: {}", err);
                return false;
            }
        };

        match sqlx::query_scalar::<_, DateTime<Utc>>("SELECT NOW()")
            .fetch_one(&mut *client)
            .await
        {
            Ok(current_time) => {
                info!("Database connection successful");
                info!("Current database time: {}", current_time);
                true
            }
            Err(err) => {
                error!("Database connection failed: {}", err);
                false
            }
        }
    }

    /// Drain in-flight work and close every pooled connection.
    ///
    /// Intended to run once at process termination; operations issued after
    /// this fail promptly with a pool-closed error instead of hanging.
    pub async fn shutdown(&self) {
        info!("Shutting down database connections...");
        self.pool.close().await;
        info!("Database connections closed");
    }
}

fn pool_options(config: &Config) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .idle_timeout(Duration::from_millis(config.idle_timeout_ms))
        .acquire_timeout(Duration::from_millis(config.connect_timeout_ms))
        .after_connect(|_conn, _meta| {
            Box::pin(async move {
                debug!("New database connection established");
                Ok(())
            })
        })
}

/// Leading command verb of a statement, for the development query log.
fn command_verb(sql: &str) -> &str {
    sql.split_whitespace().next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_verb_takes_leading_word() {
        assert_eq!(command_verb("SELECT * FROM users"), "SELECT");
        assert_eq!(command_verb("  insert into t values (1)"), "insert");
    }

    #[test]
    fn command_verb_of_empty_statement_is_empty() {
        assert_eq!(command_verb(""), "");
        assert_eq!(command_verb("   "), "");
    }
}
