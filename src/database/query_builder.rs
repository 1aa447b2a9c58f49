use std::time::Instant;

use sqlx::{self, FromRow, PgPool, Row};

use crate::config::CONFIG;
use crate::database::manager::DatabaseError;
use crate::filter::types::SqlResult;

/// Executes generated SQL, binding its parameters in placeholder order.
/// Filters only emit text parameters; anything else binds as NULL.
pub struct QueryBuilder<T> {
    sql: SqlResult,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
{
    pub fn new(sql: SqlResult) -> Self {
        Self {
            sql,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn fetch_all(self, pool: &PgPool) -> Result<Vec<T>, DatabaseError> {
        log_query(&self.sql);
        let started = Instant::now();
        let mut q = sqlx::query_as::<_, T>(&self.sql.query);
        for p in self.sql.params.iter() {
            q = q.bind(p.as_str());
        }
        let rows = q.fetch_all(pool).await?;
        warn_if_slow(&self.sql, started);
        Ok(rows)
    }

    /// Runs a `SELECT COUNT(*) AS count ...` statement.
    pub async fn fetch_count(self, pool: &PgPool) -> Result<i64, DatabaseError> {
        log_query(&self.sql);
        let started = Instant::now();
        let mut q = sqlx::query(&self.sql.query);
        for p in self.sql.params.iter() {
            q = q.bind(p.as_str());
        }
        let row = q.fetch_one(pool).await?;
        warn_if_slow(&self.sql, started);
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }
}

fn log_query(sql: &SqlResult) {
    if CONFIG.database.enable_query_logging {
        tracing::debug!(query = %sql.query, params = ?sql.params, "executing query");
    }
}

fn warn_if_slow(sql: &SqlResult, started: Instant) {
    let settings = &CONFIG.database;
    let elapsed = started.elapsed();
    if settings.enable_slow_query_warning && elapsed.as_millis() as u64 > settings.slow_query_threshold_ms {
        tracing::warn!(
            elapsed_ms = elapsed.as_millis() as u64,
            query = %sql.query,
            "slow query"
        );
    }
}
