//! PostgreSQL driver glue.
//!
//! The neutral statement shape uses backtick quoting and `?` placeholders;
//! this adapter rewrites both into the PostgreSQL forms before execution
//! (double-quoted identifiers, `$1..$n` placeholders) and emulates
//! generated-key reporting by appending `RETURNING id` to INSERTs.

use crate::adapter::ExecOutcome;
use crate::adapter::config::AdapterConfig;
use crate::adapter::decode;
use crate::error::OrmResult;
use crate::value::{SqlRow, SqlValue};
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::query::Query;
use sqlx::{Executor, Postgres, Row};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PostgresAdapter {
    pool: PgPool,
}

impl PostgresAdapter {
    /// Open a connection pool from the adapter config.
    pub async fn connect(config: &AdapterConfig) -> OrmResult<Self> {
        config.validate()?;
        let options = PgConnectOptions::from_str(&config.url).map_err(sqlx::Error::from)?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections_or_default())
            .min_connections(config.min_connections_or_default())
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_or_default()))
            .idle_timeout(Duration::from_secs(config.idle_timeout_or_default()))
            .test_before_acquire(config.test_before_acquire_or_default())
            .connect_with(options)
            .await?;
        debug!(max_connections = config.max_connections_or_default(), "postgres pool opened");
        Ok(Self { pool })
    }

    pub async fn acquire(&self) -> OrmResult<PoolConnection<Postgres>> {
        Ok(self.pool.acquire().await?)
    }

    pub async fn query(
        &self,
        sql: &str,
        params: &[SqlValue],
        conn: Option<&mut PoolConnection<Postgres>>,
    ) -> OrmResult<Vec<SqlRow>> {
        let sql = prepare_sql(sql);
        let query = build_query(&sql, params);
        let rows = match conn {
            Some(c) => query.fetch_all(&mut **c).await?,
            None => query.fetch_all(&self.pool).await?,
        };
        Ok(rows.iter().map(decode::postgres_row).collect())
    }

    pub async fn execute(
        &self,
        sql: &str,
        params: &[SqlValue],
        conn: Option<&mut PoolConnection<Postgres>>,
    ) -> OrmResult<ExecOutcome> {
        let sql = prepare_sql(sql);
        if is_insert(&sql) {
            // PostgreSQL reports no generated key on plain INSERT; fetch it
            // through RETURNING instead.
            let sql = format!("{} RETURNING id", sql.trim_end().trim_end_matches(';'));
            let query = build_query(&sql, params);
            let row = match conn {
                Some(c) => query.fetch_optional(&mut **c).await?,
                None => query.fetch_optional(&self.pool).await?,
            };
            let insert_id = row.and_then(|r| r.try_get::<i64, _>("id").or_else(|_| {
                r.try_get::<i32, _>("id").map(i64::from)
            }).ok());
            return Ok(ExecOutcome {
                insert_id,
                affected_rows: 1,
            });
        }
        let query = build_query(&sql, params);
        let result = match conn {
            Some(c) => query.execute(&mut **c).await?,
            None => query.execute(&self.pool).await?,
        };
        Ok(ExecOutcome {
            insert_id: None,
            affected_rows: result.rows_affected(),
        })
    }

    /// Execute a statement that takes no parameters outside the pool's
    /// prepared-statement path (DDL).
    pub async fn execute_raw(&self, sql: &str) -> OrmResult<()> {
        self.pool.execute(prepare_sql(sql).as_str()).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn is_insert(sql: &str) -> bool {
    sql.trim_start().to_ascii_uppercase().starts_with("INSERT")
}

/// Rewrite a neutral statement into PostgreSQL syntax: backticks become
/// double quotes, each `?` becomes the next `$n`. Both rewrites skip text
/// inside single-quoted string literals.
pub fn prepare_sql(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut in_string = false;
    let mut next_placeholder = 1u32;
    for ch in sql.chars() {
        match ch {
            '\'' => {
                in_string = !in_string;
                out.push(ch);
            }
            '`' if !in_string => out.push('"'),
            '?' if !in_string => {
                out.push('$');
                out.push_str(&next_placeholder.to_string());
                next_placeholder += 1;
            }
            _ => out.push(ch),
        }
    }
    out
}

fn build_query<'q>(sql: &'q str, params: &'q [SqlValue]) -> Query<'q, Postgres, PgArguments> {
    let mut query = sqlx::query(sql);
    for value in params {
        query = bind_value(query, value);
    }
    query
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &'q SqlValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        SqlValue::Null => query.bind(Option::<String>::None),
        SqlValue::Bool(v) => query.bind(*v),
        SqlValue::Int(v) => query.bind(*v),
        SqlValue::Float(v) => query.bind(*v),
        SqlValue::Text(v) => query.bind(v.as_str()),
        SqlValue::Timestamp(v) => query.bind(*v),
        SqlValue::Json(v) => query.bind(v.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_sql_rewrites_quotes_and_placeholders() {
        let sql = "SELECT t1.`name` FROM `users` t1 WHERE t1.`name` = ? AND t1.`age` > ?;";
        assert_eq!(
            prepare_sql(sql),
            "SELECT t1.\"name\" FROM \"users\" t1 WHERE t1.\"name\" = $1 AND t1.\"age\" > $2;"
        );
    }

    #[test]
    fn test_prepare_sql_skips_string_literals() {
        let sql = "SELECT * FROM `logs` WHERE msg = 'what?' AND lvl = ?";
        assert_eq!(
            prepare_sql(sql),
            "SELECT * FROM \"logs\" WHERE msg = 'what?' AND lvl = $1"
        );
    }

    #[test]
    fn test_insert_detection() {
        assert!(is_insert("INSERT INTO `users` ..."));
        assert!(is_insert("  insert into t ..."));
        assert!(!is_insert("UPDATE `users` SET ..."));
    }
}
