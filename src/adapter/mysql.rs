//! MySQL driver glue.
//!
//! The neutral statement shape (backtick quoting, `?` placeholders) is
//! already MySQL-native, so this adapter binds and executes verbatim.

use crate::adapter::config::AdapterConfig;
use crate::adapter::decode;
use crate::adapter::ExecOutcome;
use crate::error::OrmResult;
use crate::value::{SqlRow, SqlValue};
use sqlx::mysql::{MySqlArguments, MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::pool::PoolConnection;
use sqlx::query::Query;
use sqlx::{MySql, Executor};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct MySqlAdapter {
    pool: MySqlPool,
}

impl MySqlAdapter {
    /// Open a connection pool from the adapter config.
    pub async fn connect(config: &AdapterConfig) -> OrmResult<Self> {
        config.validate()?;
        let options = MySqlConnectOptions::from_str(&config.url)
            .map_err(sqlx::Error::from)?
            .charset("utf8mb4");
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections_or_default())
            .min_connections(config.min_connections_or_default())
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_or_default()))
            .idle_timeout(Duration::from_secs(config.idle_timeout_or_default()))
            .test_before_acquire(config.test_before_acquire_or_default())
            .connect_with(options)
            .await?;
        debug!(max_connections = config.max_connections_or_default(), "mysql pool opened");
        Ok(Self { pool })
    }

    pub async fn acquire(&self) -> OrmResult<PoolConnection<MySql>> {
        Ok(self.pool.acquire().await?)
    }

    pub async fn query(
        &self,
        sql: &str,
        params: &[SqlValue],
        conn: Option<&mut PoolConnection<MySql>>,
    ) -> OrmResult<Vec<SqlRow>> {
        let query = build_query(sql, params);
        let rows = match conn {
            Some(c) => query.fetch_all(&mut **c).await?,
            None => query.fetch_all(&self.pool).await?,
        };
        Ok(rows.iter().map(decode::mysql_row).collect())
    }

    pub async fn execute(
        &self,
        sql: &str,
        params: &[SqlValue],
        conn: Option<&mut PoolConnection<MySql>>,
    ) -> OrmResult<ExecOutcome> {
        let query = build_query(sql, params);
        let result = match conn {
            Some(c) => query.execute(&mut **c).await?,
            None => query.execute(&self.pool).await?,
        };
        // last_insert_id is 0 when the statement touched no auto-increment
        // column, which callers must read as "no generated key".
        let insert_id = match result.last_insert_id() {
            0 => None,
            id => Some(id as i64),
        };
        Ok(ExecOutcome {
            insert_id,
            affected_rows: result.rows_affected(),
        })
    }

    /// Execute a statement that takes no parameters outside the pool's
    /// prepared-statement path (DDL).
    pub async fn execute_raw(&self, sql: &str) -> OrmResult<()> {
        self.pool.execute(sql).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn build_query<'q>(sql: &'q str, params: &'q [SqlValue]) -> Query<'q, MySql, MySqlArguments> {
    let mut query = sqlx::query(sql);
    for value in params {
        query = bind_value(query, value);
    }
    query
}

fn bind_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: &'q SqlValue,
) -> Query<'q, MySql, MySqlArguments> {
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
