//! Database adapters.
//!
//! One enum per concern instead of trait objects: [`Adapter`] dispatches to
//! the driver-specific glue (avoids the lowest-common-denominator problems
//! of a generic driver), [`Connection`] holds a checked-out pool connection
//! so a sequence of statements can be pinned to one session.

pub mod config;
pub mod decode;
pub mod dialect;
pub mod mock;
pub mod mysql;
pub mod postgres;

pub use config::AdapterConfig;
pub use dialect::Dialect;
pub use mock::{MockAdapter, RecordedStatement};
pub use mysql::MySqlAdapter;
pub use postgres::PostgresAdapter;

use crate::error::OrmResult;
use crate::value::{SqlRow, SqlValue};
use sqlx::pool::PoolConnection;
use sqlx::{MySql, Postgres};
use tracing::debug;

/// Outcome of a write statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOutcome {
    /// Generated key of an INSERT, when the dialect reported one.
    pub insert_id: Option<i64>,
    /// Rows touched by the statement.
    pub affected_rows: u64,
}

/// A checked-out connection. Dropping it returns the connection to its pool.
pub enum Connection {
    MySql(PoolConnection<MySql>),
    Postgres(PoolConnection<Postgres>),
    Mock,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MySql(_) => write!(f, "Connection::MySql"),
            Self::Postgres(_) => write!(f, "Connection::Postgres"),
            Self::Mock => write!(f, "Connection::Mock"),
        }
    }
}

/// Database-specific adapter (avoids AnyPool limitations).
#[derive(Debug, Clone)]
pub enum Adapter {
    MySql(MySqlAdapter),
    Postgres(PostgresAdapter),
    Mock(MockAdapter),
}

impl Adapter {
    /// Open an adapter for the dialect named by the config URL scheme.
    pub async fn connect(config: &AdapterConfig) -> OrmResult<Self> {
        match config.dialect()? {
            Dialect::MySql => Ok(Self::MySql(MySqlAdapter::connect(config).await?)),
            Dialect::Postgres => Ok(Self::Postgres(PostgresAdapter::connect(config).await?)),
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            Self::MySql(_) => Dialect::MySql,
            Self::Postgres(_) => Dialect::Postgres,
            Self::Mock(mock) => mock.dialect(),
        }
    }

    /// Check out a dedicated connection for a statement sequence.
    pub async fn acquire(&self) -> OrmResult<Connection> {
        match self {
            Self::MySql(adapter) => Ok(Connection::MySql(adapter.acquire().await?)),
            Self::Postgres(adapter) => Ok(Connection::Postgres(adapter.acquire().await?)),
            Self::Mock(_) => Ok(Connection::Mock),
        }
    }

    /// Run a row-returning statement. With `conn`, the statement is pinned
    /// to that connection; otherwise any pooled connection serves it.
    pub async fn query(
        &self,
        sql: &str,
        params: &[SqlValue],
        conn: Option<&mut Connection>,
    ) -> OrmResult<Vec<SqlRow>> {
        debug!(sql = %sql, params = params.len(), "query");
        match (self, conn) {
            (Self::MySql(adapter), Some(Connection::MySql(c))) => {
                adapter.query(sql, params, Some(c)).await
            }
            (Self::MySql(adapter), _) => adapter.query(sql, params, None).await,
            (Self::Postgres(adapter), Some(Connection::Postgres(c))) => {
                adapter.query(sql, params, Some(c)).await
            }
            (Self::Postgres(adapter), _) => adapter.query(sql, params, None).await,
            (Self::Mock(mock), _) => mock.query(sql, params),
        }
    }

    /// Run a write statement and report its outcome.
    pub async fn execute(
        &self,
        sql: &str,
        params: &[SqlValue],
        conn: Option<&mut Connection>,
    ) -> OrmResult<ExecOutcome> {
        debug!(sql = %sql, params = params.len(), "execute");
        match (self, conn) {
            (Self::MySql(adapter), Some(Connection::MySql(c))) => {
                adapter.execute(sql, params, Some(c)).await
            }
            (Self::MySql(adapter), _) => adapter.execute(sql, params, None).await,
            (Self::Postgres(adapter), Some(Connection::Postgres(c))) => {
                adapter.execute(sql, params, Some(c)).await
            }
            (Self::Postgres(adapter), _) => adapter.execute(sql, params, None).await,
            (Self::Mock(mock), _) => mock.execute(sql, params),
        }
    }

    /// Run parameterless DDL.
    pub async fn execute_raw(&self, sql: &str) -> OrmResult<()> {
        debug!(sql = %sql, "execute_raw");
        match self {
            Self::MySql(adapter) => adapter.execute_raw(sql).await,
            Self::Postgres(adapter) => adapter.execute_raw(sql).await,
            Self::Mock(mock) => {
                mock.execute(sql, &[])?;
                Ok(())
            }
        }
    }

    /// Close the underlying pool.
    pub async fn close(&self) {
        match self {
            Self::MySql(adapter) => adapter.close().await,
            Self::Postgres(adapter) => adapter.close().await,
            Self::Mock(_) => {}
        }
    }
}
