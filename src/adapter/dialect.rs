//! Dialect policy.
//!
//! All dialect-specific SQL generation details are concentrated here as a
//! small fixed set of operations; the query builder and schema manager
//! depend on this policy rather than branching on a tag ad hoc. Placeholder
//! and identifier-quoting translation is the per-dialect driver glue's job
//! (the core always emits backticks and `?`).

use crate::catalog::ValueKind;
use serde::{Deserialize, Serialize};

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    MySql,
    Postgres,
}

impl Dialect {
    /// Base SQL type for an abstract value kind.
    pub fn base_type(self, kind: ValueKind) -> &'static str {
        match kind {
            ValueKind::Integer => match self {
                Self::MySql => "INT",
                Self::Postgres => "INTEGER",
            },
            ValueKind::Text => "VARCHAR(255)",
            ValueKind::Boolean => match self {
                Self::MySql => "TINYINT(1)",
                Self::Postgres => "BOOLEAN",
            },
            ValueKind::Timestamp => "TIMESTAMP",
            ValueKind::Json => "TEXT",
        }
    }

    /// Render the auto-incrementing primary-key definition in the dialect's
    /// native idiom.
    pub fn auto_increment_primary_key(self, kind: ValueKind) -> String {
        match self {
            Self::Postgres => "SERIAL PRIMARY KEY".to_string(),
            Self::MySql => format!("{} PRIMARY KEY AUTO_INCREMENT", self.base_type(kind)),
        }
    }

    /// Whether secondary indexes are declared inline in CREATE TABLE.
    /// Inline `INDEX` syntax is not portable; Postgres issues separate
    /// CREATE INDEX statements after table creation instead.
    pub fn inline_index_creation(self) -> bool {
        matches!(self, Self::MySql)
    }

    /// Whether `ON UPDATE CURRENT_TIMESTAMP` is supported for the
    /// conventionally named `updated_at` column.
    pub fn on_update_current_timestamp(self) -> bool {
        matches!(self, Self::MySql)
    }

    /// Information-schema query returning (column name, column type) rows
    /// for one table in the current database/schema. Written with the
    /// dialect-neutral `?` placeholder; the driver glue translates it.
    pub fn columns_query(self) -> &'static str {
        match self {
            Self::MySql => queries::MYSQL_COLUMNS,
            Self::Postgres => queries::POSTGRES_COLUMNS,
        }
    }

    /// Result field carrying the column name in `columns_query` rows.
    pub fn column_name_field(self) -> &'static str {
        match self {
            Self::MySql => "COLUMN_NAME",
            Self::Postgres => "column_name",
        }
    }

    /// Result field carrying the column type in `columns_query` rows.
    pub fn column_type_field(self) -> &'static str {
        match self {
            Self::MySql => "COLUMN_TYPE",
            Self::Postgres => "column_type",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MySql => write!(f, "mysql"),
            Self::Postgres => write!(f, "postgres"),
        }
    }
}

mod queries {
    pub const MYSQL_COLUMNS: &str = r#"
        SELECT COLUMN_NAME, COLUMN_TYPE
        FROM INFORMATION_SCHEMA.COLUMNS
        WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?
        "#;

    pub const POSTGRES_COLUMNS: &str = r#"
        SELECT column_name,
               udt_name || COALESCE('(' || character_maximum_length || ')', '') AS column_type
        FROM information_schema.columns
        WHERE table_schema = current_schema() AND table_name = ?
        "#;
}
