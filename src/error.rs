//! Error types for the ORM core.
//!
//! This module defines all error types using `thiserror`. Validation errors
//! (operator, direction, page parameters, unmapped columns) are raised before
//! any SQL is issued; driver-level failures are wrapped with context
//! (entity or table name) and carry the original cause.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrmError {
    /// No table or column metadata registered for an entity key.
    /// Detected at first query/save, not at registration time.
    #[error("no metadata registered for entity '{entity}'")]
    MissingMetadata { entity: String },

    /// No column on the entity is flagged as the identifier.
    #[error("no identifier column declared for entity '{entity}'")]
    MissingIdentifier { entity: String },

    /// A filter used an operator outside the allow-list.
    #[error("invalid operator used: {operator}")]
    InvalidOperator { operator: String },

    /// An ORDER BY direction other than ASC/DESC.
    #[error("invalid ORDER BY direction: {direction}")]
    InvalidDirection { direction: String },

    /// A negative LIMIT or OFFSET.
    #[error("invalid value for LIMIT or OFFSET: {value}")]
    InvalidPageParameter { value: i64 },

    /// A filter or sort referenced a property that is not a mapped column.
    #[error("property '{property}' is not a mapped column on entity '{entity}'")]
    UnmappedColumn { entity: String, property: String },

    /// A unique or primary-key constraint violation surfaced from the driver.
    #[error("duplicate entry violation on '{table}'")]
    DuplicateEntry {
        table: String,
        #[source]
        source: Box<OrmError>,
    },

    /// A write failed for a reason other than a duplicate key.
    #[error("failed to save entity '{entity}'")]
    SaveFailed {
        entity: String,
        #[source]
        source: Box<OrmError>,
    },

    /// A read failed at the driver level.
    #[error("query failed for '{context}'")]
    QueryFailed {
        context: String,
        #[source]
        source: Box<OrmError>,
    },

    /// Connection or pool-level failure (bad URL, pool closed, mismatched
    /// transaction connection).
    #[error("connection error: {message}")]
    Connection { message: String },

    /// Raw driver error, annotated with the SQLSTATE when the driver
    /// reported one.
    #[error("database driver error{}", sql_state.as_deref().map(|s| format!(" (SQLSTATE: {s})")).unwrap_or_default())]
    Driver {
        sql_state: Option<String>,
        unique_violation: bool,
        #[source]
        source: sqlx::Error,
    },
}

impl OrmError {
    /// Create a metadata-missing error.
    pub fn missing_metadata(entity: impl Into<String>) -> Self {
        Self::MissingMetadata {
            entity: entity.into(),
        }
    }

    /// Create an identifier-missing error.
    pub fn missing_identifier(entity: impl Into<String>) -> Self {
        Self::MissingIdentifier {
            entity: entity.into(),
        }
    }

    /// Create an invalid-operator error.
    pub fn invalid_operator(operator: impl Into<String>) -> Self {
        Self::InvalidOperator {
            operator: operator.into(),
        }
    }

    /// Create an invalid-direction error.
    pub fn invalid_direction(direction: impl Into<String>) -> Self {
        Self::InvalidDirection {
            direction: direction.into(),
        }
    }

    /// Create an unmapped-column error.
    pub fn unmapped_column(entity: impl Into<String>, property: impl Into<String>) -> Self {
        Self::UnmappedColumn {
            entity: entity.into(),
            property: property.into(),
        }
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Wrap a lower-level error as a failed save on `entity`.
    pub fn save_failed(entity: impl Into<String>, source: OrmError) -> Self {
        Self::SaveFailed {
            entity: entity.into(),
            source: Box::new(source),
        }
    }

    /// Wrap a lower-level error as a failed query with `context`.
    pub fn query_failed(context: impl Into<String>, source: OrmError) -> Self {
        Self::QueryFailed {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Whether this error (or its cause chain) is a unique-key violation.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Driver {
                unique_violation, ..
            } => *unique_violation,
            Self::DuplicateEntry { .. } => true,
            Self::SaveFailed { source, .. } | Self::QueryFailed { source, .. } => {
                source.is_unique_violation()
            }
            _ => false,
        }
    }

    /// The SQLSTATE reported by the driver, if any.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::Driver { sql_state, .. } => sql_state.as_deref(),
            Self::DuplicateEntry { source, .. }
            | Self::SaveFailed { source, .. }
            | Self::QueryFailed { source, .. } => source.sql_state(),
            _ => None,
        }
    }
}

/// Convert sqlx errors, capturing the SQLSTATE and the unique-violation
/// signal so persistence can distinguish `DuplicateEntry` from `SaveFailed`.
impl From<sqlx::Error> for OrmError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolClosed => OrmError::connection("connection pool is closed"),
            sqlx::Error::PoolTimedOut => {
                OrmError::connection("timed out acquiring a pooled connection")
            }
            sqlx::Error::Configuration(msg) => {
                OrmError::connection(format!("invalid connection configuration: {msg}"))
            }
            other => {
                let (sql_state, unique_violation) = match other.as_database_error() {
                    Some(db_err) => (
                        db_err.code().map(|c| c.to_string()),
                        db_err.is_unique_violation(),
                    ),
                    None => (None, false),
                };
                OrmError::Driver {
                    sql_state,
                    unique_violation,
                    source: other,
                }
            }
        }
    }
}

/// Result type alias for ORM operations.
pub type OrmResult<T> = Result<T, OrmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OrmError::invalid_operator("BOGUS");
        assert_eq!(err.to_string(), "invalid operator used: BOGUS");
    }

    #[test]
    fn test_unmapped_column_display() {
        let err = OrmError::unmapped_column("user", "nickname");
        assert!(err.to_string().contains("nickname"));
        assert!(err.to_string().contains("user"));
    }

    #[test]
    fn test_unique_violation_propagates_through_wrapping() {
        let driver = OrmError::Driver {
            sql_state: Some("23000".to_string()),
            unique_violation: true,
            source: sqlx::Error::Protocol("Duplicate entry 'a@b' for key 'email'".into()),
        };
        assert!(driver.is_unique_violation());

        let wrapped = OrmError::save_failed("user", driver);
        assert!(wrapped.is_unique_violation());
        assert_eq!(wrapped.sql_state(), Some("23000"));
    }

    #[test]
    fn test_pool_errors_map_to_connection() {
        let err: OrmError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, OrmError::Connection { .. }));
    }
}
