//! Declared-type rendering and type-string normalization.

use crate::adapter::Dialect;
use crate::catalog::{ColumnDef, Decimal, ValueKind};
use once_cell::sync::Lazy;
use regex::Regex;

/// Integer display widths (`int(11)`) are presentation only and must not
/// count as a type difference.
static INT_DISPLAY_WIDTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(int|integer|tinyint|smallint|mediumint|bigint)\(\d+\)").expect("valid regex")
});

/// Render the full declared SQL type for one column, suffixes included.
/// The identifier column bypasses everything and becomes the dialect's
/// auto-incrementing primary key.
pub fn render_column_type(column: &ColumnDef, dialect: Dialect) -> String {
    if column.is_identifier() {
        return dialect.auto_increment_primary_key(column.kind());
    }

    let mut sql_type = match (column.kind(), column.decimal_spec(), column.size_limit()) {
        (ValueKind::Integer, Decimal::Precision(p, s), _) => format!("DECIMAL({p},{s})"),
        (ValueKind::Integer, Decimal::Default, _) => "DECIMAL(10,2)".to_string(),
        (ValueKind::Text, _, Some(limit)) => format!("VARCHAR({limit})"),
        (kind, _, _) => dialect.base_type(kind).to_string(),
    };

    sql_type.push_str(if column.is_nullable() { " NULL" } else { " NOT NULL" });

    if column.kind() == ValueKind::Timestamp && !column.is_nullable() {
        sql_type.push_str(" DEFAULT CURRENT_TIMESTAMP");
        if dialect.on_update_current_timestamp() && column.column_name() == "updated_at" {
            sql_type.push_str(" ON UPDATE CURRENT_TIMESTAMP");
        }
    }

    if column.is_unique() {
        sql_type.push_str(" UNIQUE");
    }

    sql_type
}

/// The bare type token of a rendered declared type (everything before the
/// first suffix).
pub fn leading_token(declared: &str) -> &str {
    declared.split(' ').next().unwrap_or(declared)
}

/// Normalize a type string for comparison between an introspected column
/// type and a declared one: case-fold, canonicalize `character varying`,
/// strip whitespace and integer display widths.
pub fn normalize_type(raw: &str) -> String {
    let lowered = raw
        .to_lowercase()
        .replace("character varying", "varchar")
        .replace(char::is_whitespace, "");
    INT_DISPLAY_WIDTH.replace(&lowered, "$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_display_width_is_equal() {
        assert_eq!(normalize_type("int(11)"), normalize_type("INT"));
        assert_eq!(normalize_type("bigint(20)"), "bigint");
    }

    #[test]
    fn test_varchar_lengths_differ() {
        assert_ne!(normalize_type("varchar(100)"), normalize_type("VARCHAR(255)"));
        assert_eq!(normalize_type("character varying(255)"), "varchar(255)");
    }

    #[test]
    fn test_identifier_bypasses_suffixes() {
        let id = ColumnDef::identifier("id").unique();
        assert_eq!(
            render_column_type(&id, Dialect::MySql),
            "INT PRIMARY KEY AUTO_INCREMENT"
        );
        assert_eq!(render_column_type(&id, Dialect::Postgres), "SERIAL PRIMARY KEY");
    }

    #[test]
    fn test_timestamp_defaults() {
        let created = ColumnDef::new("createdAt", ValueKind::Timestamp);
        assert_eq!(
            render_column_type(&created, Dialect::MySql),
            "TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP"
        );

        let updated = ColumnDef::new("updatedAt", ValueKind::Timestamp);
        assert_eq!(
            render_column_type(&updated, Dialect::MySql),
            "TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP"
        );
        // The ON UPDATE clause is MySQL-only.
        assert_eq!(
            render_column_type(&updated, Dialect::Postgres),
            "TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP"
        );
    }

    #[test]
    fn test_decimal_and_size_overrides() {
        let price = ColumnDef::new("price", ValueKind::Integer).with_decimal(12, 4);
        assert_eq!(render_column_type(&price, Dialect::MySql), "DECIMAL(12,4) NOT NULL");

        let amount = ColumnDef::new("amount", ValueKind::Integer).decimal().nullable();
        assert_eq!(render_column_type(&amount, Dialect::MySql), "DECIMAL(10,2) NULL");

        let code = ColumnDef::new("code", ValueKind::Text)
            .with_size_limit(40)
            .unique();
        assert_eq!(
            render_column_type(&code, Dialect::Postgres),
            "VARCHAR(40) NOT NULL UNIQUE"
        );
    }
}
