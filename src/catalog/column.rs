//! Column metadata.

use serde::{Deserialize, Serialize};

/// Abstract value kind of a mapped column, used to derive the dialect SQL
/// type when reconciling schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Integer column (INT / INTEGER)
    Integer,
    /// Text column (VARCHAR(255) unless a size limit is set)
    Text,
    /// Boolean column (TINYINT(1) / BOOLEAN)
    Boolean,
    /// Timestamp column (TIMESTAMP)
    Timestamp,
    /// Composite value stored as TEXT (serialized JSON)
    Json,
}

/// Decimal rendering for integer-kind columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decimal {
    /// Not a decimal column.
    None,
    /// Decimal with the conventional default precision, DECIMAL(10,2).
    Default,
    /// Decimal with explicit precision and scale.
    Precision(u8, u8),
}

/// Metadata for one mapped column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDef {
    property: String,
    column_name: Option<String>,
    kind: ValueKind,
    is_identifier: bool,
    nullable: bool,
    unique: bool,
    indexed: bool,
    size_limit: Option<u32>,
    decimal: Decimal,
}

impl ColumnDef {
    /// Create a column for `property` with the given value kind. The column
    /// name defaults to the snake_case transform of the property name.
    pub fn new(property: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            property: property.into(),
            column_name: None,
            kind,
            is_identifier: false,
            nullable: false,
            unique: false,
            indexed: false,
            size_limit: None,
            decimal: Decimal::None,
        }
    }

    /// Shorthand for the auto-incrementing integer identifier column.
    pub fn identifier(property: impl Into<String>) -> Self {
        let mut col = Self::new(property, ValueKind::Integer);
        col.is_identifier = true;
        col
    }

    /// Override the column name (instead of the snake_case default).
    pub fn with_column_name(mut self, name: impl Into<String>) -> Self {
        self.column_name = Some(name.into());
        self
    }

    /// Mark the column NULLable. Columns are NOT NULL by default.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Add a UNIQUE constraint.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Request a secondary index on this column.
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    /// Limit a text column to VARCHAR(n).
    pub fn with_size_limit(mut self, limit: u32) -> Self {
        self.size_limit = Some(limit);
        self
    }

    /// Render an integer-kind column as DECIMAL(precision, scale).
    pub fn with_decimal(mut self, precision: u8, scale: u8) -> Self {
        self.decimal = Decimal::Precision(precision, scale);
        self
    }

    /// Render an integer-kind column as DECIMAL(10,2).
    pub fn decimal(mut self) -> Self {
        self.decimal = Decimal::Default;
        self
    }

    /// The mapped property name.
    pub fn property(&self) -> &str {
        &self.property
    }

    /// The effective column name (explicit or snake_case of the property).
    pub fn column_name(&self) -> String {
        match &self.column_name {
            Some(name) => name.clone(),
            None => snake_case(&self.property),
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn is_identifier(&self) -> bool {
        self.is_identifier
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    pub fn size_limit(&self) -> Option<u32> {
        self.size_limit
    }

    pub fn decimal_spec(&self) -> Decimal {
        self.decimal
    }
}

/// snake_case transform used for defaulted column names: a lowercase letter
/// or digit followed by an uppercase letter gets an underscore inserted.
pub fn snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_lower_or_digit = false;
    for ch in s.chars() {
        if ch.is_ascii_uppercase() && prev_lower_or_digit {
            out.push('_');
        }
        prev_lower_or_digit = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        out.push(ch.to_ascii_lowercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("createdAt"), "created_at");
        assert_eq!(snake_case("userId2X"), "user_id2_x");
        assert_eq!(snake_case("already_snake"), "already_snake");
        assert_eq!(snake_case("id"), "id");
    }

    #[test]
    fn test_column_name_defaults_to_snake_case() {
        let col = ColumnDef::new("firstName", ValueKind::Text);
        assert_eq!(col.column_name(), "first_name");
    }

    #[test]
    fn test_column_name_override() {
        let col = ColumnDef::new("firstName", ValueKind::Text).with_column_name("given_name");
        assert_eq!(col.column_name(), "given_name");
    }

    #[test]
    fn test_identifier_shorthand() {
        let col = ColumnDef::identifier("id");
        assert!(col.is_identifier());
        assert_eq!(col.kind(), ValueKind::Integer);
    }
}
