//! The metadata catalog.
//!
//! An explicit, process-wide catalog object built once at startup and passed
//! by reference to the query builder, the writer and the schema manager.
//! Registration is additive and keyed by symbolic entity keys; readers for
//! unknown keys fail with `MissingMetadata` at first use, never at
//! registration time.

pub mod column;
pub mod relation;

pub use column::{ColumnDef, Decimal, ValueKind, snake_case};
pub use relation::{RelationDef, RelationKind};

use crate::error::{OrmError, OrmResult};
use once_cell::sync::OnceCell;
use std::collections::HashMap;

/// Metadata for one entity type: table name, columns and relations.
#[derive(Debug)]
pub struct EntityDef {
    key: &'static str,
    table: String,
    columns: Vec<ColumnDef>,
    relations: Vec<RelationDef>,
    // Identifier lookup is cached after the first resolution; the catalog is
    // never mutated once built.
    identifier_cache: OnceCell<Option<usize>>,
}

impl EntityDef {
    /// Start the definition of an entity mapped to `table`.
    pub fn new(key: &'static str, table: impl Into<String>) -> Self {
        Self {
            key,
            table: table.into(),
            columns: Vec::new(),
            relations: Vec::new(),
            identifier_cache: OnceCell::new(),
        }
    }

    /// Append a column definition.
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Append a relation definition.
    pub fn relation(mut self, relation: RelationDef) -> Self {
        self.relations.push(relation);
        self
    }

    /// The catalog key of this entity.
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// The mapped table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// All declared columns, in declaration order.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// All declared relations, in declaration order.
    pub fn relations(&self) -> &[RelationDef] {
        &self.relations
    }

    /// Declared relations of one kind, in declaration order.
    pub fn relations_of(&self, kind: RelationKind) -> impl Iterator<Item = &RelationDef> {
        self.relations.iter().filter(move |r| r.kind() == kind)
    }

    /// The column mapped to `property`, if declared.
    pub fn column_for(&self, property: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.property() == property)
    }

    /// The identifier column. When several columns are flagged, the first
    /// declared wins; when none is, this is a `MissingIdentifier` error
    /// (resolved lazily and cached).
    pub fn identifier(&self) -> OrmResult<&ColumnDef> {
        let idx = self
            .identifier_cache
            .get_or_init(|| self.columns.iter().position(|c| c.is_identifier()));
        match idx {
            Some(i) => Ok(&self.columns[*i]),
            None => Err(OrmError::missing_identifier(self.key)),
        }
    }

    /// The identifier column name used for row grouping during hydration.
    /// Falls back to `"id"` when no identifier is declared so the read path
    /// never fails on metadata alone.
    pub fn identifier_column_or_default(&self) -> String {
        self.identifier()
            .map(|c| c.column_name())
            .unwrap_or_else(|_| "id".to_string())
    }

    /// Resolve a property to its column name, strictly: undeclared
    /// properties are an `UnmappedColumn` error. Used for filter and sort
    /// columns.
    pub fn column_name_strict(&self, property: &str) -> OrmResult<String> {
        self.column_for(property)
            .map(|c| c.column_name())
            .ok_or_else(|| OrmError::unmapped_column(self.key, property))
    }

    /// Resolve a property to its column name, leniently: undeclared
    /// properties fall back to the snake_case transform. Used for
    /// foreign-key properties in join construction.
    pub fn column_name_lenient(&self, property: &str) -> String {
        self.column_for(property)
            .map(|c| c.column_name())
            .unwrap_or_else(|| snake_case(property))
    }
}

/// The entity metadata catalog.
#[derive(Debug, Default)]
pub struct Catalog {
    entities: HashMap<&'static str, EntityDef>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity definition. Re-registering a key replaces the
    /// previous definition.
    pub fn register(&mut self, def: EntityDef) {
        self.entities.insert(def.key(), def);
    }

    /// Look up an entity definition, failing with `MissingMetadata` when
    /// the key was never registered or has no columns.
    pub fn entity(&self, key: &str) -> OrmResult<&EntityDef> {
        match self.entities.get(key) {
            Some(def) if !def.columns().is_empty() => Ok(def),
            _ => Err(OrmError::missing_metadata(key)),
        }
    }

    /// Look up an entity definition without signalling an error.
    pub fn get(&self, key: &str) -> Option<&EntityDef> {
        self.entities.get(key)
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the catalog has no registrations.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_def() -> EntityDef {
        EntityDef::new("user", "users")
            .column(ColumnDef::identifier("id"))
            .column(ColumnDef::new("name", ValueKind::Text))
            .relation(RelationDef::has_many("posts", "post", "authorId"))
    }

    #[test]
    fn test_registry_isolation_per_type() {
        let mut catalog = Catalog::new();
        catalog.register(user_def());
        catalog.register(
            EntityDef::new("post", "posts")
                .column(ColumnDef::identifier("id"))
                .column(ColumnDef::new("title", ValueKind::Text)),
        );

        let user_cols: Vec<_> = catalog
            .entity("user")
            .unwrap()
            .columns()
            .iter()
            .map(|c| c.property().to_string())
            .collect();
        let post_cols: Vec<_> = catalog
            .entity("post")
            .unwrap()
            .columns()
            .iter()
            .map(|c| c.property().to_string())
            .collect();

        assert_eq!(user_cols, vec!["id", "name"]);
        assert_eq!(post_cols, vec!["id", "title"]);
        assert!(!post_cols.contains(&"name".to_string()));
    }

    #[test]
    fn test_missing_metadata_on_unknown_key() {
        let catalog = Catalog::new();
        assert!(matches!(
            catalog.entity("ghost"),
            Err(OrmError::MissingMetadata { .. })
        ));
    }

    #[test]
    fn test_missing_metadata_on_empty_columns() {
        let mut catalog = Catalog::new();
        catalog.register(EntityDef::new("bare", "bare"));
        assert!(matches!(
            catalog.entity("bare"),
            Err(OrmError::MissingMetadata { .. })
        ));
    }

    #[test]
    fn test_identifier_resolution_and_cache() {
        let def = user_def();
        assert_eq!(def.identifier().unwrap().column_name(), "id");
        // Second call hits the cache and returns the same column.
        assert_eq!(def.identifier().unwrap().property(), "id");
    }

    #[test]
    fn test_missing_identifier_is_lazy() {
        let def = EntityDef::new("tag", "tags").column(ColumnDef::new("label", ValueKind::Text));
        assert!(matches!(
            def.identifier(),
            Err(OrmError::MissingIdentifier { .. })
        ));
        assert_eq!(def.identifier_column_or_default(), "id");
    }

    #[test]
    fn test_strict_and_lenient_column_resolution() {
        let def = user_def();
        assert_eq!(def.column_name_strict("name").unwrap(), "name");
        assert!(matches!(
            def.column_name_strict("missing"),
            Err(OrmError::UnmappedColumn { .. })
        ));
        assert_eq!(def.column_name_lenient("authorId"), "author_id");
    }
}
