//! Integration tests for the metadata catalog.
//!
//! These tests verify registration, per-type isolation, identifier
//! resolution, and property-to-column resolution through the public API.

use ormlet::{Catalog, ColumnDef, EntityDef, OrmError, RelationDef, RelationKind, ValueKind};

fn blog_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.register(
        EntityDef::new("user", "users")
            .column(ColumnDef::identifier("id"))
            .column(ColumnDef::new("firstName", ValueKind::Text))
            .column(ColumnDef::new("email", ValueKind::Text).unique())
            .relation(RelationDef::has_many("posts", "post", "authorId"))
            .relation(RelationDef::has_one("profile", "profile", "userId")),
    );
    catalog.register(
        EntityDef::new("post", "posts")
            .column(ColumnDef::identifier("id"))
            .column(ColumnDef::new("title", ValueKind::Text))
            .column(ColumnDef::new("authorId", ValueKind::Integer))
            .relation(RelationDef::belongs_to("author", "user", "authorId")),
    );
    catalog
}

/// Test that two registered entities hold disjoint column metadata.
#[test]
fn test_registry_isolation_between_types() {
    let catalog = blog_catalog();

    let user_props: Vec<_> = catalog
        .entity("user")
        .unwrap()
        .columns()
        .iter()
        .map(|c| c.property().to_string())
        .collect();
    let post_props: Vec<_> = catalog
        .entity("post")
        .unwrap()
        .columns()
        .iter()
        .map(|c| c.property().to_string())
        .collect();

    assert_eq!(user_props, vec!["id", "firstName", "email"]);
    assert_eq!(post_props, vec!["id", "title", "authorId"]);
    assert!(!post_props.contains(&"email".to_string()));
}

/// Test that an unregistered key fails with MissingMetadata at lookup, not
/// at registration.
#[test]
fn test_unknown_key_is_missing_metadata() {
    let catalog = blog_catalog();
    let err = catalog.entity("comment").unwrap_err();
    assert!(matches!(err, OrmError::MissingMetadata { .. }), "got: {err:?}");
}

/// Test that a registered entity with zero columns is treated the same as
/// an unregistered one.
#[test]
fn test_empty_entity_is_missing_metadata() {
    let mut catalog = blog_catalog();
    catalog.register(EntityDef::new("tag", "tags"));
    assert!(matches!(
        catalog.entity("tag"),
        Err(OrmError::MissingMetadata { .. })
    ));
}

/// Test identifier resolution and the default column name fallback.
#[test]
fn test_identifier_resolution() {
    let catalog = blog_catalog();
    let user = catalog.entity("user").unwrap();
    assert_eq!(user.identifier().unwrap().column_name(), "id");
    assert_eq!(user.identifier_column_or_default(), "id");

    let mut catalog = Catalog::new();
    catalog.register(
        EntityDef::new("note", "notes").column(ColumnDef::new("body", ValueKind::Text)),
    );
    let note = catalog.entity("note").unwrap();
    assert!(matches!(
        note.identifier(),
        Err(OrmError::MissingIdentifier { .. })
    ));
    assert_eq!(note.identifier_column_or_default(), "id");
}

/// Test that relation targets are symbolic keys resolvable regardless of
/// declaration order.
#[test]
fn test_relations_resolve_by_symbolic_key() {
    let catalog = blog_catalog();
    let user = catalog.entity("user").unwrap();

    let posts_rel = user
        .relations_of(RelationKind::HasMany)
        .next()
        .expect("has_many relation declared");
    assert_eq!(posts_rel.target(), "post");
    // The target resolves through the catalog even though "post" was
    // registered after "user".
    assert_eq!(catalog.entity(posts_rel.target()).unwrap().table(), "posts");

    let author_rel = catalog
        .entity("post")
        .unwrap()
        .relations_of(RelationKind::BelongsTo)
        .next()
        .expect("belongs_to relation declared");
    assert_eq!(author_rel.foreign_key(), "authorId");
}

/// Test strict resolution for filter columns and lenient snake_case
/// fallback for foreign keys.
#[test]
fn test_column_resolution_modes() {
    let catalog = blog_catalog();
    let user = catalog.entity("user").unwrap();

    assert_eq!(user.column_name_strict("firstName").unwrap(), "first_name");
    assert!(matches!(
        user.column_name_strict("nickname"),
        Err(OrmError::UnmappedColumn { .. })
    ));
    // Lenient resolution never errors; undeclared properties fall back to
    // the snake_case transform.
    assert_eq!(user.column_name_lenient("someForeignKey"), "some_foreign_key");
}
