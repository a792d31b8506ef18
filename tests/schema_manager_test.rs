//! Integration tests for schema reconciliation.
//!
//! These tests verify the create path per dialect, the additive diff path,
//! and the type normalization rules, all against the scripted adapter.

use ormlet::{
    Adapter, Catalog, ColumnDef, Dialect, EntityDef, MockAdapter, Orm, SqlRow, SqlValue,
    ValueKind,
};

fn row(pairs: &[(&str, &str)]) -> SqlRow {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), SqlValue::Text(v.to_string())))
        .collect()
}

fn user_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.register(
        EntityDef::new("user", "users")
            .column(ColumnDef::identifier("id"))
            .column(ColumnDef::new("name", ValueKind::Text))
            .column(ColumnDef::new("age", ValueKind::Integer).nullable())
            .column(ColumnDef::new("email", ValueKind::Text).unique().indexed()),
    );
    catalog
}

fn mock_orm(dialect: Dialect) -> (Orm, MockAdapter) {
    let mock = MockAdapter::new(dialect);
    (Orm::new(user_catalog(), Adapter::Mock(mock.clone())), mock)
}

/// Test the MySQL create path: one CREATE TABLE with inline index and the
/// native auto-increment primary key.
#[tokio::test]
async fn test_create_table_mysql() {
    let (orm, mock) = mock_orm(Dialect::MySql);
    mock.push_query_result(vec![]); // introspection: table absent

    let report = orm.migrate(&["user"]).await.unwrap();

    let log = mock.statements();
    assert_eq!(log.len(), 2, "introspection plus one CREATE TABLE");
    assert_eq!(
        log[1].sql,
        "CREATE TABLE `users` (\
         `id` INT PRIMARY KEY AUTO_INCREMENT, \
         `name` VARCHAR(255) NOT NULL, \
         `age` INT NULL, \
         `email` VARCHAR(255) NOT NULL UNIQUE, \
         INDEX `email` (`email`));"
    );
    assert_eq!(
        report.changes_for("users").unwrap(),
        &[
            "+ id (added)".to_string(),
            "+ name (added)".to_string(),
            "+ age (added)".to_string(),
            "+ email (added)".to_string(),
        ]
    );
}

/// Test the Postgres create path: SERIAL PRIMARY KEY and a separate
/// CREATE INDEX statement instead of an inline index.
#[tokio::test]
async fn test_create_table_postgres() {
    let (orm, mock) = mock_orm(Dialect::Postgres);
    mock.push_query_result(vec![]);

    orm.migrate(&["user"]).await.unwrap();

    let log = mock.statements();
    assert_eq!(log.len(), 3, "introspection, CREATE TABLE, CREATE INDEX");
    assert_eq!(
        log[1].sql,
        "CREATE TABLE `users` (\
         `id` SERIAL PRIMARY KEY, \
         `name` VARCHAR(255) NOT NULL, \
         `age` INTEGER NULL, \
         `email` VARCHAR(255) NOT NULL UNIQUE);"
    );
    assert_eq!(
        log[2].sql,
        "CREATE INDEX `idx_users_email` ON `users` (`email`);"
    );
}

/// Test the diff path: a declared column absent from the live table emits
/// exactly one ADD COLUMN and nothing for matching columns.
#[tokio::test]
async fn test_diff_adds_missing_column_only() {
    let (orm, mock) = mock_orm(Dialect::MySql);
    mock.push_query_result(vec![
        row(&[("COLUMN_NAME", "id"), ("COLUMN_TYPE", "int(11)")]),
        row(&[("COLUMN_NAME", "name"), ("COLUMN_TYPE", "varchar(255)")]),
        row(&[("COLUMN_NAME", "email"), ("COLUMN_TYPE", "varchar(255)")]),
    ]);

    let report = orm.migrate(&["user"]).await.unwrap();

    let alters: Vec<_> = mock
        .statements()
        .iter()
        .skip(1) // introspection
        .map(|s| s.sql.clone())
        .collect();
    assert_eq!(alters, vec!["ALTER TABLE `users` ADD COLUMN `age` INT NULL;".to_string()]);
    assert_eq!(
        report.changes_for("users").unwrap(),
        &["+ age (added)".to_string()]
    );
}

/// Test type normalization: int display widths are equal, varchar lengths
/// are not.
#[tokio::test]
async fn test_type_normalization_drives_modify() {
    let (orm, mock) = mock_orm(Dialect::MySql);
    mock.push_query_result(vec![
        row(&[("COLUMN_NAME", "id"), ("COLUMN_TYPE", "int(11)")]),
        row(&[("COLUMN_NAME", "name"), ("COLUMN_TYPE", "varchar(100)")]),
        row(&[("COLUMN_NAME", "age"), ("COLUMN_TYPE", "int(11)")]),
        row(&[("COLUMN_NAME", "email"), ("COLUMN_TYPE", "varchar(255)")]),
    ]);

    let report = orm.migrate(&["user"]).await.unwrap();

    let alters: Vec<_> = mock
        .statements()
        .iter()
        .skip(1)
        .map(|s| s.sql.clone())
        .collect();
    // age keeps its int(11); only name's length mismatch triggers a MODIFY
    // with the full declared type.
    assert_eq!(
        alters,
        vec!["ALTER TABLE `users` MODIFY COLUMN `name` VARCHAR(255) NOT NULL;".to_string()]
    );
    assert_eq!(
        report.changes_for("users").unwrap(),
        &["~ name (type changed: VARCHAR(100) → VARCHAR(255))".to_string()]
    );
}

/// Test that a fully matching live schema produces an empty report and no
/// DDL.
#[tokio::test]
async fn test_matching_schema_is_untouched() {
    let (orm, mock) = mock_orm(Dialect::MySql);
    mock.push_query_result(vec![
        row(&[("COLUMN_NAME", "id"), ("COLUMN_TYPE", "int(11)")]),
        row(&[("COLUMN_NAME", "name"), ("COLUMN_TYPE", "varchar(255)")]),
        row(&[("COLUMN_NAME", "age"), ("COLUMN_TYPE", "int(11)")]),
        row(&[("COLUMN_NAME", "email"), ("COLUMN_TYPE", "varchar(255)")]),
    ]);

    let report = orm.migrate(&["user"]).await.unwrap();

    assert!(report.is_empty());
    assert_eq!(mock.statements().len(), 1, "introspection only");
}

/// Test that entity keys without metadata are skipped without failing the
/// run.
#[tokio::test]
async fn test_unknown_keys_are_skipped() {
    let (orm, mock) = mock_orm(Dialect::MySql);

    let report = orm.migrate(&["ghost"]).await.unwrap();

    assert!(report.is_empty());
    assert!(mock.statements().is_empty());
}

/// Test the Postgres introspection result shape (lowercase fields,
/// udt-based type strings) flowing through the diff.
#[tokio::test]
async fn test_postgres_introspection_fields() {
    let (orm, mock) = mock_orm(Dialect::Postgres);
    mock.push_query_result(vec![
        row(&[("column_name", "id"), ("column_type", "int4")]),
        row(&[("column_name", "name"), ("column_type", "character varying(255)")]),
        row(&[("column_name", "age"), ("column_type", "int4")]),
        row(&[("column_name", "email"), ("column_type", "varchar(255)")]),
    ]);

    let report = orm.migrate(&["user"]).await.unwrap();

    // "character varying(255)" normalizes to varchar(255) and matches the
    // declared VARCHAR(255); int4 vs INTEGER differs and triggers MODIFY.
    let changes = report.changes_for("users").unwrap();
    assert_eq!(changes.len(), 1);
    assert!(changes[0].starts_with("~ age"), "got: {changes:?}");
}
