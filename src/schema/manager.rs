//! Schema reconciliation.
//!
//! `migrate` introspects each mapped table through the dialect's
//! information-schema query and either creates the table or diffs and
//! alters it. The policy is additive only: columns present in the database
//! but absent from the metadata are never dropped.

use crate::adapter::Adapter;
use crate::catalog::{Catalog, EntityDef};
use crate::error::OrmResult;
use crate::schema::column_type::{leading_token, normalize_type, render_column_type};
use crate::schema::report::MigrationReport;
use crate::value::SqlValue;
use std::collections::HashMap;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
pub struct SchemaManager<'a> {
    catalog: &'a Catalog,
    adapter: &'a Adapter,
}

impl<'a> SchemaManager<'a> {
    pub fn new(catalog: &'a Catalog, adapter: &'a Adapter) -> Self {
        Self { catalog, adapter }
    }

    /// Reconcile the tables behind the given entity keys. Keys without
    /// usable metadata are skipped. Not safe to run concurrently with
    /// itself across processes; DDL is not coordinated here.
    pub async fn migrate(&self, entity_keys: &[&str]) -> OrmResult<MigrationReport> {
        let mut report = MigrationReport::new();

        for &key in entity_keys {
            let def = match self.catalog.entity(key) {
                Ok(def) => def,
                Err(_) => {
                    warn!(entity = key, "no metadata for entity, skipping migration");
                    continue;
                }
            };

            let existing = self.existing_columns(def.table()).await;
            let changes = if existing.is_empty() {
                self.create_table(def).await?
            } else {
                self.update_table(def, &existing).await?
            };
            report.record(def.table(), changes);
        }

        if !report.is_empty() {
            info!(tables = report.tables().len(), "schema changes applied");
        }
        Ok(report)
    }

    /// Introspect the live column set for `table`. A failing query reads as
    /// an absent table, which routes to the create path.
    async fn existing_columns(&self, table: &str) -> HashMap<String, String> {
        let dialect = self.adapter.dialect();
        let params = [SqlValue::Text(table.to_string())];
        let rows = match self
            .adapter
            .query(dialect.columns_query(), &params, None)
            .await
        {
            Ok(rows) => rows,
            Err(err) => {
                debug!(table, error = %err, "introspection failed, treating table as absent");
                return HashMap::new();
            }
        };

        rows.iter()
            .filter_map(|row| {
                let name = row.get(dialect.column_name_field())?.as_text()?;
                let column_type = row.get(dialect.column_type_field())?.as_text()?;
                Some((name.to_string(), column_type.to_string()))
            })
            .collect()
    }

    async fn create_table(&self, def: &EntityDef) -> OrmResult<Vec<String>> {
        let dialect = self.adapter.dialect();
        let table = def.table();

        let cols_sql = def
            .columns()
            .iter()
            .map(|c| format!("`{}` {}", c.column_name(), render_column_type(c, dialect)))
            .collect::<Vec<_>>()
            .join(", ");

        let indexes: Vec<String> = def
            .columns()
            .iter()
            .filter(|c| c.is_indexed())
            .map(|c| c.column_name())
            .collect();

        let mut index_sql = String::new();
        if dialect.inline_index_creation() && !indexes.is_empty() {
            index_sql = format!(
                ", {}",
                indexes
                    .iter()
                    .map(|c| format!("INDEX `{c}` (`{c}`)"))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        let sql = format!("CREATE TABLE `{table}` ({cols_sql}{index_sql});");
        self.adapter.execute_raw(&sql).await?;
        debug!(table, "table created");

        if !dialect.inline_index_creation() {
            for col in &indexes {
                let index_name = format!("idx_{table}_{col}");
                let sql = format!("CREATE INDEX `{index_name}` ON `{table}` (`{col}`);");
                self.adapter.execute_raw(&sql).await?;
            }
        }

        Ok(def
            .columns()
            .iter()
            .map(|c| format!("+ {} (added)", c.column_name()))
            .collect())
    }

    async fn update_table(
        &self,
        def: &EntityDef,
        existing: &HashMap<String, String>,
    ) -> OrmResult<Vec<String>> {
        let dialect = self.adapter.dialect();
        let table = def.table();
        let identifier_column = def.identifier().ok().map(|c| c.column_name());
        let mut changes = Vec::new();

        for column in def.columns() {
            let col_name = column.column_name();
            if identifier_column.as_deref() == Some(col_name.as_str()) {
                continue;
            }
            let declared = render_column_type(column, dialect);

            match existing.get(&col_name) {
                None => {
                    let sql =
                        format!("ALTER TABLE `{table}` ADD COLUMN `{col_name}` {declared};");
                    self.adapter.execute_raw(&sql).await?;
                    changes.push(format!("+ {col_name} (added)"));
                }
                Some(existing_type) => {
                    let declared_token = leading_token(&declared);
                    if normalize_type(existing_type) != normalize_type(declared_token) {
                        let sql = format!(
                            "ALTER TABLE `{table}` MODIFY COLUMN `{col_name}` {declared};"
                        );
                        self.adapter.execute_raw(&sql).await?;
                        changes.push(format!(
                            "~ {col_name} (type changed: {} → {})",
                            existing_type.to_uppercase(),
                            declared_token.to_uppercase()
                        ));
                    }
                }
            }
        }

        Ok(changes)
    }
}
