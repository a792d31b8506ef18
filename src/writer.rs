//! Entity persistence.
//!
//! INSERT-or-UPDATE dispatch on the identifier value, plus delete. Callers
//! participating in a wider transaction pass their own connection, which is
//! never released here; otherwise one is checked out per call and returned
//! to the pool on every exit path when it drops.

use crate::adapter::{Adapter, Connection};
use crate::catalog::Catalog;
use crate::entity::Entity;
use crate::error::{OrmError, OrmResult};
use crate::value::SqlValue;
use tracing::debug;

/// Persistence entry points for catalog-mapped entities.
#[derive(Debug, Clone, Copy)]
pub struct EntityWriter<'a> {
    catalog: &'a Catalog,
    adapter: &'a Adapter,
}

impl<'a> EntityWriter<'a> {
    pub fn new(catalog: &'a Catalog, adapter: &'a Adapter) -> Self {
        Self { catalog, adapter }
    }

    /// Insert or update `entity`. An absent or zero identifier value means
    /// create; the generated key, when the adapter reports one, is written
    /// back onto the entity. Unique-key violations surface as
    /// `DuplicateEntry`, any other driver failure as `SaveFailed`.
    pub async fn save<T: Entity>(
        &self,
        entity: &mut T,
        tx: Option<&mut Connection>,
    ) -> OrmResult<()> {
        let def = self.catalog.entity(T::KEY)?;
        let identifier = def.identifier()?;
        let id_property = identifier.property().to_string();
        let id_column = identifier.column_name();
        let table = def.table().to_string();

        // Declared non-identifier properties the accessor table knows.
        let entries: Vec<(String, SqlValue)> = def
            .columns()
            .iter()
            .filter(|c| !c.is_identifier())
            .filter_map(|c| entity.get_field(c.property()).map(|v| (c.column_name(), v)))
            .collect();

        let id_value = entity.get_field(&id_property);
        let is_create = matches!(id_value, None | Some(SqlValue::Null) | Some(SqlValue::Int(0)));

        let mut scoped;
        let conn = match tx {
            Some(conn) => conn,
            None => {
                scoped = self.adapter.acquire().await?;
                &mut scoped
            }
        };

        if is_create {
            let cols = entries
                .iter()
                .map(|(c, _)| format!("`{c}`"))
                .collect::<Vec<_>>()
                .join(", ");
            let placeholders = vec!["?"; entries.len()].join(", ");
            let params: Vec<SqlValue> = entries.into_iter().map(|(_, v)| v).collect();
            let sql = format!("INSERT INTO `{table}` ({cols}) VALUES ({placeholders});");

            let outcome = self
                .adapter
                .execute(&sql, &params, Some(conn))
                .await
                .map_err(|e| wrap_save_error(&table, T::KEY, e))?;
            if let Some(insert_id) = outcome.insert_id {
                entity.set_field(&id_property, SqlValue::Int(insert_id));
            }
            debug!(entity = T::KEY, insert_id = ?outcome.insert_id, "inserted");
        } else {
            let set_clause = entries
                .iter()
                .map(|(c, _)| format!("`{c}` = ?"))
                .collect::<Vec<_>>()
                .join(", ");
            let mut params: Vec<SqlValue> = entries.into_iter().map(|(_, v)| v).collect();
            params.push(id_value.unwrap_or(SqlValue::Null));
            let sql = format!("UPDATE `{table}` SET {set_clause} WHERE `{id_column}` = ?;");

            self.adapter
                .execute(&sql, &params, Some(conn))
                .await
                .map_err(|e| wrap_save_error(&table, T::KEY, e))?;
            debug!(entity = T::KEY, "updated");
        }

        Ok(())
    }

    /// Delete `entity` by its identifier. A null identifier is a no-op.
    pub async fn delete<T: Entity>(
        &self,
        entity: &T,
        tx: Option<&mut Connection>,
    ) -> OrmResult<()> {
        let def = self.catalog.entity(T::KEY)?;
        let identifier = def.identifier()?;
        let id_value = match entity.get_field(identifier.property()) {
            None | Some(SqlValue::Null) => return Ok(()),
            Some(value) => value,
        };

        let mut scoped;
        let conn = match tx {
            Some(conn) => conn,
            None => {
                scoped = self.adapter.acquire().await?;
                &mut scoped
            }
        };

        let sql = format!(
            "DELETE FROM `{}` WHERE `{}` = ?;",
            def.table(),
            identifier.column_name()
        );
        self.adapter.execute(&sql, &[id_value], Some(conn)).await?;
        debug!(entity = T::KEY, "deleted");
        Ok(())
    }
}

fn wrap_save_error(table: &str, entity_key: &str, err: OrmError) -> OrmError {
    if err.is_unique_violation() {
        OrmError::DuplicateEntry {
            table: table.to_string(),
            source: Box::new(err),
        }
    } else {
        OrmError::save_failed(entity_key, err)
    }
}
