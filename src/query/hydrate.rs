//! Row-set hydration.
//!
//! Rebuilds entity graphs from the flat joined rows the SELECT pipeline
//! produces. Rows are grouped by the value of the identifier column; related
//! rows are recognized by their non-null `<property>__id` marker and routed
//! through the entity's accessor table.

use crate::catalog::Catalog;
use crate::entity::Entity;
use crate::error::OrmResult;
use crate::value::{FieldValues, SqlRow, SqlValue};
use std::collections::HashMap;

/// Hydrate a joined row set into base entities with their relations applied.
///
/// One base entity per distinct identifier value, in first-seen row order;
/// has-many fan-out rows contribute related entries instead of duplicate
/// base entities. Every declared relation is scanned on every row whether or
/// not it was included (absent marker columns just skip).
pub fn rows_to_entities<T: Entity>(catalog: &Catalog, rows: &[SqlRow]) -> OrmResult<Vec<T>> {
    let def = catalog.entity(T::KEY)?;
    let id_column = def.identifier_column_or_default();

    let mut entities: Vec<T> = Vec::new();
    let mut seen: HashMap<SqlValue, usize> = HashMap::new();

    for row in rows {
        let key = row.get(&id_column).cloned().unwrap_or(SqlValue::Null);

        let index = match seen.get(&key) {
            Some(&index) => index,
            None => {
                let mut entity = T::default();
                for column in def.columns() {
                    if let Some(value) = row.get(&column.column_name()) {
                        entity.set_field(column.property(), value.clone());
                    }
                }
                entities.push(entity);
                let index = entities.len() - 1;
                seen.insert(key, index);
                index
            }
        };

        for relation in def.relations() {
            let marker = format!("{}__id", relation.property());
            match row.get(&marker) {
                Some(value) if !value.is_null() => {}
                _ => continue,
            }
            let Ok(related) = catalog.entity(relation.target()) else {
                continue;
            };
            let values: FieldValues = related
                .columns()
                .iter()
                .map(|column| {
                    let field = format!("{}__{}", relation.property(), column.column_name());
                    (
                        column.property().to_string(),
                        row.get(&field).cloned().unwrap_or(SqlValue::Null),
                    )
                })
                .collect();
            entities[index].apply_related(relation.property(), &values);
        }
    }

    Ok(entities)
}
