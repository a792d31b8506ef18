//! Fluent query builder.
//!
//! Builds the fixed dialect-neutral statement shapes (backtick quoting, `?`
//! placeholders) and hands them to the adapter. Malformed input is detected
//! at the fluent call, held on the builder, and surfaced by the terminal
//! operation before any SQL is built or sent — a chain never half-executes.

use crate::adapter::Adapter;
use crate::catalog::{Catalog, RelationKind};
use crate::entity::Entity;
use crate::error::{OrmError, OrmResult};
use crate::query::hydrate;
use crate::value::SqlValue;
use std::marker::PhantomData;
use tracing::warn;

/// Operators accepted by [`QueryBuilder::filter`]. Matched
/// case-insensitively; the caller's original token is kept in the SQL.
pub const ALLOWED_OPERATORS: [&str; 12] = [
    "=", "!=", "<>", ">", "<", ">=", "<=", "LIKE", "IN", "IS NULL", "IS NOT NULL", "OR",
];

/// Operators that take no right-hand value and bind no parameter.
const UNARY_OPERATORS: [&str; 2] = ["IS NULL", "IS NOT NULL"];

#[derive(Debug, Clone)]
struct Filter {
    column: String,
    operator: String,
    value: Option<SqlValue>,
}

/// Fluent, consuming query builder for one entity type.
///
/// Filters always bind against the base table alias; filtering on a joined
/// relation's column is out of scope.
#[derive(Debug)]
pub struct QueryBuilder<'a, T: Entity> {
    catalog: &'a Catalog,
    adapter: &'a Adapter,
    filters: Vec<Filter>,
    includes: Vec<&'static str>,
    order: Option<(String, &'static str)>,
    limit: Option<i64>,
    offset: Option<i64>,
    deferred: Option<OrmError>,
    _entity: PhantomData<fn() -> T>,
}

impl<'a, T: Entity> QueryBuilder<'a, T> {
    pub fn new(catalog: &'a Catalog, adapter: &'a Adapter) -> Self {
        Self {
            catalog,
            adapter,
            filters: Vec::new(),
            includes: Vec::new(),
            order: None,
            limit: None,
            offset: None,
            deferred: None,
            _entity: PhantomData,
        }
    }

    /// Append a filter. Filters are joined with `AND` in insertion order.
    /// `IS NULL` / `IS NOT NULL` ignore `value` and bind no parameter.
    pub fn filter(mut self, property: &str, operator: &str, value: impl Into<SqlValue>) -> Self {
        if self.deferred.is_some() {
            return self;
        }
        let upper = operator.trim().to_uppercase();
        if !ALLOWED_OPERATORS.contains(&upper.as_str()) {
            self.deferred = Some(OrmError::invalid_operator(operator));
            return self;
        }
        let column = match self.resolve_strict(property) {
            Ok(column) => column,
            Err(err) => {
                self.deferred = Some(err);
                return self;
            }
        };
        let value = if UNARY_OPERATORS.contains(&upper.as_str()) {
            None
        } else {
            Some(value.into())
        };
        self.filters.push(Filter {
            column,
            operator: operator.trim().to_string(),
            value,
        });
        self
    }

    /// Mark the relation targeting entity `R` for eager loading. An include
    /// that matches no declared relation is dropped at build time.
    pub fn include<R: Entity>(mut self) -> Self {
        self.includes.push(R::KEY);
        self
    }

    /// Sort by a mapped column. `direction` is normalized to `ASC`/`DESC`.
    pub fn order_by(mut self, property: &str, direction: &str) -> Self {
        if self.deferred.is_some() {
            return self;
        }
        let normalized = match direction.trim().to_uppercase().as_str() {
            "ASC" => "ASC",
            "DESC" => "DESC",
            _ => {
                self.deferred = Some(OrmError::invalid_direction(direction));
                return self;
            }
        };
        match self.resolve_strict(property) {
            Ok(column) => self.order = Some((column, normalized)),
            Err(err) => self.deferred = Some(err),
        }
        self
    }

    pub fn limit(mut self, n: i64) -> Self {
        if self.deferred.is_none() {
            if n < 0 {
                self.deferred = Some(OrmError::InvalidPageParameter { value: n });
            } else {
                self.limit = Some(n);
            }
        }
        self
    }

    pub fn offset(mut self, n: i64) -> Self {
        if self.deferred.is_none() {
            if n < 0 {
                self.deferred = Some(OrmError::InvalidPageParameter { value: n });
            } else {
                self.offset = Some(n);
            }
        }
        self
    }

    /// Count matching rows on the base table only (includes are ignored).
    /// A missing COUNT row or value reads as 0.
    pub async fn count(self) -> OrmResult<i64> {
        let adapter = self.adapter;
        let (sql, params) = self.build_count()?;
        let rows = adapter
            .query(&sql, &params, None)
            .await
            .map_err(|e| OrmError::query_failed(T::KEY, e))?;
        Ok(rows
            .first()
            .and_then(|row| row.get("count"))
            .and_then(SqlValue::as_int)
            .unwrap_or(0))
    }

    /// Force `LIMIT 1` and return the first entity, if any.
    pub async fn first(self) -> OrmResult<Option<T>> {
        let mut rows = self.limit(1).get().await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.remove(0))
        })
    }

    /// Run the full SELECT / JOIN / hydrate pipeline.
    pub async fn get(self) -> OrmResult<Vec<T>> {
        let catalog = self.catalog;
        let adapter = self.adapter;
        let (sql, params) = self.build_select()?;
        let rows = adapter
            .query(&sql, &params, None)
            .await
            .map_err(|e| OrmError::query_failed(T::KEY, e))?;
        hydrate::rows_to_entities::<T>(catalog, &rows)
    }

    /// Build the SELECT statement and its positional parameters without
    /// executing anything.
    pub fn build_select(self) -> OrmResult<(String, Vec<SqlValue>)> {
        if let Some(err) = self.deferred {
            return Err(err);
        }
        let def = self.catalog.entity(T::KEY)?;

        let mut select_fields = String::from("t1.*");
        let mut join_clause = String::new();

        for (index, &include_key) in self.includes.iter().enumerate() {
            // Aliases follow inclusion position even across skipped entries.
            let alias = format!("t{}", index + 2);
            let relation = RelationKind::PRECEDENCE.iter().find_map(|&kind| {
                def.relations_of(kind).find(|r| r.target() == include_key)
            });
            let Some(relation) = relation else {
                warn!(entity = T::KEY, include = include_key, "include matches no declared relation, skipping");
                continue;
            };
            let Ok(related) = self.catalog.entity(relation.target()) else {
                warn!(entity = T::KEY, include = include_key, "included entity has no metadata, skipping");
                continue;
            };

            for column in related.columns() {
                let col_name = column.column_name();
                select_fields.push_str(&format!(
                    ", {alias}.`{col_name}` AS `{}__{col_name}`",
                    relation.property()
                ));
            }

            match relation.kind() {
                RelationKind::BelongsTo => {
                    let fk_col = def.column_name_lenient(relation.foreign_key());
                    join_clause.push_str(&format!(
                        " LEFT JOIN `{}` AS {alias} ON t1.`{fk_col}` = {alias}.id",
                        related.table()
                    ));
                }
                RelationKind::HasOne | RelationKind::HasMany => {
                    let fk_col = related.column_name_lenient(relation.foreign_key());
                    join_clause.push_str(&format!(
                        " LEFT JOIN `{}` AS {alias} ON t1.id = {alias}.`{fk_col}`",
                        related.table()
                    ));
                }
            }
        }

        let mut sql = format!(
            "SELECT {select_fields} FROM `{}` AS t1{join_clause}",
            def.table()
        );
        let mut params = Vec::with_capacity(self.filters.len());

        if !self.filters.is_empty() {
            sql.push_str(" WHERE ");
            for (i, filter) in self.filters.iter().enumerate() {
                if i > 0 {
                    sql.push_str(" AND ");
                }
                match &filter.value {
                    Some(value) => {
                        sql.push_str(&format!("t1.`{}` {} ?", filter.column, filter.operator));
                        params.push(value.clone());
                    }
                    None => {
                        sql.push_str(&format!("t1.`{}` {}", filter.column, filter.operator));
                    }
                }
            }
        }

        if let Some((column, direction)) = &self.order {
            sql.push_str(&format!(" ORDER BY t1.`{column}` {direction}"));
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
        sql.push(';');

        Ok((sql, params))
    }

    /// Build the COUNT statement and its positional parameters without
    /// executing anything. Joins never apply to counts.
    pub fn build_count(self) -> OrmResult<(String, Vec<SqlValue>)> {
        if let Some(err) = self.deferred {
            return Err(err);
        }
        let def = self.catalog.entity(T::KEY)?;

        let mut sql = format!("SELECT COUNT(*) as count FROM `{}` AS t1", def.table());
        let mut params = Vec::with_capacity(self.filters.len());

        if !self.filters.is_empty() {
            sql.push_str(" WHERE ");
            for (i, filter) in self.filters.iter().enumerate() {
                if i > 0 {
                    sql.push_str(" AND ");
                }
                match &filter.value {
                    Some(value) => {
                        sql.push_str(&format!("`t1`.`{}` {} ?", filter.column, filter.operator));
                        params.push(value.clone());
                    }
                    None => {
                        sql.push_str(&format!("`t1`.`{}` {}", filter.column, filter.operator));
                    }
                }
            }
        }

        Ok((sql, params))
    }

    fn resolve_strict(&self, property: &str) -> OrmResult<String> {
        self.catalog.entity(T::KEY)?.column_name_strict(property)
    }
}
