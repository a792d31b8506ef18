//! ormlet
//!
//! A metadata-driven object-relational mapping core for MySQL and
//! PostgreSQL: an explicit entity catalog, a fluent query builder producing
//! dialect-neutral SQL with positional parameters, row-to-entity-graph
//! hydration, insert-or-update persistence, and an additive schema
//! reconciler.

pub mod adapter;
pub mod catalog;
pub mod entity;
pub mod error;
pub mod orm;
pub mod query;
pub mod schema;
pub mod value;
pub mod writer;

pub use adapter::{Adapter, AdapterConfig, Connection, Dialect, ExecOutcome, MockAdapter};
pub use catalog::{Catalog, ColumnDef, Decimal, EntityDef, RelationDef, RelationKind, ValueKind};
pub use entity::{Entity, entity_from_values};
pub use error::{OrmError, OrmResult};
pub use orm::Orm;
pub use query::QueryBuilder;
pub use schema::{MigrationReport, SchemaManager};
pub use value::{FieldValues, SqlRow, SqlValue};
pub use writer::EntityWriter;
