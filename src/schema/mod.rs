//! Schema introspection and reconciliation.

pub mod column_type;
pub mod manager;
pub mod report;

pub use manager::SchemaManager;
pub use report::{MigrationReport, TableChanges};
