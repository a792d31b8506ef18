//! Migration reporting.

use serde::Serialize;

/// Ordered change list for one table.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TableChanges {
    pub table: String,
    pub changes: Vec<String>,
}

/// Summary of one `migrate` run. Tables with zero changes never appear.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct MigrationReport {
    tables: Vec<TableChanges>,
}

impl MigrationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the change list for a table; empty lists are dropped.
    pub fn record(&mut self, table: impl Into<String>, changes: Vec<String>) {
        if !changes.is_empty() {
            self.tables.push(TableChanges {
                table: table.into(),
                changes,
            });
        }
    }

    pub fn tables(&self) -> &[TableChanges] {
        &self.tables
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// All changes recorded for `table`, if any.
    pub fn changes_for(&self, table: &str) -> Option<&[String]> {
        self.tables
            .iter()
            .find(|t| t.table == table)
            .map(|t| t.changes.as_slice())
    }
}

/// Box-drawing tree rendering, suitable for a log line or console summary.
impl std::fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.tables.is_empty() {
            return Ok(());
        }
        writeln!(f, "Database Updated:")?;
        for (table_index, entry) in self.tables.iter().enumerate() {
            let is_last_table = table_index == self.tables.len() - 1;
            if table_index > 0 {
                writeln!(f, "│")?;
            }
            let table_prefix = if is_last_table { "└─" } else { "├─" };
            writeln!(f, "{table_prefix} {}", entry.table)?;

            for (change_index, change) in entry.changes.iter().enumerate() {
                let is_last_change = change_index == entry.changes.len() - 1;
                let line_prefix = if is_last_table { "   " } else { "│ " };
                let connector = if is_last_change { "└─" } else { "├─" };
                writeln!(f, "{line_prefix} {connector} {change}")?;
            }
        }
        Ok(())
    }
}
