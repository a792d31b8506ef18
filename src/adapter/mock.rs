//! Scripted in-memory adapter.
//!
//! Test double with the same surface as the real adapters: results and
//! outcomes are queued up front, every statement that reaches the adapter
//! is recorded with its bound parameters. Deliberately has no SQL engine,
//! assertions are made against the recorded statements.

use crate::adapter::{Dialect, ExecOutcome};
use crate::error::{OrmError, OrmResult};
use crate::value::{SqlRow, SqlValue};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One statement as it reached the adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedStatement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

#[derive(Debug, Default)]
struct MockState {
    query_results: VecDeque<Vec<SqlRow>>,
    exec_outcomes: VecDeque<OrmResult<ExecOutcome>>,
    statements: Vec<RecordedStatement>,
}

/// Scripted adapter. Cloning shares the script and the statement log.
#[derive(Debug, Clone)]
pub struct MockAdapter {
    dialect: Dialect,
    state: Arc<Mutex<MockState>>,
}

impl Default for MockAdapter {
    fn default() -> Self {
        Self::new(Dialect::MySql)
    }
}

impl MockAdapter {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Queue the result set for the next query.
    pub fn push_query_result(&self, rows: Vec<SqlRow>) {
        self.state.lock().unwrap().query_results.push_back(rows);
    }

    /// Queue the outcome for the next execute.
    pub fn push_exec_outcome(&self, outcome: ExecOutcome) {
        self.state.lock().unwrap().exec_outcomes.push_back(Ok(outcome));
    }

    /// Queue an error for the next execute.
    pub fn push_exec_error(&self, error: OrmError) {
        self.state.lock().unwrap().exec_outcomes.push_back(Err(error));
    }

    /// All statements recorded so far, in execution order.
    pub fn statements(&self) -> Vec<RecordedStatement> {
        self.state.lock().unwrap().statements.clone()
    }

    pub fn query(&self, sql: &str, params: &[SqlValue]) -> OrmResult<Vec<SqlRow>> {
        let mut state = self.state.lock().unwrap();
        state.statements.push(RecordedStatement {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        Ok(state.query_results.pop_front().unwrap_or_default())
    }

    pub fn execute(&self, sql: &str, params: &[SqlValue]) -> OrmResult<ExecOutcome> {
        let mut state = self.state.lock().unwrap();
        state.statements.push(RecordedStatement {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        state
            .exec_outcomes
            .pop_front()
            .unwrap_or(Ok(ExecOutcome::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statements_are_recorded_in_order() {
        let mock = MockAdapter::new(Dialect::MySql);
        mock.query("SELECT 1", &[]).unwrap();
        mock.execute("DELETE FROM `t` WHERE id = ?", &[SqlValue::Int(7)])
            .unwrap();

        let log = mock.statements();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].sql, "SELECT 1");
        assert_eq!(log[1].params, vec![SqlValue::Int(7)]);
    }

    #[test]
    fn test_scripted_results_are_consumed_fifo() {
        let mock = MockAdapter::new(Dialect::MySql);
        mock.push_exec_outcome(ExecOutcome {
            insert_id: Some(42),
            affected_rows: 1,
        });

        let first = mock.execute("INSERT ...", &[]).unwrap();
        assert_eq!(first.insert_id, Some(42));
        // Queue exhausted, subsequent calls report an empty outcome.
        let second = mock.execute("INSERT ...", &[]).unwrap();
        assert_eq!(second.insert_id, None);
    }
}
