//! The driver contract consumed by the builder.
//!
//! A driver owns connections, pooling and the wire protocol. tagorm only
//! needs prepare/execute/query plus transaction handles; both the driver
//! itself and its transactions are [`Executor`]s so a statement can run on
//! either.

use crate::error::DriverError;
use crate::value::Value;
use std::collections::VecDeque;
use std::future::Future;

/// Outcome of a data-modifying statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub last_insert_id: i64,
    pub rows_affected: u64,
}

/// A forward-only cursor over query results.
///
/// Values arrive as raw text; `None` is SQL NULL.
pub trait ResultSet: Send {
    /// Column names in result order.
    fn columns(&self) -> &[String];

    /// Advance to the next row, returning its raw values.
    fn next_row(&mut self) -> Result<Option<Vec<Option<String>>>, DriverError>;
}

/// Something that can prepare, execute and query.
pub trait Executor: Send + Sync {
    type Prepared: Send + Sync;
    type Rows: ResultSet;

    /// Prepare `sql` for execution.
    fn prepare(&self, sql: &str) -> impl Future<Output = Result<Self::Prepared, DriverError>> + Send;

    /// Execute a prepared statement with positional parameters.
    fn execute(
        &self,
        stmt: &Self::Prepared,
        params: &[Value],
    ) -> impl Future<Output = Result<ExecResult, DriverError>> + Send;

    /// Run a query with positional parameters.
    fn query(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<Self::Rows, DriverError>> + Send;
}

/// An open driver transaction.
pub trait Transaction: Executor + Sized {
    fn commit(self) -> impl Future<Output = Result<(), DriverError>> + Send;

    fn rollback(self) -> impl Future<Output = Result<(), DriverError>> + Send;
}

/// The connectivity layer: an executor that can open transactions.
pub trait Driver: Executor {
    type Transaction: Transaction;

    fn begin_transaction(
        &self,
    ) -> impl Future<Output = Result<Self::Transaction, DriverError>> + Send;
}

/// A fully materialized result set.
///
/// Useful for drivers whose native cursors borrow the connection.
#[derive(Debug, Clone, Default)]
pub struct MemoryRows {
    columns: Vec<String>,
    rows: VecDeque<Vec<Option<String>>>,
}

impl MemoryRows {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: VecDeque::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Option<String>>) {
        self.rows.push_back(row);
    }

    /// Add a row (consuming builder form).
    pub fn with_row<S: Into<String>>(mut self, row: impl IntoIterator<Item = Option<S>>) -> Self {
        self.rows
            .push_back(row.into_iter().map(|v| v.map(Into::into)).collect());
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl ResultSet for MemoryRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Vec<Option<String>>>, DriverError> {
        Ok(self.rows.pop_front())
    }
}
