//! Reference driver over an in-process SQLite connection (`rusqlite`).
//!
//! One connection is shared behind a mutex. A transaction issues `BEGIN` on
//! that connection, so statements sent through the driver while it is open
//! also run inside it.

use crate::driver::{Driver, ExecResult, Executor, MemoryRows, Transaction};
use crate::error::DriverError;
use crate::value::Value;
use rusqlite::Connection;
use rusqlite::types::{Value as SqliteValue, ValueRef};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, DriverError> {
    conn.lock()
        .map_err(|_| DriverError::from("sqlite connection mutex poisoned"))
}

/// Convert a bound value to its SQLite storage class.
fn to_sqlite_value(value: &Value) -> Result<SqliteValue, DriverError> {
    Ok(match value {
        Value::Null => SqliteValue::Null,
        Value::Int(i) => SqliteValue::Integer(i64::from(*i)),
        Value::BigInt(i) => SqliteValue::Integer(*i),
        Value::UInt(u) => SqliteValue::Integer(
            i64::try_from(*u).map_err(|_| format!("unsigned value {u} exceeds the sqlite integer range"))?,
        ),
        Value::Float(f) => SqliteValue::Real(*f),
        Value::Bool(b) => SqliteValue::Integer(i64::from(*b)),
        Value::Text(s) => SqliteValue::Text(s.clone()),
        Value::List(_) => return Err("a sequence value cannot be bound to a placeholder".into()),
    })
}

fn convert_params(params: &[Value]) -> Result<Vec<SqliteValue>, DriverError> {
    params.iter().map(to_sqlite_value).collect()
}

fn to_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(b) | ValueRef::Blob(b) => Some(String::from_utf8_lossy(b).into_owned()),
    }
}

fn prepare_on(conn: &Mutex<Connection>, sql: &str) -> Result<SqlitePrepared, DriverError> {
    let conn = lock(conn)?;
    conn.prepare_cached(sql)?;
    Ok(SqlitePrepared {
        sql: sql.to_string(),
    })
}

fn execute_on(
    conn: &Mutex<Connection>,
    prepared: &SqlitePrepared,
    params: &[Value],
) -> Result<ExecResult, DriverError> {
    let values = convert_params(params)?;
    let conn = lock(conn)?;
    let mut stmt = conn.prepare_cached(&prepared.sql)?;
    let changes = stmt.execute(rusqlite::params_from_iter(values.iter()))?;
    Ok(ExecResult {
        last_insert_id: conn.last_insert_rowid(),
        rows_affected: changes as u64,
    })
}

fn query_on(conn: &Mutex<Connection>, sql: &str, params: &[Value]) -> Result<MemoryRows, DriverError> {
    let values = convert_params(params)?;
    let conn = lock(conn)?;
    let mut stmt = conn.prepare_cached(sql)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let width = columns.len();
    let mut out = MemoryRows::new(columns);

    let mut rows = stmt.query(rusqlite::params_from_iter(values.iter()))?;
    while let Some(row) = rows.next()? {
        let mut raw = Vec::with_capacity(width);
        for i in 0..width {
            raw.push(to_text(row.get_ref(i)?));
        }
        out.push_row(raw);
    }
    Ok(out)
}

/// SQL text validated by `prepare`; the statement itself lives in the
/// connection's statement cache.
#[derive(Debug, Clone)]
pub struct SqlitePrepared {
    sql: String,
}

impl SqlitePrepared {
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

/// A [`Driver`] backed by a single SQLite connection.
#[derive(Clone)]
pub struct SqliteDriver {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDriver {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    pub fn open_in_memory() -> Result<Self, DriverError> {
        Ok(Self::new(Connection::open_in_memory()?))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, DriverError> {
        Ok(Self::new(Connection::open(path)?))
    }

    /// Run a batch of `;`-separated statements, e.g. schema setup.
    pub fn execute_batch(&self, sql: &str) -> Result<(), DriverError> {
        lock(&self.conn)?.execute_batch(sql)?;
        Ok(())
    }
}

impl Executor for SqliteDriver {
    type Prepared = SqlitePrepared;
    type Rows = MemoryRows;

    async fn prepare(&self, sql: &str) -> Result<SqlitePrepared, DriverError> {
        prepare_on(&self.conn, sql)
    }

    async fn execute(&self, stmt: &SqlitePrepared, params: &[Value]) -> Result<ExecResult, DriverError> {
        execute_on(&self.conn, stmt, params)
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<MemoryRows, DriverError> {
        query_on(&self.conn, sql, params)
    }
}

impl Driver for SqliteDriver {
    type Transaction = SqliteTransaction;

    async fn begin_transaction(&self) -> Result<SqliteTransaction, DriverError> {
        lock(&self.conn)?.execute_batch("BEGIN")?;
        Ok(SqliteTransaction {
            conn: Arc::clone(&self.conn),
            finished: false,
        })
    }
}

/// An open `BEGIN` on the shared connection. Dropping it unfinished rolls
/// back.
pub struct SqliteTransaction {
    conn: Arc<Mutex<Connection>>,
    finished: bool,
}

impl SqliteTransaction {
    /// Run `COMMIT`/`ROLLBACK`. If that fails with the transaction still
    /// open (e.g. a deferred constraint on `COMMIT`), roll back so the
    /// shared connection returns to autocommit.
    fn finish(&mut self, sql: &str) -> Result<(), DriverError> {
        let conn = lock(&self.conn)?;
        match conn.execute_batch(sql) {
            Ok(()) => {
                self.finished = true;
                Ok(())
            }
            Err(err) => {
                if !conn.is_autocommit() {
                    let _ = conn.execute_batch("ROLLBACK");
                }
                self.finished = conn.is_autocommit();
                Err(err.into())
            }
        }
    }
}

impl Executor for SqliteTransaction {
    type Prepared = SqlitePrepared;
    type Rows = MemoryRows;

    async fn prepare(&self, sql: &str) -> Result<SqlitePrepared, DriverError> {
        prepare_on(&self.conn, sql)
    }

    async fn execute(&self, stmt: &SqlitePrepared, params: &[Value]) -> Result<ExecResult, DriverError> {
        execute_on(&self.conn, stmt, params)
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<MemoryRows, DriverError> {
        query_on(&self.conn, sql, params)
    }
}

impl Transaction for SqliteTransaction {
    async fn commit(mut self) -> Result<(), DriverError> {
        self.finish("COMMIT")
    }

    async fn rollback(mut self) -> Result<(), DriverError> {
        self.finish("ROLLBACK")
    }
}

impl Drop for SqliteTransaction {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Ok(conn) = self.conn.lock()
            && !conn.is_autocommit()
        {
            let _ = conn.execute_batch("ROLLBACK");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_values_map_to_storage_classes() {
        assert_eq!(to_sqlite_value(&Value::Bool(true)).unwrap(), SqliteValue::Integer(1));
        assert_eq!(to_sqlite_value(&Value::Int(-3)).unwrap(), SqliteValue::Integer(-3));
        assert_eq!(to_sqlite_value(&Value::Null).unwrap(), SqliteValue::Null);
        assert!(to_sqlite_value(&Value::UInt(u64::MAX)).is_err());
        assert!(to_sqlite_value(&Value::list([1, 2])).is_err());
    }

    #[test]
    fn column_text_rendering() {
        assert_eq!(to_text(ValueRef::Null), None);
        assert_eq!(to_text(ValueRef::Integer(5)).as_deref(), Some("5"));
        assert_eq!(to_text(ValueRef::Real(2.5)).as_deref(), Some("2.5"));
        assert_eq!(to_text(ValueRef::Text(b"hi")).as_deref(), Some("hi"));
    }
}
