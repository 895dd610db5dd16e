//! Shared fixtures for unit tests: hand-written records and a recording
//! in-memory driver.

use crate::driver::{Driver, ExecResult, Executor, MemoryRows, Transaction};
use crate::error::{DriverError, OrmResult};
use crate::record::{Column, Record, parse_column};
use crate::tag::{FieldKind, FieldSpec, RecordDescriptor};
use crate::value::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, OnceLock};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub balance: f64,
    pub active: bool,
    pub note: Option<String>,
    secret: String,
}

impl Account {
    pub fn new(name: &str, balance: f64, active: bool) -> Self {
        Self {
            name: name.to_string(),
            balance,
            active,
            secret: "hidden".to_string(),
            ..Default::default()
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl Record for Account {
    fn descriptor() -> &'static RecordDescriptor {
        static DESCRIPTOR: OnceLock<RecordDescriptor> = OnceLock::new();
        DESCRIPTOR.get_or_init(|| {
            RecordDescriptor::new(
                "Account",
                &[
                    FieldSpec {
                        name: "id",
                        tag: Some("uid,auto_increment"),
                        kind: FieldKind::Int,
                        visible: true,
                    },
                    FieldSpec {
                        name: "name",
                        tag: Some("username"),
                        kind: FieldKind::Text,
                        visible: true,
                    },
                    FieldSpec {
                        name: "balance",
                        tag: None,
                        kind: FieldKind::Float64,
                        visible: true,
                    },
                    FieldSpec {
                        name: "active",
                        tag: None,
                        kind: FieldKind::Bool,
                        visible: true,
                    },
                    FieldSpec {
                        name: "note",
                        tag: None,
                        kind: FieldKind::Text,
                        visible: true,
                    },
                    FieldSpec {
                        name: "secret",
                        tag: None,
                        kind: FieldKind::Text,
                        visible: false,
                    },
                ],
            )
        })
    }

    fn field_value(&self, index: usize) -> Value {
        match index {
            0 => self.id.to_value(),
            1 => self.name.to_value(),
            2 => self.balance.to_value(),
            3 => self.active.to_value(),
            4 => self.note.to_value(),
            5 => self.secret.to_value(),
            _ => Value::Null,
        }
    }

    fn set_field(&mut self, index: usize, raw: &str) -> OrmResult<()> {
        let Some(field) = Self::descriptor().fields().get(index) else {
            return Ok(());
        };
        let column = field.column.as_str();
        match index {
            0 => self.id = parse_column(column, raw)?,
            1 => self.name = parse_column(column, raw)?,
            2 => self.balance = parse_column(column, raw)?,
            3 => self.active = parse_column(column, raw)?,
            4 => self.note = parse_column(column, raw)?,
            5 => self.secret = parse_column(column, raw)?,
            _ => {}
        }
        Ok(())
    }
}

/// Two untagged fields named `A` and `B`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pair {
    pub a: i32,
    pub b: String,
}

impl Record for Pair {
    fn descriptor() -> &'static RecordDescriptor {
        static DESCRIPTOR: OnceLock<RecordDescriptor> = OnceLock::new();
        DESCRIPTOR.get_or_init(|| {
            RecordDescriptor::new(
                "Pair",
                &[
                    FieldSpec {
                        name: "A",
                        tag: None,
                        kind: FieldKind::Int,
                        visible: true,
                    },
                    FieldSpec {
                        name: "B",
                        tag: None,
                        kind: FieldKind::Text,
                        visible: true,
                    },
                ],
            )
        })
    }

    fn field_value(&self, index: usize) -> Value {
        match index {
            0 => self.a.to_value(),
            1 => self.b.to_value(),
            _ => Value::Null,
        }
    }

    fn set_field(&mut self, index: usize, raw: &str) -> OrmResult<()> {
        match index {
            0 => self.a = parse_column("A", raw)?,
            1 => self.b = parse_column("B", raw)?,
            _ => {}
        }
        Ok(())
    }
}

/// A driver call as seen by [`MockDriver`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Prepare(String),
    Execute {
        sql: String,
        params: Vec<Value>,
        in_tx: bool,
    },
    Query {
        sql: String,
        params: Vec<Value>,
        in_tx: bool,
    },
    Begin,
    Commit,
    Rollback,
}

#[derive(Default)]
struct MockState {
    calls: Mutex<Vec<Call>>,
    results: Mutex<VecDeque<MemoryRows>>,
    exec_result: Mutex<ExecResult>,
    fail_prepare: Mutex<bool>,
    fail_begin: Mutex<bool>,
    fail_commit: Mutex<bool>,
}

impl MockState {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

/// Records every call and answers queries from a queue of canned results.
#[derive(Clone, Default)]
pub struct MockDriver {
    state: Arc<MockState>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.calls.lock().unwrap().clone()
    }

    /// SQL text of every execute/query call, in order.
    pub fn statements(&self) -> Vec<(String, Vec<Value>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Execute { sql, params, .. } | Call::Query { sql, params, .. } => {
                    Some((sql, params))
                }
                _ => None,
            })
            .collect()
    }

    pub fn push_result(&self, rows: MemoryRows) {
        self.state.results.lock().unwrap().push_back(rows);
    }

    pub fn set_exec_result(&self, result: ExecResult) {
        *self.state.exec_result.lock().unwrap() = result;
    }

    pub fn fail_prepare(&self) {
        *self.state.fail_prepare.lock().unwrap() = true;
    }

    pub fn fail_begin(&self) {
        *self.state.fail_begin.lock().unwrap() = true;
    }

    pub fn fail_commit(&self) {
        *self.state.fail_commit.lock().unwrap() = true;
    }
}

fn prepare(state: &MockState, sql: &str) -> Result<String, DriverError> {
    state.record(Call::Prepare(sql.to_string()));
    if *state.fail_prepare.lock().unwrap() {
        return Err("prepare refused".into());
    }
    Ok(sql.to_string())
}

fn execute(state: &MockState, sql: &str, params: &[Value], in_tx: bool) -> ExecResult {
    state.record(Call::Execute {
        sql: sql.to_string(),
        params: params.to_vec(),
        in_tx,
    });
    *state.exec_result.lock().unwrap()
}

fn query(state: &MockState, sql: &str, params: &[Value], in_tx: bool) -> MemoryRows {
    state.record(Call::Query {
        sql: sql.to_string(),
        params: params.to_vec(),
        in_tx,
    });
    state
        .results
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_default()
}

impl Executor for MockDriver {
    type Prepared = String;
    type Rows = MemoryRows;

    async fn prepare(&self, sql: &str) -> Result<String, DriverError> {
        prepare(&self.state, sql)
    }

    async fn execute(&self, stmt: &String, params: &[Value]) -> Result<ExecResult, DriverError> {
        Ok(execute(&self.state, stmt, params, false))
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<MemoryRows, DriverError> {
        Ok(query(&self.state, sql, params, false))
    }
}

impl Driver for MockDriver {
    type Transaction = MockTx;

    async fn begin_transaction(&self) -> Result<MockTx, DriverError> {
        self.state.record(Call::Begin);
        if *self.state.fail_begin.lock().unwrap() {
            return Err("begin refused".into());
        }
        Ok(MockTx {
            state: Arc::clone(&self.state),
        })
    }
}

pub struct MockTx {
    state: Arc<MockState>,
}

impl Executor for MockTx {
    type Prepared = String;
    type Rows = MemoryRows;

    async fn prepare(&self, sql: &str) -> Result<String, DriverError> {
        prepare(&self.state, sql)
    }

    async fn execute(&self, stmt: &String, params: &[Value]) -> Result<ExecResult, DriverError> {
        Ok(execute(&self.state, stmt, params, true))
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<MemoryRows, DriverError> {
        Ok(query(&self.state, sql, params, true))
    }
}

impl Transaction for MockTx {
    async fn commit(self) -> Result<(), DriverError> {
        self.state.record(Call::Commit);
        if *self.state.fail_commit.lock().unwrap() {
            return Err("commit refused".into());
        }
        Ok(())
    }

    async fn rollback(self) -> Result<(), DriverError> {
        self.state.record(Call::Rollback);
        Ok(())
    }
}
