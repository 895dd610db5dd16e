//! The `Orm` handle: owns the driver, configuration, transaction state and
//! the last executed SQL.

use crate::config::OrmConfig;
use crate::debug::render_debug_sql;
use crate::driver::{Driver, ExecResult, Executor, ResultSet};
use crate::error::{OrmError, OrmResult};
use crate::query::Query;
use crate::record::Record;
use crate::row::{GenericRow, read_generic, read_typed};
use crate::statement::{Statement, StatementKind};
use crate::trace;
use crate::transaction::{TxState, TxStatus};
use crate::value::Value;
use std::marker::PhantomData;

/// How a result set is turned into output.
pub(crate) trait RowReader {
    type Output;

    fn read<R: ResultSet>(rows: R) -> OrmResult<Self::Output>;
}

pub(crate) struct Generic;

impl RowReader for Generic {
    type Output = Vec<GenericRow>;

    fn read<R: ResultSet>(rows: R) -> OrmResult<Self::Output> {
        read_generic(rows)
    }
}

pub(crate) struct Typed<T>(PhantomData<T>);

impl<T: Record> RowReader for Typed<T> {
    type Output = Vec<T>;

    fn read<R: ResultSet>(rows: R) -> OrmResult<Self::Output> {
        read_typed(rows)
    }
}

async fn execute_on<E: Executor>(
    executor: &E,
    sql: &str,
    params: &[Value],
) -> OrmResult<ExecResult> {
    let prepared = executor
        .prepare(sql)
        .await
        .map_err(|e| OrmError::driver(format!("prepare `{sql}`"), e))?;
    executor
        .execute(&prepared, params)
        .await
        .map_err(|e| OrmError::driver(format!("execute `{sql}`"), e))
}

async fn query_on<E: Executor, M: RowReader>(
    executor: &E,
    sql: &str,
    params: &[Value],
) -> OrmResult<M::Output> {
    let rows = executor
        .query(sql, params)
        .await
        .map_err(|e| OrmError::driver(format!("query `{sql}`"), e))?;
    M::read(rows)
}

fn report(error: &OrmError) {
    if error.is_driver() {
        trace::driver_failure(error);
    }
}

/// Entry point for building and running statements over a [`Driver`].
///
/// While a transaction is active every statement runs on the transaction
/// handle instead of the driver.
///
/// # Example
///
/// ```ignore
/// let mut orm = Orm::new(SqliteDriver::open_in_memory()?);
/// let users: Vec<User> = orm
///     .table("userinfo")
///     .where_op("uid", ">=", 50)
///     .order(&["uid", "desc"])
///     .limit(10)
///     .find()
///     .await?;
/// ```
pub struct Orm<D: Driver> {
    driver: D,
    config: OrmConfig,
    tx: TxState<D::Transaction>,
    last_sql: Option<String>,
}

impl<D: Driver> Orm<D> {
    pub fn new(driver: D) -> Self {
        Self::with_config(driver, OrmConfig::default())
    }

    pub fn with_config(driver: D, config: OrmConfig) -> Self {
        Self {
            driver,
            config,
            tx: TxState::Idle,
            last_sql: None,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn config(&self) -> &OrmConfig {
        &self.config
    }

    /// Start a builder session bound to `table`.
    pub fn table(&mut self, name: impl Into<String>) -> Query<'_, D> {
        Query::new(self, name.into())
    }

    // ==================== Transactions ====================

    /// Open a transaction; fails if one is already active.
    pub async fn begin(&mut self) -> OrmResult<()> {
        self.tx.begin(&self.driver).await
    }

    pub async fn commit(&mut self) -> OrmResult<()> {
        self.tx.commit().await
    }

    pub async fn rollback(&mut self) -> OrmResult<()> {
        self.tx.rollback().await
    }

    pub fn in_transaction(&self) -> bool {
        self.tx.status() == TxStatus::Active
    }

    pub fn tx_status(&self) -> TxStatus {
        self.tx.status()
    }

    /// Debug rendering of the most recent statement, if tracking is enabled.
    pub fn last_sql(&self) -> Option<&str> {
        self.last_sql.as_deref()
    }

    // ==================== Raw statements ====================

    /// Run a hand-written data-modifying statement.
    pub async fn exec(&mut self, sql: &str, params: &[Value]) -> OrmResult<ExecResult> {
        self.run_execute(StatementKind::Raw, sql, params).await
    }

    /// Run a hand-written query, returning every row as text.
    pub async fn query(&mut self, sql: &str, params: &[Value]) -> OrmResult<Vec<GenericRow>> {
        self.run_query::<Generic>(StatementKind::Raw, sql, params)
            .await
    }

    // ==================== Dispatch ====================

    pub(crate) async fn execute_statement(&mut self, stmt: &Statement) -> OrmResult<ExecResult> {
        self.run_execute(stmt.kind(), stmt.sql(), stmt.params().as_slice())
            .await
    }

    pub(crate) async fn query_statement<M: RowReader>(
        &mut self,
        stmt: &Statement,
    ) -> OrmResult<M::Output> {
        self.run_query::<M>(stmt.kind(), stmt.sql(), stmt.params().as_slice())
            .await
    }

    async fn run_execute(
        &mut self,
        kind: StatementKind,
        sql: &str,
        params: &[Value],
    ) -> OrmResult<ExecResult> {
        self.record(kind, sql, params);
        let result = match self.tx.handle() {
            Some(tx) => execute_on(tx, sql, params).await,
            None => execute_on(&self.driver, sql, params).await,
        };
        result.inspect_err(report)
    }

    async fn run_query<M: RowReader>(
        &mut self,
        kind: StatementKind,
        sql: &str,
        params: &[Value],
    ) -> OrmResult<M::Output> {
        self.record(kind, sql, params);
        let result = match self.tx.handle() {
            Some(tx) => query_on::<_, M>(tx, sql, params).await,
            None => query_on::<_, M>(&self.driver, sql, params).await,
        };
        result.inspect_err(report)
    }

    fn record(&mut self, kind: StatementKind, sql: &str, params: &[Value]) {
        let debug_sql = render_debug_sql(sql, params);
        trace::statement(&self.config, kind, &debug_sql, params.len());
        self.last_sql = trace::last_sql(&self.config, debug_sql);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MemoryRows;
    use crate::test_support::{Call, MockDriver};

    #[tokio::test]
    async fn raw_exec_prepares_then_executes() {
        let driver = MockDriver::new();
        driver.set_exec_result(ExecResult {
            last_insert_id: 0,
            rows_affected: 3,
        });
        let mut orm = Orm::new(driver.clone());
        let result = orm
            .exec("update t set a=? where b=?", &[Value::Int(1), Value::from("x")])
            .await
            .unwrap();
        assert_eq!(result.rows_affected, 3);
        assert_eq!(
            driver.calls(),
            vec![
                Call::Prepare("update t set a=? where b=?".into()),
                Call::Execute {
                    sql: "update t set a=? where b=?".into(),
                    params: vec![Value::Int(1), Value::Text("x".into())],
                    in_tx: false,
                },
            ]
        );
        assert_eq!(orm.last_sql(), Some("update t set a=1 where b='x'"));
    }

    #[tokio::test]
    async fn raw_query_returns_generic_rows() {
        let driver = MockDriver::new();
        driver.push_result(
            MemoryRows::new(vec!["uid".into(), "name".into()])
                .with_row([Some("1"), Some("ann")])
                .with_row([Some("2"), None]),
        );
        let mut orm = Orm::new(driver);
        let rows = orm.query("select uid,name from t", &[]).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("name"), Some("ann"));
        assert_eq!(rows[1].get("name"), Some(""));
    }

    #[tokio::test]
    async fn statements_route_to_transaction_while_active() {
        let driver = MockDriver::new();
        let mut orm = Orm::new(driver.clone());
        orm.begin().await.unwrap();
        assert!(orm.in_transaction());
        orm.exec("delete from t", &[]).await.unwrap();
        orm.commit().await.unwrap();
        orm.exec("delete from t", &[]).await.unwrap();

        let in_tx: Vec<bool> = driver
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Execute { in_tx, .. } => Some(in_tx),
                _ => None,
            })
            .collect();
        assert_eq!(in_tx, vec![true, false]);
        assert_eq!(orm.tx_status(), TxStatus::Idle);
    }

    #[tokio::test]
    async fn prepare_failure_is_driver_error() {
        let driver = MockDriver::new();
        driver.fail_prepare();
        let mut orm = Orm::new(driver.clone());
        let err = orm.exec("delete from t", &[]).await.unwrap_err();
        assert!(err.is_driver());
        assert_eq!(driver.statements().len(), 0);
    }

    #[tokio::test]
    async fn last_sql_can_be_disabled() {
        let mut orm = Orm::with_config(
            MockDriver::new(),
            OrmConfig::new().record_last_sql(false),
        );
        orm.exec("delete from t", &[]).await.unwrap();
        assert_eq!(orm.last_sql(), None);
    }
}
