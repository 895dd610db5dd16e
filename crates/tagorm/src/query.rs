//! Chained builder session bound to one table.
//!
//! Clause methods consume and return the session. A malformed clause call is
//! recorded and reported by the terminal operation, so chains stay fluent and
//! nothing reaches the driver once a call has failed.

use crate::clause::{Clauses, Conjunction, Limit, Predicate};
use crate::driver::Driver;
use crate::error::{OrmError, OrmResult};
use crate::orm::{Generic, Orm, Typed};
use crate::record::Record;
use crate::row::GenericRow;
use crate::statement::{AggregateFn, Assignments, Statement, StatementBuilder, StatementKind};
use crate::value::Value;

/// Builder session created by [`Orm::table`].
pub struct Query<'a, D: Driver> {
    orm: &'a mut Orm<D>,
    table: String,
    fields: Option<String>,
    clauses: Clauses,
    build_error: Option<String>,
}

impl<'a, D: Driver> Query<'a, D> {
    pub(crate) fn new(orm: &'a mut Orm<D>, table: String) -> Self {
        Self {
            orm,
            table,
            fields: None,
            clauses: Clauses::new(),
            build_error: None,
        }
    }

    fn apply(mut self, f: impl FnOnce(&mut Clauses) -> OrmResult<()>) -> Self {
        if self.build_error.is_none()
            && let Err(err) = f(&mut self.clauses)
        {
            self.build_error = Some(match err {
                OrmError::Usage(message) => message,
                other => other.to_string(),
            });
        }
        self
    }

    fn validate(&self) -> OrmResult<()> {
        if let Some(err) = &self.build_error {
            return Err(OrmError::usage(err.clone()));
        }
        Ok(())
    }

    /// The clause state accumulated so far.
    pub fn clauses(&self) -> &Clauses {
        &self.clauses
    }

    /// The first clause error recorded on this session, if any.
    pub fn build_error(&self) -> Option<&str> {
        self.build_error.as_deref()
    }

    // ==================== Clauses ====================

    /// Select list for `select`/`find`; defaults to `OrmConfig::default_fields`.
    pub fn field(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    /// Fold a prepared clause set into this session, after anything already
    /// chained. See [`Clauses::merge`].
    pub fn with_clauses(self, clauses: &Clauses) -> Self {
        self.apply(|c| {
            c.merge(clauses);
            Ok(())
        })
    }

    pub fn filter(self, predicate: Predicate) -> Self {
        self.apply(|c| c.add_filter(Conjunction::And, &predicate))
    }

    pub fn or_filter(self, predicate: Predicate) -> Self {
        self.apply(|c| c.add_filter(Conjunction::Or, &predicate))
    }

    /// `and (column=?)`
    pub fn where_eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(Predicate::eq(column, value))
    }

    /// `and (column <op> ?)`; `in`/`not in` take a sequence value.
    pub fn where_op(
        self,
        column: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.filter(Predicate::compare(column, op, value))
    }

    pub fn where_in<T: Into<Value>>(
        self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        self.filter(Predicate::in_list(column, values))
    }

    pub fn where_not_in<T: Into<Value>>(
        self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        self.filter(Predicate::not_in(column, values))
    }

    /// Match every visible field of `record` by equality.
    pub fn where_record<R: Record>(self, record: &R) -> Self {
        self.filter(Predicate::matching(record))
    }

    pub fn or_where_eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.or_filter(Predicate::eq(column, value))
    }

    pub fn or_where_op(
        self,
        column: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.or_filter(Predicate::compare(column, op, value))
    }

    pub fn having(self, predicate: Predicate) -> Self {
        self.apply(|c| c.add_having(&predicate))
    }

    pub fn having_eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.having(Predicate::eq(column, value))
    }

    pub fn having_op(
        self,
        column: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.having(Predicate::compare(column, op, value))
    }

    pub fn group(self, fields: &[&str]) -> Self {
        self.apply(|c| {
            c.add_group(fields);
            Ok(())
        })
    }

    /// `(field, direction)` pairs: `order(&["name", "asc", "age", "desc"])`.
    pub fn order(self, pairs: &[&str]) -> Self {
        self.apply(|c| c.add_order(pairs))
    }

    pub fn limit(self, count: u64) -> Self {
        self.apply(|c| {
            c.set_limit(Limit::Count(count));
            Ok(())
        })
    }

    /// `limit offset,count`
    pub fn limit_offset(self, offset: u64, count: u64) -> Self {
        self.apply(|c| {
            c.set_limit(Limit::Range(offset, count));
            Ok(())
        })
    }

    // ==================== Build ====================

    fn builder(&self) -> StatementBuilder<'_> {
        let fields = self
            .fields
            .as_deref()
            .unwrap_or(&self.orm.config().default_fields);
        StatementBuilder::new(&self.table, fields, &self.clauses)
    }

    pub fn build_select(&self) -> OrmResult<Statement> {
        self.validate()?;
        self.builder().select()
    }

    pub fn build_insert<R: Record>(&self, kind: StatementKind, records: &[R]) -> OrmResult<Statement> {
        self.validate()?;
        self.builder().insert(kind, records)
    }

    pub fn build_update(&self, assignments: &Assignments) -> OrmResult<Statement> {
        self.validate()?;
        self.builder().update(assignments)
    }

    pub fn build_delete(&self) -> OrmResult<Statement> {
        self.validate()?;
        self.builder().delete()
    }

    pub fn build_aggregate(&self, func: AggregateFn, arg: &str) -> OrmResult<Statement> {
        self.validate()?;
        self.builder().aggregate(func, arg)
    }

    // ==================== Insert / update / delete ====================

    /// Insert one record, returning the driver's last insert id.
    pub async fn insert<R: Record>(self, record: &R) -> OrmResult<i64> {
        self.insert_many(std::slice::from_ref(record)).await
    }

    /// Insert a batch with one multi-row statement.
    pub async fn insert_many<R: Record>(self, records: &[R]) -> OrmResult<i64> {
        let stmt = self.build_insert(StatementKind::Insert, records)?;
        Ok(self.orm.execute_statement(&stmt).await?.last_insert_id)
    }

    pub async fn replace<R: Record>(self, record: &R) -> OrmResult<i64> {
        self.replace_many(std::slice::from_ref(record)).await
    }

    pub async fn replace_many<R: Record>(self, records: &[R]) -> OrmResult<i64> {
        let stmt = self.build_insert(StatementKind::Replace, records)?;
        Ok(self.orm.execute_statement(&stmt).await?.last_insert_id)
    }

    /// Apply `assignments` to matching rows, returning rows affected.
    pub async fn update(self, assignments: Assignments) -> OrmResult<u64> {
        let stmt = self.build_update(&assignments)?;
        Ok(self.orm.execute_statement(&stmt).await?.rows_affected)
    }

    /// Assign every visible field of `record` to matching rows.
    pub async fn update_record<R: Record>(self, record: &R) -> OrmResult<u64> {
        self.update(Assignments::from_record(record)).await
    }

    pub async fn delete(self) -> OrmResult<u64> {
        let stmt = self.build_delete()?;
        Ok(self.orm.execute_statement(&stmt).await?.rows_affected)
    }

    // ==================== Select ====================

    /// Every matching row as column→text pairs.
    pub async fn select(self) -> OrmResult<Vec<GenericRow>> {
        let stmt = self.build_select()?;
        self.orm.query_statement::<Generic>(&stmt).await
    }

    /// First matching row; [`OrmError::NotFound`] when there is none.
    pub async fn select_one(self) -> OrmResult<GenericRow> {
        let table = self.table.clone();
        self.select_opt()
            .await?
            .ok_or_else(|| OrmError::not_found(format!("no row in `{table}`")))
    }

    pub async fn select_opt(self) -> OrmResult<Option<GenericRow>> {
        let rows = self.limit(1).select().await?;
        Ok(rows.into_iter().next())
    }

    /// Every matching row mapped onto `T`.
    pub async fn find<T: Record>(self) -> OrmResult<Vec<T>> {
        let stmt = self.build_select()?;
        self.orm.query_statement::<Typed<T>>(&stmt).await
    }

    /// First matching row as `T`; [`OrmError::NotFound`] when there is none.
    pub async fn find_one<T: Record>(self) -> OrmResult<T> {
        let table = self.table.clone();
        self.find_opt()
            .await?
            .ok_or_else(|| OrmError::not_found(format!("no row in `{table}`")))
    }

    pub async fn find_opt<T: Record>(self) -> OrmResult<Option<T>> {
        let rows = self.limit(1).find::<T>().await?;
        Ok(rows.into_iter().next())
    }

    // ==================== Aggregates ====================

    /// `count(*)` over matching rows; 0 when the result is empty.
    pub async fn count(self) -> OrmResult<i64> {
        let raw = self.aggregate(AggregateFn::Count, "*").await?;
        if raw.is_empty() {
            return Ok(0);
        }
        raw.trim()
            .parse()
            .map_err(|e: std::num::ParseIntError| OrmError::conversion("cnt", raw, e.to_string()))
    }

    pub async fn max(self, column: &str) -> OrmResult<String> {
        self.aggregate(AggregateFn::Max, column).await
    }

    pub async fn min(self, column: &str) -> OrmResult<String> {
        self.aggregate(AggregateFn::Min, column).await
    }

    pub async fn avg(self, column: &str) -> OrmResult<String> {
        self.aggregate(AggregateFn::Avg, column).await
    }

    pub async fn sum(self, column: &str) -> OrmResult<String> {
        self.aggregate(AggregateFn::Sum, column).await
    }

    /// Raw text of the first column of the first row; empty when no row
    /// comes back or the value is NULL.
    async fn aggregate(self, func: AggregateFn, arg: &str) -> OrmResult<String> {
        let stmt = self.build_aggregate(func, arg)?;
        let rows = self.orm.query_statement::<Generic>(&stmt).await?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.values().first().cloned())
            .unwrap_or_default())
    }
}
