//! Statement composition: insert, replace, select, update, delete and aggregates.

use crate::clause::Clauses;
use crate::debug::render_debug_sql;
use crate::error::{OrmError, OrmResult};
use crate::param::{ParamList, placeholders};
use crate::record::Record;
use crate::value::Value;
use std::fmt;

/// Aggregate functions usable with [`StatementBuilder::aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFn {
    Count,
    Max,
    Min,
    Avg,
    Sum,
}

impl AggregateFn {
    pub fn as_str(self) -> &'static str {
        match self {
            AggregateFn::Count => "count",
            AggregateFn::Max => "max",
            AggregateFn::Min => "min",
            AggregateFn::Avg => "avg",
            AggregateFn::Sum => "sum",
        }
    }
}

/// What a built statement does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Insert,
    Replace,
    Select,
    Update,
    Delete,
    Aggregate(AggregateFn),
    /// Hand-written SQL passed to [`Orm::exec`](crate::Orm::exec) or
    /// [`Orm::query`](crate::Orm::query).
    Raw,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementKind::Insert => f.write_str("insert"),
            StatementKind::Replace => f.write_str("replace"),
            StatementKind::Select => f.write_str("select"),
            StatementKind::Update => f.write_str("update"),
            StatementKind::Delete => f.write_str("delete"),
            StatementKind::Aggregate(func) => f.write_str(func.as_str()),
            StatementKind::Raw => f.write_str("raw"),
        }
    }
}

/// `column=?` assignments for an update statement.
#[derive(Debug, Clone, Default)]
pub struct Assignments {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Assignments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign every visible field of `record`.
    pub fn from_record<R: Record>(record: &R) -> Self {
        let mut assignments = Self::new();
        for (i, field) in R::descriptor().visible_fields() {
            assignments.columns.push(field.column.clone());
            assignments.values.push(record.field_value(i));
        }
        assignments
    }

    /// Add `column=?` bound to `value`.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.push(column.into());
        self.values.push(value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Fully built SQL text and its bound values.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    kind: StatementKind,
    sql: String,
    params: ParamList,
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &ParamList {
        &self.params
    }

    /// The SQL with parameters inlined, for diagnostics only.
    pub fn debug_sql(&self) -> String {
        render_debug_sql(&self.sql, self.params.as_slice())
    }
}

/// Composes statements from a table, a field selection and accumulated
/// clauses.
#[derive(Debug, Clone, Copy)]
pub struct StatementBuilder<'a> {
    table: &'a str,
    fields: &'a str,
    clauses: &'a Clauses,
}

impl<'a> StatementBuilder<'a> {
    pub fn new(table: &'a str, fields: &'a str, clauses: &'a Clauses) -> Self {
        Self {
            table,
            fields,
            clauses,
        }
    }

    /// `insert into` / `replace into` with one placeholder group per record.
    ///
    /// Columns come from the record type, so every group has the same shape.
    pub fn insert<R: Record>(&self, kind: StatementKind, records: &[R]) -> OrmResult<Statement> {
        let verb = match kind {
            StatementKind::Insert => "insert",
            StatementKind::Replace => "replace",
            other => {
                return Err(OrmError::usage(format!(
                    "`{other}` is not an insert statement kind"
                )));
            }
        };
        if records.is_empty() {
            return Err(OrmError::usage("insert requires at least one record"));
        }

        let descriptor = R::descriptor();
        let indices: Vec<usize> = descriptor.insert_fields().map(|(i, _)| i).collect();
        if indices.is_empty() {
            return Err(OrmError::usage(format!(
                "record `{}` has no insertable fields",
                descriptor.type_name()
            )));
        }

        let mut params = ParamList::new();
        let group = format!("({})", placeholders(indices.len()));
        let mut groups = Vec::with_capacity(records.len());
        for record in records {
            for &i in &indices {
                params.push(record.field_value(i))?;
            }
            groups.push(group.as_str());
        }

        let sql = format!(
            "{verb} into {} ({}) values {}",
            self.table,
            descriptor.insert_columns(),
            groups.join(",")
        );
        Ok(Statement { kind, sql, params })
    }

    pub fn select(&self) -> OrmResult<Statement> {
        let mut sql = format!("select {} from {}", self.fields, self.table);
        let mut params = ParamList::new();
        self.push_where(&mut sql, &mut params);
        self.push_group_having(&mut sql, &mut params);
        self.push_order(&mut sql);
        self.push_limit(&mut sql);
        Ok(Statement {
            kind: StatementKind::Select,
            sql,
            params,
        })
    }

    /// `update ... set`; assignment values bind before filter values.
    pub fn update(&self, assignments: &Assignments) -> OrmResult<Statement> {
        if assignments.is_empty() {
            return Err(OrmError::usage("update requires at least one assignment"));
        }
        let mut params = ParamList::new();
        let mut sets = Vec::with_capacity(assignments.len());
        for (column, value) in assignments.columns.iter().zip(&assignments.values) {
            sets.push(format!("{column}={}", params.push(value.clone())?));
        }

        let mut sql = format!("update {} set {}", self.table, sets.join(","));
        self.push_where(&mut sql, &mut params);
        self.push_order(&mut sql);
        self.push_limit(&mut sql);
        Ok(Statement {
            kind: StatementKind::Update,
            sql,
            params,
        })
    }

    pub fn delete(&self) -> OrmResult<Statement> {
        let mut sql = format!("delete from {}", self.table);
        let mut params = ParamList::new();
        self.push_where(&mut sql, &mut params);
        self.push_order(&mut sql);
        self.push_limit(&mut sql);
        Ok(Statement {
            kind: StatementKind::Delete,
            sql,
            params,
        })
    }

    /// `select <fn>(<arg>) as cnt from ...`
    pub fn aggregate(&self, func: AggregateFn, arg: &str) -> OrmResult<Statement> {
        if arg.trim().is_empty() {
            return Err(OrmError::usage(format!(
                "{}() requires a column expression",
                func.as_str()
            )));
        }
        let mut sql = format!("select {}({arg}) as cnt from {}", func.as_str(), self.table);
        let mut params = ParamList::new();
        self.push_where(&mut sql, &mut params);
        self.push_group_having(&mut sql, &mut params);
        self.push_limit(&mut sql);
        Ok(Statement {
            kind: StatementKind::Aggregate(func),
            sql,
            params,
        })
    }

    fn push_where(&self, sql: &mut String, params: &mut ParamList) {
        let where_sql = self.clauses.where_sql();
        if !where_sql.is_empty() {
            sql.push_str(" where ");
            sql.push_str(where_sql);
            params.extend(self.clauses.where_params());
        }
    }

    fn push_group_having(&self, sql: &mut String, params: &mut ParamList) {
        let group = self.clauses.group();
        if !group.is_empty() {
            sql.push_str(" group by ");
            sql.push_str(group);
        }
        let having = self.clauses.having_sql();
        if !having.is_empty() {
            sql.push_str(" having ");
            sql.push_str(having);
            params.extend(self.clauses.having_params());
        }
    }

    fn push_order(&self, sql: &mut String) {
        let order = self.clauses.order();
        if !order.is_empty() {
            sql.push_str(" order by ");
            sql.push_str(order);
        }
    }

    fn push_limit(&self, sql: &mut String) {
        if let Some(limit) = self.clauses.limit() {
            sql.push_str(" limit ");
            sql.push_str(&limit.to_string());
        }
    }
}
