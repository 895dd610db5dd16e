//! Clause accumulation: filters, ordering, grouping, having and limit.
//!
//! Each filter call renders one parenthesized fragment and appends its bound
//! values in emission order, so the accumulated text and [`ParamList`] always
//! line up placeholder-for-value.

use crate::error::{OrmError, OrmResult};
use crate::param::ParamList;
use crate::record::Record;
use crate::value::Value;
use std::fmt;

/// How a filter joins the filters already accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conjunction {
    And,
    Or,
}

impl Conjunction {
    fn as_str(self) -> &'static str {
        match self {
            Conjunction::And => "and",
            Conjunction::Or => "or",
        }
    }
}

/// One filter/having predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column=?`
    Equals { column: String, value: Value },
    /// `column <op> ?`; `in` / `not in` expand a sequence value.
    Compare {
        column: String,
        op: String,
        value: Value,
    },
    /// Every visible record field as `column=?`, AND-joined.
    StructMatch(Vec<(String, Value)>),
    /// `column in (?,...)`
    InList { column: String, values: Vec<Value> },
    /// `column not in (?,...)`
    NotInList { column: String, values: Vec<Value> },
}

impl Predicate {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Equals {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn compare(
        column: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Predicate::Compare {
            column: column.into(),
            op: op.into(),
            value: value.into(),
        }
    }

    pub fn in_list<T: Into<Value>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        Predicate::InList {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn not_in<T: Into<Value>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        Predicate::NotInList {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Match every visible field of `record` by equality.
    pub fn matching<R: Record>(record: &R) -> Self {
        let pairs = R::descriptor()
            .visible_fields()
            .map(|(i, f)| (f.column.clone(), record.field_value(i)))
            .collect();
        Predicate::StructMatch(pairs)
    }

    /// Render the predicate body (without parentheses), binding into `params`.
    pub fn render(&self, params: &mut ParamList) -> OrmResult<String> {
        match self {
            Predicate::Equals { column, value } => {
                Ok(format!("{column}={}", params.push(value.clone())?))
            }
            Predicate::Compare { column, op, value } => {
                let op_norm = op.trim().to_ascii_lowercase();
                match op_norm.as_str() {
                    "in" | "not in" => match value {
                        Value::List(values) => {
                            render_in_list(column, values, op_norm == "not in", params)
                        }
                        other => Err(OrmError::usage(format!(
                            "`{op_norm}` on column `{column}` requires a sequence value, got {}",
                            other.kind_name()
                        ))),
                    },
                    _ => Ok(format!("{column} {op} {}", params.push(value.clone())?)),
                }
            }
            Predicate::StructMatch(pairs) => {
                if pairs.is_empty() {
                    return Err(OrmError::usage("record has no visible fields to match"));
                }
                let mut parts = Vec::with_capacity(pairs.len());
                for (column, value) in pairs {
                    parts.push(format!("{column}={}", params.push(value.clone())?));
                }
                Ok(parts.join(" and "))
            }
            Predicate::InList { column, values } => render_in_list(column, values, false, params),
            Predicate::NotInList { column, values } => {
                render_in_list(column, values, true, params)
            }
        }
    }
}

fn render_in_list(
    column: &str,
    values: &[Value],
    negated: bool,
    params: &mut ParamList,
) -> OrmResult<String> {
    // An empty list can never match (or always matches, negated); `in ()`
    // is not valid SQL.
    if values.is_empty() {
        return Ok(if negated { "1=1" } else { "1=0" }.to_string());
    }
    let placeholders = params.push_list(values)?;
    let op = if negated { "not in" } else { "in" };
    Ok(format!("{column} {op} ({placeholders})"))
}

/// Sort direction keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// Parse `asc` / `desc` in any case.
    pub fn parse(keyword: &str) -> OrmResult<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            _ => Err(OrmError::usage(format!(
                "order direction must be `asc` or `desc`, got `{keyword}`"
            ))),
        }
    }
}

/// A `limit` clause, emitted verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// `limit N`
    Count(u64),
    /// `limit A,B` (conventionally offset, count)
    Range(u64, u64),
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Count(n) => write!(f, "{n}"),
            Limit::Range(a, b) => write!(f, "{a},{b}"),
        }
    }
}

/// In-progress clause fragments and their bound values.
#[derive(Debug, Clone, Default)]
pub struct Clauses {
    where_sql: String,
    where_params: ParamList,
    group: String,
    having_sql: String,
    having_params: ParamList,
    order: String,
    limit: Option<Limit>,
}

impl Clauses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter joined with `conjunction`.
    ///
    /// A disjunction needs a preceding filter to attach to.
    pub fn add_filter(&mut self, conjunction: Conjunction, predicate: &Predicate) -> OrmResult<()> {
        if conjunction == Conjunction::Or && self.where_sql.is_empty() {
            return Err(OrmError::usage(
                "or-filter must follow at least one and-filter",
            ));
        }
        append_fragment(
            &mut self.where_sql,
            &mut self.where_params,
            conjunction,
            predicate,
        )
    }

    /// Add a having predicate (always AND-joined).
    pub fn add_having(&mut self, predicate: &Predicate) -> OrmResult<()> {
        append_fragment(
            &mut self.having_sql,
            &mut self.having_params,
            Conjunction::And,
            predicate,
        )
    }

    /// Append `(field, direction)` pairs given as a flat list.
    pub fn add_order(&mut self, pairs: &[&str]) -> OrmResult<()> {
        if pairs.len() % 2 != 0 {
            return Err(OrmError::usage(format!(
                "order expects (field, direction) pairs, got {} arguments",
                pairs.len()
            )));
        }
        let mut fragments = Vec::with_capacity(pairs.len() / 2);
        for pair in pairs.chunks_exact(2) {
            Direction::parse(pair[1])?;
            fragments.push(format!("{} {}", pair[0], pair[1]));
        }
        if fragments.is_empty() {
            return Ok(());
        }
        if !self.order.is_empty() {
            self.order.push(',');
        }
        self.order.push_str(&fragments.join(","));
        Ok(())
    }

    /// Replace the group list; an empty list leaves it untouched.
    pub fn add_group(&mut self, fields: &[&str]) {
        if !fields.is_empty() {
            self.group = fields.join(",");
        }
    }

    pub fn set_limit(&mut self, limit: Limit) {
        self.limit = Some(limit);
    }

    /// Fold `other` into these clauses.
    ///
    /// Where and having text from both sides is AND-joined, each side kept in
    /// its own parentheses, with `other`'s values bound after ours. Order
    /// fields append; a non-empty group list or a set limit in `other`
    /// replaces ours.
    pub fn merge(&mut self, other: &Clauses) {
        merge_fragment(
            &mut self.where_sql,
            &mut self.where_params,
            &other.where_sql,
            &other.where_params,
        );
        merge_fragment(
            &mut self.having_sql,
            &mut self.having_params,
            &other.having_sql,
            &other.having_params,
        );
        if !other.group.is_empty() {
            self.group = other.group.clone();
        }
        if !other.order.is_empty() {
            if !self.order.is_empty() {
                self.order.push(',');
            }
            self.order.push_str(&other.order);
        }
        if other.limit.is_some() {
            self.limit = other.limit;
        }
    }

    pub fn where_sql(&self) -> &str {
        &self.where_sql
    }

    pub fn where_params(&self) -> &ParamList {
        &self.where_params
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn having_sql(&self) -> &str {
        &self.having_sql
    }

    pub fn having_params(&self) -> &ParamList {
        &self.having_params
    }

    pub fn order(&self) -> &str {
        &self.order
    }

    pub fn limit(&self) -> Option<Limit> {
        self.limit
    }
}

/// Render `predicate` into a scratch list first so a failing call leaves the
/// accumulated text and values untouched.
fn append_fragment(
    sql: &mut String,
    params: &mut ParamList,
    conjunction: Conjunction,
    predicate: &Predicate,
) -> OrmResult<()> {
    let mut scratch = ParamList::new();
    let body = predicate.render(&mut scratch)?;
    if !sql.is_empty() {
        sql.push(' ');
        sql.push_str(conjunction.as_str());
        sql.push(' ');
    }
    sql.push('(');
    sql.push_str(&body);
    sql.push(')');
    params.extend(&scratch);
    Ok(())
}

fn merge_fragment(sql: &mut String, params: &mut ParamList, other_sql: &str, other_params: &ParamList) {
    if other_sql.is_empty() {
        return;
    }
    if sql.is_empty() {
        sql.push_str(other_sql);
    } else {
        *sql = format!("({sql}) and ({other_sql})");
    }
    params.extend(other_params);
}
