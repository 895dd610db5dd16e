//! Row mapping: generic column→text rows and typed records.
//!
//! SQL NULL is read as empty text in both modes, so NULL and `''` cannot be
//! told apart. `Option<T>` record fields read empty text as `None`.

use crate::driver::ResultSet;
use crate::error::{OrmError, OrmResult};
use crate::record::Record;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

/// One result row as ordered column→text pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericRow {
    columns: Arc<[String]>,
    values: Vec<String>,
}

impl GenericRow {
    pub fn new(columns: Arc<[String]>, values: Vec<String>) -> Self {
        Self { columns, values }
    }

    /// Text of `column`, if the row has it.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Iterate `(column, text)` in result order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The row as a JSON object of strings.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.iter()
                .map(|(c, v)| (c.to_string(), serde_json::Value::String(v.to_string())))
                .collect(),
        )
    }

    /// Map this row onto a typed record.
    pub fn to_record<T: Record>(&self) -> OrmResult<T> {
        let plan = MappingPlan::new::<T>(&self.columns);
        plan.map_row(self.values.iter().map(String::as_str))
    }
}

impl Serialize for GenericRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// For each result column, the record fields it fills.
struct MappingPlan {
    targets: Vec<Vec<usize>>,
}

impl MappingPlan {
    fn new<T: Record>(columns: &[String]) -> Self {
        let descriptor = T::descriptor();
        let targets = columns
            .iter()
            .map(|c| descriptor.fields_for_column(c).collect())
            .collect();
        Self { targets }
    }

    fn map_row<'v, T: Record>(&self, values: impl Iterator<Item = &'v str>) -> OrmResult<T> {
        let mut dest = T::default();
        for (targets, raw) in self.targets.iter().zip(values) {
            for &field in targets {
                dest.set_field(field, raw)?;
            }
        }
        Ok(dest)
    }
}

fn next_row<R: ResultSet>(rows: &mut R) -> OrmResult<Option<Vec<Option<String>>>> {
    rows.next_row()
        .map_err(|e| OrmError::driver("reading result rows", e))
}

/// Drain `rows` into generic rows.
pub fn read_generic<R: ResultSet>(mut rows: R) -> OrmResult<Vec<GenericRow>> {
    let columns: Arc<[String]> = rows.columns().into();
    let mut out = Vec::new();
    while let Some(raw) = next_row(&mut rows)? {
        let values = raw.into_iter().map(Option::unwrap_or_default).collect();
        out.push(GenericRow::new(Arc::clone(&columns), values));
    }
    Ok(out)
}

/// Drain `rows` into typed records, stopping at the first conversion error.
pub fn read_typed<T: Record, R: ResultSet>(mut rows: R) -> OrmResult<Vec<T>> {
    let plan = MappingPlan::new::<T>(rows.columns());
    let mut out = Vec::new();
    while let Some(raw) = next_row(&mut rows)? {
        out.push(plan.map_row(raw.iter().map(|v| v.as_deref().unwrap_or("")))?);
    }
    Ok(out)
}
