//! Debug rendering of built SQL.
//!
//! The output inlines bound values for logs and `last_sql()`. It performs no
//! escaping and must never be sent to a database.

use crate::value::Value;

/// Replace each `?` in `sql`, left to right, with the matching value.
///
/// Integers and booleans are written bare, NULL as `NULL`, everything else
/// between single quotes as-is. Placeholders without a value stay `?`.
pub fn render_debug_sql(sql: &str, params: &[Value]) -> String {
    let mut out = String::with_capacity(sql.len() + params.len() * 8);
    let mut values = params.iter();
    for ch in sql.chars() {
        if ch != '?' {
            out.push(ch);
            continue;
        }
        match values.next() {
            Some(value) => push_literal(&mut out, value),
            None => out.push('?'),
        }
    }
    out
}

fn push_literal(out: &mut String, value: &Value) {
    match value {
        Value::Int(_) | Value::BigInt(_) | Value::UInt(_) | Value::Bool(_) | Value::Null => {
            out.push_str(&value.to_string());
        }
        other => {
            out.push('\'');
            out.push_str(&other.to_string());
            out.push('\'');
        }
    }
}
