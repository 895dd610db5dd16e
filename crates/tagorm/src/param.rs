//! Ordered parameter storage.

use crate::error::{OrmError, OrmResult};
use crate::value::Value;

/// The flat, ordered list of values bound to a statement's placeholders.
///
/// Values are pushed in exactly the order their `?` markers are emitted, so
/// the n-th value always binds the n-th placeholder.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamList {
    params: Vec<Value>,
}

impl ParamList {
    /// Create a new empty parameter list.
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Bind a scalar value and return the placeholder to emit for it.
    ///
    /// Sequences are rejected: they only make sense inside an `in` list,
    /// which goes through [`ParamList::push_list`].
    pub fn push(&mut self, value: Value) -> OrmResult<&'static str> {
        if let Value::List(_) = value {
            return Err(OrmError::usage(
                "sequence values can only be bound with `in` / `not in`",
            ));
        }
        self.params.push(value);
        Ok("?")
    }

    /// Bind every element of a sequence and return the matching
    /// comma-separated placeholders (`?,?,?`).
    ///
    /// A nested sequence anywhere in `values` rejects the whole list and
    /// leaves `self` unchanged.
    pub fn push_list(&mut self, values: &[Value]) -> OrmResult<String> {
        if values.iter().any(Value::is_list) {
            return Err(OrmError::usage("`in` lists cannot contain nested sequences"));
        }
        self.params.extend(values.iter().cloned());
        Ok(placeholders(values.len()))
    }

    /// Get the current parameter count.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Borrow the values in binding order.
    pub fn as_slice(&self) -> &[Value] {
        &self.params
    }

    /// Extend this list with another list's parameters.
    pub fn extend(&mut self, other: &ParamList) {
        self.params.extend(other.params.iter().cloned());
    }

    /// Clear all parameters.
    pub fn clear(&mut self) {
        self.params.clear();
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.params
    }
}

impl<'a> IntoIterator for &'a ParamList {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

/// `n` comma-separated placeholders, e.g. `?,?,?` for 3.
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}
