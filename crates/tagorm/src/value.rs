//! Bound parameter values.

use std::fmt;

/// A value bound to a `?` placeholder.
///
/// `List` is only meaningful as the right-hand side of an `in` / `not in`
/// predicate, where it expands to one placeholder per element. It is never
/// stored in a [`ParamList`](crate::ParamList).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i32),
    BigInt(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    /// Build a sequence value from anything convertible element-wise.
    pub fn list<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Short kind name used in error messages and logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "int",
            Value::BigInt(_) => "bigint",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Text(_) => "text",
            Value::List(_) => "list",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Int(v) => write!(f, "{v}"),
            Value::BigInt(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident($v:ident => $conv:expr)),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from($v: $ty) -> Self {
                    Value::$variant($conv)
                }
            }
        )+
    };
}

impl_from_value!(
    i8 => Int(v => i32::from(v)),
    i16 => Int(v => i32::from(v)),
    i32 => Int(v => v),
    i64 => BigInt(v => v),
    isize => BigInt(v => v as i64),
    u8 => UInt(v => u64::from(v)),
    u16 => UInt(v => u64::from(v)),
    u32 => UInt(v => u64::from(v)),
    u64 => UInt(v => v),
    usize => UInt(v => v as u64),
    f32 => Float(v => f64::from(v)),
    f64 => Float(v => v),
    bool => Bool(v => v),
    String => Text(v => v),
    &str => Text(v => v.to_string()),
    char => Text(v => v.to_string()),
);

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::list(v)
    }
}

impl<T: Into<Value> + Clone> From<&[T]> for Value {
    fn from(v: &[T]) -> Self {
        Value::list(v.iter().cloned())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(v: [T; N]) -> Self {
        Value::list(v)
    }
}
