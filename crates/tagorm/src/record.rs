//! Record mapping traits.

use crate::error::{OrmError, OrmResult};
use crate::tag::{FieldKind, RecordDescriptor};
use crate::value::Value;

/// A struct whose fields map to table columns via tags.
///
/// This trait should typically be derived using `#[derive(Record)]`
/// from the `tagorm-derive` crate.
///
/// # Example
///
/// ```ignore
/// use tagorm::Record;
///
/// #[derive(Default, Record)]
/// pub struct User {
///     #[orm(sql = "id,auto_increment")]
///     pub id: i64,
///     #[orm(sql = "username")]
///     pub name: String,
///     pub status: i32,
/// }
/// ```
pub trait Record: Default + Send + Sync {
    /// The cached field mappings of this type.
    fn descriptor() -> &'static RecordDescriptor;

    /// Read the field at `index` (descriptor order) as a bound value.
    fn field_value(&self, index: usize) -> Value;

    /// Parse `raw` column text into the field at `index`.
    fn set_field(&mut self, index: usize, raw: &str) -> OrmResult<()>;
}

/// A Rust type that can live in a record field.
pub trait Column: Sized {
    const KIND: FieldKind;

    fn to_value(&self) -> Value;

    /// Parse the textual column representation.
    fn from_text(raw: &str) -> Result<Self, String>;
}

/// Parse `raw` into a field type, mapping failures to a conversion error
/// naming `column`.
pub fn parse_column<T: Column>(column: &str, raw: &str) -> OrmResult<T> {
    T::from_text(raw).map_err(|message| OrmError::conversion(column, raw, message))
}

macro_rules! impl_numeric_column {
    ($kind:ident: $($ty:ty),+) => {
        $(
            impl Column for $ty {
                const KIND: FieldKind = FieldKind::$kind;

                fn to_value(&self) -> Value {
                    Value::from(*self)
                }

                fn from_text(raw: &str) -> Result<Self, String> {
                    raw.trim().parse::<$ty>().map_err(|e| e.to_string())
                }
            }
        )+
    };
}

impl_numeric_column!(Int: i8, i16, i32, i64, isize);
impl_numeric_column!(UInt: u8, u16, u32, u64, usize);
impl_numeric_column!(Float32: f32);
impl_numeric_column!(Float64: f64);

impl Column for bool {
    const KIND: FieldKind = FieldKind::Bool;

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_text(raw: &str) -> Result<Self, String> {
        parse_bool(raw)
    }
}

impl Column for String {
    const KIND: FieldKind = FieldKind::Text;

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_text(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }
}

/// Empty column text (which is also how NULL arrives) maps to `None`.
impl<T: Column> Column for Option<T> {
    const KIND: FieldKind = T::KIND;

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, Column::to_value)
    }

    fn from_text(raw: &str) -> Result<Self, String> {
        if raw.is_empty() {
            return Ok(None);
        }
        T::from_text(raw).map(Some)
    }
}

/// Boolean text vocabulary accepted from drivers.
pub(crate) fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        other => Err(format!("invalid boolean {other:?}")),
    }
}
