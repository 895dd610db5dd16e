//! Derive macros for tagorm
//!
//! Provides `#[derive(Record)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod record;

/// Derive the `Record` trait for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use tagorm::Record;
///
/// #[derive(Debug, Default, Record)]
/// pub struct User {
///     #[orm(sql = "uid,auto_increment")]
///     pub id: i64,
///     #[orm(sql = "username")]
///     pub name: String,
///     pub department: Option<String>,
///     cache_key: String,
/// }
/// ```
///
/// # Attributes
///
/// - `#[orm(sql = "column[,auto_increment]")]` - Column name and modifiers.
///   Without it the field name is used as the column.
///
/// Only `pub` fields take part in inserts, updates and record matching.
/// Every field type must implement `tagorm::Column`.
#[proc_macro_derive(Record, attributes(orm))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
