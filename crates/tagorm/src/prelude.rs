//! Convenient imports for typical `tagorm` usage.
//!
//! ```ignore
//! use tagorm::prelude::*;
//! ```

pub use crate::{
    Assignments, Clauses, Driver, GenericRow, Orm, OrmConfig, OrmError, OrmResult, Predicate,
    Query, Record, Value,
};

#[cfg(feature = "sqlite")]
pub use crate::SqliteDriver;
