//! # tagorm
//!
//! A lightweight tag-driven SQL builder and row mapper over a pluggable driver.
//!
//! ## Features
//!
//! - **Tag-driven mapping**: `#[orm(sql = "column,auto_increment")]` on struct fields names columns
//! - **Chained builder**: filters, grouping, having, ordering and limits on one table-bound session
//! - **Positional binding**: `?` placeholders with a flat, ordered parameter list
//! - **Row mapping**: results as generic column→text rows or typed records
//! - **Transactions**: statements follow the active transaction handle automatically
//! - **Pluggable driver**: bring any executor that can prepare, execute and query
//!
//! ```ignore
//! use tagorm::prelude::*;
//!
//! #[derive(Debug, Default, Record)]
//! pub struct User {
//!     #[orm(sql = "uid,auto_increment")]
//!     pub id: i64,
//!     #[orm(sql = "username")]
//!     pub name: String,
//! }
//!
//! let mut orm = Orm::new(driver);
//! let id = orm.table("userinfo").insert(&user).await?;
//! let users: Vec<User> = orm
//!     .table("userinfo")
//!     .where_op("uid", ">=", 50)
//!     .order(&["uid", "desc"])
//!     .find()
//!     .await?;
//! ```

pub mod clause;
pub mod config;
pub mod debug;
pub mod driver;
pub mod error;
pub mod orm;
pub mod param;
pub mod prelude;
pub mod query;
pub mod record;
pub mod row;
pub mod statement;
pub mod tag;
pub mod transaction;
pub mod value;

mod trace;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod test_support;

pub use clause::{Clauses, Conjunction, Direction, Limit, Predicate};
pub use config::{LogLevel, OrmConfig};
pub use debug::render_debug_sql;
pub use driver::{Driver, ExecResult, Executor, MemoryRows, ResultSet, Transaction};
pub use error::{DriverError, OrmError, OrmResult};
pub use orm::Orm;
pub use param::ParamList;
pub use query::Query;
pub use record::{Column, Record, parse_column};
pub use row::GenericRow;
pub use statement::{AggregateFn, Assignments, Statement, StatementBuilder, StatementKind};
pub use tag::{FieldKind, FieldMapping, FieldSpec, RecordDescriptor};
pub use transaction::TxStatus;
pub use value::Value;

#[cfg(feature = "derive")]
pub use tagorm_derive::Record;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDriver;
