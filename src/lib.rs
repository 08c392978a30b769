//! Parameterized CRUD and schema statements without hand-written SQL.
//!
//! [`StatementBuilder`] turns table names, row data, condition sets and column
//! definitions into parameterized SQL for MySQL or `SQLite`. [`CrudClient`] runs
//! those statements on any [`AsyncDatabaseExecutor`]; a rusqlite-backed
//! [`sqlite::SqliteConnection`] is included behind the `sqlite` feature.
//!
//! ```rust
//! use sql_crud_middleware::prelude::*;
//!
//! let builder = StatementBuilder::new(Dialect::MySql);
//! let stmt = builder
//!     .update(
//!         "users",
//!         &RowData::mapping([("status", "archived")]),
//!         &Conditions::new().eq("status", "active"),
//!     )
//!     .unwrap();
//! assert_eq!(
//!     stmt.sql,
//!     "UPDATE `users` SET `status` = :__set_status WHERE `status` = :__where_status"
//! );
//! ```

pub mod crud;
pub mod error;
pub mod executor;
pub mod prelude;
pub mod query_builder;
pub mod results;
pub mod types;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use crud::CrudClient;
pub use error::{Operation, SqlCrudError};
pub use executor::{AsyncDatabaseExecutor, DmlOutcome};
pub use query_builder::{Params, PlaceholderStyle, RawClausePolicy, Statement, StatementBuilder};
pub use results::{CustomDbRow, ResultSet};
pub use types::{Dialect, RowValues};
