//! Convenient imports for common functionality.

pub use crate::crud::CrudClient;
pub use crate::error::{Operation, SqlCrudError};
pub use crate::executor::{AsyncDatabaseExecutor, DmlOutcome};
pub use crate::query_builder::{
    AlterAction, AlterOperation, ColumnDef, ColumnLength, Conditions, DefaultValue, FieldSpec,
    FindOptions, OrderBy, Params, PlaceholderStyle, Projection, RawClausePolicy, RowData,
    SortDirection, Statement, StatementBuilder, TableOptions, quote_identifier,
};
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::types::{Dialect, RowValues};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteConnection, SqliteOptions, SqliteOptionsBuilder};
