//! Statement builder.
//!
//! Turns table names, row data, condition sets and column definitions into a
//! [`Statement`]: SQL text plus the parameters to bind. Nothing here touches a
//! connection; the [`crate::crud::CrudClient`] hands the result to an executor.
//!
//! ```rust
//! use sql_crud_middleware::prelude::*;
//!
//! let builder = StatementBuilder::new(Dialect::MySql);
//! let stmt = builder
//!     .find_one("users", &Conditions::new().eq("email", "ann@example.com"), &Projection::All)
//!     .unwrap();
//! assert_eq!(stmt.sql, "SELECT * FROM `users` WHERE `email` = :email LIMIT 1");
//! ```

mod conditions;
mod ddl;
mod dml;
mod ident;
mod select;

pub use conditions::Conditions;
pub use ddl::{
    AlterAction, AlterOperation, ColumnDef, ColumnLength, DefaultValue, FieldSpec, TableOptions,
};
pub use dml::RowData;
pub use ident::quote_identifier;
pub use select::{FindOptions, OrderBy, Projection, SortDirection};

use crate::types::{Dialect, RowValues};

/// Placeholder syntax written into generated SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderStyle {
    /// `:column` placeholders bound by name.
    #[default]
    Named,
    /// `?` placeholders bound by position.
    Positional,
}

/// How caller-supplied raw SQL fragments (ORDER BY text, raw projections) are treated.
///
/// Raw fragments are interpolated into the statement, never bound. `Trusted` passes
/// them through unchanged and leaves their safety to the caller; `Validated` only
/// accepts plain column lists and rejects anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawClausePolicy {
    #[default]
    Trusted,
    Validated,
}

/// Parameters to bind alongside a statement, in SQL text order.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    /// Placeholder name (including the leading `:`) and value.
    Named(Vec<(String, RowValues)>),
    Positional(Vec<RowValues>),
}

impl Default for Params {
    fn default() -> Self {
        Params::Positional(Vec::new())
    }
}

impl Params {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Params::Named(pairs) => pairs.len(),
            Params::Positional(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values in binding order, ignoring names.
    pub fn values(&self) -> Box<dyn Iterator<Item = &RowValues> + '_> {
        match self {
            Params::Named(pairs) => Box::new(pairs.iter().map(|(_, value)| value)),
            Params::Positional(values) => Box::new(values.iter()),
        }
    }

    /// Look up a named parameter. Always `None` for positional parameters.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RowValues> {
        match self {
            Params::Named(pairs) => pairs.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            Params::Positional(_) => None,
        }
    }
}

/// Parameterized SQL ready for an executor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    pub sql: String,
    pub params: Params,
}

impl Statement {
    #[must_use]
    pub fn new(sql: String, params: Params) -> Self {
        Self { sql, params }
    }

    #[must_use]
    pub fn without_params(sql: String) -> Self {
        Self {
            sql,
            params: Params::default(),
        }
    }
}

/// Builds CRUD and schema statements for one SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementBuilder {
    dialect: Dialect,
    placeholders: PlaceholderStyle,
    raw_clauses: RawClausePolicy,
}

impl StatementBuilder {
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            placeholders: PlaceholderStyle::default(),
            raw_clauses: RawClausePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_placeholders(mut self, placeholders: PlaceholderStyle) -> Self {
        self.placeholders = placeholders;
        self
    }

    #[must_use]
    pub fn with_raw_clause_policy(mut self, policy: RawClausePolicy) -> Self {
        self.raw_clauses = policy;
        self
    }

    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    #[must_use]
    pub fn placeholders(&self) -> PlaceholderStyle {
        self.placeholders
    }

    #[must_use]
    pub fn raw_clause_policy(&self) -> RawClausePolicy {
        self.raw_clauses
    }
}
