use rusqlite::Statement as SqliteStatement;
use rusqlite::types::Value;

use crate::error::SqlCrudError;
use crate::query_builder::Params;
use crate::types::RowValues;

/// Convert a single `RowValues` to a rusqlite `Value`.
#[must_use]
pub fn row_value_to_sqlite_value(value: &RowValues) -> Value {
    match value {
        RowValues::Int(i) => Value::Integer(*i),
        RowValues::Float(f) => Value::Real(*f),
        RowValues::Text(s) => Value::Text(s.clone()),
        RowValues::Bool(b) => Value::Integer(i64::from(*b)),
        RowValues::Timestamp(dt) => Value::Text(dt.format("%F %T%.f").to_string()),
        RowValues::Null => Value::Null,
        RowValues::JSON(jval) => Value::Text(jval.to_string()),
        RowValues::Blob(bytes) => Value::Blob(bytes.clone()),
    }
}

/// Statement parameters converted to owned `SQLite` values, ready to move onto a
/// blocking thread.
#[derive(Debug, Clone)]
pub enum SqliteParams {
    Named(Vec<(String, Value)>),
    Positional(Vec<Value>),
}

impl SqliteParams {
    #[must_use]
    pub fn convert(params: &Params) -> Self {
        match params {
            Params::Named(pairs) => SqliteParams::Named(
                pairs
                    .iter()
                    .map(|(name, value)| (name.clone(), row_value_to_sqlite_value(value)))
                    .collect(),
            ),
            Params::Positional(values) => {
                SqliteParams::Positional(values.iter().map(row_value_to_sqlite_value).collect())
            }
        }
    }

    fn len(&self) -> usize {
        match self {
            SqliteParams::Named(pairs) => pairs.len(),
            SqliteParams::Positional(values) => values.len(),
        }
    }

    /// Bind every parameter onto a prepared statement.
    ///
    /// # Errors
    /// Returns `SqlCrudError::ParameterError` when the statement's placeholder count or
    /// names do not match, or `SqlCrudError::SqliteError` if binding fails.
    pub fn bind(&self, stmt: &mut SqliteStatement<'_>) -> Result<(), SqlCrudError> {
        let expected = stmt.parameter_count();
        if expected != self.len() {
            return Err(SqlCrudError::ParameterError(format!(
                "statement expects {expected} parameters, got {}",
                self.len()
            )));
        }
        match self {
            SqliteParams::Positional(values) => {
                for (idx, value) in values.iter().enumerate() {
                    stmt.raw_bind_parameter(idx + 1, value)?;
                }
            }
            SqliteParams::Named(pairs) => {
                for (name, value) in pairs {
                    let idx = stmt.parameter_index(name)?.ok_or_else(|| {
                        SqlCrudError::ParameterError(format!("unknown parameter {name}"))
                    })?;
                    stmt.raw_bind_parameter(idx, value)?;
                }
            }
        }
        Ok(())
    }
}
