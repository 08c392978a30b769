use std::fmt;

use thiserror::Error;

/// The CRUD call a driver failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FindOne,
    FindAll,
    Count,
    Insert,
    BatchInsert,
    Update,
    Delete,
    CreateTable,
    AlterTable,
    DescribeTable,
    BeginTransaction,
    Commit,
    Rollback,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::FindOne | Operation::FindAll | Operation::Count => "query",
            Operation::Insert => "insert",
            Operation::BatchInsert => "batch insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::CreateTable => "create table",
            Operation::AlterTable => "alter table",
            Operation::DescribeTable => "describe table",
            Operation::BeginTransaction => "begin transaction",
            Operation::Commit => "commit",
            Operation::Rollback => "rollback",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum SqlCrudError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    /// A driver failure, tagged with the operation that issued the statement.
    #[error("{operation} failed: {source}")]
    OperationFailed {
        operation: Operation,
        #[source]
        source: Box<SqlCrudError>,
    },
}

impl SqlCrudError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SqlCrudError::InvalidArgument(msg.into())
    }

    /// Wrap a driver error with the operation that produced it.
    #[must_use]
    pub fn during(self, operation: Operation) -> Self {
        match self {
            // caller-input errors are reported as-is
            err @ (SqlCrudError::InvalidArgument(_) | SqlCrudError::OperationFailed { .. }) => {
                err
            }
            other => SqlCrudError::OperationFailed {
                operation,
                source: Box::new(other),
            },
        }
    }

    /// The operation a failure was recorded against, if any.
    #[must_use]
    pub fn operation(&self) -> Option<Operation> {
        match self {
            SqlCrudError::OperationFailed { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, SqlCrudError::InvalidArgument(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_errors_carry_operation_context() {
        let err = SqlCrudError::ExecutionError("no such table: users".into())
            .during(Operation::Insert);
        assert_eq!(err.operation(), Some(Operation::Insert));
        assert_eq!(
            err.to_string(),
            "insert failed: SQL execution error: no such table: users"
        );
    }

    #[test]
    fn invalid_arguments_are_not_wrapped() {
        let err = SqlCrudError::invalid("empty payload").during(Operation::Insert);
        assert!(err.is_invalid_argument());
        assert_eq!(err.operation(), None);
    }
}
