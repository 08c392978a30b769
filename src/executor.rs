use async_trait::async_trait;

use crate::error::SqlCrudError;
use crate::query_builder::Statement;
use crate::results::ResultSet;
use crate::types::Dialect;

/// What a DML round trip reports back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DmlOutcome {
    pub rows_affected: usize,
    /// Driver-assigned id of the last inserted row; 0 when the statement inserted nothing.
    pub last_insert_id: i64,
}

/// The database driver seen by [`crate::crud::CrudClient`].
///
/// Each call is one prepare + execute round trip. Implement this for any client
/// (e.g. a MySQL driver) to reuse the statement builder; `SqliteConnection`
/// ships with the `sqlite` feature.
#[async_trait]
pub trait AsyncDatabaseExecutor: Send {
    /// SQL flavor this executor understands.
    fn dialect(&self) -> Dialect;

    /// Executes parameterless SQL, possibly several `;`-separated statements.
    async fn execute_batch(&mut self, sql: &str) -> Result<(), SqlCrudError>;

    /// Executes a single SELECT statement and returns the result set.
    async fn execute_select(&mut self, statement: &Statement) -> Result<ResultSet, SqlCrudError>;

    /// Executes a single DML statement (INSERT, UPDATE, DELETE, etc.).
    async fn execute_dml(&mut self, statement: &Statement) -> Result<DmlOutcome, SqlCrudError>;

    async fn begin(&mut self) -> Result<(), SqlCrudError>;

    async fn commit(&mut self) -> Result<(), SqlCrudError>;

    async fn rollback(&mut self) -> Result<(), SqlCrudError>;
}

#[async_trait]
impl<E: AsyncDatabaseExecutor + ?Sized> AsyncDatabaseExecutor for &mut E {
    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }

    async fn execute_batch(&mut self, sql: &str) -> Result<(), SqlCrudError> {
        (**self).execute_batch(sql).await
    }

    async fn execute_select(&mut self, statement: &Statement) -> Result<ResultSet, SqlCrudError> {
        (**self).execute_select(statement).await
    }

    async fn execute_dml(&mut self, statement: &Statement) -> Result<DmlOutcome, SqlCrudError> {
        (**self).execute_dml(statement).await
    }

    async fn begin(&mut self) -> Result<(), SqlCrudError> {
        (**self).begin().await
    }

    async fn commit(&mut self) -> Result<(), SqlCrudError> {
        (**self).commit().await
    }

    async fn rollback(&mut self) -> Result<(), SqlCrudError> {
        (**self).rollback().await
    }
}
