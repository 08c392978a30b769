//! CRUD client: one builder call, one executor round trip, one `Result`.

use tracing::{debug, warn};

use crate::error::{Operation, SqlCrudError};
use crate::executor::{AsyncDatabaseExecutor, DmlOutcome};
use crate::query_builder::{
    AlterAction, Conditions, FieldSpec, FindOptions, Projection, RowData, Statement,
    StatementBuilder, TableOptions,
};
use crate::results::{CustomDbRow, ResultSet};
use crate::types::RowValues;

/// Runs builder-generated statements on an executor.
///
/// There is no stored "last error": every failure comes back as the `Err` arm.
/// Invalid input is returned as `SqlCrudError::InvalidArgument` before anything is
/// sent; driver failures come back as `SqlCrudError::OperationFailed`.
///
/// ```rust,no_run
/// # #[cfg(feature = "sqlite")]
/// # async fn demo() -> Result<(), sql_crud_middleware::SqlCrudError> {
/// use sql_crud_middleware::prelude::*;
///
/// let conn = SqliteConnection::open(SqliteOptions::in_memory()).await?;
/// let mut client = CrudClient::new(conn);
/// let id = client
///     .insert("users", &RowData::mapping([("name", "ann")]))
///     .await?;
/// let row = client
///     .find_one("users", &Conditions::new().eq("id", id), &Projection::All)
///     .await?;
/// # let _ = row;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CrudClient<E> {
    executor: E,
    builder: StatementBuilder,
}

impl<E: AsyncDatabaseExecutor> CrudClient<E> {
    /// Client with a builder for the executor's dialect and default settings.
    pub fn new(executor: E) -> Self {
        let builder = StatementBuilder::new(executor.dialect());
        Self { executor, builder }
    }

    /// Client with a custom builder (placeholder style, raw clause policy).
    ///
    /// # Errors
    /// Returns `SqlCrudError::ConfigError` if the builder targets another dialect.
    pub fn with_builder(executor: E, builder: StatementBuilder) -> Result<Self, SqlCrudError> {
        if builder.dialect() != executor.dialect() {
            return Err(SqlCrudError::ConfigError(format!(
                "builder dialect {:?} does not match executor dialect {:?}",
                builder.dialect(),
                executor.dialect()
            )));
        }
        Ok(Self { executor, builder })
    }

    #[must_use]
    pub fn builder(&self) -> &StatementBuilder {
        &self.builder
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    pub fn into_inner(self) -> E {
        self.executor
    }

    async fn select(
        &mut self,
        operation: Operation,
        statement: Statement,
    ) -> Result<ResultSet, SqlCrudError> {
        debug!(%operation, sql = %statement.sql, params = statement.params.len(), "select");
        self.executor
            .execute_select(&statement)
            .await
            .map_err(|e| failed(operation, e))
    }

    async fn dml(
        &mut self,
        operation: Operation,
        statement: Statement,
    ) -> Result<DmlOutcome, SqlCrudError> {
        debug!(%operation, sql = %statement.sql, params = statement.params.len(), "dml");
        self.executor
            .execute_dml(&statement)
            .await
            .map_err(|e| failed(operation, e))
    }

    async fn batch(&mut self, operation: Operation, statement: Statement) -> Result<(), SqlCrudError> {
        debug!(%operation, sql = %statement.sql, "batch");
        self.executor
            .execute_batch(&statement.sql)
            .await
            .map_err(|e| failed(operation, e))
    }

    /// First row matching `conditions`, or `None`.
    ///
    /// # Errors
    /// Returns `SqlCrudError` on invalid input or driver failure.
    pub async fn find_one(
        &mut self,
        table: &str,
        conditions: &Conditions,
        fields: &Projection,
    ) -> Result<Option<CustomDbRow>, SqlCrudError> {
        let statement = self.builder.find_one(table, conditions, fields)?;
        Ok(self.select(Operation::FindOne, statement).await?.into_first())
    }

    /// # Errors
    /// Returns `SqlCrudError` on invalid input or driver failure.
    pub async fn find_all(
        &mut self,
        table: &str,
        conditions: &Conditions,
        options: &FindOptions,
    ) -> Result<ResultSet, SqlCrudError> {
        let statement = self.builder.find_all(table, conditions, options)?;
        self.select(Operation::FindAll, statement).await
    }

    /// Number of rows matching `conditions`.
    ///
    /// # Errors
    /// Returns `SqlCrudError` on invalid input, driver failure, or a non-integer count.
    pub async fn count(&mut self, table: &str, conditions: &Conditions) -> Result<i64, SqlCrudError> {
        let statement = self.builder.count(table, conditions)?;
        let row = self.select(Operation::Count, statement).await?.into_first();
        match row.as_ref().and_then(|r| r.get("count")) {
            None => Ok(0),
            Some(RowValues::Int(n)) => Ok(*n),
            Some(other) => Err(failed(
                Operation::Count,
                SqlCrudError::ExecutionError(format!("unexpected COUNT(*) value: {other:?}")),
            )),
        }
    }

    /// Insert one row and return the driver-assigned id.
    ///
    /// # Errors
    /// Returns `SqlCrudError::InvalidArgument` for empty data or positional data without
    /// column names, otherwise `SqlCrudError` on driver failure.
    pub async fn insert(&mut self, table: &str, data: &RowData) -> Result<i64, SqlCrudError> {
        let statement = self.builder.insert(table, data)?;
        Ok(self.dml(Operation::Insert, statement).await?.last_insert_id)
    }

    /// Insert many rows in one statement; returns rows affected (0 for no rows).
    ///
    /// # Errors
    /// Returns `SqlCrudError` on invalid input or driver failure.
    pub async fn batch_insert(&mut self, table: &str, rows: &[RowData]) -> Result<usize, SqlCrudError> {
        match self.builder.batch_insert(table, rows)? {
            Some(statement) => Ok(self.dml(Operation::BatchInsert, statement).await?.rows_affected),
            None => Ok(0),
        }
    }

    /// # Errors
    /// Returns `SqlCrudError` on invalid input or driver failure.
    pub async fn update(
        &mut self,
        table: &str,
        data: &RowData,
        conditions: &Conditions,
    ) -> Result<usize, SqlCrudError> {
        let statement = self.builder.update(table, data, conditions)?;
        Ok(self.dml(Operation::Update, statement).await?.rows_affected)
    }

    /// Delete matching rows. Empty `conditions` deletes every row in `table`.
    ///
    /// # Errors
    /// Returns `SqlCrudError` on invalid input or driver failure.
    pub async fn delete(&mut self, table: &str, conditions: &Conditions) -> Result<usize, SqlCrudError> {
        let statement = self.builder.delete(table, conditions)?;
        Ok(self.dml(Operation::Delete, statement).await?.rows_affected)
    }

    /// # Errors
    /// Returns `SqlCrudError` on invalid definitions or driver failure.
    pub async fn create_table(
        &mut self,
        table: &str,
        fields: &[FieldSpec],
        options: &TableOptions,
    ) -> Result<(), SqlCrudError> {
        let statement = self.builder.create_table(table, fields, options)?;
        self.batch(Operation::CreateTable, statement).await
    }

    /// # Errors
    /// Returns `SqlCrudError` on invalid actions or driver failure.
    pub async fn alter_table(&mut self, table: &str, actions: &[AlterAction]) -> Result<(), SqlCrudError> {
        let statement = self.builder.alter_table(table, actions)?;
        self.batch(Operation::AlterTable, statement).await
    }

    /// The driver's column introspection rows, unmodified.
    ///
    /// # Errors
    /// Returns `SqlCrudError` on invalid input or driver failure.
    pub async fn get_table_structure(&mut self, table: &str) -> Result<ResultSet, SqlCrudError> {
        let statement = self.builder.describe_table(table)?;
        self.select(Operation::DescribeTable, statement).await
    }

    /// # Errors
    /// Returns `SqlCrudError` if the driver refuses to start a transaction.
    pub async fn begin_transaction(&mut self) -> Result<(), SqlCrudError> {
        self.executor
            .begin()
            .await
            .map_err(|e| failed(Operation::BeginTransaction, e))
    }

    /// # Errors
    /// Returns `SqlCrudError` if committing fails.
    pub async fn commit(&mut self) -> Result<(), SqlCrudError> {
        self.executor
            .commit()
            .await
            .map_err(|e| failed(Operation::Commit, e))
    }

    /// # Errors
    /// Returns `SqlCrudError` if rolling back fails.
    pub async fn rollback(&mut self) -> Result<(), SqlCrudError> {
        self.executor
            .rollback()
            .await
            .map_err(|e| failed(Operation::Rollback, e))
    }
}

fn failed(operation: Operation, err: SqlCrudError) -> SqlCrudError {
    let err = err.during(operation);
    warn!(%operation, error = %err, "statement failed");
    err
}
