use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::SqlCrudError;
use crate::executor::{AsyncDatabaseExecutor, DmlOutcome};
use crate::query_builder::Statement;
use crate::results::ResultSet;
use crate::types::Dialect;

use super::config::SqliteOptions;
use super::params::SqliteParams;
use super::query::build_result_set;

pub(crate) type SharedSqliteConnection = Arc<Mutex<rusqlite::Connection>>;

/// A single `SQLite` connection. Blocking rusqlite calls run on tokio's blocking pool.
pub struct SqliteConnection {
    conn: SharedSqliteConnection,
    options: SqliteOptions,
    in_transaction: bool,
}

impl SqliteConnection {
    /// Open (or create) the database described by `options`.
    ///
    /// # Errors
    /// Returns `SqlCrudError::ConfigError` for invalid options and
    /// `SqlCrudError::ConnectionError` if the database cannot be opened or configured.
    pub async fn open(options: SqliteOptions) -> Result<Self, SqlCrudError> {
        options.validate()?;
        info!(db_path = %options.db_path, "opening sqlite database");
        let opts = options.clone();
        let conn = tokio::task::spawn_blocking(move || open_blocking(&opts))
            .await
            .map_err(|e| {
                SqlCrudError::ConnectionError(format!("sqlite spawn_blocking join error: {e}"))
            })??;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            options,
            in_transaction: false,
        })
    }

    /// # Errors
    /// Returns `SqlCrudError::ConnectionError` if the in-memory database cannot be created.
    pub async fn open_in_memory() -> Result<Self, SqlCrudError> {
        Self::open(SqliteOptions::in_memory()).await
    }

    #[must_use]
    pub fn options(&self) -> &SqliteOptions {
        &self.options
    }

    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Run a closure against the raw rusqlite connection on the blocking pool.
    ///
    /// # Errors
    /// Returns whatever the closure returns, or `SqlCrudError::ExecutionError` if the
    /// blocking task panics.
    pub async fn with_connection<F, R>(&self, func: F) -> Result<R, SqlCrudError>
    where
        F: FnOnce(&mut rusqlite::Connection) -> Result<R, SqlCrudError> + Send + 'static,
        R: Send + 'static,
    {
        run_blocking(self.conn_handle(), func).await
    }

    fn conn_handle(&self) -> SharedSqliteConnection {
        Arc::clone(&self.conn)
    }
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("options", &self.options)
            .field("in_transaction", &self.in_transaction)
            .finish_non_exhaustive()
    }
}

fn open_blocking(options: &SqliteOptions) -> Result<rusqlite::Connection, SqlCrudError> {
    let connection_error = |e: rusqlite::Error| {
        SqlCrudError::ConnectionError(format!(
            "failed to open SQLite database {}: {e}",
            options.db_path
        ))
    };
    let conn = rusqlite::Connection::open(&options.db_path).map_err(connection_error)?;
    if let Some(timeout) = options.busy_timeout() {
        conn.busy_timeout(timeout).map_err(connection_error)?;
    }
    if options.wal && !options.is_in_memory() {
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(connection_error)?;
    }
    Ok(conn)
}

pub(crate) async fn run_blocking<F, R>(conn: SharedSqliteConnection, func: F) -> Result<R, SqlCrudError>
where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R, SqlCrudError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        func(&mut guard)
    })
    .await
    .map_err(|e| SqlCrudError::ExecutionError(format!("sqlite spawn_blocking join error: {e}")))?
}

#[async_trait]
impl AsyncDatabaseExecutor for SqliteConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    /// Runs the batch inside its own transaction unless one is already open.
    async fn execute_batch(&mut self, sql: &str) -> Result<(), SqlCrudError> {
        let sql_owned = sql.to_owned();
        run_blocking(self.conn_handle(), move |guard| {
            if guard.is_autocommit() {
                let tx = guard.transaction()?;
                tx.execute_batch(&sql_owned)?;
                tx.commit()?;
            } else {
                guard.execute_batch(&sql_owned)?;
            }
            Ok(())
        })
        .await
    }

    async fn execute_select(&mut self, statement: &Statement) -> Result<ResultSet, SqlCrudError> {
        let sql_owned = statement.sql.clone();
        let params = SqliteParams::convert(&statement.params);
        run_blocking(self.conn_handle(), move |guard| {
            let mut stmt = guard.prepare_cached(&sql_owned)?;
            build_result_set(&mut stmt, &params)
        })
        .await
    }

    async fn execute_dml(&mut self, statement: &Statement) -> Result<DmlOutcome, SqlCrudError> {
        let sql_owned = statement.sql.clone();
        let params = SqliteParams::convert(&statement.params);
        run_blocking(self.conn_handle(), move |guard| {
            let rows_affected = {
                let mut stmt = guard.prepare_cached(&sql_owned)?;
                params.bind(&mut stmt)?;
                stmt.raw_execute()?
            };
            Ok(DmlOutcome {
                rows_affected,
                last_insert_id: guard.last_insert_rowid(),
            })
        })
        .await
    }

    async fn begin(&mut self) -> Result<(), SqlCrudError> {
        if self.in_transaction {
            return Err(SqlCrudError::ExecutionError(
                "SQLite transaction already in progress".into(),
            ));
        }
        run_blocking(self.conn_handle(), |guard| Ok(guard.execute_batch("BEGIN")?)).await?;
        debug!("sqlite transaction started");
        self.in_transaction = true;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), SqlCrudError> {
        if !self.in_transaction {
            return Err(SqlCrudError::ExecutionError("SQLite transaction not active".into()));
        }
        run_blocking(self.conn_handle(), |guard| Ok(guard.execute_batch("COMMIT")?)).await?;
        self.in_transaction = false;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), SqlCrudError> {
        if !self.in_transaction {
            return Err(SqlCrudError::ExecutionError("SQLite transaction not active".into()));
        }
        run_blocking(self.conn_handle(), |guard| Ok(guard.execute_batch("ROLLBACK")?)).await?;
        self.in_transaction = false;
        Ok(())
    }
}
