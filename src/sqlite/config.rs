use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SqlCrudError;

use super::connection::SqliteConnection;

const IN_MEMORY: &str = ":memory:";

/// Options for opening a `SQLite` connection.
///
/// Deserializable, so they can come straight from a JSON config file:
/// ```rust
/// use sql_crud_middleware::prelude::*;
///
/// let opts = SqliteOptions::from_json(r#"{"db_path": "app.db", "wal": false}"#).unwrap();
/// assert_eq!(opts.db_path, "app.db");
/// assert_eq!(opts.busy_timeout_ms, Some(5000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteOptions {
    pub db_path: String,
    pub busy_timeout_ms: Option<u64>,
    /// Switch file databases to WAL journaling on open.
    pub wal: bool,
}

impl Default for SqliteOptions {
    fn default() -> Self {
        Self {
            db_path: IN_MEMORY.to_string(),
            busy_timeout_ms: Some(5000),
            wal: true,
        }
    }
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.db_path == IN_MEMORY
    }

    /// Parse options from JSON; missing keys take their defaults.
    ///
    /// # Errors
    /// Returns `SqlCrudError::ConfigError` for malformed JSON or an empty path.
    pub fn from_json(json: &str) -> Result<Self, SqlCrudError> {
        let opts: SqliteOptions = serde_json::from_str(json)
            .map_err(|e| SqlCrudError::ConfigError(format!("invalid SQLite options: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    pub(crate) fn validate(&self) -> Result<(), SqlCrudError> {
        if self.db_path.trim().is_empty() {
            return Err(SqlCrudError::ConfigError("SQLite db_path must not be empty".into()));
        }
        Ok(())
    }

    pub(crate) fn busy_timeout(&self) -> Option<Duration> {
        self.busy_timeout_ms.map(Duration::from_millis)
    }
}

/// Fluent builder for `SQLite` options.
#[derive(Debug, Clone)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
}

impl SqliteOptionsBuilder {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            opts: SqliteOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn busy_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.opts.busy_timeout_ms = timeout.map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX));
        self
    }

    #[must_use]
    pub fn wal(mut self, wal: bool) -> Self {
        self.opts.wal = wal;
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }

    /// Open a connection with these options.
    ///
    /// # Errors
    /// Returns `SqlCrudError::ConnectionError` if the database cannot be opened.
    pub async fn build(self) -> Result<SqliteConnection, SqlCrudError> {
        SqliteConnection::open(self.finish()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_in_memory() {
        let opts = SqliteOptions::default();
        assert!(opts.is_in_memory());
        assert_eq!(opts.busy_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn builder_overrides_fields() {
        let opts = SqliteOptionsBuilder::new("data.db")
            .busy_timeout(None)
            .wal(false)
            .finish();
        assert_eq!(
            opts,
            SqliteOptions {
                db_path: "data.db".into(),
                busy_timeout_ms: None,
                wal: false,
            }
        );
    }

    #[test]
    fn json_config_is_validated() {
        assert!(matches!(
            SqliteOptions::from_json(r#"{"db_path": ""}"#),
            Err(SqlCrudError::ConfigError(_))
        ));
        assert!(SqliteOptions::from_json("not json").is_err());
        assert!(SqliteOptions::from_json("{}").unwrap().is_in_memory());
    }
}
