use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::SqlCrudError;
use crate::types::Dialect;

use super::ident::{is_plain_word, quote_identifier, quote_literal};
use super::{Statement, StatementBuilder};

/// Numeric-looking text, as accepted for an unquoted DEFAULT.
static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$").expect("valid numeric pattern")
});

const STRING_TYPES: &[&str] = &[
    "CHAR",
    "VARCHAR",
    "TEXT",
    "TINYTEXT",
    "MEDIUMTEXT",
    "LONGTEXT",
    "ENUM",
    "SET",
];

fn is_string_type(data_type: &str) -> bool {
    let base = data_type
        .trim()
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase();
    STRING_TYPES.contains(&base.as_str())
}

/// Column length: `(n)` or `(precision,scale)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnLength {
    Size(u32),
    Precision(u32, u32),
}

impl fmt::Display for ColumnLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnLength::Size(n) => write!(f, "({n})"),
            ColumnLength::Precision(p, s) => write!(f, "({p},{s})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    CurrentTimestamp,
}

impl From<bool> for DefaultValue {
    fn from(value: bool) -> Self {
        DefaultValue::Bool(value)
    }
}

impl From<i64> for DefaultValue {
    fn from(value: i64) -> Self {
        DefaultValue::Int(value)
    }
}

impl From<i32> for DefaultValue {
    fn from(value: i32) -> Self {
        DefaultValue::Int(i64::from(value))
    }
}

impl From<f64> for DefaultValue {
    fn from(value: f64) -> Self {
        DefaultValue::Float(value)
    }
}

impl From<&str> for DefaultValue {
    fn from(value: &str) -> Self {
        DefaultValue::Text(value.to_string())
    }
}

impl From<String> for DefaultValue {
    fn from(value: String) -> Self {
        DefaultValue::Text(value)
    }
}

impl DefaultValue {
    /// SQL text following `DEFAULT`.
    ///
    /// Booleans become 1/0, numbers stay bare unless the column is a string type,
    /// `CURRENT_TIMESTAMP` stays a keyword, and everything else is quoted.
    fn render(&self, data_type: &str) -> Result<String, SqlCrudError> {
        let string_column = is_string_type(data_type);
        Ok(match self {
            DefaultValue::Null => "NULL".to_string(),
            DefaultValue::CurrentTimestamp => "CURRENT_TIMESTAMP".to_string(),
            DefaultValue::Bool(b) => String::from(if *b { "1" } else { "0" }),
            DefaultValue::Int(i) if string_column => quote_literal(&i.to_string()),
            DefaultValue::Int(i) => i.to_string(),
            DefaultValue::Float(f) if !f.is_finite() => {
                return Err(SqlCrudError::invalid(format!(
                    "default value {f} is not a finite number"
                )));
            }
            DefaultValue::Float(f) if string_column => quote_literal(&f.to_string()),
            DefaultValue::Float(f) => f.to_string(),
            DefaultValue::Text(s) if s.eq_ignore_ascii_case("CURRENT_TIMESTAMP") => {
                "CURRENT_TIMESTAMP".to_string()
            }
            DefaultValue::Text(s) if !string_column && NUMERIC.is_match(s) => s.clone(),
            DefaultValue::Text(s) => quote_literal(s),
        })
    }
}

/// Structured column definition for `create_table`.
///
/// ```rust
/// use sql_crud_middleware::prelude::*;
///
/// let id = ColumnDef::new("id", "INT").unsigned().not_null().auto_increment().primary_key();
/// let sql = StatementBuilder::new(Dialect::MySql).column_definition(&id).unwrap();
/// assert_eq!(sql, "`id` INT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: String,
    pub length: Option<ColumnLength>,
    pub unsigned: bool,
    /// `Some(true)` → NOT NULL, `Some(false)` → NULL. `None` → NOT NULL for key columns,
    /// otherwise NULL unless a default is set.
    pub not_null: Option<bool>,
    pub default: Option<DefaultValue>,
    pub auto_increment: bool,
    pub primary_key: bool,
    pub comment: Option<String>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            length: None,
            unsigned: false,
            not_null: None,
            default: None,
            auto_increment: false,
            primary_key: false,
            comment: None,
        }
    }

    #[must_use]
    pub fn size(mut self, size: u32) -> Self {
        self.length = Some(ColumnLength::Size(size));
        self
    }

    #[must_use]
    pub fn precision(mut self, precision: u32, scale: u32) -> Self {
        self.length = Some(ColumnLength::Precision(precision, scale));
        self
    }

    #[must_use]
    pub fn unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.not_null = Some(true);
        self
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.not_null = Some(false);
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<DefaultValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// One column of a `create_table` call.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSpec {
    /// Column name plus type and attributes written as raw SQL, e.g. `"INT NOT NULL"`.
    Literal { name: String, definition: String },
    Column(ColumnDef),
}

impl FieldSpec {
    pub fn literal(name: impl Into<String>, definition: impl Into<String>) -> Self {
        FieldSpec::Literal {
            name: name.into(),
            definition: definition.into(),
        }
    }
}

impl From<ColumnDef> for FieldSpec {
    fn from(column: ColumnDef) -> Self {
        FieldSpec::Column(column)
    }
}

/// Table-level options. ENGINE and CHARSET only apply to MySQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    pub engine: String,
    pub charset: String,
    pub if_not_exists: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            engine: "InnoDB".to_string(),
            charset: "utf8mb4".to_string(),
            if_not_exists: true,
        }
    }
}

impl TableOptions {
    #[must_use]
    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = engine.into();
        self
    }

    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    #[must_use]
    pub fn if_not_exists(mut self, if_not_exists: bool) -> Self {
        self.if_not_exists = if_not_exists;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlterOperation {
    Add,
    Drop,
    Modify,
    Change,
}

impl AlterOperation {
    fn as_sql(self, dialect: Dialect) -> Result<&'static str, SqlCrudError> {
        match (self, dialect) {
            (AlterOperation::Add, Dialect::MySql) => Ok("ADD"),
            (AlterOperation::Drop, Dialect::MySql) => Ok("DROP"),
            (AlterOperation::Modify, Dialect::MySql) => Ok("MODIFY"),
            (AlterOperation::Change, Dialect::MySql) => Ok("CHANGE"),
            (AlterOperation::Add, Dialect::Sqlite) => Ok("ADD COLUMN"),
            (AlterOperation::Drop, Dialect::Sqlite) => Ok("DROP COLUMN"),
            (AlterOperation::Modify | AlterOperation::Change, Dialect::Sqlite) => Err(
                SqlCrudError::invalid("SQLite cannot MODIFY or CHANGE a column"),
            ),
        }
    }

    fn needs_definition(self) -> bool {
        !matches!(self, AlterOperation::Drop)
    }
}

/// One ALTER TABLE action. `definition` is raw SQL (type and attributes; for
/// CHANGE, the new name first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterAction {
    pub operation: AlterOperation,
    pub field: String,
    pub definition: Option<String>,
    pub after: Option<String>,
}

impl AlterAction {
    fn with(operation: AlterOperation, field: String, definition: Option<String>) -> Self {
        Self {
            operation,
            field,
            definition,
            after: None,
        }
    }

    pub fn add(field: impl Into<String>, definition: impl Into<String>) -> Self {
        Self::with(AlterOperation::Add, field.into(), Some(definition.into()))
    }

    pub fn drop(field: impl Into<String>) -> Self {
        Self::with(AlterOperation::Drop, field.into(), None)
    }

    pub fn modify(field: impl Into<String>, definition: impl Into<String>) -> Self {
        Self::with(AlterOperation::Modify, field.into(), Some(definition.into()))
    }

    pub fn change(field: impl Into<String>, definition: impl Into<String>) -> Self {
        Self::with(AlterOperation::Change, field.into(), Some(definition.into()))
    }

    #[must_use]
    pub fn after(mut self, column: impl Into<String>) -> Self {
        self.after = Some(column.into());
        self
    }
}

impl StatementBuilder {
    /// Compile a structured column definition for this dialect.
    ///
    /// # Errors
    /// Returns `SqlCrudError::InvalidArgument` when the name or type is missing, or
    /// the default is a non-finite float.
    pub fn column_definition(&self, column: &ColumnDef) -> Result<String, SqlCrudError> {
        if column.name.trim().is_empty() || column.data_type.trim().is_empty() {
            return Err(SqlCrudError::invalid(
                "column definition requires a name and a type",
            ));
        }
        let sqlite = self.dialect == Dialect::Sqlite;
        // SQLite only allows AUTOINCREMENT on an INTEGER PRIMARY KEY
        let rowid_alias = sqlite && column.auto_increment;

        let mut definition = quote_identifier(&column.name)?;
        definition.push(' ');
        if rowid_alias {
            definition.push_str("INTEGER");
        } else {
            definition.push_str(column.data_type.trim());
            if let Some(length) = column.length {
                definition.push_str(&length.to_string());
            }
        }

        if column.unsigned {
            if sqlite {
                debug!(column = %column.name, "UNSIGNED dropped for SQLite");
            } else {
                definition.push_str(" UNSIGNED");
            }
        }

        match column.not_null {
            Some(true) => definition.push_str(" NOT NULL"),
            Some(false) => definition.push_str(" NULL"),
            // key columns never get the implicit NULL
            None if column.primary_key || column.auto_increment => {
                definition.push_str(" NOT NULL");
            }
            None if column.default.is_none() => definition.push_str(" NULL"),
            None => {}
        }

        if let Some(default) = &column.default {
            definition.push_str(" DEFAULT ");
            definition.push_str(&default.render(&column.data_type)?);
        }

        if sqlite {
            if column.primary_key || column.auto_increment {
                definition.push_str(" PRIMARY KEY");
            }
            if column.auto_increment {
                definition.push_str(" AUTOINCREMENT");
            }
        } else {
            if column.auto_increment {
                definition.push_str(" AUTO_INCREMENT");
            }
            if column.primary_key {
                definition.push_str(" PRIMARY KEY");
            }
        }

        if let Some(comment) = &column.comment {
            if sqlite {
                debug!(column = %column.name, "COMMENT dropped for SQLite");
            } else {
                definition.push_str(" COMMENT ");
                definition.push_str(&quote_literal(comment));
            }
        }
        Ok(definition)
    }

    /// `CREATE TABLE [IF NOT EXISTS] <table> (<columns>) [ENGINE=.. DEFAULT CHARSET=..]`
    ///
    /// # Errors
    /// Returns `SqlCrudError::InvalidArgument` for an empty field list, an invalid
    /// column definition, or an engine/charset that is not a plain word.
    pub fn create_table(
        &self,
        table: &str,
        fields: &[FieldSpec],
        options: &TableOptions,
    ) -> Result<Statement, SqlCrudError> {
        if fields.is_empty() {
            return Err(SqlCrudError::invalid("create table requires at least one field"));
        }
        let mut columns = Vec::with_capacity(fields.len());
        for field in fields {
            columns.push(match field {
                FieldSpec::Literal { definition, .. } if definition.trim().is_empty() => {
                    return Err(SqlCrudError::invalid("field definition must not be empty"));
                }
                FieldSpec::Literal { name, definition } => {
                    format!("{} {}", quote_identifier(name)?, definition.trim())
                }
                FieldSpec::Column(column) => self.column_definition(column)?,
            });
        }

        let mut sql = format!(
            "CREATE TABLE {}{} ({})",
            if options.if_not_exists { "IF NOT EXISTS " } else { "" },
            quote_identifier(table)?,
            columns.join(", ")
        );
        if self.dialect == Dialect::MySql {
            for (what, value) in [("engine", &options.engine), ("charset", &options.charset)] {
                if !is_plain_word(value) {
                    return Err(SqlCrudError::invalid(format!("invalid table {what}: {value}")));
                }
            }
            sql.push_str(&format!(
                " ENGINE={} DEFAULT CHARSET={}",
                options.engine, options.charset
            ));
        }
        Ok(Statement::without_params(sql))
    }

    /// MySQL: one `ALTER TABLE` with comma-joined actions. `SQLite`: one `ALTER TABLE`
    /// per action joined by `; `, meant for batch execution; MODIFY/CHANGE are
    /// rejected and AFTER is dropped.
    ///
    /// # Errors
    /// Returns `SqlCrudError::InvalidArgument` for an empty action list, an empty field,
    /// a missing definition, or an action the dialect cannot express.
    pub fn alter_table(
        &self,
        table: &str,
        actions: &[AlterAction],
    ) -> Result<Statement, SqlCrudError> {
        if actions.is_empty() {
            return Err(SqlCrudError::invalid("alter table requires at least one action"));
        }
        let table = quote_identifier(table)?;
        let mut clauses = Vec::with_capacity(actions.len());
        for action in actions {
            let mut clause = format!(
                "{} {}",
                action.operation.as_sql(self.dialect)?,
                quote_identifier(&action.field)?
            );
            match &action.definition {
                Some(definition) if !definition.trim().is_empty() => {
                    clause.push(' ');
                    clause.push_str(definition.trim());
                }
                _ if action.operation.needs_definition() => {
                    return Err(SqlCrudError::invalid(format!(
                        "{:?} of {} requires a definition",
                        action.operation, action.field
                    )));
                }
                _ => {}
            }
            if let Some(after) = &action.after {
                match self.dialect {
                    Dialect::MySql => {
                        clause.push_str(" AFTER ");
                        clause.push_str(&quote_identifier(after)?);
                    }
                    Dialect::Sqlite => debug!(field = %action.field, "AFTER dropped for SQLite"),
                }
            }
            clauses.push(clause);
        }

        let sql = match self.dialect {
            Dialect::MySql => format!("ALTER TABLE {table} {}", clauses.join(", ")),
            Dialect::Sqlite => clauses
                .iter()
                .map(|clause| format!("ALTER TABLE {table} {clause}"))
                .collect::<Vec<_>>()
                .join("; "),
        };
        Ok(Statement::without_params(sql))
    }

    /// Column introspection: `DESCRIBE` on MySQL, `PRAGMA table_info` on `SQLite`.
    ///
    /// # Errors
    /// Returns `SqlCrudError::InvalidArgument` for an empty table name.
    pub fn describe_table(&self, table: &str) -> Result<Statement, SqlCrudError> {
        let quoted = quote_identifier(table)?;
        Ok(Statement::without_params(match self.dialect {
            Dialect::MySql => format!("DESCRIBE {quoted}"),
            Dialect::Sqlite => format!("PRAGMA table_info({})", quote_literal(table)),
        }))
    }
}
