use std::sync::LazyLock;

use regex::Regex;

use crate::error::SqlCrudError;

use super::ident::{ParamSink, quote_identifier};
use super::{Conditions, RawClausePolicy, Statement, StatementBuilder};

const IDENT: &str = r"(?:`[^`]+`|[A-Za-z_][A-Za-z0-9_]*)";

static ORDER_LIST: LazyLock<Regex> = LazyLock::new(|| {
    let term = format!(r"{IDENT}(?:\.{IDENT})?(?:\s+(?i:asc|desc))?");
    Regex::new(&format!(r"^\s*{term}(?:\s*,\s*{term})*\s*$")).expect("valid ORDER BY pattern")
});

static PROJECTION_LIST: LazyLock<Regex> = LazyLock::new(|| {
    let term = format!(r"(?:\*|{IDENT}(?:\.(?:{IDENT}|\*))?(?:\s+(?i:as)\s+{IDENT})?)");
    Regex::new(&format!(r"^\s*{term}(?:\s*,\s*{term})*\s*$")).expect("valid projection pattern")
});

/// Columns to select.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Projection {
    /// `*`
    #[default]
    All,
    /// Quoted column names.
    Columns(Vec<String>),
    /// Caller-supplied select list, interpolated verbatim.
    Raw(String),
}

impl Projection {
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Projection::Columns(columns.into_iter().map(Into::into).collect())
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        Projection::Raw(sql.into())
    }

    fn render(&self, policy: RawClausePolicy) -> Result<String, SqlCrudError> {
        match self {
            Projection::All => Ok("*".to_string()),
            Projection::Columns(columns) if columns.is_empty() => Ok("*".to_string()),
            Projection::Columns(columns) => Ok(columns
                .iter()
                .map(|c| quote_identifier(c))
                .collect::<Result<Vec<_>, _>>()?
                .join(", ")),
            Projection::Raw(sql) => {
                check_raw(policy, &PROJECTION_LIST, sql, "select list")?;
                Ok(sql.trim().to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// One ORDER BY term on a quoted column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Projection, ordering and paging for `find_all`.
///
/// ORDER BY, LIMIT and OFFSET are written into the SQL text rather than bound.
/// Typed `order_by` terms are quoted; `order_raw` is interpolated as given and is
/// the caller's responsibility unless the builder validates raw clauses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub fields: Projection,
    pub order_by: Vec<OrderBy>,
    pub order_raw: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl FindOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn fields(mut self, fields: Projection) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    #[must_use]
    pub fn order_raw(mut self, order: impl Into<String>) -> Self {
        self.order_raw = Some(order.into());
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

fn check_raw(
    policy: RawClausePolicy,
    pattern: &Regex,
    sql: &str,
    what: &str,
) -> Result<(), SqlCrudError> {
    match policy {
        RawClausePolicy::Trusted if sql.trim().is_empty() => {
            Err(SqlCrudError::invalid(format!("{what} must not be empty")))
        }
        RawClausePolicy::Trusted => Ok(()),
        RawClausePolicy::Validated if pattern.is_match(sql) => Ok(()),
        RawClausePolicy::Validated => Err(SqlCrudError::invalid(format!(
            "{what} rejected by validation: {sql}"
        ))),
    }
}

impl StatementBuilder {
    /// `SELECT <fields> FROM <table> [WHERE ...] LIMIT 1`
    ///
    /// # Errors
    /// Returns `SqlCrudError::InvalidArgument` for empty identifiers or a rejected raw projection.
    pub fn find_one(
        &self,
        table: &str,
        conditions: &Conditions,
        fields: &Projection,
    ) -> Result<Statement, SqlCrudError> {
        let mut sink = ParamSink::new(self.placeholders);
        let mut parts = vec![
            "SELECT".to_string(),
            fields.render(self.raw_clauses)?,
            "FROM".to_string(),
            quote_identifier(table)?,
        ];
        parts.extend(conditions.render_where("", &mut sink)?);
        parts.push("LIMIT 1".to_string());
        Ok(Statement::new(parts.join(" "), sink.finish()))
    }

    /// `SELECT <fields> FROM <table> [WHERE ...] [ORDER BY ...] [LIMIT n] [OFFSET m]`
    ///
    /// An offset without a limit is preceded by the dialect's "no limit" LIMIT, since
    /// neither MySQL nor `SQLite` accepts a bare OFFSET.
    ///
    /// # Errors
    /// Returns `SqlCrudError::InvalidArgument` for empty identifiers or rejected raw clauses.
    pub fn find_all(
        &self,
        table: &str,
        conditions: &Conditions,
        options: &FindOptions,
    ) -> Result<Statement, SqlCrudError> {
        let mut sink = ParamSink::new(self.placeholders);
        let mut parts = vec![
            "SELECT".to_string(),
            options.fields.render(self.raw_clauses)?,
            "FROM".to_string(),
            quote_identifier(table)?,
        ];
        parts.extend(conditions.render_where("", &mut sink)?);

        let mut order_terms = Vec::with_capacity(options.order_by.len() + 1);
        for term in &options.order_by {
            order_terms.push(format!(
                "{} {}",
                quote_identifier(&term.column)?,
                term.direction.as_sql()
            ));
        }
        if let Some(raw) = &options.order_raw {
            check_raw(self.raw_clauses, &ORDER_LIST, raw, "ORDER BY clause")?;
            order_terms.push(raw.trim().to_string());
        }
        if !order_terms.is_empty() {
            parts.push(format!("ORDER BY {}", order_terms.join(", ")));
        }

        match (options.limit, options.offset) {
            (Some(limit), _) => parts.push(format!("LIMIT {limit}")),
            (None, Some(_)) => parts.push(format!("LIMIT {}", self.dialect.unbounded_limit())),
            (None, None) => {}
        }
        if let Some(offset) = options.offset {
            parts.push(format!("OFFSET {offset}"));
        }
        Ok(Statement::new(parts.join(" "), sink.finish()))
    }

    /// `SELECT COUNT(*) AS count FROM <table> [WHERE ...]`, the count column quoted.
    ///
    /// # Errors
    /// Returns `SqlCrudError::InvalidArgument` for empty identifiers.
    pub fn count(&self, table: &str, conditions: &Conditions) -> Result<Statement, SqlCrudError> {
        let mut sink = ParamSink::new(self.placeholders);
        let mut parts = vec![format!(
            "SELECT COUNT(*) AS `count` FROM {}",
            quote_identifier(table)?
        )];
        parts.extend(conditions.render_where("", &mut sink)?);
        Ok(Statement::new(parts.join(" "), sink.finish()))
    }
}
