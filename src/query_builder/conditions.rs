use crate::error::SqlCrudError;
use crate::types::RowValues;

use super::ident::{ParamSink, quote_identifier};

/// Column-equals-value filter, combined with AND.
///
/// Keeps insertion order; setting a column twice replaces its value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions {
    pairs: Vec<(String, RowValues)>,
}

impl Conditions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) an equality condition.
    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<RowValues>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<RowValues>) {
        let column = column.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(c, _)| *c == column) {
            Some(existing) => existing.1 = value,
            None => self.pairs.push((column, value)),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        self.pairs.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// `WHERE a = :a AND b = :b`, or `None` for an empty set.
    pub(crate) fn render_where(
        &self,
        prefix: &str,
        sink: &mut ParamSink,
    ) -> Result<Option<String>, SqlCrudError> {
        if self.pairs.is_empty() {
            return Ok(None);
        }
        let mut parts = Vec::with_capacity(self.pairs.len());
        for (column, value) in &self.pairs {
            let placeholder = sink.bind(prefix, column, value.clone());
            parts.push(format!("{} = {placeholder}", quote_identifier(column)?));
        }
        Ok(Some(format!("WHERE {}", parts.join(" AND "))))
    }
}

impl<K: Into<String>, V: Into<RowValues>> FromIterator<(K, V)> for Conditions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut conditions = Conditions::new();
        for (column, value) in iter {
            conditions.insert(column, value);
        }
        conditions
    }
}
