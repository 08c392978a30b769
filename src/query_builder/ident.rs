use std::collections::HashSet;

use crate::error::SqlCrudError;
use crate::types::RowValues;

use super::{Params, PlaceholderStyle};

/// Backtick-quote an identifier, doubling any embedded backtick.
///
/// # Errors
/// Returns `SqlCrudError::InvalidArgument` for an empty or blank name.
pub fn quote_identifier(name: &str) -> Result<String, SqlCrudError> {
    if name.trim().is_empty() {
        return Err(SqlCrudError::invalid("identifier must not be empty"));
    }
    Ok(format!("`{}`", name.replace('`', "``")))
}

/// Single-quote a string literal, doubling any embedded quote.
pub(crate) fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Letters, digits and underscores only; used for interpolated keywords such as ENGINE.
pub(crate) fn is_plain_word(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Collects bound values while a statement is being rendered and hands out the
/// placeholder text for each one.
pub(crate) struct ParamSink {
    style: PlaceholderStyle,
    named: Vec<(String, RowValues)>,
    positional: Vec<RowValues>,
    used: HashSet<String>,
}

impl ParamSink {
    pub(crate) fn new(style: PlaceholderStyle) -> Self {
        Self {
            style,
            named: Vec::new(),
            positional: Vec::new(),
            used: HashSet::new(),
        }
    }

    /// Register `value` for `column` and return the placeholder to splice into SQL.
    ///
    /// Named placeholders are `:<prefix><column>` with every character outside
    /// `[A-Za-z0-9_]` replaced by `_`; a clash gets a numeric suffix.
    pub(crate) fn bind(&mut self, prefix: &str, column: &str, value: RowValues) -> String {
        match self.style {
            PlaceholderStyle::Positional => {
                self.positional.push(value);
                "?".to_string()
            }
            PlaceholderStyle::Named => {
                let sanitized: String = column
                    .chars()
                    .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
                    .collect();
                let base = format!(":{prefix}{sanitized}");
                let mut name = base.clone();
                let mut suffix = 2;
                while self.used.contains(&name) {
                    name = format!("{base}_{suffix}");
                    suffix += 1;
                }
                self.used.insert(name.clone());
                self.named.push((name.clone(), value));
                name
            }
        }
    }

    pub(crate) fn finish(self) -> Params {
        match self.style {
            PlaceholderStyle::Named => Params::Named(self.named),
            PlaceholderStyle::Positional => Params::Positional(self.positional),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_backtick_quoted() {
        assert_eq!(quote_identifier("users").unwrap(), "`users`");
        assert_eq!(quote_identifier("we`ird").unwrap(), "`we``ird`");
        assert!(quote_identifier("  ").unwrap_err().is_invalid_argument());
    }

    #[test]
    fn literals_double_single_quotes() {
        assert_eq!(quote_literal("it's"), "'it''s'");
    }

    #[test]
    fn named_placeholders_are_sanitized_and_deduplicated() {
        let mut sink = ParamSink::new(PlaceholderStyle::Named);
        assert_eq!(sink.bind("", "first name", "a".into()), ":first_name");
        assert_eq!(sink.bind("", "first_name", "b".into()), ":first_name_2");
        assert_eq!(sink.bind("__where_", "id", 1.into()), ":__where_id");
        let Params::Named(pairs) = sink.finish() else {
            panic!("expected named params");
        };
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[1], (":first_name_2".to_string(), RowValues::Text("b".into())));
    }

    #[test]
    fn positional_placeholders_keep_order() {
        let mut sink = ParamSink::new(PlaceholderStyle::Positional);
        assert_eq!(sink.bind("", "a", 1.into()), "?");
        assert_eq!(sink.bind("", "b", 2.into()), "?");
        assert_eq!(
            sink.finish(),
            Params::Positional(vec![RowValues::Int(1), RowValues::Int(2)])
        );
    }
}
