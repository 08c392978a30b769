use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::SqlCrudError;
use crate::types::RowValues;

use super::ident::{ParamSink, quote_identifier};
use super::{Conditions, Params, Statement, StatementBuilder};

const SET_PREFIX: &str = "__set_";
const WHERE_PREFIX: &str = "__where_";

/// Row data accepted by insert and update.
///
/// Either column/value pairs, or bare values paired with an explicit column list.
/// Both shapes are normalized into one ordered column → value sequence before any
/// SQL is written.
#[derive(Debug, Clone, PartialEq)]
pub enum RowData {
    Mapping(Vec<(String, RowValues)>),
    Positional {
        values: Vec<RowValues>,
        columns: Vec<String>,
    },
}

impl RowData {
    pub fn mapping<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RowValues>,
    {
        RowData::Mapping(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn positional<V, C>(values: Vec<V>, columns: &[C]) -> Self
    where
        V: Into<RowValues>,
        C: AsRef<str>,
    {
        RowData::Positional {
            values: values.into_iter().map(Into::into).collect(),
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
        }
    }

    /// Attach column names to positional data. Mappings are returned unchanged.
    #[must_use]
    pub fn with_columns<C: AsRef<str>>(self, names: &[C]) -> Self {
        match self {
            RowData::Positional { values, .. } => RowData::Positional {
                values,
                columns: names.iter().map(|c| c.as_ref().to_string()).collect(),
            },
            mapping @ RowData::Mapping(_) => mapping,
        }
    }

    /// A JSON object becomes a mapping (keys in `serde_json` map order); a JSON
    /// array becomes positional data that still needs column names (see
    /// [`RowData::with_columns`]).
    ///
    /// # Errors
    /// Returns `SqlCrudError::InvalidArgument` for scalars and `null`.
    pub fn from_json(value: JsonValue) -> Result<Self, SqlCrudError> {
        match value {
            JsonValue::Object(map) => Ok(RowData::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, RowValues::from_json(v)))
                    .collect(),
            )),
            JsonValue::Array(items) => Ok(RowData::Positional {
                values: items.into_iter().map(RowValues::from_json).collect(),
                columns: Vec::new(),
            }),
            other => Err(SqlCrudError::invalid(format!(
                "row data must be a JSON object or array, got {other}"
            ))),
        }
    }

    /// Build row data from any serializable struct or map.
    ///
    /// # Errors
    /// Returns `SqlCrudError::ParameterError` if serialization fails, or
    /// `SqlCrudError::InvalidArgument` if the value is not an object or array.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, SqlCrudError> {
        let json = serde_json::to_value(value)
            .map_err(|e| SqlCrudError::ParameterError(format!("row serialization failed: {e}")))?;
        Self::from_json(json)
    }

    /// Canonical column → value pairs.
    ///
    /// Duplicate mapping keys keep their first position and their last value.
    /// Positional values are paired with columns by index: surplus values are
    /// dropped and columns without a value are left out.
    pub(crate) fn normalize(&self) -> Result<Vec<(String, RowValues)>, SqlCrudError> {
        match self {
            RowData::Mapping(pairs) => {
                let mut out: Vec<(String, RowValues)> = Vec::with_capacity(pairs.len());
                for (column, value) in pairs {
                    match out.iter_mut().find(|(c, _)| c == column) {
                        Some(existing) => existing.1 = value.clone(),
                        None => out.push((column.clone(), value.clone())),
                    }
                }
                Ok(out)
            }
            RowData::Positional { columns, .. } if columns.is_empty() => Err(
                SqlCrudError::invalid("positional row data requires column names"),
            ),
            RowData::Positional { values, columns } => {
                if values.len() != columns.len() {
                    debug!(
                        values = values.len(),
                        columns = columns.len(),
                        "positional row length differs from column list"
                    );
                }
                Ok(columns
                    .iter()
                    .cloned()
                    .zip(values.iter().cloned())
                    .collect())
            }
        }
    }

    /// Values laid out in `order`; columns this row lacks become NULL and extra
    /// columns are ignored. Positional data without its own column list is matched
    /// to `order` by index.
    fn align(&self, order: &[String]) -> Result<Vec<RowValues>, SqlCrudError> {
        if let RowData::Positional { values, columns } = self {
            if columns.is_empty() {
                return Ok((0..order.len())
                    .map(|i| values.get(i).cloned().unwrap_or(RowValues::Null))
                    .collect());
            }
        }
        let pairs = self.normalize()?;
        Ok(order
            .iter()
            .map(|column| {
                pairs
                    .iter()
                    .find(|(c, _)| c == column)
                    .map_or(RowValues::Null, |(_, v)| v.clone())
            })
            .collect())
    }
}

impl<K: Into<String>, V: Into<RowValues>> FromIterator<(K, V)> for RowData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RowData::mapping(iter)
    }
}

fn quoted_columns<'a>(
    columns: impl Iterator<Item = &'a String>,
) -> Result<Vec<String>, SqlCrudError> {
    columns.map(|c| quote_identifier(c)).collect()
}

impl StatementBuilder {
    /// `INSERT INTO <table> (<cols>) VALUES (<placeholders>)`
    ///
    /// # Errors
    /// Returns `SqlCrudError::InvalidArgument` for empty data, positional data without
    /// column names, or empty identifiers.
    pub fn insert(&self, table: &str, data: &RowData) -> Result<Statement, SqlCrudError> {
        let pairs = data.normalize()?;
        if pairs.is_empty() {
            return Err(SqlCrudError::invalid("insert data must not be empty"));
        }
        let table = quote_identifier(table)?;
        let columns = quoted_columns(pairs.iter().map(|(c, _)| c))?;
        let mut sink = ParamSink::new(self.placeholders);
        let placeholders: Vec<String> = pairs
            .into_iter()
            .map(|(column, value)| sink.bind("", &column, value))
            .collect();
        Ok(Statement::new(
            format!(
                "INSERT INTO {table} ({}) VALUES ({})",
                columns.join(", "),
                placeholders.join(", ")
            ),
            sink.finish(),
        ))
    }

    /// One multi-row INSERT with positional placeholders.
    ///
    /// The first row fixes the column order; every later row is laid out in that
    /// order with NULL for columns it lacks. Returns `None` when `rows` is empty.
    ///
    /// # Errors
    /// Returns `SqlCrudError::InvalidArgument` if the first row is empty or any row
    /// cannot be normalized.
    pub fn batch_insert(
        &self,
        table: &str,
        rows: &[RowData],
    ) -> Result<Option<Statement>, SqlCrudError> {
        let Some(first) = rows.first() else {
            return Ok(None);
        };
        let order: Vec<String> = first.normalize()?.into_iter().map(|(c, _)| c).collect();
        if order.is_empty() {
            return Err(SqlCrudError::invalid(
                "batch insert first row must not be empty",
            ));
        }
        let table = quote_identifier(table)?;
        let columns = quoted_columns(order.iter())?;
        let row_placeholder = format!("({})", vec!["?"; order.len()].join(", "));

        let mut values = Vec::with_capacity(rows.len() * order.len());
        for row in rows {
            values.extend(row.align(&order)?);
        }
        let tuples = vec![row_placeholder.as_str(); rows.len()].join(", ");
        Ok(Some(Statement::new(
            format!("INSERT INTO {table} ({}) VALUES {tuples}", columns.join(", ")),
            Params::Positional(values),
        )))
    }

    /// `UPDATE <table> SET ... [WHERE ...]`
    ///
    /// SET placeholders are prefixed `__set_` and WHERE placeholders `__where_`, so
    /// a column may appear on both sides.
    ///
    /// # Errors
    /// Returns `SqlCrudError::InvalidArgument` for empty data or empty identifiers.
    pub fn update(
        &self,
        table: &str,
        data: &RowData,
        conditions: &Conditions,
    ) -> Result<Statement, SqlCrudError> {
        let pairs = data.normalize()?;
        if pairs.is_empty() {
            return Err(SqlCrudError::invalid("update data must not be empty"));
        }
        let mut sink = ParamSink::new(self.placeholders);
        let mut assignments = Vec::with_capacity(pairs.len());
        for (column, value) in pairs {
            let quoted = quote_identifier(&column)?;
            assignments.push(format!("{quoted} = {}", sink.bind(SET_PREFIX, &column, value)));
        }
        let mut parts = vec![
            format!("UPDATE {} SET", quote_identifier(table)?),
            assignments.join(", "),
        ];
        parts.extend(conditions.render_where(WHERE_PREFIX, &mut sink)?);
        Ok(Statement::new(parts.join(" "), sink.finish()))
    }

    /// `DELETE FROM <table> [WHERE ...]`
    ///
    /// An empty condition set produces no WHERE clause and deletes every row.
    ///
    /// # Errors
    /// Returns `SqlCrudError::InvalidArgument` for empty identifiers.
    pub fn delete(&self, table: &str, conditions: &Conditions) -> Result<Statement, SqlCrudError> {
        let mut sink = ParamSink::new(self.placeholders);
        let mut parts = vec![format!("DELETE FROM {}", quote_identifier(table)?)];
        parts.extend(conditions.render_where("", &mut sink)?);
        Ok(Statement::new(parts.join(" "), sink.finish()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dialect;
    use serde_json::json;

    fn mysql() -> StatementBuilder {
        StatementBuilder::new(Dialect::MySql)
    }

    #[test]
    fn insert_uses_named_placeholders() {
        let data = RowData::mapping([("name", RowValues::from("ann")), ("age", 30.into())]);
        let stmt = mysql().insert("users", &data).unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO `users` (`name`, `age`) VALUES (:name, :age)"
        );
        assert_eq!(stmt.params.get(":age"), Some(&RowValues::Int(30)));
    }

    #[test]
    fn positional_insert_requires_columns() {
        let data = RowData::from_json(json!(["ann", 30])).unwrap();
        let err = mysql().insert("users", &data).unwrap_err();
        assert!(err.is_invalid_argument());

        let stmt = mysql()
            .insert("users", &data.with_columns(&["name", "age"]))
            .unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO `users` (`name`, `age`) VALUES (:name, :age)"
        );
    }

    #[test]
    fn empty_insert_is_rejected() {
        let err = mysql()
            .insert("users", &RowData::Mapping(Vec::new()))
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn serializable_structs_become_mappings() {
        #[derive(Serialize)]
        struct User {
            name: &'static str,
            active: bool,
        }
        let data = RowData::from_serialize(&User {
            name: "ann",
            active: true,
        })
        .unwrap();
        let pairs = data.normalize().unwrap();
        assert!(pairs.contains(&("active".to_string(), RowValues::Bool(true))));
        assert!(pairs.contains(&("name".to_string(), RowValues::Text("ann".into()))));
        assert!(RowData::from_serialize(&5).is_err());
    }

    #[test]
    fn batch_insert_fixes_columns_from_first_row() {
        let rows = vec![
            RowData::mapping([("a", 1), ("b", 2)]),
            RowData::mapping([("b", 4)]),
            RowData::mapping([("c", 9), ("a", 5)]),
        ];
        let stmt = mysql().batch_insert("t", &rows).unwrap().unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO `t` (`a`, `b`) VALUES (?, ?), (?, ?), (?, ?)"
        );
        assert_eq!(
            stmt.params,
            Params::Positional(vec![
                RowValues::Int(1),
                RowValues::Int(2),
                RowValues::Null,
                RowValues::Int(4),
                RowValues::Int(5),
                RowValues::Null,
            ])
        );
    }

    #[test]
    fn batch_insert_pairs_bare_positional_rows_with_first_row_order() {
        let rows = vec![
            RowData::positional(vec![1, 2], &["a", "b"]),
            RowData::from_json(json!([3])).unwrap(),
        ];
        let stmt = mysql().batch_insert("t", &rows).unwrap().unwrap();
        assert_eq!(
            stmt.params,
            Params::Positional(vec![
                RowValues::Int(1),
                RowValues::Int(2),
                RowValues::Int(3),
                RowValues::Null,
            ])
        );
    }

    #[test]
    fn batch_insert_of_nothing_is_none() {
        assert_eq!(mysql().batch_insert("t", &[]).unwrap(), None);
    }

    #[test]
    fn update_namespaces_never_collide() {
        let stmt = mysql()
            .update(
                "users",
                &RowData::mapping([("status", "archived")]),
                &Conditions::new().eq("status", "active"),
            )
            .unwrap();
        assert_eq!(
            stmt.sql,
            "UPDATE `users` SET `status` = :__set_status WHERE `status` = :__where_status"
        );
        assert_eq!(
            stmt.params.get(":__set_status"),
            Some(&RowValues::Text("archived".into()))
        );
        assert_eq!(
            stmt.params.get(":__where_status"),
            Some(&RowValues::Text("active".into()))
        );
    }

    #[test]
    fn delete_without_conditions_targets_every_row() {
        let stmt = mysql().delete("sessions", &Conditions::new()).unwrap();
        assert_eq!(stmt.sql, "DELETE FROM `sessions`");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn duplicate_mapping_keys_keep_last_value() {
        let data = RowData::mapping([("a", 1), ("b", 2), ("a", 3)]);
        assert_eq!(
            data.normalize().unwrap(),
            vec![("a".to_string(), RowValues::Int(3)), ("b".to_string(), RowValues::Int(2))]
        );
    }
}
