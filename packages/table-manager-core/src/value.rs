//! Dynamic row values.
//!
//! Rows crossing the service boundary carry values whose type is only known
//! once the target column's declared type has been consulted. [`Value`] is the
//! tagged representation used for row fields and column defaults; the row
//! validator narrows textual input to the native variants.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DbError;

/// A single row field or column default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Date(NaiveDate),
}

/// Column name to value mapping.
pub type Row = BTreeMap<String, Value>;

impl Value {
    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the integer payload, if any.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the text payload, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Converts a JSON value into a row value.
    ///
    /// Strings stay textual even when they look like numbers or dates; the
    /// validator decides what they mean for a given column. Arrays and objects
    /// have no row representation.
    pub fn from_json(column: &str, value: serde_json::Value) -> Result<Self, DbError> {
        match value {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Boolean(b)),
            serde_json::Value::String(s) => Ok(Value::Text(s)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Integer(i))
                } else if let Some(f) = n.as_f64().filter(|f| f.is_finite()) {
                    Ok(Value::Float(f))
                } else {
                    Err(DbError::UnsupportedValue {
                        column: column.to_string(),
                        value: n.to_string(),
                    })
                }
            }
            other @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
                Err(DbError::UnsupportedValue {
                    column: column.to_string(),
                    value: other.to_string(),
                })
            }
        }
    }

    /// Converts the value into plain JSON. Dates render as `YYYY-MM-DD`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Builds a row from a JSON object.
pub fn row_from_json(value: serde_json::Value) -> Result<Row, DbError> {
    match value {
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(key, value)| {
                let value = Value::from_json(&key, value)?;
                Ok((key, value))
            })
            .collect(),
        other => Err(DbError::UnsupportedValue {
            column: "<row>".to_string(),
            value: other.to_string(),
        }),
    }
}

/// Renders a row as a JSON object.
pub fn row_to_json(row: &Row) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = row
        .iter()
        .map(|(name, value)| (name.clone(), value.to_json()))
        .collect();
    serde_json::Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_keeps_strings_textual() {
        let value = Value::from_json("owner_id", json!("42")).unwrap();
        assert_eq!(value, Value::Text("42".to_string()));

        let value = Value::from_json("owner_id", json!(42)).unwrap();
        assert_eq!(value, Value::Integer(42));

        let value = Value::from_json("price", json!(1.5)).unwrap();
        assert_eq!(value, Value::Float(1.5));
    }

    #[test]
    fn test_from_json_rejects_nested_values() {
        let err = Value::from_json("tags", json!(["a", "b"])).unwrap_err();
        assert!(matches!(err, DbError::UnsupportedValue { ref column, .. } if column == "tags"));

        assert!(row_from_json(json!([1, 2])).is_err());
    }

    #[test]
    fn test_row_to_json_renders_dates() {
        let mut row = Row::new();
        row.insert("id".to_string(), Value::Integer(1));
        row.insert(
            "birthday".to_string(),
            Value::Date(NaiveDate::from_ymd_opt(1990, 4, 12).unwrap()),
        );
        row.insert("salary".to_string(), Value::Null);

        assert_eq!(
            row_to_json(&row),
            json!({"id": 1, "birthday": "1990-04-12", "salary": null})
        );
    }
}
