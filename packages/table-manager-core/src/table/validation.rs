//! Row validation against a user-facing schema.
//!
//! Validation never fails with an error: it either produces a clean row, with
//! textual input narrowed to the column's native type, or a map of per-column
//! messages.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::value::{Row, Value};

use super::column::{ColumnDescriptor, TableSchema};

/// Reported when a required column receives no value.
pub const CANT_BE_NULL: &str = "can't be null";
/// Reported when a value doesn't fit the column's type family.
pub const INVALID_VALUE: &str = "invalid value";

/// Column name to message.
pub type ValidationErrors = BTreeMap<String, String>;

static INTEGER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A[0-9]+\z").expect("integer pattern is valid"));
static FLOAT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A[0-9]+(\.[0-9]+)?\z").expect("float pattern is valid"));
// Anchored at the end only: "due 2024-01-31" is accepted as 2024-01-31.
static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]{4}-[0-9]{2}-[0-9]{2}\z").expect("date pattern is valid"));

/// Format family of a declared column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFamily {
    Integer,
    Float,
    Date,
    Other,
}

impl TypeFamily {
    /// Classifies a declared type: `integer`, anything starting with
    /// `double`, `date`, or other (no format check).
    pub fn of(declared_type: &str) -> Self {
        let declared = declared_type.trim().to_ascii_lowercase();
        if declared == "integer" {
            TypeFamily::Integer
        } else if declared.starts_with("double") {
            TypeFamily::Float
        } else if declared == "date" {
            TypeFamily::Date
        } else {
            TypeFamily::Other
        }
    }

    /// Narrows a non-null value to this family's native type.
    ///
    /// Returns `None` when the value isn't acceptable for the family.
    pub fn narrow(self, value: &Value) -> Option<Value> {
        match (self, value) {
            (TypeFamily::Float, Value::Float(f)) if !f.is_finite() => None,
            (TypeFamily::Integer, Value::Integer(_))
            | (TypeFamily::Float, Value::Float(_))
            | (TypeFamily::Date, Value::Date(_))
            | (TypeFamily::Other, _) => Some(value.clone()),
            (TypeFamily::Integer, Value::Text(s)) if INTEGER_RE.is_match(s) => {
                s.parse().ok().map(Value::Integer)
            }
            // Long digit runs overflow to infinity, which has no JSON form.
            (TypeFamily::Float, Value::Text(s)) if FLOAT_RE.is_match(s) => s
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Value::Float),
            // A match that isn't a calendar date ("2024-02-30") stays textual.
            (TypeFamily::Date, Value::Text(s)) => DATE_RE.find(s).map(|m| {
                NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d")
                    .map(Value::Date)
                    .unwrap_or_else(|_| value.clone())
            }),
            _ => None,
        }
    }
}

/// Outcome of validating one row.
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    /// Row ready for persistence
    Valid(Row),
    /// At least one column was rejected
    Invalid(ValidationErrors),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid(_))
    }

    /// Returns the error map, if any.
    pub fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            Validation::Valid(_) => None,
            Validation::Invalid(errors) => Some(errors),
        }
    }
}

/// Validates rows against a user-facing schema.
pub struct RowValidator<'a> {
    schema: &'a TableSchema,
}

impl<'a> RowValidator<'a> {
    /// `schema` must not contain the primary key.
    pub fn new(schema: &'a TableSchema) -> Self {
        Self { schema }
    }

    /// Validates a complete row, as for an insert.
    ///
    /// Columns missing from `row` are treated as null. Keys that aren't
    /// columns of the schema are passed through untouched for the store to
    /// judge.
    pub fn validate(&self, row: &Row) -> Validation {
        let mut clean = row.clone();
        let mut errors = ValidationErrors::new();

        for column in self.schema {
            let value = row.get(&column.name).unwrap_or(&Value::Null);
            match Self::check_column(column, value) {
                Ok(Some(narrowed)) => {
                    clean.insert(column.name.clone(), narrowed);
                }
                Ok(None) => {}
                Err(message) => {
                    errors.insert(column.name.clone(), message.to_string());
                }
            }
        }

        if errors.is_empty() {
            Validation::Valid(clean)
        } else {
            Validation::Invalid(errors)
        }
    }

    /// Validates a partial row, as for an update.
    ///
    /// Errors for columns absent from `row` are discarded, so only the
    /// fields the caller tried to change are reported.
    pub fn validate_partial(&self, row: &Row) -> Validation {
        match self.validate(row) {
            Validation::Invalid(mut errors) => {
                errors.retain(|column, _| row.contains_key(column));
                if errors.is_empty() {
                    self.narrowed(row)
                } else {
                    Validation::Invalid(errors)
                }
            }
            Validation::Valid(_) => self.narrowed(row),
        }
    }

    // Clean row restricted to the keys present in `row`.
    fn narrowed(&self, row: &Row) -> Validation {
        let mut clean = row.clone();
        for (name, value) in clean.iter_mut() {
            if let Some(column) = self.schema.get(name) {
                if let Ok(Some(narrowed)) = Self::check_column(column, value) {
                    *value = narrowed;
                }
            }
        }
        Validation::Valid(clean)
    }

    /// Checks one value. `Ok(None)` leaves the row untouched.
    ///
    /// A null aimed at a NOT NULL column with a default becomes the default,
    /// since the store would reject the null itself.
    fn check_column(
        column: &ColumnDescriptor,
        value: &Value,
    ) -> Result<Option<Value>, &'static str> {
        if value.is_null() {
            return match (column.nullable, column.has_default()) {
                (true, _) => Ok(None),
                (false, true) => Ok(column.default.clone()),
                (false, false) => Err(CANT_BE_NULL),
            };
        }

        TypeFamily::of(&column.declared_type)
            .narrow(value)
            .map(Some)
            .ok_or(INVALID_VALUE)
    }
}
