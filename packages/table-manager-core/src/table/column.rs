//! Column specifications and the canonical table schema.

use serde::{Serialize, Serializer};

use crate::value::Value;

/// Abstract column specification supplied when creating a table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    /// Column name
    pub name: String,
    /// Declared type, passed to the store verbatim
    pub declared_type: String,
    /// Whether the column accepts null (default: true)
    pub nullable: bool,
    /// Value the store applies when an insert omits the column
    pub default: Option<Value>,
    /// Whether to create a single-column index
    pub indexed: bool,
}

impl ColumnSpec {
    /// Creates a nullable, unindexed column spec without default.
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            nullable: true,
            default: None,
            indexed: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }
}

/// Canonical description of one column, derived from store metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: String,
    pub nullable: bool,
    #[serde(serialize_with = "serialize_default")]
    pub default: Option<Value>,
    pub primary_key: bool,
    pub indexed: bool,
}

impl ColumnDescriptor {
    /// Returns true when the store fills the column on its own if omitted.
    pub fn has_default(&self) -> bool {
        self.default.as_ref().is_some_and(|d| !d.is_null())
    }
}

fn serialize_default<S: Serializer>(default: &Option<Value>, serializer: S) -> Result<S::Ok, S::Error> {
    match default {
        Some(value) => value.to_json().serialize(serializer),
        None => serializer.serialize_none(),
    }
}

/// Ordered column descriptors, primary key first.
///
/// A schema is a snapshot of live store metadata. Any structural change to
/// the table invalidates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TableSchema {
    columns: Vec<ColumnDescriptor>,
}

impl TableSchema {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self { columns }
    }

    /// Looks a column up by name.
    pub fn get(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter()
    }

    /// Column names in creation order.
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn primary_key(&self) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.primary_key)
    }

    /// Returns the schema without its primary key column.
    pub fn without_primary_key(&self) -> TableSchema {
        TableSchema {
            columns: self
                .columns
                .iter()
                .filter(|c| !c.primary_key)
                .cloned()
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TableSchema {
    type Item = &'a ColumnDescriptor;
    type IntoIter = std::slice::Iter<'a, ColumnDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
