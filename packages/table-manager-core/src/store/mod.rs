//! Relational store contract consumed by the table layer.
//!
//! The table layer never talks to a storage engine directly. Everything it
//! needs (catalog introspection, DDL and row-level DML) goes through
//! [`SchemaStore`], which keeps the core independent of the engine.

mod memory;

pub use memory::{MemoryStore, StoredTable};

use serde::{Deserialize, Serialize};

use crate::error::DbError;
use crate::value::{Row, Value};

/// Column definition passed to [`SchemaStore::create_table`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,
    /// Declared type, passed through verbatim (e.g. "integer", "varchar(255)")
    pub declared_type: String,
    /// Whether the column accepts null
    pub nullable: bool,
    /// Value applied when an insert omits the column
    pub default: Option<Value>,
    /// Primary key flag
    pub primary_key: bool,
    /// Values assigned from the table's id sequence
    pub auto_increment: bool,
}

/// Index definition passed to [`SchemaStore::create_table`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Index name, unique within the store
    pub name: String,
    /// Indexed columns in key order
    pub columns: Vec<String>,
}

/// Create-table instruction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateTable {
    /// Columns in creation order
    pub columns: Vec<ColumnDefinition>,
    /// Secondary indexes
    pub indexes: Vec<IndexDefinition>,
}

/// Column metadata as reported by the store catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMetadata {
    pub name: String,
    pub declared_type: String,
    pub nullable: bool,
    pub primary_key: bool,
    pub default: Option<Value>,
}

/// Index metadata as reported by the store catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMetadata {
    pub name: String,
    /// Member columns in key order
    pub columns: Vec<String>,
}

/// Capability over a relational engine.
///
/// Filters are exact-match rows: a stored row matches when every filter
/// column holds an equal value. Errors are engine failures (connectivity,
/// constraint violations, duplicate tables) and are surfaced unchanged by
/// the table layer.
pub trait SchemaStore: Send + Sync + std::fmt::Debug {
    /// Returns the names of every table in the store, managed or not.
    fn list_table_names(&self) -> Result<Vec<String>, DbError>;

    /// Returns column metadata in creation order.
    fn table_column_metadata(&self, storage_name: &str) -> Result<Vec<ColumnMetadata>, DbError>;

    /// Returns one entry per declared index.
    fn table_index_metadata(&self, storage_name: &str) -> Result<Vec<IndexMetadata>, DbError>;

    /// Creates a table. Fails if the name is taken.
    fn create_table(&self, storage_name: &str, table: CreateTable) -> Result<(), DbError>;

    /// Drops a table and its rows.
    fn drop_table(&self, storage_name: &str) -> Result<(), DbError>;

    /// Returns rows in store order, honoring optional pagination.
    fn select_rows(
        &self,
        storage_name: &str,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<Row>, DbError>;

    /// Returns the number of rows in a table.
    fn count_rows(&self, storage_name: &str) -> Result<usize, DbError>;

    /// Returns the first row matching `filter`.
    fn select_one(&self, storage_name: &str, filter: &Row) -> Result<Option<Row>, DbError>;

    /// Inserts a row and returns its generated primary key.
    fn insert(&self, storage_name: &str, row: Row) -> Result<i64, DbError>;

    /// Assigns `row`'s values to every row matching `filter`. Returns the
    /// number of affected rows.
    fn update(&self, storage_name: &str, filter: &Row, row: Row) -> Result<usize, DbError>;

    /// Deletes every row matching `filter`. Returns the number of deleted rows.
    fn delete(&self, storage_name: &str, filter: &Row) -> Result<usize, DbError>;
}
