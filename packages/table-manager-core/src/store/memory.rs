//! In-memory relational store.
//!
//! Each table keeps:
//! - Column and index definitions in declaration order
//! - Rows in insertion order
//! - A row id sequence starting at 1

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::DbError;
use crate::value::{Row, Value};

use super::{
    ColumnDefinition, ColumnMetadata, CreateTable, IndexDefinition, IndexMetadata, SchemaStore,
};

/// A table held by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTable {
    /// Column definitions in declaration order
    pub columns: Vec<ColumnDefinition>,
    /// Secondary indexes
    pub indexes: Vec<IndexDefinition>,
    /// Rows in insertion order, each holding every column
    pub rows: Vec<Row>,
    /// Next id handed out by the sequence
    pub next_id: i64,
}

impl StoredTable {
    fn create(name: &str, definition: CreateTable) -> Result<Self, DbError> {
        let mut seen = HashSet::new();
        for column in &definition.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(DbError::DuplicateColumn {
                    table: name.to_string(),
                    column: column.name.clone(),
                });
            }
        }

        for index in &definition.indexes {
            if let Some(missing) = index.columns.iter().find(|c| !seen.contains(c.as_str())) {
                return Err(DbError::ColumnNotFound {
                    table: name.to_string(),
                    column: missing.clone(),
                });
            }
        }

        Ok(Self {
            columns: definition.columns,
            indexes: definition.indexes,
            rows: Vec::new(),
            next_id: 1,
        })
    }

    fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    fn primary_key(&self) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.primary_key)
    }

    fn check_known_columns(&self, table: &str, row: &Row) -> Result<(), DbError> {
        match row.keys().find(|name| self.column(name).is_none()) {
            Some(unknown) => Err(DbError::ColumnNotFound {
                table: table.to_string(),
                column: unknown.clone(),
            }),
            None => Ok(()),
        }
    }

    fn matches(row: &Row, filter: &Row) -> bool {
        filter.iter().all(|(name, value)| row.get(name) == Some(value))
    }

    fn key_taken(&self, column: &str, value: &Value, skip: &[usize]) -> bool {
        self.rows
            .iter()
            .enumerate()
            .any(|(i, row)| !skip.contains(&i) && row.get(column) == Some(value))
    }

    fn insert(&mut self, table: &str, mut row: Row) -> Result<i64, DbError> {
        self.check_known_columns(table, &row)?;

        let mut stored = Row::new();
        let mut key = None;
        for column in &self.columns {
            let mut value = row
                .remove(&column.name)
                .unwrap_or_else(|| column.default.clone().unwrap_or(Value::Null));

            if column.auto_increment && value.is_null() {
                value = Value::Integer(self.next_id);
            }

            if value.is_null() && !column.nullable {
                return Err(DbError::NotNullViolation {
                    table: table.to_string(),
                    column: column.name.clone(),
                });
            }

            if column.primary_key {
                if self.key_taken(&column.name, &value, &[]) {
                    return Err(DbError::UniqueViolation {
                        table: table.to_string(),
                        column: column.name.clone(),
                    });
                }
                key = value.as_integer();
            }

            stored.insert(column.name.clone(), value);
        }

        let id = key.unwrap_or(self.next_id);
        self.next_id = self.next_id.max(id.saturating_add(1));
        self.rows.push(stored);
        Ok(id)
    }

    fn update(&mut self, table: &str, filter: &Row, row: Row) -> Result<usize, DbError> {
        self.check_known_columns(table, filter)?;
        self.check_known_columns(table, &row)?;

        for (name, value) in &row {
            let nullable = self.column(name).map(|c| c.nullable).unwrap_or(true);
            if value.is_null() && !nullable {
                return Err(DbError::NotNullViolation {
                    table: table.to_string(),
                    column: name.clone(),
                });
            }
        }

        let targets: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, stored)| Self::matches(stored, filter))
            .map(|(i, _)| i)
            .collect();

        if let Some(pk) = self.primary_key() {
            if let Some(new_key) = row.get(&pk.name) {
                let collides = targets.len() > 1 || self.key_taken(&pk.name, new_key, &targets);
                if !targets.is_empty() && collides {
                    return Err(DbError::UniqueViolation {
                        table: table.to_string(),
                        column: pk.name.clone(),
                    });
                }
            }
        }

        for &i in &targets {
            for (name, value) in &row {
                self.rows[i].insert(name.clone(), value.clone());
            }
        }
        Ok(targets.len())
    }

    fn delete(&mut self, table: &str, filter: &Row) -> Result<usize, DbError> {
        self.check_known_columns(table, filter)?;
        let before = self.rows.len();
        self.rows.retain(|row| !Self::matches(row, filter));
        Ok(before - self.rows.len())
    }
}

/// Relational store held entirely in memory.
///
/// All tables sit behind one `RwLock`; readers run concurrently and every
/// mutation takes the write lock for its whole duration. The generation
/// counter increases on every mutation that changed something.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<BTreeMap<String, StoredTable>>,
    generation: AtomicU64,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store from previously captured tables.
    pub fn from_tables(tables: BTreeMap<String, StoredTable>) -> Self {
        Self {
            tables: RwLock::new(tables),
            generation: AtomicU64::new(0),
        }
    }

    /// Returns a copy of every table, keyed by storage name.
    pub fn snapshot(&self) -> Result<BTreeMap<String, StoredTable>, DbError> {
        let tables = self.tables.read().map_err(|_| DbError::LockPoisoned)?;
        Ok(tables.clone())
    }

    /// Returns the current mutation generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn touch(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    fn with_table<R>(
        &self,
        storage_name: &str,
        f: impl FnOnce(&StoredTable) -> R,
    ) -> Result<R, DbError> {
        let tables = self.tables.read().map_err(|_| DbError::LockPoisoned)?;
        let table = tables
            .get(storage_name)
            .ok_or_else(|| DbError::TableNotFound {
                table: storage_name.to_string(),
            })?;
        Ok(f(table))
    }

    fn with_table_mut<R>(
        &self,
        storage_name: &str,
        f: impl FnOnce(&mut StoredTable) -> Result<R, DbError>,
    ) -> Result<R, DbError> {
        let mut tables = self.tables.write().map_err(|_| DbError::LockPoisoned)?;
        let table = tables
            .get_mut(storage_name)
            .ok_or_else(|| DbError::TableNotFound {
                table: storage_name.to_string(),
            })?;
        f(table)
    }
}

impl SchemaStore for MemoryStore {
    fn list_table_names(&self) -> Result<Vec<String>, DbError> {
        let tables = self.tables.read().map_err(|_| DbError::LockPoisoned)?;
        Ok(tables.keys().cloned().collect())
    }

    fn table_column_metadata(&self, storage_name: &str) -> Result<Vec<ColumnMetadata>, DbError> {
        self.with_table(storage_name, |table| {
            table
                .columns
                .iter()
                .map(|c| ColumnMetadata {
                    name: c.name.clone(),
                    declared_type: c.declared_type.clone(),
                    nullable: c.nullable,
                    primary_key: c.primary_key,
                    default: c.default.clone(),
                })
                .collect()
        })
    }

    fn table_index_metadata(&self, storage_name: &str) -> Result<Vec<IndexMetadata>, DbError> {
        self.with_table(storage_name, |table| {
            table
                .indexes
                .iter()
                .map(|i| IndexMetadata {
                    name: i.name.clone(),
                    columns: i.columns.clone(),
                })
                .collect()
        })
    }

    fn create_table(&self, storage_name: &str, table: CreateTable) -> Result<(), DbError> {
        let mut tables = self.tables.write().map_err(|_| DbError::LockPoisoned)?;
        if tables.contains_key(storage_name) {
            return Err(DbError::TableAlreadyExists(storage_name.to_string()));
        }
        let stored = StoredTable::create(storage_name, table)?;
        tracing::debug!(
            "Created table {} with {} columns",
            storage_name,
            stored.columns.len()
        );
        tables.insert(storage_name.to_string(), stored);
        self.touch();
        Ok(())
    }

    fn drop_table(&self, storage_name: &str) -> Result<(), DbError> {
        let mut tables = self.tables.write().map_err(|_| DbError::LockPoisoned)?;
        tables
            .remove(storage_name)
            .ok_or_else(|| DbError::TableNotFound {
                table: storage_name.to_string(),
            })?;
        tracing::debug!("Dropped table {}", storage_name);
        self.touch();
        Ok(())
    }

    fn select_rows(
        &self,
        storage_name: &str,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<Row>, DbError> {
        self.with_table(storage_name, |table| {
            table
                .rows
                .iter()
                .skip(offset.unwrap_or(0))
                .take(limit.unwrap_or(usize::MAX))
                .cloned()
                .collect()
        })
    }

    fn count_rows(&self, storage_name: &str) -> Result<usize, DbError> {
        self.with_table(storage_name, |table| table.rows.len())
    }

    fn select_one(&self, storage_name: &str, filter: &Row) -> Result<Option<Row>, DbError> {
        self.with_table(storage_name, |table| {
            table.check_known_columns(storage_name, filter)?;
            Ok::<_, DbError>(
                table
                    .rows
                    .iter()
                    .find(|row| StoredTable::matches(row, filter))
                    .cloned(),
            )
        })?
    }

    fn insert(&self, storage_name: &str, row: Row) -> Result<i64, DbError> {
        let id = self.with_table_mut(storage_name, |table| table.insert(storage_name, row))?;
        tracing::debug!("Inserted row {} into {}", id, storage_name);
        self.touch();
        Ok(id)
    }

    fn update(&self, storage_name: &str, filter: &Row, row: Row) -> Result<usize, DbError> {
        let affected =
            self.with_table_mut(storage_name, |table| table.update(storage_name, filter, row))?;
        if affected > 0 {
            tracing::debug!("Updated {} rows in {}", affected, storage_name);
            self.touch();
        }
        Ok(affected)
    }

    fn delete(&self, storage_name: &str, filter: &Row) -> Result<usize, DbError> {
        let affected =
            self.with_table_mut(storage_name, |table| table.delete(storage_name, filter))?;
        if affected > 0 {
            tracing::debug!("Deleted {} rows from {}", affected, storage_name);
            self.touch();
        }
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, declared_type: &str, nullable: bool) -> ColumnDefinition {
        ColumnDefinition {
            name: name.to_string(),
            declared_type: declared_type.to_string(),
            nullable,
            default: None,
            primary_key: false,
            auto_increment: false,
        }
    }

    fn id_column() -> ColumnDefinition {
        ColumnDefinition {
            primary_key: true,
            auto_increment: true,
            ..column("id", "integer", false)
        }
    }

    fn filter(name: &str, value: impl Into<Value>) -> Row {
        Row::from([(name.to_string(), value.into())])
    }

    fn store_with_cars() -> MemoryStore {
        let store = MemoryStore::new();
        let mut in_stock = column("in_stock", "boolean", false);
        in_stock.default = Some(Value::Boolean(true));
        store
            .create_table(
                "_cars",
                CreateTable {
                    columns: vec![
                        id_column(),
                        column("model", "varchar(255)", false),
                        column("owner_id", "integer", true),
                        in_stock,
                    ],
                    indexes: vec![IndexDefinition {
                        name: "_cars_owner_id_index".to_string(),
                        columns: vec!["owner_id".to_string()],
                    }],
                },
            )
            .unwrap();
        store
    }

    #[test]
    fn test_create_table_rejects_duplicates() {
        let store = store_with_cars();
        let err = store.create_table("_cars", CreateTable::default()).unwrap_err();
        assert_eq!(err, DbError::TableAlreadyExists("_cars".to_string()));

        let err = store
            .create_table(
                "_twice",
                CreateTable {
                    columns: vec![column("a", "integer", true), column("a", "text", true)],
                    indexes: vec![],
                },
            )
            .unwrap_err();
        assert!(matches!(err, DbError::DuplicateColumn { .. }));
    }

    #[test]
    fn test_insert_assigns_sequence_and_defaults() {
        let store = store_with_cars();
        let first = store.insert("_cars", filter("model", "BMW X3")).unwrap();
        let second = store.insert("_cars", filter("model", "Ford Focus")).unwrap();
        assert_eq!((first, second), (1, 2));

        let row = store.select_one("_cars", &filter("id", 2i64)).unwrap().unwrap();
        assert_eq!(row.get("owner_id"), Some(&Value::Null));
        assert_eq!(row.get("in_stock"), Some(&Value::Boolean(true)));
        assert_eq!(store.count_rows("_cars").unwrap(), 2);
    }

    #[test]
    fn test_insert_enforces_constraints() {
        let store = store_with_cars();
        let err = store.insert("_cars", Row::new()).unwrap_err();
        assert!(matches!(err, DbError::NotNullViolation { ref column, .. } if column == "model"));

        let err = store.insert("_cars", filter("colour", "red")).unwrap_err();
        assert!(matches!(err, DbError::ColumnNotFound { ref column, .. } if column == "colour"));
        assert_eq!(store.count_rows("_cars").unwrap(), 0);
    }

    #[test]
    fn test_update_and_delete_by_filter() {
        let store = store_with_cars();
        store.insert("_cars", filter("model", "BMW X3")).unwrap();
        store.insert("_cars", filter("model", "Volvo S80")).unwrap();

        let affected = store
            .update("_cars", &filter("id", 1i64), filter("model", "VAZ"))
            .unwrap();
        assert_eq!(affected, 1);
        let row = store.select_one("_cars", &filter("id", 1i64)).unwrap().unwrap();
        assert_eq!(row.get("model"), Some(&Value::from("VAZ")));

        let err = store
            .update("_cars", &filter("id", 1i64), filter("model", Value::Null))
            .unwrap_err();
        assert!(matches!(err, DbError::NotNullViolation { .. }));

        let err = store
            .update("_cars", &filter("id", 1i64), filter("id", 2i64))
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        assert_eq!(store.delete("_cars", &filter("id", 1i64)).unwrap(), 1);
        assert_eq!(store.delete("_cars", &filter("id", 1i64)).unwrap(), 0);
        assert_eq!(store.count_rows("_cars").unwrap(), 1);
    }

    #[test]
    fn test_select_rows_pagination() {
        let store = store_with_cars();
        for model in ["a", "b", "c", "d"] {
            store.insert("_cars", filter("model", model)).unwrap();
        }

        let models = |rows: Vec<Row>| -> Vec<String> {
            rows.iter()
                .map(|r| r.get("model").unwrap().to_string())
                .collect()
        };

        assert_eq!(models(store.select_rows("_cars", None, None).unwrap()), ["a", "b", "c", "d"]);
        assert_eq!(models(store.select_rows("_cars", Some(2), Some(1)).unwrap()), ["b", "c"]);
        assert!(store.select_rows("_cars", None, Some(10)).unwrap().is_empty());
    }

    #[test]
    fn test_generation_tracks_mutations() {
        let store = store_with_cars();
        let start = store.generation();

        store.select_rows("_cars", None, None).unwrap();
        assert_eq!(store.generation(), start);

        store.insert("_cars", filter("model", "a")).unwrap();
        assert_eq!(store.generation(), start + 1);

        store.delete("_cars", &filter("id", 99i64)).unwrap();
        assert_eq!(store.generation(), start + 1);

        store.drop_table("_cars").unwrap();
        assert_eq!(store.generation(), start + 2);
        assert!(matches!(
            store.count_rows("_cars"),
            Err(DbError::TableNotFound { .. })
        ));
    }
}
