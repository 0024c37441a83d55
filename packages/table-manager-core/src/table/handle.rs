//! Façade over one managed table.
//!
//! A handle combines:
//! - Registry lookups for existence
//! - Schema translation in both directions
//! - Row validation ahead of every write
//! - Row CRUD delegated to the store

use std::sync::Arc;

use crate::error::DbError;
use crate::naming;
use crate::store::SchemaStore;
use crate::value::{Row, Value};

use super::column::{ColumnSpec, TableSchema};
use super::registry::TableRegistry;
use super::translator::{SchemaTranslator, PRIMARY_KEY};
use super::validation::{RowValidator, Validation, ValidationErrors};

/// One managed table.
///
/// Handles are cheap and meant to live for a single request. The schema is
/// re-read from the store on every call, so a handle never acts on stale
/// structure.
#[derive(Debug)]
pub struct TableHandle {
    name: String,
    storage_name: String,
    store: Arc<dyn SchemaStore>,
    row_errors: Option<ValidationErrors>,
}

impl TableHandle {
    /// Creates a handle for the managed table `name`.
    ///
    /// # Errors
    /// [`DbError::InvalidTableName`] if `name` uses anything but `[0-9A-Za-z_]`.
    pub fn new(name: &str, store: Arc<dyn SchemaStore>) -> Result<Self, DbError> {
        naming::validate_table_name(name)?;
        Ok(Self {
            name: name.to_string(),
            storage_name: naming::encode(name),
            store,
            row_errors: None,
        })
    }

    /// User-facing table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the table inside the store.
    pub fn storage_name(&self) -> &str {
        &self.storage_name
    }

    pub fn exists(&self) -> Result<bool, DbError> {
        TableRegistry::new(self.store.as_ref()).exists(&self.name)
    }

    /// Live schema, primary key first.
    pub fn schema(&self) -> Result<TableSchema, DbError> {
        self.translator().from_storage_schema(&self.storage_name)
    }

    /// Live schema without the primary key.
    pub fn user_schema(&self) -> Result<TableSchema, DbError> {
        Ok(SchemaTranslator::user_facing_schema(&self.schema()?))
    }

    /// Columns leading an index.
    pub fn index_fields(&self) -> Result<Vec<String>, DbError> {
        self.translator().index_fields(&self.storage_name)
    }

    /// Creates the table. Doesn't check for an existing table; the store's
    /// error is returned as is.
    pub fn create(&self, specs: &[ColumnSpec]) -> Result<(), DbError> {
        let instruction = SchemaTranslator::to_storage_schema(&self.storage_name, specs);
        self.store.create_table(&self.storage_name, instruction)?;
        tracing::info!("Created table '{}' with {} columns", self.name, specs.len());
        Ok(())
    }

    /// Drops the table and all of its rows.
    pub fn delete(&self) -> Result<(), DbError> {
        self.store.drop_table(&self.storage_name)?;
        tracing::info!("Deleted table '{}'", self.name);
        Ok(())
    }

    /// Rows in store order.
    pub fn rows(&self, limit: Option<usize>, offset: Option<usize>) -> Result<Vec<Row>, DbError> {
        self.store.select_rows(&self.storage_name, limit, offset)
    }

    pub fn rows_count(&self) -> Result<usize, DbError> {
        self.store.count_rows(&self.storage_name)
    }

    /// Validates `data` against the user-facing schema as a complete row.
    pub fn validate_row(&self, data: &Row) -> Result<Validation, DbError> {
        let schema = self.user_schema()?;
        Ok(RowValidator::new(&schema).validate(data))
    }

    /// Validates and inserts a row.
    ///
    /// Returns the new primary key, or `None` when validation failed; the
    /// reasons are then available from [`row_errors`](Self::row_errors).
    /// A client-supplied `id` is ignored.
    pub fn insert_row(&mut self, mut data: Row) -> Result<Option<i64>, DbError> {
        data.remove(PRIMARY_KEY);

        match self.validate_row(&data)? {
            Validation::Valid(clean) => {
                self.row_errors = None;
                let id = self.store.insert(&self.storage_name, clean)?;
                Ok(Some(id))
            }
            Validation::Invalid(errors) => {
                tracing::debug!("Rejected row for '{}': {:?}", self.name, errors);
                self.row_errors = Some(errors);
                Ok(None)
            }
        }
    }

    /// Validates and applies a partial update to row `id`.
    ///
    /// The primary key can't be changed. Only the fields present in `data`
    /// are validated and reported; an empty payload is a no-op.
    pub fn update_row(&mut self, id: i64, mut data: Row) -> Result<(), DbError> {
        data.remove(PRIMARY_KEY);
        self.row_errors = None;
        if data.is_empty() {
            return Ok(());
        }

        let schema = self.user_schema()?;
        match RowValidator::new(&schema).validate_partial(&data) {
            Validation::Valid(clean) => {
                self.store
                    .update(&self.storage_name, &Self::id_filter(id), clean)?;
                Ok(())
            }
            Validation::Invalid(errors) => {
                tracing::debug!("Rejected update of {}#{}: {:?}", self.name, id, errors);
                self.row_errors = Some(errors);
                Ok(())
            }
        }
    }

    /// First row matching every entry of `filter`.
    pub fn find_row(&self, filter: &Row) -> Result<Option<Row>, DbError> {
        self.store.select_one(&self.storage_name, filter)
    }

    /// Shorthand for `find_row({id: id})`.
    pub fn find_by_id(&self, id: i64) -> Result<Option<Row>, DbError> {
        self.find_row(&Self::id_filter(id))
    }

    /// Deletes row `id`. Deleting a missing row is not an error.
    pub fn delete_row(&self, id: i64) -> Result<(), DbError> {
        self.store.delete(&self.storage_name, &Self::id_filter(id))?;
        Ok(())
    }

    /// Validation errors of the last `insert_row`/`update_row` call, if it
    /// was rejected.
    pub fn row_errors(&self) -> Option<&ValidationErrors> {
        self.row_errors.as_ref()
    }

    fn translator(&self) -> SchemaTranslator<'_> {
        SchemaTranslator::new(self.store.as_ref())
    }

    fn id_filter(id: i64) -> Row {
        Row::from([(PRIMARY_KEY.to_string(), Value::Integer(id))])
    }
}
