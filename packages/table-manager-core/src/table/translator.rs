//! Mapping between column specs, store DDL and the canonical schema.

use std::collections::HashSet;

use crate::error::DbError;
use crate::store::{ColumnDefinition, CreateTable, IndexDefinition, SchemaStore};

use super::column::{ColumnDescriptor, ColumnSpec, TableSchema};

/// Name of the system-managed primary key column.
pub const PRIMARY_KEY: &str = "id";

/// Declared type of the injected primary key.
const PRIMARY_KEY_TYPE: &str = "integer";

/// Translates schemas in both directions for one store.
#[derive(Clone, Copy)]
pub struct SchemaTranslator<'a> {
    store: &'a dyn SchemaStore,
}

impl<'a> SchemaTranslator<'a> {
    pub fn new(store: &'a dyn SchemaStore) -> Self {
        Self { store }
    }

    /// Builds the create-table instruction for a managed table.
    ///
    /// An auto-incrementing `id` primary key is always injected as the first
    /// column; a spec named `id` is discarded in its favour. Indexed specs get
    /// a non-unique single-column index named `<table>_<column>_index`.
    pub fn to_storage_schema(storage_name: &str, specs: &[ColumnSpec]) -> CreateTable {
        let mut columns = vec![ColumnDefinition {
            name: PRIMARY_KEY.to_string(),
            declared_type: PRIMARY_KEY_TYPE.to_string(),
            nullable: false,
            default: None,
            primary_key: true,
            auto_increment: true,
        }];
        let mut indexes = Vec::new();

        for spec in specs.iter().filter(|s| s.name != PRIMARY_KEY) {
            columns.push(ColumnDefinition {
                name: spec.name.clone(),
                declared_type: spec.declared_type.clone(),
                nullable: spec.nullable,
                default: spec.default.clone(),
                primary_key: false,
                auto_increment: false,
            });

            if spec.indexed {
                indexes.push(IndexDefinition {
                    name: format!("{}_{}_index", storage_name, spec.name),
                    columns: vec![spec.name.clone()],
                });
            }
        }

        CreateTable { columns, indexes }
    }

    /// Reads the live schema of a storage table.
    ///
    /// Column order follows the store. A column counts as indexed when it is
    /// the first member of some index; other members of a multi-column index
    /// are not reported.
    pub fn from_storage_schema(&self, storage_name: &str) -> Result<TableSchema, DbError> {
        let indexed: HashSet<String> = self.index_fields(storage_name)?.into_iter().collect();
        let columns = self
            .store
            .table_column_metadata(storage_name)?
            .into_iter()
            .map(|meta| ColumnDescriptor {
                indexed: indexed.contains(&meta.name),
                name: meta.name,
                declared_type: meta.declared_type,
                nullable: meta.nullable,
                default: meta.default,
                primary_key: meta.primary_key,
            })
            .collect();

        Ok(TableSchema::new(columns))
    }

    /// Returns the leading column of every index, in index order.
    pub fn index_fields(&self, storage_name: &str) -> Result<Vec<String>, DbError> {
        Ok(self
            .store
            .table_index_metadata(storage_name)?
            .into_iter()
            .filter_map(|index| index.columns.into_iter().next())
            .collect())
    }

    /// The schema a client writes rows against: everything but the primary key.
    pub fn user_facing_schema(schema: &TableSchema) -> TableSchema {
        schema.without_primary_key()
    }
}
