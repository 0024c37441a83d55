//! Enumeration of managed tables.

use std::collections::BTreeSet;

use crate::error::DbError;
use crate::naming;
use crate::store::SchemaStore;

/// Lists the managed tables of a store.
#[derive(Clone, Copy)]
pub struct TableRegistry<'a> {
    store: &'a dyn SchemaStore,
}

impl<'a> TableRegistry<'a> {
    pub fn new(store: &'a dyn SchemaStore) -> Self {
        Self { store }
    }

    /// Returns the user-facing names of every managed table.
    ///
    /// Store tables without the reserved prefix are skipped.
    pub fn list_managed_names(&self) -> Result<BTreeSet<String>, DbError> {
        Ok(self
            .store
            .list_table_names()?
            .iter()
            .filter_map(|storage_name| naming::decode(storage_name))
            .map(str::to_string)
            .collect())
    }

    /// Returns true if a managed table called `name` exists.
    pub fn exists(&self, name: &str) -> Result<bool, DbError> {
        Ok(self.list_managed_names()?.contains(name))
    }
}
