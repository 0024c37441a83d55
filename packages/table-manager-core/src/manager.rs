//! Composition root for table access.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::DbError;
use crate::store::SchemaStore;
use crate::table::{TableHandle, TableRegistry};

/// Hands out table handles over one shared store.
#[derive(Debug, Clone)]
pub struct TableManager {
    store: Arc<dyn SchemaStore>,
}

impl TableManager {
    pub fn new(store: Arc<dyn SchemaStore>) -> Self {
        Self { store }
    }

    /// Opens a handle for `name` without checking that the table exists.
    pub fn table(&self, name: &str) -> Result<TableHandle, DbError> {
        TableHandle::new(name, Arc::clone(&self.store))
    }

    pub fn registry(&self) -> TableRegistry<'_> {
        TableRegistry::new(self.store.as_ref())
    }

    /// User-facing names of all managed tables.
    pub fn list_tables(&self) -> Result<BTreeSet<String>, DbError> {
        self.registry().list_managed_names()
    }

    pub fn store(&self) -> &Arc<dyn SchemaStore> {
        &self.store
    }
}
