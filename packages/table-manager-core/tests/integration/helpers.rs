//! Shared fixtures.

use std::sync::Arc;

use table_manager_core::store::MemoryStore;
use table_manager_core::table::ColumnSpec;
use table_manager_core::{Row, TableManager, Value};

pub fn cars_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("model", "varchar(255)").not_null(),
        ColumnSpec::new("owner_id", "integer").indexed(),
        ColumnSpec::new("price", "double precision"),
        ColumnSpec::new("is_insured", "boolean").not_null(),
    ]
}

pub fn people_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("name", "varchar(255)").not_null(),
        ColumnSpec::new("salary", "double precision"),
        ColumnSpec::new("birthday", "date").not_null(),
    ]
}

/// Manager over a fresh store holding empty `cars` and `people` tables.
pub fn manager_with_tables() -> (Arc<MemoryStore>, TableManager) {
    let store = Arc::new(MemoryStore::new());
    let manager = TableManager::new(store.clone());
    manager.table("cars").unwrap().create(&cars_columns()).unwrap();
    manager
        .table("people")
        .unwrap()
        .create(&people_columns())
        .unwrap();
    (store, manager)
}

pub fn row<const N: usize>(entries: [(&str, Value); N]) -> Row {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
