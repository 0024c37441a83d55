//! Snapshot persistence across simulated restarts.

use std::sync::Arc;

use ntest::timeout;
use tempfile::tempdir;

use table_manager_core::config::ManagerConfig;
use table_manager_core::persistence::{PersistenceManager, SNAPSHOT_FILE};
use table_manager_core::{TableManager, Value};

use super::helpers::{cars_columns, row};

#[timeout(2000)]
#[test]
fn tables_and_rows_survive_restart() {
    let temp_dir = tempdir().unwrap();
    let config = ManagerConfig {
        data_dir: temp_dir.path().to_path_buf(),
        ..Default::default()
    };

    {
        let persistence = PersistenceManager::new(&config);
        let store = Arc::new(persistence.load().unwrap());
        let manager = TableManager::new(store.clone());

        let mut cars = manager.table("cars").unwrap();
        cars.create(&cars_columns()).unwrap();
        for model in ["BMW X3", "Audi A4"] {
            cars.insert_row(row([
                ("model", Value::from(model)),
                ("is_insured", Value::from(true)),
            ]))
            .unwrap()
            .unwrap();
        }

        assert!(persistence.flush_if_dirty(&store).unwrap());
    }

    assert!(temp_dir.path().join(SNAPSHOT_FILE).exists());

    let persistence = PersistenceManager::new(&config);
    let store = Arc::new(persistence.load().unwrap());
    assert!(!persistence.flush_if_dirty(&store).unwrap());

    let manager = TableManager::new(store.clone());
    let mut cars = manager.table("cars").unwrap();
    assert_eq!(cars.rows_count().unwrap(), 2);
    assert_eq!(cars.index_fields().unwrap(), vec!["owner_id".to_string()]);

    let id = cars
        .insert_row(row([
            ("model", Value::from("Kia Cerato")),
            ("is_insured", Value::from(false)),
        ]))
        .unwrap();
    assert_eq!(id, Some(3));
    assert!(persistence.flush_if_dirty(&store).unwrap());
}

#[timeout(2000)]
#[test]
fn rejected_rows_do_not_dirty_the_store() {
    let temp_dir = tempdir().unwrap();
    let config = ManagerConfig {
        data_dir: temp_dir.path().to_path_buf(),
        ..Default::default()
    };
    let persistence = PersistenceManager::new(&config);
    let store = Arc::new(persistence.load().unwrap());
    let manager = TableManager::new(store.clone());

    manager.table("cars").unwrap().create(&cars_columns()).unwrap();
    persistence.save(&store).unwrap();

    let mut cars = manager.table("cars").unwrap();
    let id = cars
        .insert_row(row([("model", Value::from("Kia Cerato"))]))
        .unwrap();
    assert_eq!(id, None);
    assert!(!persistence.flush_if_dirty(&store).unwrap());
}
