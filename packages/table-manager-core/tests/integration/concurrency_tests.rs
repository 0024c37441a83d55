//! Many handles writing through one shared store.

use std::thread;

use ntest::timeout;

use table_manager_core::Value;

use super::helpers::{manager_with_tables, row};

#[timeout(5000)]
#[test]
fn concurrent_inserts_get_distinct_ids() {
    let (_store, manager) = manager_with_tables();

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let manager = manager.clone();
            thread::spawn(move || {
                let mut ids = Vec::new();
                for n in 0..25 {
                    let mut cars = manager.table("cars").unwrap();
                    let id = cars
                        .insert_row(row([
                            ("model", Value::from(format!("car-{worker}-{n}"))),
                            ("owner_id", Value::Integer(worker)),
                            ("is_insured", Value::from(n % 2 == 0)),
                        ]))
                        .unwrap()
                        .unwrap();
                    ids.push(id);
                }
                ids
            })
        })
        .collect();

    let mut ids: Vec<i64> = workers
        .into_iter()
        .flat_map(|w| w.join().unwrap())
        .collect();
    ids.sort_unstable();
    ids.dedup();

    assert_eq!(ids.len(), 100);
    assert_eq!(manager.table("cars").unwrap().rows_count().unwrap(), 100);
}

#[timeout(5000)]
#[test]
fn row_errors_are_per_handle() {
    let (_store, manager) = manager_with_tables();

    let mut bad = manager.table("cars").unwrap();
    let mut good = manager.table("cars").unwrap();

    bad.insert_row(row([("model", Value::Null)])).unwrap();
    good.insert_row(row([
        ("model", Value::from("Skoda")),
        ("is_insured", Value::from(true)),
    ]))
    .unwrap();

    assert_eq!(bad.row_errors().unwrap().len(), 2);
    assert_eq!(good.row_errors(), None);
}
