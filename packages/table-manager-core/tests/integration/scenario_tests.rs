//! End-to-end scenarios over the cars and people tables.

use table_manager_core::store::SchemaStore;
use table_manager_core::table::validation::{CANT_BE_NULL, INVALID_VALUE};
use table_manager_core::table::ColumnSpec;
use table_manager_core::Value;

use super::helpers::{manager_with_tables, row};

#[test]
fn insert_defaults_missing_nullable_columns() {
    let (_store, manager) = manager_with_tables();
    let mut cars = manager.table("cars").unwrap();

    let id = cars
        .insert_row(row([
            ("model", Value::from("BMW X3")),
            ("owner_id", Value::Integer(1)),
            ("is_insured", Value::from(true)),
        ]))
        .unwrap()
        .expect("row should be valid");
    assert_eq!(cars.row_errors(), None);

    let stored = cars.find_by_id(id).unwrap().unwrap();
    assert_eq!(
        stored,
        row([
            ("id", Value::Integer(id)),
            ("model", Value::from("BMW X3")),
            ("owner_id", Value::Integer(1)),
            ("price", Value::Null),
            ("is_insured", Value::from(true)),
        ])
    );
}

#[test]
fn missing_required_column_is_reported_and_not_persisted() {
    let (_store, manager) = manager_with_tables();
    let mut cars = manager.table("cars").unwrap();

    let id = cars
        .insert_row(row([
            ("model", Value::from("Kia Cerato")),
            ("owner_id", Value::Integer(1)),
        ]))
        .unwrap();

    assert_eq!(id, None);
    let errors = cars.row_errors().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors["is_insured"], CANT_BE_NULL);
    assert_eq!(cars.rows_count().unwrap(), 0);
}

#[test]
fn update_changes_only_given_fields() {
    let (_store, manager) = manager_with_tables();
    let mut cars = manager.table("cars").unwrap();
    let id = cars
        .insert_row(row([
            ("model", Value::from("BMW X3")),
            ("owner_id", Value::Integer(1)),
            ("is_insured", Value::from(true)),
        ]))
        .unwrap()
        .unwrap();

    cars.update_row(id, row([("is_insured", Value::from(false))]))
        .unwrap();
    assert_eq!(cars.row_errors(), None);

    let reread = manager.table("cars").unwrap().find_by_id(id).unwrap().unwrap();
    assert_eq!(reread["is_insured"], Value::from(false));
    assert_eq!(reread["model"], Value::from("BMW X3"));
    assert_eq!(reread["id"], Value::Integer(id));
}

#[test]
fn non_numeric_text_for_integer_column() {
    let (_store, manager) = manager_with_tables();
    let mut cars = manager.table("cars").unwrap();

    let id = cars
        .insert_row(row([
            ("model", Value::from("Lada")),
            ("owner_id", Value::from("abc")),
            ("is_insured", Value::from(false)),
        ]))
        .unwrap();

    assert_eq!(id, None);
    let errors = cars.row_errors().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors["owner_id"], INVALID_VALUE);
}

#[test]
fn textual_values_are_narrowed_before_storing() {
    let (_store, manager) = manager_with_tables();
    let mut people = manager.table("people").unwrap();

    let id = people
        .insert_row(row([
            ("name", Value::from("John")),
            ("salary", Value::from("1200.50")),
            ("birthday", Value::from("1990-04-12")),
        ]))
        .unwrap()
        .unwrap();

    let john = people.find_by_id(id).unwrap().unwrap();
    assert_eq!(john["salary"], Value::Float(1200.5));
    assert_eq!(
        john["birthday"],
        Value::Date(chrono_date(1990, 4, 12))
    );
}

#[test]
fn unprefixed_tables_are_never_listed() {
    let (store, manager) = manager_with_tables();
    store
        .create_table("sessions", Default::default())
        .unwrap();
    store
        .create_table("audit_log", Default::default())
        .unwrap();

    let names: Vec<String> = manager.list_tables().unwrap().into_iter().collect();
    assert_eq!(names, vec!["cars".to_string(), "people".to_string()]);
}

#[test]
fn index_fields_report_indexed_columns() {
    let (_store, manager) = manager_with_tables();
    let cars = manager.table("cars").unwrap();
    assert_eq!(cars.index_fields().unwrap(), vec!["owner_id".to_string()]);

    let schema = cars.schema().unwrap();
    assert_eq!(
        schema.names(),
        vec!["id", "model", "owner_id", "price", "is_insured"]
    );
    assert!(schema.get("owner_id").unwrap().indexed);
    assert!(schema.get("id").unwrap().primary_key);
}

#[test]
fn dropped_table_disappears() {
    let (_store, manager) = manager_with_tables();
    let people = manager.table("people").unwrap();
    people.delete().unwrap();

    assert!(!people.exists().unwrap());
    assert!(!manager.list_tables().unwrap().contains("people"));

    people
        .create(&[ColumnSpec::new("nickname", "varchar(32)")])
        .unwrap();
    assert_eq!(people.user_schema().unwrap().names(), vec!["nickname"]);
}

fn chrono_date(year: i32, month: u32, day: u32) -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
