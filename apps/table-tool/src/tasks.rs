//! Demo tables and row generation.

use anyhow::{bail, Context};
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use table_manager_core::table::ColumnSpec;
use table_manager_core::{Row, TableManager, Value};

const FIRST_NAMES: &[&str] = &["John", "Mary", "Anna", "Peter", "Olga", "Ivan", "Kate"];
const LAST_NAMES: &[&str] = &["Smith", "Brown", "Petrov", "Novak", "Kowalski"];
const MODELS: &[&str] = &["BMW X3", "Kia Cerato", "Audi A4", "Lada Vesta", "Skoda Octavia"];

pub fn people_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("name", "varchar(255)").not_null(),
        ColumnSpec::new("salary", "double precision"),
        ColumnSpec::new("birthday", "date").not_null(),
    ]
}

pub fn cars_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("model", "varchar(255)").not_null(),
        ColumnSpec::new("owner_id", "integer").indexed(),
        ColumnSpec::new("price", "double precision"),
        ColumnSpec::new("is_insured", "boolean").not_null(),
    ]
}

/// Creates `people` and `cars`, skipping tables that already exist.
///
/// Returns the names of the tables created.
pub fn setup(manager: &TableManager) -> anyhow::Result<Vec<&'static str>> {
    let mut created = Vec::new();
    for (name, columns) in [("people", people_columns()), ("cars", cars_columns())] {
        let table = manager.table(name)?;
        if table.exists()? {
            tracing::info!("Table '{}' already exists, skipping", name);
            continue;
        }
        table.create(&columns)?;
        created.push(name);
    }
    Ok(created)
}

/// Inserts `count` people and `count` cars owned by them.
///
/// Rows go through validation, so dates and numbers are generated in the
/// textual form a client would send.
pub fn seed(manager: &TableManager, count: usize, seed: u64) -> anyhow::Result<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut people = manager.table("people")?;
    let mut cars = manager.table("cars")?;
    if !people.exists()? || !cars.exists()? {
        bail!("Run `setup` before seeding");
    }

    let epoch = NaiveDate::from_ymd_opt(1950, 1, 1).context("Invalid base date")?;
    let mut inserted = 0;

    for _ in 0..count {
        let name = format!(
            "{} {}",
            FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())],
            LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())]
        );
        let birthday = epoch + Duration::days(rng.gen_range(0..20_000));
        let salary = if rng.gen_bool(0.8) {
            Value::Text(format!("{:.2}", rng.gen_range(1_000.0..10_000.0_f64)))
        } else {
            Value::Null
        };

        let person: Row = [
            ("name".to_string(), Value::Text(name)),
            ("salary".to_string(), salary),
            (
                "birthday".to_string(),
                Value::Text(birthday.format("%Y-%m-%d").to_string()),
            ),
        ]
        .into();
        let Some(owner_id) = people.insert_row(person)? else {
            bail!("Generated person rejected: {:?}", people.row_errors());
        };

        let car: Row = [
            (
                "model".to_string(),
                Value::from(MODELS[rng.gen_range(0..MODELS.len())]),
            ),
            ("owner_id".to_string(), Value::Text(owner_id.to_string())),
            (
                "price".to_string(),
                Value::Float((rng.gen_range(5_000.0..80_000.0_f64) * 100.0).round() / 100.0),
            ),
            ("is_insured".to_string(), Value::Boolean(rng.gen_bool(0.5))),
        ]
        .into();
        if cars.insert_row(car)?.is_none() {
            bail!("Generated car rejected: {:?}", cars.row_errors());
        }
        inserted += 2;
    }

    tracing::debug!("Seeded {} rows with seed {}", inserted, seed);
    Ok(inserted)
}
