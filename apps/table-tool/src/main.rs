//! CLI tool for creating, seeding and inspecting managed tables.
//!
//! Works directly on the snapshot in `--data-dir`; don't run it against a
//! directory a live server is flushing to.

mod cli;
mod tasks;

use std::sync::Arc;

use anyhow::bail;
use clap::Parser;
use table_manager_core::{config::ManagerConfig, persistence::PersistenceManager, TableManager};

use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt::init();

    let config = ManagerConfig {
        data_dir: cli.data_dir,
        ..Default::default()
    };
    let persistence = PersistenceManager::new(&config);
    let store = Arc::new(persistence.load()?);
    let manager = TableManager::new(store.clone());

    match cli.command {
        Commands::Setup => {
            let created = tasks::setup(&manager)?;
            println!("Created {} tables: {}", created.len(), created.join(", "));
        }
        Commands::Seed { count, seed } => {
            let inserted = tasks::seed(&manager, count, seed)?;
            println!("Inserted {} rows", inserted);
        }
        Commands::List => {
            for name in manager.list_tables()? {
                let rows = manager.table(&name)?.rows_count()?;
                println!("{:<24} {:>8} rows", name, rows);
            }
        }
        Commands::Describe { table } => {
            let handle = manager.table(&table)?;
            if !handle.exists()? {
                bail!("Table '{}' not found", table);
            }
            println!("{}", table);
            for column in handle.schema()?.iter() {
                let mut flags = Vec::new();
                if column.primary_key {
                    flags.push("primary key".to_string());
                }
                if !column.nullable {
                    flags.push("not null".to_string());
                }
                if let Some(default) = column.default.as_ref().filter(|d| !d.is_null()) {
                    flags.push(format!("default {}", default));
                }
                if column.indexed {
                    flags.push("indexed".to_string());
                }
                println!(
                    "  {:<20} {:<20} {}",
                    column.name,
                    column.declared_type,
                    flags.join(", ")
                );
            }
        }
        Commands::Drop { table } => {
            let handle = manager.table(&table)?;
            if !handle.exists()? {
                bail!("Table '{}' not found", table);
            }
            handle.delete()?;
            println!("Dropped {}", table);
        }
    }

    if persistence.flush_if_dirty(&store)? {
        tracing::info!("Snapshot written to {}", persistence.snapshot_path().display());
    }
    Ok(())
}
