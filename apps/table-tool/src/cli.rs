use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Data directory holding the snapshot
    #[arg(long, default_value = "./data", global = true)]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the demo `people` and `cars` tables
    Setup,

    /// Insert pseudo-random rows into `people` and `cars`
    Seed {
        /// Rows to insert per table
        #[arg(short, long, default_value_t = 10)]
        count: usize,

        /// Seed for the random generator
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
    },

    /// List managed tables with their row counts
    List,

    /// Print the schema of a table
    Describe {
        /// Table name
        table: String,
    },

    /// Drop a table with all of its rows
    Drop {
        /// Table name
        table: String,
    },
}
