//! Runtime-defined relational tables.
//!
//! Provides the managed-table naming convention, schema translation between
//! column specs and store metadata, row validation, an in-memory store and
//! snapshot persistence.

pub mod config;
pub mod error;
pub mod manager;
pub mod naming;
pub mod persistence;
pub mod store;
pub mod table;
pub mod value;

pub use manager::TableManager;
pub use value::{Row, Value};
