//! Integration tests for the table manager.
//!
//! - Cars scenarios through the public handle API
//! - Snapshot persistence across restarts
//! - Concurrent handles over one store

pub mod concurrency_tests;
pub mod helpers;
pub mod persistence_tests;
pub mod scenario_tests;
