//! JSON API over managed tables.
//!
//! Provides HTTP endpoints for table definition, introspection and row
//! CRUD, plus request routing and the hyper server.

pub mod handlers;
pub mod router;
pub mod server;
