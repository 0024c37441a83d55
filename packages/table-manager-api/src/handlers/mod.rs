//! HTTP endpoint implementations for table definition and row CRUD.

pub mod request_utils;
pub mod response;
mod row_handlers;
mod table_handlers;

pub use response::{error_response, success_response, ApiError, ApiResponse, ErrorResponse};
pub use row_handlers::{create_row, delete_row, list_rows, read_row, update_row};
pub use table_handlers::{create_table, delete_table, list_tables, table_spec};
