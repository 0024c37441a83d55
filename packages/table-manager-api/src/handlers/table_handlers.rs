//! Table definition and introspection handlers.

use hyper::{body::Bytes, Request, Response};
use serde_json::json;

use crate::router::{AppState, RouterError};
use table_manager_core::table::TableHandle;

use super::request_utils::{
    build_empty_response, json_response, map_db_error_to_router_error, parse_json, path_param,
    CreateTableRequest, MatchitParams,
};
use super::response::success_response;

/// Opens the table named by the `table` route parameter, failing with 404
/// when it doesn't exist.
pub(crate) fn existing_table(
    params: &MatchitParams<'_, '_>,
    state: &AppState,
) -> Result<TableHandle, RouterError> {
    let name = path_param(params, "table")?;
    let not_found = || RouterError::NotFound(format!("Table '{}' not found", name));

    let handle = state.manager.table(&name).map_err(|_| not_found())?;
    if !handle.exists().map_err(map_db_error_to_router_error)? {
        return Err(not_found());
    }
    Ok(handle)
}

/// Lists managed tables.
///
/// # Endpoint
/// `GET /api/tables`
///
/// # Response
/// - **200 OK**: `{"tables": ["cars", "people"]}`
pub fn list_tables(state: &AppState) -> Result<Response<Bytes>, RouterError> {
    let tables = state
        .manager
        .list_tables()
        .map_err(map_db_error_to_router_error)?;
    json_response(200, &success_response(json!({ "tables": tables })))
}

/// Creates a managed table.
///
/// # Endpoint
/// `POST /api/tables`
///
/// # Request Body
/// ```json
/// {
///   "table": {
///     "name": "cars",
///     "fields": [
///       {"name": "model", "type": "varchar(255)", "null": false},
///       {"name": "owner_id", "type": "integer", "index": true},
///       {"name": "is_insured", "type": "boolean", "null": false, "default": false}
///     ]
///   }
/// }
/// ```
///
/// # Response
/// - **201 Created**: `{"table": "cars"}`
///
/// # Errors
/// - **400 Bad Request**: Malformed body, invalid table name or duplicate field
/// - **409 Conflict**: Table already exists
pub fn create_table(req: &Request<Bytes>, state: &AppState) -> Result<Response<Bytes>, RouterError> {
    let request: CreateTableRequest = parse_json(req.body())?;
    let specs = request
        .table
        .fields
        .into_iter()
        .map(|field| field.into_spec())
        .collect::<Result<Vec<_>, _>>()
        .map_err(map_db_error_to_router_error)?;

    let handle = state
        .manager
        .table(&request.table.name)
        .map_err(map_db_error_to_router_error)?;
    handle.create(&specs).map_err(map_db_error_to_router_error)?;

    json_response(201, &success_response(json!({ "table": handle.name() })))
}

/// Describes a table.
///
/// # Endpoint
/// `GET /api/tables/{table}/spec`
///
/// # Response
/// - **200 OK**: `{"table": {"name": "cars", "schema": [{"name": "id", "type": "integer", ...}]}}`
pub fn table_spec(
    params: &MatchitParams<'_, '_>,
    state: &AppState,
) -> Result<Response<Bytes>, RouterError> {
    let handle = existing_table(params, state)?;
    let schema = handle.schema().map_err(map_db_error_to_router_error)?;

    json_response(
        200,
        &success_response(json!({
            "table": { "name": handle.name(), "schema": schema }
        })),
    )
}

/// Drops a table with all of its rows.
///
/// # Endpoint
/// `DELETE /api/tables/{table}`
///
/// # Response
/// - **204 No Content**
pub fn delete_table(
    params: &MatchitParams<'_, '_>,
    state: &AppState,
) -> Result<Response<Bytes>, RouterError> {
    let handle = existing_table(params, state)?;
    handle.delete().map_err(map_db_error_to_router_error)?;
    build_empty_response(204)
}
