//! Row CRUD handlers.

use hyper::{body::Bytes, Request, Response};
use serde_json::json;

use crate::router::{AppState, RouterError};
use table_manager_core::table::TableHandle;
use table_manager_core::value::{row_from_json, row_to_json};

use super::request_utils::{
    build_empty_response, json_response, map_db_error_to_router_error, parse_json,
    parse_query_params, parse_row_id, path_param, MatchitParams, RowRequest,
};
use super::response::{success_response, validation_error_response};
use super::table_handlers::existing_table;

fn existing_row(
    handle: &TableHandle,
    params: &MatchitParams<'_, '_>,
) -> Result<(i64, serde_json::Value), RouterError> {
    let id = parse_row_id(&path_param(params, "row_id")?)?;
    match handle.find_by_id(id).map_err(map_db_error_to_router_error)? {
        Some(row) => Ok((id, row_to_json(&row))),
        None => Err(RouterError::NotFound(format!(
            "Row {} not found in '{}'",
            id,
            handle.name()
        ))),
    }
}

fn rejected(handle: &TableHandle) -> Result<Option<Response<Bytes>>, RouterError> {
    match handle.row_errors() {
        Some(errors) => json_response(200, &validation_error_response(errors)).map(Some),
        None => Ok(None),
    }
}

/// Lists rows of a table.
///
/// # Endpoint
/// `GET /api/tables/{table}?limit=10&offset=20`
///
/// # Response
/// - **200 OK**: `{"rows": [...], "total": 42}`
pub fn list_rows(
    req: &Request<Bytes>,
    params: &MatchitParams<'_, '_>,
    state: &AppState,
) -> Result<Response<Bytes>, RouterError> {
    let handle = existing_table(params, state)?;
    let page = parse_query_params(req.uri().query())?;
    let limit = page.limit.or(state.config.default_page_limit);

    let rows = handle
        .rows(limit, page.offset)
        .map_err(map_db_error_to_router_error)?;
    let total = handle.rows_count().map_err(map_db_error_to_router_error)?;
    let rows: Vec<_> = rows.iter().map(row_to_json).collect();

    json_response(200, &success_response(json!({ "rows": rows, "total": total })))
}

/// Inserts a row.
///
/// # Endpoint
/// `POST /api/tables/{table}`
///
/// # Request Body
/// ```json
/// {"row": {"model": "BMW X3", "owner_id": 1, "is_insured": true}}
/// ```
///
/// # Response
/// - **201 Created**: `{"row": {"id": 1, ...}}`
/// - **200 OK**: `{"success": false, "errors": {"is_insured": "can't be null"}}`
///   when the row is rejected
pub fn create_row(
    req: &Request<Bytes>,
    params: &MatchitParams<'_, '_>,
    state: &AppState,
) -> Result<Response<Bytes>, RouterError> {
    let mut handle = existing_table(params, state)?;
    let request: RowRequest = parse_json(req.body())?;
    let row = row_from_json(request.row).map_err(map_db_error_to_router_error)?;

    let Some(id) = handle.insert_row(row).map_err(map_db_error_to_router_error)? else {
        return rejected(&handle)?.ok_or_else(|| {
            RouterError::InternalError("Row rejected without errors".to_string())
        });
    };

    let row = handle
        .find_by_id(id)
        .map_err(map_db_error_to_router_error)?
        .ok_or_else(|| RouterError::InternalError(format!("Inserted row {} vanished", id)))?;
    json_response(201, &success_response(json!({ "row": row_to_json(&row) })))
}

/// Reads one row.
///
/// # Endpoint
/// `GET /api/tables/{table}/{row_id}`
pub fn read_row(
    params: &MatchitParams<'_, '_>,
    state: &AppState,
) -> Result<Response<Bytes>, RouterError> {
    let handle = existing_table(params, state)?;
    let (_, row) = existing_row(&handle, params)?;
    json_response(200, &success_response(json!({ "row": row })))
}

/// Updates the given fields of one row. `id` can't be changed.
///
/// # Endpoint
/// `PATCH /api/tables/{table}/{row_id}`
///
/// # Request Body
/// ```json
/// {"row": {"is_insured": false}}
/// ```
///
/// # Response
/// - **200 OK**: `{"row": {...}}` with the stored values
/// - **200 OK**: `{"success": false, "errors": {...}}` when the update is rejected
pub fn update_row(
    req: &Request<Bytes>,
    params: &MatchitParams<'_, '_>,
    state: &AppState,
) -> Result<Response<Bytes>, RouterError> {
    let mut handle = existing_table(params, state)?;
    let (id, _) = existing_row(&handle, params)?;
    let request: RowRequest = parse_json(req.body())?;
    let changes = row_from_json(request.row).map_err(map_db_error_to_router_error)?;

    handle
        .update_row(id, changes)
        .map_err(map_db_error_to_router_error)?;
    if let Some(response) = rejected(&handle)? {
        return Ok(response);
    }

    let (_, row) = existing_row(&handle, params)?;
    json_response(200, &success_response(json!({ "row": row })))
}

/// Deletes one row.
///
/// # Endpoint
/// `DELETE /api/tables/{table}/{row_id}`
///
/// # Response
/// - **204 No Content**
pub fn delete_row(
    params: &MatchitParams<'_, '_>,
    state: &AppState,
) -> Result<Response<Bytes>, RouterError> {
    let handle = existing_table(params, state)?;
    let (id, _) = existing_row(&handle, params)?;
    handle.delete_row(id).map_err(map_db_error_to_router_error)?;
    build_empty_response(204)
}
