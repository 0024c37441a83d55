//! Request parsing and response building shared by the handlers.

use http_body_util::BodyExt;
use hyper::body::{Body, Bytes};
use hyper::Response;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use tokio::time;

use crate::router::RouterError;
use table_manager_core::error::DbError;
use table_manager_core::table::ColumnSpec;
use table_manager_core::Value;

/// Type alias for matchit parameters with explicit lifetimes
pub type MatchitParams<'a, 'b> = matchit::Params<'a, 'b>;

/// Reads a whole request body, failing with [`RouterError::Timeout`] once
/// `timeout_ms` has passed.
pub async fn read_body_with_timeout<B>(body: B, timeout_ms: u64) -> Result<Bytes, RouterError>
where
    B: Body<Data = Bytes>,
    B::Error: std::fmt::Display,
{
    let timeout_duration = time::Duration::from_millis(timeout_ms);
    let collected = time::timeout(timeout_duration, body.collect())
        .await
        .map_err(|_| RouterError::Timeout)?
        .map_err(|e| RouterError::InternalError(format!("Failed to read request body: {}", e)))?;
    Ok(collected.to_bytes())
}

/// Map DbError to appropriate RouterError
pub fn map_db_error_to_router_error(e: DbError) -> RouterError {
    match e {
        DbError::TableNotFound { .. } => RouterError::NotFound(e.to_string()),
        DbError::TableAlreadyExists(_) => RouterError::Conflict(e.to_string()),
        DbError::InvalidTableName(_)
        | DbError::ColumnNotFound { .. }
        | DbError::DuplicateColumn { .. }
        | DbError::NotNullViolation { .. }
        | DbError::UniqueViolation { .. }
        | DbError::UnsupportedValue { .. } => RouterError::BadRequest(e.to_string()),
        _ => {
            tracing::error!("Request failed: {}", e);
            RouterError::InternalError(e.to_string())
        }
    }
}

/// Returns a percent-decoded route parameter.
pub fn path_param(params: &MatchitParams<'_, '_>, name: &str) -> Result<String, RouterError> {
    let raw = params
        .get(name)
        .ok_or_else(|| RouterError::BadRequest(format!("Missing path parameter '{}'", name)))?;
    Ok(percent_decode_str(raw).decode_utf8_lossy().into_owned())
}

pub fn parse_row_id(raw: &str) -> Result<i64, RouterError> {
    raw.parse()
        .map_err(|_| RouterError::BadRequest(format!("Invalid row id '{}'", raw)))
}

/// Parses a JSON request body.
pub fn parse_json<'a, T: Deserialize<'a>>(body: &'a Bytes) -> Result<T, RouterError> {
    serde_json::from_slice(body)
        .map_err(|e| RouterError::BadRequest(format!("Failed to parse request: {}", e)))
}

/// Pagination taken from the query string.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Parse `limit` and `offset` from a URL query string. Other keys are ignored.
pub fn parse_query_params(query_str: Option<&str>) -> Result<PageParams, RouterError> {
    let mut params = PageParams::default();

    let Some(query_str) = query_str else {
        return Ok(params);
    };

    for pair in query_str.split('&') {
        let Some((key, encoded_value)) = pair.split_once('=') else {
            continue;
        };
        let decoded_value = percent_decode_str(encoded_value).decode_utf8_lossy();
        let slot = match key {
            "limit" => &mut params.limit,
            "offset" => &mut params.offset,
            _ => continue,
        };
        *slot = Some(decoded_value.parse().map_err(|e| {
            RouterError::BadRequest(format!("Invalid {} value '{}': {}", key, decoded_value, e))
        })?);
    }

    Ok(params)
}

/// Column definition accepted when creating a table.
#[derive(Debug, Deserialize, Serialize)]
pub struct FieldDefinition {
    pub name: String,
    /// Declared type, e.g. "integer", "varchar(255)", "date"
    pub r#type: String,
    /// Whether the column accepts null
    #[serde(default = "default_true")]
    pub null: bool,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    /// Whether to index the column
    #[serde(default)]
    pub index: bool,
}

fn default_true() -> bool {
    true
}

impl FieldDefinition {
    pub fn into_spec(self) -> Result<ColumnSpec, DbError> {
        let mut spec = ColumnSpec::new(self.name, self.r#type);
        if !self.null {
            spec = spec.not_null();
        }
        if let Some(default) = self.default {
            let value = Value::from_json(&spec.name, default)?;
            spec = spec.default_value(value);
        }
        if self.index {
            spec = spec.indexed();
        }
        Ok(spec)
    }
}

/// Table definition inside [`CreateTableRequest`].
#[derive(Debug, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    pub fields: Vec<FieldDefinition>,
}

/// Body of `POST /api/tables`.
#[derive(Debug, Deserialize)]
pub struct CreateTableRequest {
    pub table: TableDefinition,
}

/// Body of row inserts and updates.
#[derive(Debug, Deserialize)]
pub struct RowRequest {
    pub row: serde_json::Value,
}

/// Helper to build HTTP response with proper error handling
pub fn build_response(status: u16, json: Vec<u8>) -> Result<Response<Bytes>, RouterError> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Bytes::from(json))
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}

/// Serializes `value` and wraps it in a JSON response.
pub fn json_response<T: Serialize>(status: u16, value: &T) -> Result<Response<Bytes>, RouterError> {
    let json = serde_json::to_vec(value)
        .map_err(|e| RouterError::InternalError(format!("Failed to serialize response: {}", e)))?;
    build_response(status, json)
}

/// Helper to build empty HTTP response (for 204 No Content)
pub fn build_empty_response(status: u16) -> Result<Response<Bytes>, RouterError> {
    Response::builder()
        .status(status)
        .body(Bytes::new())
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}
