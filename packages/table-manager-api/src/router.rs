//! Matchit routing configuration.

use std::sync::Arc;

use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use matchit::Router as MatchitRouter;

use crate::handlers::{self, request_utils::read_body_with_timeout};
use table_manager_core::{config::ManagerConfig, TableManager};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Table access over the shared store
    pub manager: TableManager,
    /// Server configuration
    pub config: Arc<ManagerConfig>,
}

/// HTTP request router.
pub struct Router {
    inner: MatchitRouter<RouteHandler>,
    state: AppState,
}

impl Router {
    /// Creates a new router with default routes.
    pub fn new(manager: TableManager, config: Arc<ManagerConfig>) -> Self {
        let mut router = MatchitRouter::new();

        router
            .insert("/api/tables", RouteHandler::Tables)
            .expect("Failed to insert /api/tables route");
        router
            .insert("/api/tables/{table}", RouteHandler::Table)
            .expect("Failed to insert /api/tables/{table} route");
        router
            .insert("/api/tables/{table}/spec", RouteHandler::Spec)
            .expect("Failed to insert /api/tables/{table}/spec route");
        router
            .insert("/api/tables/{table}/{row_id}", RouteHandler::Row)
            .expect("Failed to insert /api/tables/{table}/{row_id} route");

        Self {
            inner: router,
            state: AppState { manager, config },
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Routes an incoming request to the appropriate handler.
    ///
    /// The body is read in full, bounded by the configured request timeout,
    /// before the handler runs.
    pub async fn route<B>(&self, req: Request<B>) -> Result<Response<Bytes>, RouterError>
    where
        B: Body<Data = Bytes>,
        B::Error: std::fmt::Display,
    {
        let (parts, body) = req.into_parts();
        let path = parts.uri.path().to_string();

        let matched = match self.inner.at(&path) {
            Ok(matched) => matched,
            Err(_) => {
                return Err(RouterError::NotFound(format!(
                    "No route found for {}",
                    path
                )))
            }
        };

        let body = read_body_with_timeout(body, self.state.config.request_timeout_ms).await?;
        let req = Request::from_parts(parts, body);

        tracing::debug!("{} {}", req.method(), path);
        matched.value.handle(&req, &matched.params, &self.state)
    }
}

/// Route handler function.
enum RouteHandler {
    Tables,
    Table,
    Spec,
    Row,
}

impl RouteHandler {
    /// Handles a request with the given route parameters.
    fn handle(
        &self,
        req: &Request<Bytes>,
        params: &matchit::Params<'_, '_>,
        state: &AppState,
    ) -> Result<Response<Bytes>, RouterError> {
        let method = req.method();
        match self {
            RouteHandler::Tables => match *method {
                Method::GET => handlers::list_tables(state),
                Method::POST => handlers::create_table(req, state),
                _ => Err(RouterError::MethodNotAllowed),
            },
            RouteHandler::Table => match *method {
                Method::GET => handlers::list_rows(req, params, state),
                Method::POST => handlers::create_row(req, params, state),
                Method::DELETE => handlers::delete_table(params, state),
                _ => Err(RouterError::MethodNotAllowed),
            },
            RouteHandler::Spec => match *method {
                Method::GET => handlers::table_spec(params, state),
                _ => Err(RouterError::MethodNotAllowed),
            },
            RouteHandler::Row => match *method {
                Method::GET => handlers::read_row(params, state),
                Method::PATCH => handlers::update_row(req, params, state),
                Method::DELETE => handlers::delete_row(params, state),
                _ => Err(RouterError::MethodNotAllowed),
            },
        }
    }
}

/// Router error type.
#[derive(Debug, PartialEq)]
pub enum RouterError {
    MethodNotAllowed,
    InternalError(String),
    Timeout,
    BadRequest(String),
    NotFound(String),
    Conflict(String),
}

impl RouterError {
    pub fn status(&self) -> u16 {
        match self {
            RouterError::MethodNotAllowed => 405,
            RouterError::InternalError(_) => 500,
            RouterError::Timeout => 408,
            RouterError::BadRequest(_) => 400,
            RouterError::NotFound(_) => 404,
            RouterError::Conflict(_) => 409,
        }
    }
}

impl std::fmt::Display for RouterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouterError::MethodNotAllowed => write!(f, "Method Not Allowed"),
            RouterError::InternalError(msg) => write!(f, "Internal Error: {}", msg),
            RouterError::Timeout => write!(f, "Request Timeout"),
            RouterError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            RouterError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            RouterError::Conflict(msg) => write!(f, "Conflict: {}", msg),
        }
    }
}

impl std::error::Error for RouterError {}

impl From<RouterError> for Response<Bytes> {
    fn from(err: RouterError) -> Self {
        let status = err.status();
        let message = match &err {
            RouterError::MethodNotAllowed => "Method Not Allowed",
            RouterError::Timeout => "Request Timeout",
            RouterError::InternalError(msg)
            | RouterError::BadRequest(msg)
            | RouterError::NotFound(msg)
            | RouterError::Conflict(msg) => msg.as_str(),
        };

        let error_response = handlers::error_response(status, message.to_string(), None);
        let body = serde_json::to_vec(&error_response)
            .unwrap_or_else(|e| format!("{{\"success\":false,\"error\":{{\"code\":\"500\",\"message\":\"Failed to serialize error: {}\"}}}}", e).into_bytes());

        let mut response = Response::new(Bytes::from(body));
        *response.status_mut() =
            hyper::StatusCode::from_u16(status).unwrap_or(hyper::StatusCode::INTERNAL_SERVER_ERROR);
        response.headers_mut().insert(
            hyper::header::CONTENT_TYPE,
            hyper::header::HeaderValue::from_static("application/json"),
        );
        response
    }
}
