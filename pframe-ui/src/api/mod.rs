//! REST API for the playlist server
//!
//! Routes mirror the control surface consumed by the browser UI and the
//! polling display client. All handlers funnel into the shared
//! [`StateManager`]; this layer only translates between HTTP and the
//! playlist's error taxonomy.

pub mod handlers;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;

use pframe_common::Error;

use crate::state::StateManager;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub manager: Arc<StateManager>,
}

/// Create the API router
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        // Embedded control UI
        .route("/", get(handlers::index))
        // Health check
        .route("/health", get(handlers::health))
        // Playlist state
        .route("/api/state", get(handlers::get_state))
        // Ingestion
        .route("/api/upload", post(handlers::upload))
        // Queue management
        .route("/api/queue/:image_id", delete(handlers::remove_from_queue))
        .route("/api/queue/reorder", post(handlers::reorder_queue))
        .route("/api/queue/insert", post(handlers::insert_into_queue))
        // History management
        .route("/api/history/insert", post(handlers::move_to_history))
        // Settings
        .route("/api/settings", post(handlers::update_settings))
        // Image bytes and transforms
        .route("/api/images/:image_id", get(handlers::get_image))
        .route(
            "/api/images/:image_id/transform",
            put(handlers::update_transform),
        )
        // Polling endpoints for the display client
        .route("/api/frame/current", get(handlers::frame_current))
        .route("/api/frame/advance", post(handlers::frame_advance))
        .with_state(ctx)
        // Request/response tracing
        .layer(TraceLayer::new_for_http())
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
}

/// Error body returned for every failed request
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// HTTP-facing wrapper mapping the error taxonomy to status codes
///
/// Client-caused kinds (NotFound, InvalidInput, Conflict) are reported
/// verbatim; everything else is logged and surfaced as a 500.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Build an error with an explicit status, for handler-level checks
    /// that precede the playlist core (e.g. upload content-type validation)
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Io(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("Request failed: {}", self.message);
        }
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}
