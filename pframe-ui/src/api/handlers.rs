//! HTTP request handlers
//!
//! Implements the REST endpoints for ingestion, queue/history management,
//! settings and the display polling surface. Payload validation that the
//! playlist core does not repeat (non-empty body, image content type)
//! happens here, before the core is called.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use pframe_common::{FramePayload, ImageStub, Settings, SettingsUpdate, StateSnapshot};

use crate::api::{ApiError, AppContext};
use crate::playlist::IngestUpload;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub added: Vec<ImageStub>,
}

#[derive(Debug, Deserialize)]
pub struct QueueOrderRequest {
    pub image_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct QueueInsertRequest {
    pub image_id: Uuid,
    pub index: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct TransformRequest {
    pub offset_x: f64,
    pub offset_y: f64,
}

// ============================================================================
// UI and Health
// ============================================================================

/// GET / - Embedded control UI
pub async fn index() -> Html<&'static str> {
    Html(include_str!("ui.html"))
}

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "pframe-ui".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Playlist State
// ============================================================================

/// GET /api/state - Snapshot of current, queue, history and settings
pub async fn get_state(State(ctx): State<AppContext>) -> Json<StateSnapshot> {
    Json(ctx.manager.snapshot().await)
}

// ============================================================================
// Ingestion
// ============================================================================

/// POST /api/upload - Ingest one or more image files (multipart)
///
/// Each part must be non-empty (400) and carry an `image/*` content type
/// (415); the playlist core does not re-validate payload bytes.
pub async fn upload(
    State(ctx): State<AppContext>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::status(
            StatusCode::BAD_REQUEST,
            format!("malformed multipart body: {}", e),
        )
    })? {
        let filename = field
            .file_name()
            .unwrap_or("upload")
            .to_string();
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_default();
        let data = field.bytes().await.map_err(|e| {
            ApiError::status(
                StatusCode::BAD_REQUEST,
                format!("failed reading {}: {}", filename, e),
            )
        })?;

        if data.is_empty() {
            return Err(ApiError::status(
                StatusCode::BAD_REQUEST,
                format!("{} is empty", filename),
            ));
        }
        if !content_type.starts_with("image/") {
            return Err(ApiError::status(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                format!("{} is not an image", filename),
            ));
        }

        uploads.push(IngestUpload {
            filename,
            content_type,
            data,
        });
    }

    if uploads.is_empty() {
        return Err(ApiError::status(
            StatusCode::BAD_REQUEST,
            "no files supplied",
        ));
    }

    info!("Upload request with {} file(s)", uploads.len());
    let added = ctx.manager.ingest(uploads).await;
    Ok(Json(UploadResponse { added }))
}

// ============================================================================
// Queue Management
// ============================================================================

/// DELETE /api/queue/:image_id - Remove an id from the queue
pub async fn remove_from_queue(
    State(ctx): State<AppContext>,
    Path(image_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ctx.manager.remove_from_queue(image_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/queue/reorder - Replace the queue order
pub async fn reorder_queue(
    State(ctx): State<AppContext>,
    Json(req): Json<QueueOrderRequest>,
) -> Result<StatusCode, ApiError> {
    ctx.manager.reorder_queue(&req.image_ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/queue/insert - Insert a known item into the queue
pub async fn insert_into_queue(
    State(ctx): State<AppContext>,
    Json(req): Json<QueueInsertRequest>,
) -> Result<StatusCode, ApiError> {
    ctx.manager.insert_into_queue(req.image_id, req.index).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// History Management
// ============================================================================

/// POST /api/history/insert - Move a known item into history
pub async fn move_to_history(
    State(ctx): State<AppContext>,
    Json(req): Json<QueueInsertRequest>,
) -> Result<StatusCode, ApiError> {
    ctx.manager.move_to_history(req.image_id, req.index).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Settings
// ============================================================================

/// POST /api/settings - Partial settings update, all-or-nothing
pub async fn update_settings(
    State(ctx): State<AppContext>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<Settings>, ApiError> {
    let settings = ctx.manager.update_settings(&update).await?;
    Ok(Json(settings))
}

// ============================================================================
// Image Bytes and Transforms
// ============================================================================

/// GET /api/images/:image_id - Raw bytes with the stored content type
pub async fn get_image(
    State(ctx): State<AppContext>,
    Path(image_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let item = ctx.manager.image(image_id).await?;
    Ok(([(header::CONTENT_TYPE, item.content_type)], item.data).into_response())
}

/// PUT /api/images/:image_id/transform - Set display offsets
pub async fn update_transform(
    State(ctx): State<AppContext>,
    Path(image_id): Path<Uuid>,
    Json(req): Json<TransformRequest>,
) -> Result<Json<ImageStub>, ApiError> {
    let stub = ctx
        .manager
        .update_transform(image_id, req.offset_x, req.offset_y)
        .await?;
    Ok(Json(stub))
}

// ============================================================================
// Display Polling
// ============================================================================

/// GET /api/frame/current - Frame descriptor for the current item
pub async fn frame_current(
    State(ctx): State<AppContext>,
) -> Result<Json<FramePayload>, ApiError> {
    Ok(Json(ctx.manager.current_frame().await?))
}

/// POST /api/frame/advance - Rotate and return the new frame descriptor
pub async fn frame_advance(
    State(ctx): State<AppContext>,
) -> Result<Json<FramePayload>, ApiError> {
    Ok(Json(ctx.manager.advance_frame().await?))
}
