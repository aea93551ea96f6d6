//! Axum-based HTTP server for the rover's local API.
//!
//! Provides REST endpoints for:
//! - POST `/api/v1/sendcommand` - Execute a motor command
//! - GET `/api/v1/events` - Sensor event stream (SSE)
//! - GET `/api/v1/blockdiagrams` - List saved block diagrams
//! - POST `/api/v1/blockdiagrams` - Save a block diagram
//! - GET `/api/v1/blockdiagrams/{id}` - Fetch a block diagram
//! - GET `/api/v1/download/{id}` - Download a stored diagram file
//! - POST `/api/v1/upload` - Upload a previously exported diagram

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::Stream;
use tokio::sync::{broadcast, watch};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::WebConfig;
use crate::messages::CommandMessage;
use crate::storage::{BlockDiagram, StorageError};
use crate::traits::PwmController;

use super::api::{ApiResponse, DiagramList, SavedDiagram, UploadRequest};
use super::shared::AppState;

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /api/v1/sendcommand - Execute a motor command
///
/// Accepts JSON: `{"command": "START_MOTOR", "pin": 9, "speed": 50.0}`
/// The command is echoed back whether or not it was recognized; unknown
/// commands are dropped server-side.
async fn send_command<P: PwmController + Send + Sync + 'static>(
    State(state): State<AppState<P>>,
    Json(message): Json<CommandMessage>,
) -> Json<ApiResponse<CommandMessage>> {
    state.dispatcher().dispatch(&message);
    Json(ApiResponse::ok(message))
}

/// GET /api/v1/events - Sensor event stream
///
/// Server-sent events named `binary_sensors`, one per sensor edge. Slow
/// consumers that lag the broadcast bus miss events rather than stalling
/// the poller.
async fn sensor_events<P: PwmController + Send + Sync + 'static>(
    State(state): State<AppState<P>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.subscribe();
    let stream = futures::stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    match Event::default().event("binary_sensors").json_data(&event) {
                        Ok(sse) => return Some((Ok(sse), receiver)),
                        Err(_) => continue,
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// GET /api/v1/blockdiagrams - List saved designs
async fn list_diagrams<P: PwmController + Send + Sync + 'static>(
    State(state): State<AppState<P>>,
) -> Response {
    match state.store().list() {
        Ok(result) => Json(ApiResponse::ok(DiagramList { result })).into_response(),
        Err(err) => storage_error(err),
    }
}

/// POST /api/v1/blockdiagrams - Save a design
///
/// Accepts JSON: `{"designName": "patrol", "bdString": "..."}`
async fn save_diagram<P: PwmController + Send + Sync + 'static>(
    State(state): State<AppState<P>>,
    Json(diagram): Json<BlockDiagram>,
) -> Response {
    match state.store().save(&diagram.design_name, &diagram.bd_string) {
        Ok(design_name) => Json(ApiResponse::ok(SavedDiagram { design_name })).into_response(),
        Err(err) => storage_error(err),
    }
}

/// GET /api/v1/blockdiagrams/{id} - Fetch the first design matching `id`
async fn get_diagram<P: PwmController + Send + Sync + 'static>(
    State(state): State<AppState<P>>,
    Path(id): Path<String>,
) -> Response {
    match state.store().get(&id) {
        Ok(diagram) => Json(ApiResponse::ok(diagram)).into_response(),
        Err(err) => storage_error(err),
    }
}

/// GET /api/v1/download/{id} - Download a stored diagram file verbatim
async fn download_diagram<P: PwmController + Send + Sync + 'static>(
    State(state): State<AppState<P>>,
    Path(id): Path<String>,
) -> Response {
    match state.store().download(&id) {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "application/json".to_owned()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{id}\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(err) => storage_error(err),
    }
}

/// POST /api/v1/upload - Store an exported diagram, uniquifying its name
async fn upload_diagram<P: PwmController + Send + Sync + 'static>(
    State(state): State<AppState<P>>,
    Json(request): Json<UploadRequest>,
) -> Response {
    match state
        .store()
        .upload(&request.file_name, request.contents.as_bytes())
    {
        Ok(design_name) => Json(ApiResponse::ok(SavedDiagram { design_name })).into_response(),
        Err(err) => storage_error(err),
    }
}

/// Fallback handler for 404
async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::err("Not found")),
    )
}

fn storage_error(err: StorageError) -> Response {
    let status = match err {
        StorageError::NotFound(_) => StatusCode::NOT_FOUND,
        StorageError::Malformed(_) => StatusCode::BAD_REQUEST,
        StorageError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ApiResponse::<()>::err(err.to_string()))).into_response()
}

// ============================================================================
// Server Builder
// ============================================================================

/// Build the Axum router with all routes
pub fn build_router<P: PwmController + Send + Sync + 'static>(
    state: AppState<P>,
    config: &WebConfig,
) -> Router {
    let mut router = Router::new()
        .route("/api/v1/sendcommand", post(send_command::<P>))
        .route("/api/v1/events", get(sensor_events::<P>))
        .route(
            "/api/v1/blockdiagrams",
            get(list_diagrams::<P>).post(save_diagram::<P>),
        )
        .route("/api/v1/blockdiagrams/:id", get(get_diagram::<P>))
        .route("/api/v1/download/:id", get(download_diagram::<P>))
        .route("/api/v1/upload", post(upload_diagram::<P>))
        .fallback(not_found)
        .with_state(state);

    // Add CORS if requested
    if config.cors_permissive {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}

/// Start the local API server.
///
/// Serves until the stop token flips to `true` or the token's sender is
/// dropped.
pub async fn run_server<P: PwmController + Send + Sync + 'static>(
    state: AppState<P>,
    config: &WebConfig,
    mut stop: watch::Receiver<bool>,
) -> Result<(), std::io::Error> {
    let router = build_router(state, config);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "local api listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = stop.wait_for(|stopped| *stopped).await;
        })
        .await
}
