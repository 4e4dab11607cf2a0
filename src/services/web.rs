//! Axum-based HTTP server for the panel API.
//!
//! Provides REST endpoints for:
//! - GET `/api/pins` - Board pins with candidates and visual class
//! - GET `/api/pins/:id` - Open a pin for editing
//! - POST `/api/pins/:id` - Save a pin configuration
//! - POST `/api/pins/:id/state` - Drive a GPIO output
//! - POST `/api/reset` - Clear every configuration
//! - GET `/api/dashboard` - Active assignments
//! - GET `/api/status` - Connection state and channel counters

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::config::WebConfig;
use crate::dashboard::DashboardEntry;
use crate::error::PanelError;
use crate::panel::PanelStatus;
use crate::store::EditSession;
use crate::traits::DeviceTransport;

use super::api::{
    ApiResponse, CommandResponse, CommitRequest, CommitResponse, PinStateRequest, PinSummary,
};
use super::shared::SharedPanel;

type ApiResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<T>>)>;

fn failure<T>(err: PanelError) -> (StatusCode, Json<ApiResponse<T>>) {
    let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(ApiResponse::err(err.to_string())))
}

fn bad_request<T>(message: &str) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::BAD_REQUEST, Json(ApiResponse::err(message)))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /api/pins - Every catalog pin
async fn list_pins<T: DeviceTransport + Send + 'static>(
    State(state): State<Arc<SharedPanel<T>>>,
) -> ApiResult<Vec<PinSummary>> {
    state.with_panel(|panel| {
        let store = panel.store();
        store
            .catalog()
            .iter()
            .map(|pin| {
                store
                    .visual_class(pin.id)
                    .map(|class| PinSummary::new(pin, class))
            })
            .collect::<Result<Vec<_>, PanelError>>()
            .map(|pins| Json(ApiResponse::ok(pins)))
            .map_err(failure)
    })
}

/// GET /api/pins/:id - Begin editing a pin
async fn begin_edit<T: DeviceTransport + Send + 'static>(
    State(state): State<Arc<SharedPanel<T>>>,
    Path(pin_id): Path<String>,
) -> ApiResult<EditSession> {
    state
        .with_panel(|panel| panel.begin_edit(&pin_id))
        .map(|session| Json(ApiResponse::ok(session)))
        .map_err(failure)
}

/// POST /api/pins/:id - Save a configuration
///
/// Accepts JSON: `{"function": "GPIO", "direction": "Output"}`
async fn commit_pin<T: DeviceTransport + Send + 'static>(
    State(state): State<Arc<SharedPanel<T>>>,
    Path(pin_id): Path<String>,
    body: Bytes,
) -> ApiResult<CommitResponse> {
    let request: CommitRequest = serde_json::from_slice(&body)
        .map_err(|_| bad_request::<CommitResponse>("Invalid configuration request"))?;

    let outcome = state
        .with_panel(|panel| panel.commit(&pin_id, &request.function, request.intent))
        .map_err(failure::<CommitResponse>)?;

    Ok(Json(ApiResponse::ok(CommitResponse {
        config: outcome.config,
        command: outcome.delivery.into(),
    })))
}

/// POST /api/pins/:id/state - Drive a GPIO output
///
/// Accepts JSON: `{"value": 1}`
async fn set_pin_state<T: DeviceTransport + Send + 'static>(
    State(state): State<Arc<SharedPanel<T>>>,
    Path(pin_id): Path<String>,
    body: Bytes,
) -> ApiResult<CommandResponse> {
    let request: PinStateRequest = serde_json::from_slice(&body)
        .map_err(|_| bad_request::<CommandResponse>("Invalid state request"))?;

    state
        .with_panel(|panel| panel.set_pin_state(&pin_id, request.value))
        .map(|outcome| Json(ApiResponse::ok(outcome.into())))
        .map_err(failure)
}

/// POST /api/reset - Clear every pin
async fn reset<T: DeviceTransport + Send + 'static>(
    State(state): State<Arc<SharedPanel<T>>>,
) -> Json<ApiResponse<CommandResponse>> {
    let outcome = state.with_panel(|panel| panel.reset());
    Json(ApiResponse::ok(outcome.into()))
}

/// GET /api/dashboard - Active assignments
async fn dashboard<T: DeviceTransport + Send + 'static>(
    State(state): State<Arc<SharedPanel<T>>>,
) -> Json<ApiResponse<Vec<DashboardEntry>>> {
    Json(ApiResponse::ok(state.dashboard()))
}

/// GET /api/status - Connection summary
async fn status<T: DeviceTransport + Send + 'static>(
    State(state): State<Arc<SharedPanel<T>>>,
) -> Json<ApiResponse<PanelStatus>> {
    Json(ApiResponse::ok(state.status()))
}

/// Fallback handler for 404
async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::err("Not found")),
    )
}

// ============================================================================
// Server Builder
// ============================================================================

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebServerConfig {
    /// Address to bind to
    pub addr: SocketAddr,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self::from_config(&WebConfig::default())
    }
}

impl WebServerConfig {
    /// Create from shared WebConfig
    pub fn from_config(config: &WebConfig) -> Self {
        Self {
            addr: ([0, 0, 0, 0], config.port).into(),
            cors_permissive: config.cors_permissive,
        }
    }
}

/// Build the Axum router with all routes
pub fn build_router<T: DeviceTransport + Send + 'static>(
    state: Arc<SharedPanel<T>>,
    config: &WebServerConfig,
) -> Router {
    let mut router = Router::new()
        .route("/api/pins", get(list_pins::<T>))
        .route("/api/pins/:id", get(begin_edit::<T>).post(commit_pin::<T>))
        .route("/api/pins/:id/state", post(set_pin_state::<T>))
        .route("/api/reset", post(reset::<T>))
        .route("/api/dashboard", get(dashboard::<T>))
        .route("/api/status", get(status::<T>))
        .fallback(not_found)
        .with_state(state);

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

/// Start the web server with shared state
///
/// Runs until the listener fails. Share `state` with a
/// [`SyncRunner`](super::SyncRunner) so device traffic is processed.
pub async fn run_server_with_state<T: DeviceTransport + Send + 'static>(
    state: Arc<SharedPanel<T>>,
    config: WebServerConfig,
) -> Result<(), std::io::Error> {
    let router = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!("Web server listening on http://{}", config.addr);

    axum::serve(listener, router).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_from_web_config() {
        let web = WebConfig::default().with_port(3000).with_cors(false);
        let config = WebServerConfig::from_config(&web);
        assert_eq!(config.addr, SocketAddr::from(([0, 0, 0, 0], 3000)));
        assert!(!config.cors_permissive);

        let defaults = WebServerConfig::default();
        assert_eq!(defaults.addr.port(), 8080);
        assert!(defaults.cors_permissive);
    }
}
