//! HTTP server mode: a thin relay that runs syncs as subprocesses
//!
//! The relay never syncs in-process. Each `POST /sync` spawns the binary
//! itself with the matching `sync` arguments, so a crashing or hanging run
//! cannot take the server down with it, and reports the subprocess outcome
//! as JSON.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::process::Command;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{Error, Result};

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Config file forwarded to sync subprocesses
    pub config_path: Option<PathBuf>,
    /// Database path forwarded to sync subprocesses
    pub db_path: Option<PathBuf>,
}

/// App state shared across handlers
#[derive(Clone)]
struct AppState {
    config: ServerConfig,
}

/// Request body for the sync endpoint
#[derive(Debug, Deserialize)]
struct SyncRequest {
    /// Location code, forwarded as `--location`
    location: String,

    /// First day of the range (ISO date)
    #[serde(default)]
    start: Option<NaiveDate>,

    /// Last day of the range (ISO date)
    #[serde(default)]
    end: Option<NaiveDate>,

    /// Single-day shorthand; wins over start/end when set
    #[serde(default)]
    date: Option<NaiveDate>,
}

/// Response wrapper reporting a subprocess outcome
#[derive(Debug, Serialize)]
struct RelayResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl RelayResponse {
    fn success(message: impl Into<String>, output: String) -> Self {
        Self {
            success: true,
            message: message.into(),
            output: Some(output),
            error: None,
        }
    }

    fn failure(message: impl Into<String>, error: String) -> Self {
        Self {
            success: false,
            message: message.into(),
            output: None,
            error: Some(error),
        }
    }
}

/// Start the HTTP server
pub async fn serve(config: ServerConfig, port: u16) -> Result<()> {
    let state = AppState { config };

    // Allow all origins: the relay runs next to its callers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/sync", post(sync_data))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Run one sync as a subprocess and report its outcome
async fn sync_data(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SyncRequest>,
) -> impl IntoResponse {
    let exe = match std::env::current_exe() {
        Ok(path) => path,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RelayResponse::failure(
                    "Failed to locate the sync binary",
                    e.to_string(),
                )),
            );
        }
    };

    let mut command = Command::new(exe);
    command.arg("sync").arg("--location").arg(&req.location);
    if let Some(path) = &state.config.config_path {
        command.arg("--config").arg(path);
    }
    if let Some(path) = &state.config.db_path {
        command.arg("--db").arg(path);
    }
    if let Some(day) = req.date {
        command.arg("--date").arg(day.to_string());
    } else {
        if let Some(day) = req.start {
            command.arg("--start").arg(day.to_string());
        }
        if let Some(day) = req.end {
            command.arg("--end").arg(day.to_string());
        }
    }

    tracing::info!("Spawning sync for location {}", req.location);

    match command.output().await {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

            if output.status.success() {
                (
                    StatusCode::OK,
                    Json(RelayResponse::success("Sync completed", stdout)),
                )
            } else {
                let detail = if stderr.is_empty() { stdout } else { stderr };
                (
                    StatusCode::OK,
                    Json(RelayResponse::failure(
                        format!("Sync exited with {}", output.status),
                        detail,
                    )),
                )
            }
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(RelayResponse::failure(
                "Failed to spawn sync subprocess",
                e.to_string(),
            )),
        ),
    }
}
