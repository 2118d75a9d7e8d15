//! JSON API routes.
//!
//! Every handler moves its storage work onto the blocking pool; the
//! osmanager crate is synchronous and opens a connection per operation.

mod dashboard;
mod orders;
mod settings;
mod upload;


use std::future::Future;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use osmanager::OsManagerError;
use serde::Serialize;
use thiserror::Error;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::state::AppState;
use crate::BoxError;

/// Headroom above the upload cap for multipart framing and form fields.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// Binds the configured address and serves until `shutdown` resolves.
pub async fn serve<F>(state: AppState, shutdown: F) -> Result<(), BoxError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(&state.config.bind_address).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "osmanager listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Build the axum router (separated for testing).
pub fn router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.config.max_upload_bytes + MULTIPART_OVERHEAD)
        .unwrap_or(usize::MAX);
    let static_dir = state.config.static_directory.clone();

    let api = Router::new()
        .route("/api/health", get(health))
        .route("/api/dashboard", get(dashboard::dashboard))
        .route("/api/filtros", get(dashboard::filters))
        .route("/api/relatorios", get(dashboard::reports))
        .route("/api/upload", post(upload::upload))
        .route("/api/consultar", get(orders::consultar))
        .route("/api/exportar", get(orders::exportar))
        .route("/api/configuracoes", get(settings::configuracoes))
        .route("/api/limpar", post(settings::limpar))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    match static_dir {
        Some(dir) => api.fallback_service(ServeDir::new(dir)),
        None => api,
    }
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// The `{success, message}` envelope used by write endpoints and errors.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Failure of a read endpoint, reported as HTTP 500.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Internal(#[from] OsManagerError),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");
        let body = MessageResponse::failed(self.to_string());
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Runs synchronous store work on the blocking pool.
pub async fn blocking<F, T>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> osmanager::Result<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(work).await??)
}
