//! HTTP dashboard for service-order spreadsheets.
//!
//! Serves the JSON API over the orders store and, when configured, the
//! dashboard's static assets.

mod routes;
mod state;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, Layer};

use crate::state::AppState;

/// Environment variable holding the tracing filter directives.
const ENV_LOG: &str = "OSMANAGER_LOG";
/// Set to `json` for structured log lines.
const ENV_LOG_FORMAT: &str = "OSMANAGER_LOG_FORMAT";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    init_tracing()?;

    let state = AppState::from_env()?;
    routes::serve(state, shutdown_signal()).await
}

/// Installs the global subscriber and forwards `log` records into it.
fn init_tracing() -> Result<(), BoxError> {
    let filter = tracing_subscriber::EnvFilter::try_from_env(ENV_LOG)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = std::env::var(ENV_LOG_FORMAT)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let fmt_layer = if json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
