//! Storage information and the clear-all action.

use axum::extract::State;
use axum::Json;
use osmanager::db::{order_repo, stats_repo};
use serde::Serialize;
use tracing::{error, info};

use super::{blocking, ApiError, MessageResponse};
use crate::state::AppState;

const NO_ROWS: &str = "Sem registros";

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub total_registros: u64,
    pub tamanho_mb: f64,
    pub colunas_esperadas: Vec<String>,
    /// Comma-separated column names, or a placeholder while empty.
    pub colunas: String,
}

pub async fn configuracoes(
    State(state): State<AppState>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let db = state.db.clone();
    let info = blocking(move || Ok(stats_repo::storage_info(&db)?)).await?;

    let colunas = if info.colunas.is_empty() {
        NO_ROWS.to_string()
    } else {
        info.colunas.join(", ")
    };
    Ok(Json(SettingsResponse {
        total_registros: info.total_registros,
        tamanho_mb: info.tamanho_mb,
        colunas_esperadas: info.colunas_esperadas,
        colunas,
    }))
}

/// Deletes every stored order. Failures are reported in the envelope.
pub async fn limpar(State(state): State<AppState>) -> Json<MessageResponse> {
    let db = state.db.clone();
    match blocking(move || Ok(order_repo::delete_all(&db)?)).await {
        Ok(removed) => {
            info!(removed, "cleared all orders");
            Json(MessageResponse::ok("Todos os dados foram apagados!"))
        }
        Err(e) => {
            error!(error = %e, "clear failed");
            Json(MessageResponse::failed(format!(
                "Erro ao limpar dados: {}",
                e
            )))
        }
    }
}
