//! Filtered listing and spreadsheet export.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use osmanager::db::order_repo::{self, OrderFilter, OrderRecord};
use osmanager::export;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::{blocking, ApiError, MessageResponse};
use crate::state::AppState;

/// Query-string filters shared by `/api/consultar` and `/api/exportar`.
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    pub busca: Option<String>,
    pub status: Option<String>,
    pub status_cotacao: Option<String>,
}

impl FilterParams {
    fn into_filter(self, limit: Option<u64>) -> OrderFilter {
        OrderFilter {
            busca: self.busca,
            status: self.status,
            status_cotacao: self.status_cotacao,
            limit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub total: usize,
    pub resultados: Vec<OrderRecord>,
}

pub async fn consultar(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<QueryResponse>, ApiError> {
    let filter = params.into_filter(Some(state.config.query_limit));
    let db = state.db.clone();
    let resultados = blocking(move || Ok(order_repo::query(&db, &filter)?)).await?;
    Ok(Json(QueryResponse {
        total: resultados.len(),
        resultados,
    }))
}

pub async fn exportar(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Response {
    let filter = params.into_filter(None);
    let db = state.db.clone();

    match blocking(move || Ok(export::export(&db, &filter)?)).await {
        Ok(file) => {
            let disposition = format!("attachment; filename=\"{}\"", file.filename);
            (
                [
                    (header::CONTENT_TYPE, export::CONTENT_TYPE.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                file.bytes,
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "export failed");
            let body = MessageResponse::failed(format!(
                "Erro ao executar consulta para exportação: {}",
                e
            ));
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}
