//! Dashboard, filter options and report aggregates.

use axum::extract::State;
use axum::Json;
use osmanager::db::order_repo::{self, FilterColumn};
use osmanager::db::stats_repo::{self, LabelCount, PerformanceRow};
use osmanager::format_brl;
use serde::Serialize;

use super::{blocking, ApiError};
use crate::state::AppState;

const NO_IMPORT: &str = "N/A";

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub metricas: Metricas,
    pub status_chart: Chart<u64>,
    pub cotacao_chart: Chart<f64>,
    pub timeline_chart: Chart<u64>,
    pub top_clientes: Vec<NamedCount>,
    pub top_produtos: Vec<NamedCount>,
}

#[derive(Debug, Serialize)]
pub struct Metricas {
    pub total: u64,
    pub concluidas: u64,
    pub pendentes: u64,
    /// Currency text, e.g. `R$ 1.234,56`.
    pub valor_total: String,
    pub ultima_atualizacao: String,
}

/// Parallel label/value arrays as the charts consume them.
#[derive(Debug, Serialize)]
pub struct Chart<T> {
    pub labels: Vec<String>,
    pub values: Vec<T>,
}

impl Chart<u64> {
    fn from_counts(rows: Vec<LabelCount>) -> Self {
        let (labels, values) = rows.into_iter().map(|r| (r.label, r.count)).unzip();
        Self { labels, values }
    }
}

#[derive(Debug, Serialize)]
pub struct NamedCount {
    pub nome: String,
    pub count: u64,
}

fn named(rows: Vec<LabelCount>) -> Vec<NamedCount> {
    rows.into_iter()
        .map(|r| NamedCount {
            nome: r.label,
            count: r.count,
        })
        .collect()
}

pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardResponse>, ApiError> {
    let db = state.db.clone();
    let response = blocking(move || -> osmanager::Result<_> {
        let m = stats_repo::metrics(&db)?;
        let quotations = stats_repo::quotation_totals(&db)?;
        let (cotacao_labels, cotacao_values): (Vec<String>, Vec<f64>) =
            quotations.into_iter().map(|r| (r.label, r.total)).unzip();

        Ok(DashboardResponse {
            metricas: Metricas {
                total: m.total,
                concluidas: m.concluidas,
                pendentes: m.pendentes,
                valor_total: format_brl(m.valor_total),
                ultima_atualizacao: m
                    .ultima_atualizacao
                    .unwrap_or_else(|| NO_IMPORT.to_string()),
            },
            status_chart: Chart::from_counts(stats_repo::status_histogram(&db)?),
            cotacao_chart: Chart {
                labels: cotacao_labels,
                values: cotacao_values,
            },
            timeline_chart: Chart::from_counts(stats_repo::monthly_timeline(&db)?),
            top_clientes: named(stats_repo::top_clients(&db)?),
            top_produtos: named(stats_repo::top_products(&db)?),
        })
    })
    .await?;
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
pub struct FiltersResponse {
    pub status: Vec<String>,
    pub status_cotacao: Vec<String>,
}

pub async fn filters(State(state): State<AppState>) -> Result<Json<FiltersResponse>, ApiError> {
    let db = state.db.clone();
    let response = blocking(move || -> osmanager::Result<_> {
        Ok(FiltersResponse {
            status: order_repo::distinct_values(&db, FilterColumn::Status)?,
            status_cotacao: order_repo::distinct_values(&db, FilterColumn::StatusCotacao)?,
        })
    })
    .await?;
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
pub struct ReportsResponse {
    pub metricas: stats_repo::ReportMetrics,
    pub performance: Vec<PerformanceRow>,
}

pub async fn reports(State(state): State<AppState>) -> Result<Json<ReportsResponse>, ApiError> {
    let db = state.db.clone();
    let response = blocking(move || -> osmanager::Result<_> {
        Ok(ReportsResponse {
            metricas: stats_repo::report_metrics(&db)?,
            performance: stats_repo::performance(&db)?,
        })
    })
    .await?;
    Ok(Json(response))
}
