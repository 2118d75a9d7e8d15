//! Spreadsheet upload.

use std::fmt::Display;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::Json;
use tracing::{error, warn};

use super::MessageResponse;
use crate::state::AppState;

const FILE_FIELD: &str = "file";
const REPLACE_FIELD: &str = "atualizar";

struct UploadForm {
    file: Option<(String, Vec<u8>)>,
    replace: bool,
}

/// Reads the form. `atualizar` defaults to replace; only the literal
/// `true` keeps it.
async fn read_form(mut multipart: Multipart) -> Result<UploadForm, MultipartError> {
    let mut form = UploadForm {
        file: None,
        replace: true,
    };
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(FILE_FIELD) => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                form.file = Some((filename, bytes.to_vec()));
            }
            Some(REPLACE_FIELD) => {
                form.replace = field.text().await? == "true";
            }
            _ => {}
        }
    }
    Ok(form)
}

fn processing_failure(detail: impl Display) -> MessageResponse {
    MessageResponse::failed(format!(
        "Erro ao processar arquivo. Verifique se a planilha está no formato correto. Detalhe: {}",
        detail
    ))
}

/// Ingests an uploaded workbook. Every outcome is reported in the
/// `{success, message}` envelope.
pub async fn upload(State(state): State<AppState>, multipart: Multipart) -> Json<MessageResponse> {
    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(e) => {
            warn!(error = %e, "malformed upload");
            return Json(processing_failure(e.body_text()));
        }
    };
    let Some((filename, bytes)) = form.file else {
        return Json(MessageResponse::failed("Nenhum arquivo enviado"));
    };

    let pipeline = state.pipeline.clone();
    let replace = form.replace;
    let outcome =
        tokio::task::spawn_blocking(move || pipeline.run(&filename, &bytes, replace)).await;

    Json(match outcome {
        Ok(Ok(report)) => MessageResponse::ok(format!(
            "Arquivo processado com sucesso. {} linhas inseridas.",
            report.inserted
        )),
        Ok(Err(e)) if e.is_rejection() => MessageResponse::failed(e.to_string()),
        Ok(Err(e)) => processing_failure(e),
        Err(e) => {
            error!(error = %e, "ingestion task failed");
            processing_failure(e)
        }
    })
}
