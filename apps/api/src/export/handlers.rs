use axum::{
    body::Bytes,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::export::render::{CapturedRenderer, RenderCapture};
use crate::export::snapshot::Snapshot;
use crate::export::{export_docx, export_snapshot, raster, ExportPayload};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: bool,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

/// `attachment` disposition with an ASCII `filename` fallback and the exact
/// name percent-encoded in `filename*`.
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(filename)
    )
}

impl IntoResponse for ExportPayload {
    fn into_response(self) -> Response {
        let disposition = content_disposition(&self.filename);
        (
            [
                (header::CONTENT_TYPE, self.content_type.to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.bytes,
        )
            .into_response()
    }
}

/// GET /api/v1/export/snapshot
pub async fn handle_export_snapshot(
    State(state): State<AppState>,
) -> Result<ExportPayload, AppError> {
    let current = state.session.current().await;
    Ok(export_snapshot(&current.resume, &current.preferences)?)
}

/// GET /api/v1/export/docx
pub async fn handle_export_docx(State(state): State<AppState>) -> Result<ExportPayload, AppError> {
    let resume = state.session.resume().await;
    let payload = tokio::task::spawn_blocking(move || export_docx(&resume))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in docx export: {e}")))??;
    Ok(payload)
}

/// POST /api/v1/export/pdf
///
/// The body is the client's render capture of the current preview.
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Json(capture): Json<RenderCapture>,
) -> Result<ExportPayload, AppError> {
    let resume = state.session.resume().await;
    let renderer = CapturedRenderer::new(capture);
    Ok(raster::export_pdf(&resume, &renderer).await?)
}

/// POST /api/v1/import/snapshot
///
/// Always 200. An undecodable payload reports `imported: false` and leaves
/// the session as it was.
pub async fn handle_import(State(state): State<AppState>, body: Bytes) -> Json<ImportResponse> {
    let response = match state.session.import(&body).await {
        Some(snapshot) => ImportResponse {
            imported: true,
            snapshot,
        },
        None => ImportResponse {
            imported: false,
            snapshot: state.session.current().await,
        },
    };
    Json(response)
}
