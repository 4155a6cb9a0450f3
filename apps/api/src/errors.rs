use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::editing::ModelError;
use crate::export::render::RenderError;
use crate::export::ExportError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Unsupported photo: {0}")]
    UnsupportedPhoto(String),

    #[error("Render failed: {0}")]
    Render(#[from] RenderError),

    #[error("Export failed: {0}")]
    Export(ExportError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::InvalidPath(path) => AppError::InvalidPath(path),
            ModelError::UnsupportedPhoto(reason) => AppError::UnsupportedPhoto(reason),
        }
    }
}

impl From<ExportError> for AppError {
    /// Renderer failures keep their own status; everything else is a 500.
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Render(render) => AppError::Render(render),
            other => AppError::Export(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InvalidPath(path) => (
                StatusCode::BAD_REQUEST,
                "INVALID_PATH",
                format!("'{path}' does not name an editable field"),
            ),
            AppError::UnsupportedPhoto(msg) => {
                (StatusCode::BAD_REQUEST, "UNSUPPORTED_PHOTO", msg.clone())
            }
            AppError::Render(e) => {
                tracing::warn!("Render error: {e}");
                (StatusCode::UNPROCESSABLE_ENTITY, "RENDER_FAILED", e.to_string())
            }
            AppError::Export(e) => {
                tracing::error!("Export error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXPORT_FAILED",
                    "The document could not be encoded".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::from(ModelError::InvalidPath("x".into())), StatusCode::BAD_REQUEST),
            (
                AppError::from(ModelError::UnsupportedPhoto("tiff".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::from(ExportError::Render(RenderError::Capture("busy".into()))),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::from(ExportError::Io(std::io::Error::other("disk"))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
