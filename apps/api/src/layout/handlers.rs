use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::layout::page::{estimate_pages, PageEstimate, PageGeometry};

#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    /// Rendered preview width in CSS pixels.
    pub width: f32,
    /// Rendered preview height in CSS pixels.
    pub height: f32,
}

/// POST /api/v1/layout/estimate
///
/// Estimates printed A4 pages for the preview geometry the client just laid out.
pub async fn handle_estimate(
    Json(request): Json<EstimateRequest>,
) -> Result<Json<PageEstimate>, AppError> {
    if !request.width.is_finite() || !request.height.is_finite() {
        return Err(AppError::Validation(
            "width and height must be finite numbers".to_string(),
        ));
    }
    Ok(Json(estimate_pages(
        &PageGeometry::A4,
        request.width,
        request.height,
    )))
}
