//! The renderer seam used by the raster exporter.
//!
//! Layout and painting happen outside this crate. A `ResumeRenderer` hands
//! back one atomic `RenderedView`: the pixels, the size of the source view
//! they were captured from, and where the hyperlinks sit in that view.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::Resume;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render capture is invalid: {0}")]
    Capture(String),

    #[error("render image could not be decoded: {0}")]
    Image(#[from] image::ImageError),
}

// ────────────────────────────────────────────────────────────────────────────
// Request / result types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    /// Device pixels per source pixel.
    pub scale: f32,
    /// Opaque RGB behind the view.
    pub background: [u8; 3],
}

impl RenderRequest {
    /// The request every export uses: 2× with a white background.
    pub const EXPORT: RenderRequest = RenderRequest {
        scale: 2.0,
        background: [255, 255, 255],
    };
}

/// Rectangle in source-view pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRegion {
    #[serde(default)]
    pub text: String,
    pub href: String,
    pub bounds: BoundingBox,
}

#[derive(Debug, Clone)]
pub struct RenderedView {
    pub image: RgbaImage,
    pub source_width: f32,
    pub source_height: f32,
    pub links: Vec<LinkRegion>,
}

#[async_trait]
pub trait ResumeRenderer: Send + Sync {
    async fn render(
        &self,
        resume: &Resume,
        request: &RenderRequest,
    ) -> Result<RenderedView, RenderError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Client-submitted captures
// ────────────────────────────────────────────────────────────────────────────

/// A render produced by the client's layout engine and posted with the
/// export request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderCapture {
    /// Base64 PNG/JPEG, optionally as a `data:` URL.
    pub image: String,
    pub source_width: f32,
    pub source_height: f32,
    #[serde(default)]
    pub links: Vec<LinkRegion>,
}

/// Serves a single pre-rendered capture as the render result.
#[derive(Debug)]
pub struct CapturedRenderer {
    capture: RenderCapture,
}

impl CapturedRenderer {
    pub fn new(capture: RenderCapture) -> Self {
        Self { capture }
    }

    fn decode(&self) -> Result<RenderedView, RenderError> {
        let capture = &self.capture;
        if !(capture.source_width.is_finite() && capture.source_width > 0.0)
            || !(capture.source_height.is_finite() && capture.source_height > 0.0)
        {
            return Err(RenderError::Capture(format!(
                "source size {}x{} is not positive",
                capture.source_width, capture.source_height
            )));
        }

        let encoded = match capture.image.split_once(";base64,") {
            Some((prefix, data)) if prefix.starts_with("data:") => data,
            _ => capture.image.as_str(),
        };
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| RenderError::Capture(format!("image is not base64: {e}")))?;
        let image = image::load_from_memory(&bytes)?.to_rgba8();

        Ok(RenderedView {
            image,
            source_width: capture.source_width,
            source_height: capture.source_height,
            links: capture.links.clone(),
        })
    }
}

#[async_trait]
impl ResumeRenderer for CapturedRenderer {
    async fn render(
        &self,
        _resume: &Resume,
        request: &RenderRequest,
    ) -> Result<RenderedView, RenderError> {
        let view = self.decode()?;
        debug!(
            requested_scale = request.scale,
            captured_scale = view.image.width() as f32 / view.source_width,
            links = view.links.len(),
            "Using client render capture"
        );
        Ok(view)
    }
}
