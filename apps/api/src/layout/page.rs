//! Page geometry and the printed-page estimator.
//!
//! The preview element is laid out at the physical width of one page, so its
//! rendered width fixes the pixel-per-millimetre scale and therefore the pixel
//! height of one printed page. The estimate is advisory: the raster exporter
//! still emits a single page.

use serde::Serialize;

const POINTS_PER_MM: f32 = 72.0 / 25.4;

// ────────────────────────────────────────────────────────────────────────────
// Geometry
// ────────────────────────────────────────────────────────────────────────────

/// Physical page size in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PageGeometry {
    /// ISO A4 portrait, 210 × 297 mm.
    pub const A4: PageGeometry = PageGeometry {
        width_mm: 210.0,
        height_mm: 297.0,
    };

    /// Page width in PDF points (1/72 in).
    pub fn width_pt(&self) -> f32 {
        self.width_mm * POINTS_PER_MM
    }

    /// Page height in PDF points (1/72 in).
    pub fn height_pt(&self) -> f32 {
        self.height_mm * POINTS_PER_MM
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Estimator
// ────────────────────────────────────────────────────────────────────────────

/// Result of a page-count estimate for one rendered geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageEstimate {
    pub px_per_mm: f32,
    pub page_height_px: f32,
    /// Always at least 1.
    pub pages: u32,
}

/// Estimates how many pages a preview `width_px` × `height_px` prints to.
///
/// `px_per_mm = W / page width`, `page_height_px = page height × px_per_mm`,
/// `pages = max(1, ceil(H / page_height_px))`. A width that gives no usable
/// scale (zero, negative, NaN) yields one page.
pub fn estimate_pages(geometry: &PageGeometry, width_px: f32, height_px: f32) -> PageEstimate {
    let px_per_mm = width_px / geometry.width_mm;
    let page_height_px = geometry.height_mm * px_per_mm;

    let pages = if page_height_px.is_finite() && page_height_px > 0.0 && height_px.is_finite() {
        (height_px / page_height_px).ceil().max(1.0) as u32
    } else {
        1
    };

    PageEstimate {
        px_per_mm,
        page_height_px,
        pages,
    }
}
