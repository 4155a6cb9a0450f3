//! Raster PDF export.
//!
//! The rendered view is composited onto the request background, placed at the
//! top-left of one A4 page scaled to fit, and overlaid with `/Link`
//! annotations so contact details stay clickable in the flattened output.

use chrono::Utc;
use image::RgbaImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::{debug, warn};

use crate::annotate::normalize_url;
use crate::export::render::{LinkRegion, RenderRequest, RenderedView, ResumeRenderer};
use crate::export::{export_filename, ExportError, ExportPayload};
use crate::layout::page::{estimate_pages, PageGeometry};
use crate::models::Resume;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Boxes at or below this size in points after scaling are not clickable.
const MIN_LINK_EXTENT_PT: f32 = 2.0;

const IMAGE_NAME: &str = "Im0";

/// Renders `resume` and encodes the result as a single-page PDF.
pub async fn export_pdf(
    resume: &Resume,
    renderer: &dyn ResumeRenderer,
) -> Result<ExportPayload, ExportError> {
    let view = renderer.render(resume, &RenderRequest::EXPORT).await?;

    let estimate = estimate_pages(&PageGeometry::A4, view.source_width, view.source_height);
    if estimate.pages > 1 {
        warn!(
            pages = estimate.pages,
            "Resume is taller than one page; raster export keeps the first page scaled to fit"
        );
    }

    let title = resume.display_name().to_string();
    let background = RenderRequest::EXPORT.background;
    let bytes = tokio::task::spawn_blocking(move || {
        encode_pdf(&view, &PageGeometry::A4, background, &title)
    })
    .await
    .map_err(|e| ExportError::Io(std::io::Error::other(format!("PDF encoder task failed: {e}"))))??;

    Ok(ExportPayload {
        bytes,
        filename: export_filename(&resume.name, "pdf"),
        content_type: PDF_CONTENT_TYPE,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Encoding
// ────────────────────────────────────────────────────────────────────────────

/// Where the image lands on the page, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Placement {
    page_height: f32,
    drawn_width: f32,
    drawn_height: f32,
}

/// Encodes `view` as a one-page PDF with the image at the top-left.
pub fn encode_pdf(
    view: &RenderedView,
    geometry: &PageGeometry,
    background: [u8; 3],
    title: &str,
) -> Result<Vec<u8>, ExportError> {
    let (width_px, height_px) = view.image.dimensions();
    let page_width = geometry.width_pt();
    let page_height = geometry.height_pt();

    let ratio = (page_width / width_px.max(1) as f32).min(page_height / height_px.max(1) as f32);
    let placement = Placement {
        page_height,
        drawn_width: width_px as f32 * ratio,
        drawn_height: height_px as f32 * ratio,
    };

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width_px as i64,
            "Height" => height_px as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        flatten_rgb(&view.image, background),
    ));

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    placement.drawn_width.into(),
                    0.into(),
                    0.into(),
                    placement.drawn_height.into(),
                    0.into(),
                    (page_height - placement.drawn_height).into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! {
            IMAGE_NAME => image_id,
        },
    });

    let annotations: Vec<Object> = view
        .links
        .iter()
        .filter_map(|link| link_annotation(&mut doc, link, view, &placement))
        .map(Object::Reference)
        .collect();

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "Annots" => annotations,
    });

    doc.set_object(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Count" => 1,
            "Kids" => vec![page_id.into()],
            "MediaBox" => vec![0.into(), 0.into(), page_width.into(), page_height.into()],
        },
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let date = Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();
    let info_id = doc.add_object(dictionary! {
        "Title" => text_string(title),
        "Producer" => Object::string_literal(env!("CARGO_PKG_NAME")),
        "CreationDate" => Object::string_literal(date),
    });
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

/// PDF text string: ASCII stays literal, anything else is UTF-16BE with a BOM.
fn text_string(value: &str) -> Object {
    if value.is_ascii() {
        return Object::string_literal(value);
    }
    let mut bytes = vec![0xFE, 0xFF];
    bytes.extend(value.encode_utf16().flat_map(u16::to_be_bytes));
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Adds a `/Link` annotation for `link` and returns its id, or `None` when
/// the region cannot become a usable click target.
fn link_annotation(
    doc: &mut Document,
    link: &LinkRegion,
    view: &RenderedView,
    placement: &Placement,
) -> Option<ObjectId> {
    let href = normalize_url(&link.href);
    if href.is_empty() {
        debug!(text = %link.text, "Skipping link region without a target");
        return None;
    }

    let fx = placement.drawn_width / view.source_width;
    let fy = placement.drawn_height / view.source_height;
    let bounds = link.bounds;

    let x0 = bounds.x * fx;
    let width = bounds.width * fx;
    let height = bounds.height * fy;
    let top = placement.page_height - bounds.y * fy;

    if !bounds.is_finite() || ![x0, width, height, top].iter().all(|v| v.is_finite()) {
        debug!(href = %href, "Skipping link region with non-finite bounds");
        return None;
    }
    if width <= MIN_LINK_EXTENT_PT || height <= MIN_LINK_EXTENT_PT {
        debug!(href = %href, width, height, "Skipping link region too small to click");
        return None;
    }

    Some(doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => vec![x0.into(), (top - height).into(), (x0 + width).into(), top.into()],
        "Border" => vec![0.into(), 0.into(), 0.into()],
        "A" => dictionary! {
            "S" => "URI",
            "URI" => Object::String(href.into_bytes(), StringFormat::Literal),
        },
    }))
}

/// Composites RGBA pixels over an opaque background into packed RGB.
fn flatten_rgb(image: &RgbaImage, background: [u8; 3]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(image.as_raw().len() / 4 * 3);
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as u16;
        for (channel, bg) in [r, g, b].into_iter().zip(background) {
            let blended = (channel as u16 * alpha + bg as u16 * (255 - alpha) + 127) / 255;
            rgb.push(blended as u8);
        }
    }
    rgb
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use image::Rgba;

    use super::*;
    use crate::export::render::{BoundingBox, RenderError};

    fn region(href: &str, x: f32, y: f32, width: f32, height: f32) -> LinkRegion {
        LinkRegion {
            text: href.to_string(),
            href: href.to_string(),
            bounds: BoundingBox { x, y, width, height },
        }
    }

    fn view(links: Vec<LinkRegion>) -> RenderedView {
        RenderedView {
            image: RgbaImage::from_pixel(100, 150, Rgba([0, 0, 0, 255])),
            source_width: 400.0,
            source_height: 600.0,
            links,
        }
    }

    struct FixedRenderer(Option<RenderedView>);

    #[async_trait]
    impl ResumeRenderer for FixedRenderer {
        async fn render(
            &self,
            _resume: &Resume,
            _request: &RenderRequest,
        ) -> Result<RenderedView, RenderError> {
            self.0
                .clone()
                .ok_or_else(|| RenderError::Capture("renderer offline".to_string()))
        }
    }

    fn page_annotations(bytes: &[u8]) -> (Document, Vec<ObjectId>) {
        let doc = Document::load_mem(bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let page = doc.get_dictionary(pages[&1]).unwrap();
        let ids = page
            .get(b"Annots")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|annot| annot.as_reference().unwrap())
            .collect();
        (doc, ids)
    }

    fn uri_of(doc: &Document, id: ObjectId) -> Vec<u8> {
        let annot = doc.get_dictionary(id).unwrap();
        let action = annot.get(b"A").unwrap().as_dict().unwrap();
        action.get(b"URI").unwrap().as_str().unwrap().to_vec()
    }

    #[test]
    fn test_flatten_composites_over_background() {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        image.put_pixel(1, 0, Rgba([0, 0, 0, 255]));
        assert_eq!(flatten_rgb(&image, [255, 255, 255]), vec![255, 255, 255, 0, 0, 0]);
    }

    #[test]
    fn test_encode_emits_single_page_with_normalized_link() {
        let rendered = view(vec![region("alex@example.com", 10.0, 20.0, 120.0, 14.0)]);
        let bytes = encode_pdf(&rendered, &PageGeometry::A4, [255, 255, 255], "Alex").unwrap();
        let (doc, annots) = page_annotations(&bytes);

        assert_eq!(annots.len(), 1);
        assert_eq!(uri_of(&doc, annots[0]), b"mailto:alex@example.com".to_vec());
    }

    #[test]
    fn test_non_ascii_title_is_utf16_in_document_info() {
        let bytes = encode_pdf(&view(Vec::new()), &PageGeometry::A4, [255, 255, 255], "José").unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let title = doc.get_dictionary(info_id).unwrap().get(b"Title").unwrap();

        let expected: Vec<u8> = [0xFE, 0xFF]
            .into_iter()
            .chain("José".encode_utf16().flat_map(u16::to_be_bytes))
            .collect();
        assert_eq!(title.as_str().unwrap(), expected.as_slice());

        let ascii = encode_pdf(&view(Vec::new()), &PageGeometry::A4, [255, 255, 255], "Alex").unwrap();
        let doc = Document::load_mem(&ascii).unwrap();
        let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let title = doc.get_dictionary(info_id).unwrap().get(b"Title").unwrap();
        assert_eq!(title.as_str().unwrap(), b"Alex");
    }

    #[test]
    fn test_link_rect_is_scaled_from_source_coordinates() {
        let rendered = view(vec![region("https://x.com", 0.0, 0.0, 100.0, 50.0)]);
        let bytes = encode_pdf(&rendered, &PageGeometry::A4, [255, 255, 255], "Alex").unwrap();
        let (doc, annots) = page_annotations(&bytes);

        let rect: Vec<f32> = doc
            .get_dictionary(annots[0])
            .unwrap()
            .get(b"Rect")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_float().unwrap())
            .collect();

        // 100×150 px image fits by height: drawn 561.26 × 841.89 pt.
        let scale = 841.89 / 600.0;
        assert!(rect[0].abs() < 0.01);
        assert!((rect[2] - 100.0 * scale).abs() < 0.05);
        assert!((rect[3] - 841.89).abs() < 0.05);
        assert!((rect[1] - (841.89 - 50.0 * scale)).abs() < 0.05);
    }

    #[test]
    fn test_degenerate_and_non_finite_regions_are_skipped() {
        let rendered = view(vec![
            region("https://ok.com", 10.0, 10.0, 80.0, 12.0),
            region("https://thin.com", 10.0, 40.0, 80.0, 1.0),
            region("https://nan.com", f32::NAN, 10.0, 80.0, 12.0),
            region("https://inf.com", 10.0, 10.0, f32::INFINITY, 12.0),
            region("   ", 10.0, 60.0, 80.0, 12.0),
        ]);
        let bytes = encode_pdf(&rendered, &PageGeometry::A4, [255, 255, 255], "Alex").unwrap();
        let (doc, annots) = page_annotations(&bytes);

        assert_eq!(annots.len(), 1);
        assert_eq!(uri_of(&doc, annots[0]), b"https://ok.com".to_vec());
    }

    #[tokio::test]
    async fn test_export_pdf_names_file_after_resume() {
        let renderer = FixedRenderer(Some(view(vec![])));
        let payload = export_pdf(&Resume::sample(), &renderer).await.unwrap();

        assert_eq!(payload.filename, "Alex_Student.pdf");
        assert_eq!(payload.content_type, PDF_CONTENT_TYPE);
        assert!(payload.bytes.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_tall_render_still_exports_one_page() {
        let mut tall = view(vec![]);
        tall.source_height = 4000.0;
        let payload = export_pdf(&Resume::default(), &FixedRenderer(Some(tall)))
            .await
            .unwrap();
        assert_eq!(payload.filename, "resume.pdf");
        assert_eq!(Document::load_mem(&payload.bytes).unwrap().get_pages().len(), 1);
    }

    #[tokio::test]
    async fn test_renderer_failure_fails_export() {
        let err = export_pdf(&Resume::sample(), &FixedRenderer(None))
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Render(RenderError::Capture(_))));
    }
}
