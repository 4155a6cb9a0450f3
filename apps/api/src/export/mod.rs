//! Export pipeline: snapshot JSON, flow document (.docx) and raster PDF.
//!
//! Every exporter reads a `Resume` by reference and never changes session
//! state. The encoders are synchronous and CPU-bound. Handlers run them inside
//! `tokio::task::spawn_blocking`.

pub mod docx;
pub mod flow_doc;
pub mod handlers;
pub mod raster;
pub mod render;
pub mod snapshot;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::export::render::RenderError;
use crate::models::{Preferences, Resume};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    #[error("PDF encoding failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("DOCX packaging failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML writing failed: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("snapshot encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// An encoded export ready to be sent as a download.
#[derive(Debug, Clone)]
pub struct ExportPayload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: &'static str,
}

/// `<name>.<extension>` with whitespace runs replaced by `_` and control
/// characters dropped; `resume` when nothing is left of the name.
pub fn export_filename(name: &str, extension: &str) -> String {
    let name: String = name.chars().filter(|c| c.is_whitespace() || !c.is_control()).collect();
    let stem = WHITESPACE_RUN.replace_all(&name, "_");
    let stem = if stem.is_empty() { "resume" } else { stem.as_ref() };
    format!("{stem}.{extension}")
}

/// Encodes the session as a downloadable snapshot.
pub fn export_snapshot(
    resume: &Resume,
    preferences: &Preferences,
) -> Result<ExportPayload, ExportError> {
    Ok(ExportPayload {
        bytes: snapshot::serialize(resume, preferences)?,
        filename: export_filename(&resume.name, "json"),
        content_type: JSON_CONTENT_TYPE,
    })
}

/// Builds the flow document for `resume` and packages it as .docx.
pub fn export_docx(resume: &Resume) -> Result<ExportPayload, ExportError> {
    let blocks = flow_doc::build_blocks(resume);
    Ok(ExportPayload {
        bytes: docx::encode_docx(&blocks, resume.display_name(), Utc::now())?,
        filename: export_filename(&resume.name, "docx"),
        content_type: docx::DOCX_CONTENT_TYPE,
    })
}
