//! Whole-field transformations that sit beside plain leaf edits:
//! skills commit, the composite "Start - End" field, and photo upload.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;

use crate::editing::lists::ListField;
use crate::editing::path::{mutate, EducationField, ExperienceField, FieldPath};
use crate::editing::ModelError;
use crate::models::Resume;

// ────────────────────────────────────────────────────────────────────────────
// Skills
// ────────────────────────────────────────────────────────────────────────────

/// Splits raw skills text on `,`, `;` and newlines; trims and drops empties.
pub fn parse_skills(raw: &str) -> Vec<String> {
    raw.split([',', ';', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Recomputes `skills` from the current `skills_input`.
pub fn commit_skills(resume: &Resume) -> Resume {
    Resume {
        skills: Arc::new(parse_skills(&resume.skills_input)),
        ..resume.clone()
    }
}

/// Empties both the raw skills text and the committed list.
pub fn clear_skills(resume: &Resume) -> Resume {
    Resume {
        skills_input: String::new(),
        skills: Arc::new(Vec::new()),
        ..resume.clone()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Date ranges
// ────────────────────────────────────────────────────────────────────────────

/// Splits a composite "Start - End" value into `(start, end)`.
///
/// Splits on every hyphen and keeps the first two parts, so `2021-06 - 2022`
/// becomes `("2021", "06")`.
pub fn split_date_range(raw: &str) -> (String, String) {
    let mut parts = raw.split('-').map(str::trim);
    let start = parts.next().unwrap_or_default().to_string();
    let end = parts.next().unwrap_or_default().to_string();
    (start, end)
}

/// Inverse display of [`split_date_range`] for the composite editor field.
pub fn format_date_range(start: &str, end: &str) -> String {
    if end.is_empty() {
        start.to_string()
    } else {
        format!("{start} - {end}")
    }
}

/// Writes the `start`/`end` pair of one education or experience row.
pub fn set_date_range(
    resume: &Resume,
    list: ListField,
    index: usize,
    raw: &str,
) -> Result<Resume, ModelError> {
    let (start_path, end_path) = match list {
        ListField::Education => (
            FieldPath::Education { index, field: EducationField::Start },
            FieldPath::Education { index, field: EducationField::End },
        ),
        ListField::Experience => (
            FieldPath::Experience { index, field: ExperienceField::Start },
            FieldPath::Experience { index, field: ExperienceField::End },
        ),
        other => return Err(ModelError::InvalidPath(format!("{other}.{index}.start"))),
    };

    let (start, end) = split_date_range(raw);
    let next = mutate(resume, &start_path, start)?;
    mutate(&next, &end_path, end)
}

// ────────────────────────────────────────────────────────────────────────────
// Photo
// ────────────────────────────────────────────────────────────────────────────

/// Stores an uploaded image as a base64 data URL.
///
/// Only the format is sniffed; the image is not decoded.
pub fn set_photo(resume: &Resume, bytes: &[u8]) -> Result<Resume, ModelError> {
    let format = image::guess_format(bytes)
        .map_err(|e| ModelError::UnsupportedPhoto(e.to_string()))?;
    let mime = match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        other => {
            return Err(ModelError::UnsupportedPhoto(format!(
                "{other:?} images are not accepted"
            )))
        }
    };

    Ok(Resume {
        photo: Some(format!("data:{mime};base64,{}", STANDARD.encode(bytes))),
        ..resume.clone()
    })
}

pub fn clear_photo(resume: &Resume) -> Resume {
    Resume {
        photo: None,
        ..resume.clone()
    }
}
