//! Typed leaf addresses for resume edits.
//!
//! Edits arrive as dot paths (`experience.0.role`, `certifications.2`, `name`).
//! A path is parsed once into a [`FieldPath`], which can only name leaves that
//! exist in the schema; index bounds are checked against the resume being edited.
//!
//! `mutate` never touches its input. The returned resume shares every list it
//! did not edit with the original and owns a fresh copy of the one it did.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::editing::ModelError;
use crate::models::Resume;

// ────────────────────────────────────────────────────────────────────────────
// Leaf enums
// ────────────────────────────────────────────────────────────────────────────

/// Top-level string fields. `skills` is derived and deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarField {
    Name,
    Title,
    Phone,
    Email,
    Address,
    Linkedin,
    Github,
    Course,
    Gpa,
    Summary,
    SkillsInput,
}

impl ScalarField {
    fn parse(segment: &str) -> Option<Self> {
        Some(match segment {
            "name" => ScalarField::Name,
            "title" => ScalarField::Title,
            "phone" => ScalarField::Phone,
            "email" => ScalarField::Email,
            "address" => ScalarField::Address,
            "linkedin" => ScalarField::Linkedin,
            "github" => ScalarField::Github,
            "course" => ScalarField::Course,
            "gpa" => ScalarField::Gpa,
            "summary" => ScalarField::Summary,
            "skillsInput" => ScalarField::SkillsInput,
            _ => return None,
        })
    }

    fn key(self) -> &'static str {
        match self {
            ScalarField::Name => "name",
            ScalarField::Title => "title",
            ScalarField::Phone => "phone",
            ScalarField::Email => "email",
            ScalarField::Address => "address",
            ScalarField::Linkedin => "linkedin",
            ScalarField::Github => "github",
            ScalarField::Course => "course",
            ScalarField::Gpa => "gpa",
            ScalarField::Summary => "summary",
            ScalarField::SkillsInput => "skillsInput",
        }
    }

    fn slot(self, resume: &mut Resume) -> &mut String {
        match self {
            ScalarField::Name => &mut resume.name,
            ScalarField::Title => &mut resume.title,
            ScalarField::Phone => &mut resume.phone,
            ScalarField::Email => &mut resume.email,
            ScalarField::Address => &mut resume.address,
            ScalarField::Linkedin => &mut resume.linkedin,
            ScalarField::Github => &mut resume.github,
            ScalarField::Course => &mut resume.course,
            ScalarField::Gpa => &mut resume.gpa,
            ScalarField::Summary => &mut resume.summary,
            ScalarField::SkillsInput => &mut resume.skills_input,
        }
    }

    fn get(self, resume: &Resume) -> &str {
        match self {
            ScalarField::Name => &resume.name,
            ScalarField::Title => &resume.title,
            ScalarField::Phone => &resume.phone,
            ScalarField::Email => &resume.email,
            ScalarField::Address => &resume.address,
            ScalarField::Linkedin => &resume.linkedin,
            ScalarField::Github => &resume.github,
            ScalarField::Course => &resume.course,
            ScalarField::Gpa => &resume.gpa,
            ScalarField::Summary => &resume.summary,
            ScalarField::SkillsInput => &resume.skills_input,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EducationField {
    School,
    Degree,
    Start,
    End,
    Details,
}

impl EducationField {
    fn parse(segment: &str) -> Option<Self> {
        Some(match segment {
            "school" => EducationField::School,
            "degree" => EducationField::Degree,
            "start" => EducationField::Start,
            "end" => EducationField::End,
            "details" => EducationField::Details,
            _ => return None,
        })
    }

    fn key(self) -> &'static str {
        match self {
            EducationField::School => "school",
            EducationField::Degree => "degree",
            EducationField::Start => "start",
            EducationField::End => "end",
            EducationField::Details => "details",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceField {
    Role,
    Company,
    Start,
    End,
    Details,
}

impl ExperienceField {
    fn parse(segment: &str) -> Option<Self> {
        Some(match segment {
            "role" => ExperienceField::Role,
            "company" => ExperienceField::Company,
            "start" => ExperienceField::Start,
            "end" => ExperienceField::End,
            "details" => ExperienceField::Details,
            _ => return None,
        })
    }

    fn key(self) -> &'static str {
        match self {
            ExperienceField::Role => "role",
            ExperienceField::Company => "company",
            ExperienceField::Start => "start",
            ExperienceField::End => "end",
            ExperienceField::Details => "details",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebsiteField {
    Label,
    Url,
}

impl WebsiteField {
    fn parse(segment: &str) -> Option<Self> {
        match segment {
            "label" => Some(WebsiteField::Label),
            "url" => Some(WebsiteField::Url),
            _ => None,
        }
    }

    fn key(self) -> &'static str {
        match self {
            WebsiteField::Label => "label",
            WebsiteField::Url => "url",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// FieldPath
// ────────────────────────────────────────────────────────────────────────────

/// Address of one string leaf inside a [`Resume`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPath {
    Scalar(ScalarField),
    Education { index: usize, field: EducationField },
    Experience { index: usize, field: ExperienceField },
    Website { index: usize, field: WebsiteField },
    Certification { index: usize },
}

impl FromStr for FieldPath {
    type Err = ModelError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidPath(raw.to_string());
        let segments: Vec<&str> = raw.split('.').collect();

        // Indices are canonical decimals so that `Display` round-trips.
        let index_at = |i: usize| -> Result<usize, ModelError> {
            segments
                .get(i)
                .copied()
                .filter(|s| s.bytes().all(|b| b.is_ascii_digit()))
                .filter(|s| *s == "0" || !s.starts_with('0'))
                .and_then(|s| s.parse::<usize>().ok())
                .ok_or_else(invalid)
        };

        match segments.as_slice() {
            [field] => ScalarField::parse(field)
                .map(FieldPath::Scalar)
                .ok_or_else(invalid),
            ["certifications", _] => Ok(FieldPath::Certification { index: index_at(1)? }),
            ["education", _, field] => Ok(FieldPath::Education {
                index: index_at(1)?,
                field: EducationField::parse(field).ok_or_else(invalid)?,
            }),
            ["experience", _, field] => Ok(FieldPath::Experience {
                index: index_at(1)?,
                field: ExperienceField::parse(field).ok_or_else(invalid)?,
            }),
            ["websites", _, field] => Ok(FieldPath::Website {
                index: index_at(1)?,
                field: WebsiteField::parse(field).ok_or_else(invalid)?,
            }),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Scalar(field) => write!(f, "{}", field.key()),
            FieldPath::Education { index, field } => write!(f, "education.{index}.{}", field.key()),
            FieldPath::Experience { index, field } => {
                write!(f, "experience.{index}.{}", field.key())
            }
            FieldPath::Website { index, field } => write!(f, "websites.{index}.{}", field.key()),
            FieldPath::Certification { index } => write!(f, "certifications.{index}"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Read / write
// ────────────────────────────────────────────────────────────────────────────

/// Returns the current value of the leaf at `path`.
pub fn read<'a>(resume: &'a Resume, path: &FieldPath) -> Result<&'a str, ModelError> {
    let out_of_range = || ModelError::InvalidPath(path.to_string());
    Ok(match *path {
        FieldPath::Scalar(field) => field.get(resume),
        FieldPath::Education { index, field } => {
            let row = resume.education.get(index).ok_or_else(out_of_range)?;
            match field {
                EducationField::School => &row.school,
                EducationField::Degree => &row.degree,
                EducationField::Start => &row.start,
                EducationField::End => &row.end,
                EducationField::Details => &row.details,
            }
        }
        FieldPath::Experience { index, field } => {
            let row = resume.experience.get(index).ok_or_else(out_of_range)?;
            match field {
                ExperienceField::Role => &row.role,
                ExperienceField::Company => &row.company,
                ExperienceField::Start => &row.start,
                ExperienceField::End => &row.end,
                ExperienceField::Details => &row.details,
            }
        }
        FieldPath::Website { index, field } => {
            let site = resume.websites.get(index).ok_or_else(out_of_range)?;
            match field {
                WebsiteField::Label => &site.label,
                WebsiteField::Url => &site.url,
            }
        }
        FieldPath::Certification { index } => resume
            .certifications
            .get(index)
            .map(String::as_str)
            .ok_or_else(out_of_range)?,
    })
}

/// Returns a new resume whose leaf at `path` holds `value`.
pub fn mutate(
    resume: &Resume,
    path: &FieldPath,
    value: impl Into<String>,
) -> Result<Resume, ModelError> {
    let value = value.into();
    let mut next = resume.clone();

    match *path {
        FieldPath::Scalar(field) => *field.slot(&mut next) = value,
        FieldPath::Education { index, field } => {
            update_at(&mut next.education, index, path, |row| {
                let slot = match field {
                    EducationField::School => &mut row.school,
                    EducationField::Degree => &mut row.degree,
                    EducationField::Start => &mut row.start,
                    EducationField::End => &mut row.end,
                    EducationField::Details => &mut row.details,
                };
                *slot = value;
            })?
        }
        FieldPath::Experience { index, field } => {
            update_at(&mut next.experience, index, path, |row| {
                let slot = match field {
                    ExperienceField::Role => &mut row.role,
                    ExperienceField::Company => &mut row.company,
                    ExperienceField::Start => &mut row.start,
                    ExperienceField::End => &mut row.end,
                    ExperienceField::Details => &mut row.details,
                };
                *slot = value;
            })?
        }
        FieldPath::Website { index, field } => update_at(&mut next.websites, index, path, |site| {
            match field {
                WebsiteField::Label => site.label = value,
                WebsiteField::Url => site.url = value,
            }
        })?,
        FieldPath::Certification { index } => {
            update_at(&mut next.certifications, index, path, |cert| *cert = value)?
        }
    }

    Ok(next)
}

/// Parses `raw` and applies [`mutate`].
pub fn mutate_str(
    resume: &Resume,
    raw: &str,
    value: impl Into<String>,
) -> Result<Resume, ModelError> {
    let path: FieldPath = raw.parse()?;
    mutate(resume, &path, value)
}

/// Bounds-checks before `make_mut`, so a rejected edit never copies the list.
fn update_at<T: Clone>(
    list: &mut Arc<Vec<T>>,
    index: usize,
    path: &FieldPath,
    apply: impl FnOnce(&mut T),
) -> Result<(), ModelError> {
    if index >= list.len() {
        return Err(ModelError::InvalidPath(path.to_string()));
    }
    apply(&mut Arc::make_mut(list)[index]);
    Ok(())
}
