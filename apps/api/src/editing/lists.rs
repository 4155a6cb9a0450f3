//! Growth and shrink of the resume's editable lists.
//!
//! These are the only operations that change a list's length; `mutate` only
//! ever rewrites existing leaves.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::editing::ModelError;
use crate::models::{Education, Experience, Resume, Website};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListField {
    Education,
    Experience,
    Certifications,
    Websites,
}

impl ListField {
    pub fn key(self) -> &'static str {
        match self {
            ListField::Education => "education",
            ListField::Experience => "experience",
            ListField::Certifications => "certifications",
            ListField::Websites => "websites",
        }
    }

    /// Current length of this list in `resume`.
    pub fn len(self, resume: &Resume) -> usize {
        match self {
            ListField::Education => resume.education.len(),
            ListField::Experience => resume.experience.len(),
            ListField::Certifications => resume.certifications.len(),
            ListField::Websites => resume.websites.len(),
        }
    }
}

impl FromStr for ListField {
    type Err = ModelError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "education" => Ok(ListField::Education),
            "experience" => Ok(ListField::Experience),
            "certifications" => Ok(ListField::Certifications),
            "websites" => Ok(ListField::Websites),
            other => Err(ModelError::InvalidPath(other.to_string())),
        }
    }
}

impl fmt::Display for ListField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Returns a new resume with one blank placeholder appended to `list`.
pub fn append(resume: &Resume, list: ListField) -> Resume {
    let mut next = resume.clone();
    match list {
        ListField::Education => Arc::make_mut(&mut next.education).push(Education::default()),
        ListField::Experience => Arc::make_mut(&mut next.experience).push(Experience::default()),
        ListField::Certifications => Arc::make_mut(&mut next.certifications).push(String::new()),
        ListField::Websites => Arc::make_mut(&mut next.websites).push(Website::default()),
    }
    next
}

/// Returns a new resume without element `index` of `list`.
///
/// Later elements shift down by one. Removing the last element leaves an
/// empty list.
pub fn remove_at(resume: &Resume, list: ListField, index: usize) -> Result<Resume, ModelError> {
    if index >= list.len(resume) {
        return Err(ModelError::InvalidPath(format!("{list}.{index}")));
    }

    let mut next = resume.clone();
    match list {
        ListField::Education => {
            Arc::make_mut(&mut next.education).remove(index);
        }
        ListField::Experience => {
            Arc::make_mut(&mut next.experience).remove(index);
        }
        ListField::Certifications => {
            Arc::make_mut(&mut next.certifications).remove(index);
        }
        ListField::Websites => {
            Arc::make_mut(&mut next.websites).remove(index);
        }
    }
    Ok(next)
}
