use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// The root resume aggregate.
///
/// Lists are shared behind `Arc`, so cloning a `Resume` is cheap and an edit
/// only copies the list it touches (see `editing::path`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub name: String,
    pub title: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub linkedin: String,
    pub github: String,
    #[serde(default)]
    pub websites: Arc<Vec<Website>>,
    /// `data:<mime>;base64,...` payload of the uploaded photo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub course: String,
    pub gpa: String,
    pub summary: String,
    /// Raw skills text. `skills` is derived from it on commit only.
    pub skills_input: String,
    pub skills: Arc<Vec<String>>,
    pub education: Arc<Vec<Education>>,
    pub experience: Arc<Vec<Experience>>,
    pub certifications: Arc<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Website {
    #[serde(default)]
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub school: String,
    pub degree: String,
    pub start: String,
    pub end: String,
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub role: String,
    pub company: String,
    pub start: String,
    pub end: String,
    /// One achievement per line.
    pub details: String,
}

/// Display preferences persisted alongside the resume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub dark: bool,
    #[serde(default)]
    pub compact: bool,
}

impl Default for Resume {
    /// A blank resume: empty scalars, one placeholder row in each editable
    /// list, no skills and no websites.
    fn default() -> Self {
        Resume {
            name: String::new(),
            title: String::new(),
            phone: String::new(),
            email: String::new(),
            address: String::new(),
            linkedin: String::new(),
            github: String::new(),
            websites: Arc::new(Vec::new()),
            photo: None,
            course: String::new(),
            gpa: String::new(),
            summary: String::new(),
            skills_input: String::new(),
            skills: Arc::new(Vec::new()),
            education: Arc::new(vec![Education::default()]),
            experience: Arc::new(vec![Experience::default()]),
            certifications: Arc::new(vec![String::new()]),
        }
    }
}

impl Resume {
    /// The demonstration resume used by the "fill sample" action.
    pub fn sample() -> Self {
        Resume {
            name: "Alex Student".to_string(),
            title: "Software Engineer Intern".to_string(),
            phone: "+1 555 123 4567".to_string(),
            email: "alex@example.com".to_string(),
            address: "123 Main St, City".to_string(),
            linkedin: "linkedin.com/in/alex".to_string(),
            github: "github.com/alex".to_string(),
            websites: Arc::new(Vec::new()),
            photo: None,
            course: "Computer Science".to_string(),
            gpa: "3.8".to_string(),
            summary: "Motivated computer science student with internship experience building web applications."
                .to_string(),
            skills_input: "JavaScript, React, Node.js, SQL".to_string(),
            skills: Arc::new(
                ["JavaScript", "React", "Node.js", "SQL"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
            education: Arc::new(vec![Education {
                school: "State University".to_string(),
                degree: "BSc Computer Science".to_string(),
                start: "2021".to_string(),
                end: "2024".to_string(),
                details: "Relevant coursework: Algorithms, Databases".to_string(),
            }]),
            experience: Arc::new(vec![Experience {
                role: "Research Intern".to_string(),
                company: "Acme Labs".to_string(),
                start: "Jun 2023".to_string(),
                end: "Aug 2023".to_string(),
                details: "Built data pipeline\nImproved performance by 20%".to_string(),
            }]),
            certifications: Arc::new(vec!["AWS Certified Cloud Practitioner".to_string()]),
        }
    }

    /// Name shown on rendered output; the stored name is left untouched.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Full Name"
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_resume_has_one_placeholder_per_list() {
        let resume = Resume::default();
        assert_eq!(resume.education.len(), 1);
        assert_eq!(resume.experience.len(), 1);
        assert_eq!(resume.certifications.as_slice(), &[String::new()]);
        assert!(resume.skills.is_empty());
        assert!(resume.websites.is_empty());
        assert!(resume.photo.is_none());
    }

    #[test]
    fn test_serializes_camel_case_and_omits_missing_photo() {
        let json = serde_json::to_value(Resume::default()).unwrap();
        assert!(json.get("skillsInput").is_some());
        assert!(json.get("skills_input").is_none());
        assert!(json.get("photo").is_none());
        assert_eq!(json["websites"], serde_json::json!([]));
    }

    #[test]
    fn test_display_name_falls_back_without_touching_name() {
        let resume = Resume::default();
        assert_eq!(resume.display_name(), "Full Name");
        assert_eq!(resume.name, "");
        assert_eq!(Resume::sample().display_name(), "Alex Student");
    }
}
