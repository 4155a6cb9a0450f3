//! Flow document model: the resume as an ordered list of styled blocks.
//!
//! The block list is format-independent; `export::docx` packages it. Section
//! order is fixed: title, subtitle, Contact, Profile, Work Experience,
//! Education, Skills, Certifications.

use crate::annotate::{linkify, normalize_tel, normalize_url, Segment};
use crate::editing::transforms::format_date_range;
use crate::models::{Resume, Website};

// ────────────────────────────────────────────────────────────────────────────
// Block types
// ────────────────────────────────────────────────────────────────────────────

/// A styled span of text inside a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    /// External target when this run is a hyperlink.
    pub link: Option<String>,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Run {
            text: text.into(),
            bold: false,
            italic: false,
            link: None,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Run {
            bold: true,
            ..Run::plain(text)
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Run {
            italic: true,
            ..Run::plain(text)
        }
    }

    /// A hyperlink run; falls back to plain text when `href` is empty.
    pub fn link(text: impl Into<String>, href: String) -> Self {
        Run {
            link: (!href.is_empty()).then_some(href),
            ..Run::plain(text)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Title(String),
    Subtitle(String),
    Heading(String),
    Paragraph(Vec<Run>),
    Bullet(Vec<Run>),
}

// ────────────────────────────────────────────────────────────────────────────
// Builder
// ────────────────────────────────────────────────────────────────────────────

/// Builds the block sequence for `resume`. Deterministic.
pub fn build_blocks(resume: &Resume) -> Vec<Block> {
    let mut blocks = vec![Block::Title(resume.display_name().to_string())];
    if !resume.title.is_empty() {
        blocks.push(Block::Subtitle(resume.title.clone()));
    }

    blocks.push(Block::Heading("Contact".to_string()));
    blocks.extend(contact_lines(resume).into_iter().map(Block::Paragraph));

    if !resume.summary.is_empty() {
        blocks.push(Block::Heading("Profile".to_string()));
        blocks.push(Block::Paragraph(linked_runs(&resume.summary)));
    }

    blocks.push(Block::Heading("Work Experience".to_string()));
    for job in resume.experience.iter() {
        if job.role.is_empty() && job.company.is_empty() {
            continue;
        }
        blocks.push(Block::Paragraph(entry_header(
            &job.role,
            &job.company,
            &job.start,
            &job.end,
        )));
        blocks.extend(
            job.details
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|line| Block::Bullet(linked_runs(line))),
        );
    }

    blocks.push(Block::Heading("Education".to_string()));
    for school in resume.education.iter() {
        if school.school.is_empty() && school.degree.is_empty() {
            continue;
        }
        blocks.push(Block::Paragraph(entry_header(
            &school.school,
            &school.degree,
            &school.start,
            &school.end,
        )));
        if !school.details.trim().is_empty() {
            blocks.push(Block::Paragraph(vec![Run::plain(school.details.clone())]));
        }
    }

    blocks.push(Block::Heading("Skills".to_string()));
    if resume.skills.is_empty() {
        blocks.push(Block::Paragraph(vec![Run::plain("No skills")]));
    } else {
        blocks.extend(
            resume
                .skills
                .iter()
                .map(|skill| Block::Bullet(vec![Run::plain(skill.clone())])),
        );
    }

    blocks.push(Block::Heading("Certifications".to_string()));
    let certifications: Vec<&String> = resume
        .certifications
        .iter()
        .filter(|cert| !cert.is_empty())
        .collect();
    if certifications.is_empty() {
        blocks.push(Block::Paragraph(vec![Run::plain("None")]));
    } else {
        blocks.extend(
            certifications
                .into_iter()
                .map(|cert| Block::Bullet(vec![Run::plain(cert.clone())])),
        );
    }

    blocks
}

/// One run list per non-empty contact value, in display order.
fn contact_lines(resume: &Resume) -> Vec<Vec<Run>> {
    let mut lines = Vec::new();
    if !resume.phone.is_empty() {
        lines.push(vec![Run::link(&resume.phone, normalize_tel(&resume.phone))]);
    }
    if !resume.email.is_empty() {
        lines.push(vec![Run::link(&resume.email, normalize_url(&resume.email))]);
    }
    if !resume.address.is_empty() {
        lines.push(linked_runs(&resume.address));
    }
    for profile in [&resume.linkedin, &resume.github] {
        if !profile.is_empty() {
            lines.push(vec![Run::link(profile.as_str(), normalize_url(profile))]);
        }
    }
    lines.extend(resume.websites.iter().filter_map(website_line));
    lines
}

fn website_line(site: &Website) -> Option<Vec<Run>> {
    if site.url.is_empty() {
        return None;
    }
    let mut runs = Vec::new();
    if !site.label.trim().is_empty() {
        runs.push(Run::plain(format!("{}: ", site.label)));
    }
    runs.push(Run::link(&site.url, normalize_url(&site.url)));
    Some(runs)
}

/// Heading and organisation in bold, then the italic date range if any.
fn entry_header(heading: &str, organisation: &str, start: &str, end: &str) -> Vec<Run> {
    let mut runs = Vec::new();
    if !heading.is_empty() {
        runs.push(Run::bold(heading));
    }
    if !organisation.is_empty() {
        let text = if heading.is_empty() {
            organisation.to_string()
        } else {
            format!(" — {organisation}")
        };
        runs.push(Run::bold(text));
    }

    let dates = format_date_range(start, end);
    if !start.is_empty() || !end.is_empty() {
        runs.push(Run::plain(" "));
        runs.push(Run::italic(dates));
    }
    runs
}

fn linked_runs(text: &str) -> Vec<Run> {
    linkify(text)
        .into_iter()
        .map(|segment| match segment {
            Segment::Text { value } => Run::plain(value),
            Segment::Link { display, href } => Run::link(display, href),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::lists::{append, ListField};
    use crate::editing::path::mutate_str;
    use crate::editing::transforms::commit_skills;

    /// Plain text of the block with styling dropped.
    fn text(block: &Block) -> String {
        match block {
            Block::Title(text) | Block::Subtitle(text) | Block::Heading(text) => text.clone(),
            Block::Paragraph(runs) | Block::Bullet(runs) => {
                runs.iter().map(|run| run.text.as_str()).collect()
            }
        }
    }

    fn headings(blocks: &[Block]) -> Vec<String> {
        blocks
            .iter()
            .filter_map(|block| match block {
                Block::Heading(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn section<'a>(blocks: &'a [Block], heading: &str) -> &'a [Block] {
        let start = blocks
            .iter()
            .position(|b| *b == Block::Heading(heading.to_string()))
            .expect("heading present")
            + 1;
        let end = blocks[start..]
            .iter()
            .position(|b| matches!(b, Block::Heading(_)))
            .map(|offset| start + offset)
            .unwrap_or(blocks.len());
        &blocks[start..end]
    }

    #[test]
    fn test_blank_resume_uses_placeholders_and_omits_profile() {
        let blocks = build_blocks(&Resume::default());
        assert_eq!(blocks[0], Block::Title("Full Name".to_string()));
        assert!(!matches!(blocks[1], Block::Subtitle(_)));
        assert_eq!(
            headings(&blocks),
            vec!["Contact", "Work Experience", "Education", "Skills", "Certifications"]
        );
        assert_eq!(
            section(&blocks, "Skills"),
            &[Block::Paragraph(vec![Run::plain("No skills")])]
        );
        assert_eq!(
            section(&blocks, "Certifications"),
            &[Block::Paragraph(vec![Run::plain("None")])]
        );
        assert!(section(&blocks, "Contact").is_empty());
        assert!(section(&blocks, "Work Experience").is_empty());
    }

    #[test]
    fn test_sample_resume_section_order() {
        let blocks = build_blocks(&Resume::sample());
        assert_eq!(blocks[0], Block::Title("Alex Student".to_string()));
        assert_eq!(blocks[1], Block::Subtitle("Software Engineer Intern".to_string()));
        assert_eq!(
            headings(&blocks),
            vec![
                "Contact",
                "Profile",
                "Work Experience",
                "Education",
                "Skills",
                "Certifications"
            ]
        );
    }

    #[test]
    fn test_contact_lines_are_linked() {
        let blocks = build_blocks(&Resume::sample());
        let contact = section(&blocks, "Contact");
        assert_eq!(contact.len(), 5);
        assert_eq!(
            contact[0],
            Block::Paragraph(vec![Run::link("+1 555 123 4567", "tel:+15551234567".to_string())])
        );
        assert_eq!(
            contact[1],
            Block::Paragraph(vec![Run::link("alex@example.com", "mailto:alex@example.com".to_string())])
        );
        assert_eq!(text(&contact[2]), "123 Main St, City");
        assert_eq!(
            contact[3],
            Block::Paragraph(vec![Run::link(
                "linkedin.com/in/alex",
                "https://linkedin.com/in/alex".to_string()
            )])
        );
    }

    #[test]
    fn test_website_lines_with_and_without_label() {
        let mut resume = Resume::default();
        resume = append(&resume, ListField::Websites);
        resume = append(&resume, ListField::Websites);
        resume = append(&resume, ListField::Websites);
        resume = mutate_str(&resume, "websites.0.label", "Blog").unwrap();
        resume = mutate_str(&resume, "websites.0.url", "alex.dev").unwrap();
        resume = mutate_str(&resume, "websites.1.url", "https://x.com/alex").unwrap();
        resume = mutate_str(&resume, "websites.2.label", "Empty").unwrap();

        let blocks = build_blocks(&resume);
        let contact = section(&blocks, "Contact");
        assert_eq!(contact.len(), 2);
        assert_eq!(text(&contact[0]), "Blog: alex.dev");
        assert_eq!(text(&contact[1]), "https://x.com/alex");
        if let Block::Paragraph(runs) = &contact[0] {
            assert_eq!(runs[1].link.as_deref(), Some("https://alex.dev"));
        } else {
            panic!("expected paragraph");
        }
    }

    #[test]
    fn test_experience_header_and_detail_bullets() {
        let mut resume = Resume::sample();
        resume = mutate_str(&resume, "experience.0.details", "Built data pipeline\n\n  \nImproved performance by 20%\n").unwrap();
        let blocks = build_blocks(&resume);
        let work = section(&blocks, "Work Experience");

        assert_eq!(
            work[0],
            Block::Paragraph(vec![
                Run::bold("Research Intern"),
                Run::bold(" — Acme Labs"),
                Run::plain(" "),
                Run::italic("Jun 2023 - Aug 2023"),
            ])
        );
        assert_eq!(work.len(), 3);
        assert_eq!(work[1], Block::Bullet(vec![Run::plain("Built data pipeline")]));
        assert_eq!(text(&work[2]), "Improved performance by 20%");
    }

    #[test]
    fn test_experience_without_role_or_company_is_skipped() {
        let mut resume = append(&Resume::sample(), ListField::Experience);
        resume = mutate_str(&resume, "experience.1.details", "orphan detail").unwrap();
        let blocks = build_blocks(&resume);
        assert_eq!(section(&blocks, "Work Experience").len(), 3);
    }

    #[test]
    fn test_header_without_dates_has_no_italic_run() {
        let resume = mutate_str(&Resume::default(), "experience.0.company", "Acme").unwrap();
        let blocks = build_blocks(&resume);
        assert_eq!(
            section(&blocks, "Work Experience"),
            &[Block::Paragraph(vec![Run::bold("Acme")])]
        );
    }

    #[test]
    fn test_education_details_is_single_plain_paragraph() {
        let blocks = build_blocks(&Resume::sample());
        let education = section(&blocks, "Education");
        assert_eq!(education.len(), 2);
        assert_eq!(
            text(&education[0]),
            "State University — BSc Computer Science 2021 - 2024"
        );
        assert!(matches!(education[1], Block::Paragraph(_)));
        assert_eq!(text(&education[1]), "Relevant coursework: Algorithms, Databases");
    }

    #[test]
    fn test_skills_and_certifications_are_bulleted() {
        let mut resume = mutate_str(&Resume::default(), "skillsInput", "Rust; SQL").unwrap();
        resume = commit_skills(&resume);
        resume = append(&resume, ListField::Certifications);
        resume = mutate_str(&resume, "certifications.1", "CKA").unwrap();

        let blocks = build_blocks(&resume);
        assert_eq!(
            section(&blocks, "Skills"),
            &[
                Block::Bullet(vec![Run::plain("Rust")]),
                Block::Bullet(vec![Run::plain("SQL")])
            ]
        );
        assert_eq!(
            section(&blocks, "Certifications"),
            &[Block::Bullet(vec![Run::plain("CKA")])]
        );
    }

    #[test]
    fn test_whitespace_certification_is_still_listed() {
        let resume = mutate_str(&Resume::default(), "certifications.0", "  ").unwrap();
        let blocks = build_blocks(&resume);
        assert_eq!(
            section(&blocks, "Certifications"),
            &[Block::Bullet(vec![Run::plain("  ")])]
        );

        let blank = build_blocks(&Resume::default());
        assert_eq!(
            section(&blank, "Certifications"),
            &[Block::Paragraph(vec![Run::plain("None")])]
        );
    }

    #[test]
    fn test_summary_links_are_detected() {
        let resume = mutate_str(&Resume::default(), "summary", "Portfolio at www.alex.dev.").unwrap();
        let blocks = build_blocks(&resume);
        let profile = section(&blocks, "Profile");
        assert_eq!(
            profile,
            &[Block::Paragraph(vec![
                Run::plain("Portfolio at "),
                Run::link("www.alex.dev", "https://www.alex.dev".to_string()),
                Run::plain("."),
            ])]
        );
    }

    #[test]
    fn test_stored_name_is_not_replaced_by_fallback() {
        let resume = Resume::default();
        let _ = build_blocks(&resume);
        assert_eq!(resume.name, "");
    }
}
