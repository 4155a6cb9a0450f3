//! WordprocessingML packaging for the flow document.
//!
//! Produces a minimal but valid .docx: content types, package and document
//! relationships, core properties, styles, one bullet numbering definition,
//! and the document body. Hyperlinks are external relationships numbered
//! from `rId3` (`rId1` styles, `rId2` numbering).

use std::borrow::Cow;
use std::io::{Cursor, Write};

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::export::flow_doc::{Block, Run};
use crate::export::ExportError;

pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PACKAGE_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

/// First relationship id available to hyperlinks.
const FIRST_LINK_RID: usize = 3;

/// A4 in twentieths of a point.
const PAGE_WIDTH_TWIPS: &str = "11906";
const PAGE_HEIGHT_TWIPS: &str = "16838";
const PAGE_MARGIN_TWIPS: &str = "1134";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/><w:sz w:val="22"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="80"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style><w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:pPr><w:spacing w:after="40"/></w:pPr><w:rPr><w:b/><w:sz w:val="48"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Subtitle"><w:name w:val="Subtitle"/><w:basedOn w:val="Normal"/><w:rPr><w:color w:val="555555"/><w:sz w:val="28"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="80"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="28"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/><w:basedOn w:val="Normal"/><w:pPr><w:numPr><w:numId w:val="1"/></w:numPr></w:pPr></w:style><w:style w:type="character" w:styleId="Hyperlink"><w:name w:val="Hyperlink"/><w:rPr><w:color w:val="0563C1"/><w:u w:val="single"/></w:rPr></w:style></w:styles>"#;

const NUMBERING_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="singleLevel"/><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="&#8226;"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum><w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num></w:numbering>"#;

type XmlResult = Result<(), quick_xml::Error>;

// ────────────────────────────────────────────────────────────────────────────
// Package
// ────────────────────────────────────────────────────────────────────────────

/// Packages `blocks` as a .docx archive.
pub fn encode_docx(
    blocks: &[Block],
    title: &str,
    created: DateTime<Utc>,
) -> Result<Vec<u8>, ExportError> {
    let mut links = Vec::new();
    let document = document_xml(blocks, &mut links)?;
    let document_rels = document_rels_xml(&links)?;
    let core = core_xml(title, created)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, &[u8]); 7] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
        ("_rels/.rels", PACKAGE_RELS_XML.as_bytes()),
        ("docProps/core.xml", &core),
        ("word/document.xml", &document),
        ("word/styles.xml", STYLES_XML.as_bytes()),
        ("word/numbering.xml", NUMBERING_XML.as_bytes()),
        ("word/_rels/document.xml.rels", &document_rels),
    ];
    for (name, bytes) in parts {
        zip.start_file(name, options)?;
        zip.write_all(bytes)?;
    }

    Ok(zip.finish()?.into_inner())
}

fn xml_writer() -> Result<Writer<Cursor<Vec<u8>>>, quick_xml::Error> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(writer)
}

fn core_xml(title: &str, created: DateTime<Utc>) -> Result<Vec<u8>, quick_xml::Error> {
    let mut writer = xml_writer()?;
    let mut root = BytesStart::new("cp:coreProperties");
    root.push_attribute((
        "xmlns:cp",
        "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
    ));
    root.push_attribute(("xmlns:dc", "http://purl.org/dc/elements/1.1/"));
    root.push_attribute(("xmlns:dcterms", "http://purl.org/dc/terms/"));
    root.push_attribute(("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"));
    writer.write_event(Event::Start(root))?;

    write_text_element(&mut writer, BytesStart::new("dc:title"), title)?;
    write_text_element(&mut writer, BytesStart::new("dc:creator"), title)?;
    let mut created_elem = BytesStart::new("dcterms:created");
    created_elem.push_attribute(("xsi:type", "dcterms:W3CDTF"));
    write_text_element(
        &mut writer,
        created_elem,
        &created.to_rfc3339_opts(SecondsFormat::Secs, true),
    )?;

    writer.write_event(Event::End(BytesEnd::new("cp:coreProperties")))?;
    Ok(writer.into_inner().into_inner())
}

fn document_rels_xml(links: &[String]) -> Result<Vec<u8>, quick_xml::Error> {
    let mut writer = xml_writer()?;
    let mut root = BytesStart::new("Relationships");
    root.push_attribute(("xmlns", NS_PACKAGE_RELS));
    writer.write_event(Event::Start(root))?;

    write_relationship(
        &mut writer,
        "rId1",
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles",
        "styles.xml",
        false,
    )?;
    write_relationship(
        &mut writer,
        "rId2",
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering",
        "numbering.xml",
        false,
    )?;
    for (offset, target) in links.iter().enumerate() {
        let id = format!("rId{}", FIRST_LINK_RID + offset);
        write_relationship(&mut writer, &id, REL_HYPERLINK, target, true)?;
    }

    writer.write_event(Event::End(BytesEnd::new("Relationships")))?;
    Ok(writer.into_inner().into_inner())
}

fn write_relationship<W: Write>(
    writer: &mut Writer<W>,
    id: &str,
    kind: &str,
    target: &str,
    external: bool,
) -> XmlResult {
    let mut elem = BytesStart::new("Relationship");
    elem.push_attribute(("Id", id));
    elem.push_attribute(("Type", kind));
    elem.push_attribute(("Target", xml_safe(target).as_ref()));
    if external {
        elem.push_attribute(("TargetMode", "External"));
    }
    writer.write_event(Event::Empty(elem))?;
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Document body
// ────────────────────────────────────────────────────────────────────────────

/// Writes `word/document.xml`, collecting hyperlink targets into `links` in
/// the order their relationship ids are assigned.
fn document_xml(blocks: &[Block], links: &mut Vec<String>) -> Result<Vec<u8>, quick_xml::Error> {
    let mut writer = xml_writer()?;
    let mut root = BytesStart::new("w:document");
    root.push_attribute(("xmlns:w", NS_W));
    root.push_attribute(("xmlns:r", NS_R));
    writer.write_event(Event::Start(root))?;
    writer.write_event(Event::Start(BytesStart::new("w:body")))?;

    for block in blocks {
        match block {
            Block::Title(text) => write_styled_paragraph(&mut writer, "Title", text)?,
            Block::Subtitle(text) => write_styled_paragraph(&mut writer, "Subtitle", text)?,
            Block::Heading(text) => write_styled_paragraph(&mut writer, "Heading1", text)?,
            Block::Paragraph(runs) => write_paragraph(&mut writer, None, runs, links)?,
            Block::Bullet(runs) => write_paragraph(&mut writer, Some("ListBullet"), runs, links)?,
        }
    }

    write_section_properties(&mut writer)?;
    writer.write_event(Event::End(BytesEnd::new("w:body")))?;
    writer.write_event(Event::End(BytesEnd::new("w:document")))?;
    Ok(writer.into_inner().into_inner())
}

fn write_styled_paragraph<W: Write>(writer: &mut Writer<W>, style: &str, text: &str) -> XmlResult {
    let mut no_links = Vec::new();
    write_paragraph(writer, Some(style), &[Run::plain(text)], &mut no_links)
}

fn write_paragraph<W: Write>(
    writer: &mut Writer<W>,
    style: Option<&str>,
    runs: &[Run],
    links: &mut Vec<String>,
) -> XmlResult {
    writer.write_event(Event::Start(BytesStart::new("w:p")))?;

    if let Some(style) = style {
        writer.write_event(Event::Start(BytesStart::new("w:pPr")))?;
        write_val(writer, "w:pStyle", style)?;
        writer.write_event(Event::End(BytesEnd::new("w:pPr")))?;
    }

    for run in runs {
        match &run.link {
            Some(target) => {
                let id = format!("rId{}", FIRST_LINK_RID + links.len());
                links.push(target.clone());

                let mut hyperlink = BytesStart::new("w:hyperlink");
                hyperlink.push_attribute(("r:id", id.as_str()));
                writer.write_event(Event::Start(hyperlink))?;
                write_run(writer, run)?;
                writer.write_event(Event::End(BytesEnd::new("w:hyperlink")))?;
            }
            None => write_run(writer, run)?,
        }
    }

    writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}

fn write_run<W: Write>(writer: &mut Writer<W>, run: &Run) -> XmlResult {
    writer.write_event(Event::Start(BytesStart::new("w:r")))?;

    if run.bold || run.italic || run.link.is_some() {
        writer.write_event(Event::Start(BytesStart::new("w:rPr")))?;
        if run.link.is_some() {
            write_val(writer, "w:rStyle", "Hyperlink")?;
        }
        if run.bold {
            writer.write_event(Event::Empty(BytesStart::new("w:b")))?;
        }
        if run.italic {
            writer.write_event(Event::Empty(BytesStart::new("w:i")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:rPr")))?;
    }

    // Embedded newlines and vertical tabs become line breaks inside the same run.
    for (i, line) in run.text.split(['\n', '\u{b}']).enumerate() {
        if i > 0 {
            writer.write_event(Event::Empty(BytesStart::new("w:br")))?;
        }
        let mut text = BytesStart::new("w:t");
        text.push_attribute(("xml:space", "preserve"));
        write_text_element(writer, text, line)?;
    }

    writer.write_event(Event::End(BytesEnd::new("w:r")))?;
    Ok(())
}

fn write_section_properties<W: Write>(writer: &mut Writer<W>) -> XmlResult {
    writer.write_event(Event::Start(BytesStart::new("w:sectPr")))?;

    let mut size = BytesStart::new("w:pgSz");
    size.push_attribute(("w:w", PAGE_WIDTH_TWIPS));
    size.push_attribute(("w:h", PAGE_HEIGHT_TWIPS));
    writer.write_event(Event::Empty(size))?;

    let mut margins = BytesStart::new("w:pgMar");
    for side in ["w:top", "w:right", "w:bottom", "w:left"] {
        margins.push_attribute((side, PAGE_MARGIN_TWIPS));
    }
    margins.push_attribute(("w:header", "708"));
    margins.push_attribute(("w:footer", "708"));
    margins.push_attribute(("w:gutter", "0"));
    writer.write_event(Event::Empty(margins))?;

    writer.write_event(Event::End(BytesEnd::new("w:sectPr")))?;
    Ok(())
}

fn write_val<W: Write>(writer: &mut Writer<W>, name: &str, value: &str) -> XmlResult {
    let mut elem = BytesStart::new(name);
    elem.push_attribute(("w:val", value));
    writer.write_event(Event::Empty(elem))?;
    Ok(())
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, start: BytesStart, value: &str) -> XmlResult {
    let end = start.to_end().into_owned();
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(&xml_safe(value))))?;
    writer.write_event(Event::End(end))?;
    Ok(())
}

/// Drops the control characters XML 1.0 cannot carry. Tab, LF and CR stay.
fn xml_safe(value: &str) -> Cow<'_, str> {
    if value.chars().any(is_xml_illegal) {
        Cow::Owned(value.chars().filter(|c| !is_xml_illegal(*c)).collect())
    } else {
        Cow::Borrowed(value)
    }
}

fn is_xml_illegal(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}'
    )
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use chrono::TimeZone;
    use zip::ZipArchive;

    use super::*;
    use crate::export::flow_doc::build_blocks;
    use crate::models::Resume;

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut out = String::new();
        part.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_archive_contains_all_parts() {
        let bytes = encode_docx(&build_blocks(&Resume::sample()), "Alex Student", created()).unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort_unstable();
        assert_eq!(
            names,
            vec![
                "[Content_Types].xml",
                "_rels/.rels",
                "docProps/core.xml",
                "word/_rels/document.xml.rels",
                "word/document.xml",
                "word/numbering.xml",
                "word/styles.xml",
            ]
        );
    }

    #[test]
    fn test_document_body_carries_styles_and_text() {
        let bytes = encode_docx(&build_blocks(&Resume::sample()), "Alex Student", created()).unwrap();
        let document = read_part(&bytes, "word/document.xml");

        assert!(document.contains(r#"<w:pStyle w:val="Title"/>"#));
        assert!(document.contains(r#"<w:pStyle w:val="Heading1"/>"#));
        assert!(document.contains(r#"<w:pStyle w:val="ListBullet"/>"#));
        assert!(document.contains("Alex Student"));
        assert!(document.contains("Work Experience"));
        assert!(document.contains("<w:b/>"));
        assert!(document.contains("<w:i/>"));
        assert!(document.contains(r#"<w:pgSz w:w="11906" w:h="16838"/>"#));
    }

    #[test]
    fn test_hyperlinks_get_external_relationships() {
        let bytes = encode_docx(&build_blocks(&Resume::sample()), "Alex Student", created()).unwrap();
        let document = read_part(&bytes, "word/document.xml");
        let rels = read_part(&bytes, "word/_rels/document.xml.rels");

        assert!(document.contains(r#"<w:hyperlink r:id="rId3">"#));
        assert!(rels.contains(r#"Id="rId3""#));
        assert!(rels.contains(r#"Target="tel:+15551234567""#));
        assert!(rels.contains(r#"Target="mailto:alex@example.com""#));
        assert!(rels.contains(r#"Target="https://github.com/alex""#));
        assert!(rels.contains(r#"TargetMode="External""#));
        assert!(rels.contains(r#"Target="styles.xml""#));
    }

    #[test]
    fn test_text_is_escaped_and_line_breaks_preserved() {
        let blocks = vec![
            Block::Title("R&D <Lead>".to_string()),
            Block::Paragraph(vec![Run::plain("line one\nline two")]),
        ];
        let bytes = encode_docx(&blocks, "R&D", created()).unwrap();
        let document = read_part(&bytes, "word/document.xml");

        assert!(document.contains("R&amp;D &lt;Lead&gt;"));
        assert!(document.contains(
            r#"<w:t xml:space="preserve">line one</w:t><w:br/><w:t xml:space="preserve">line two</w:t>"#
        ));
    }

    #[test]
    fn test_control_characters_never_reach_the_package() {
        let mut resume = Resume::sample();
        resume.summary = "Line one\u{b}Line two\u{1}\u{c}".to_string();
        resume.name = "Ada\u{7}Lovelace".to_string();
        let bytes = encode_docx(&build_blocks(&resume), &resume.name, created()).unwrap();

        for part in ["word/document.xml", "docProps/core.xml", "word/_rels/document.xml.rels"] {
            let xml = read_part(&bytes, part);
            assert!(!xml.chars().any(is_xml_illegal), "{part} carries an illegal character");
        }

        let document = read_part(&bytes, "word/document.xml");
        assert!(document.contains(
            r#"<w:t xml:space="preserve">Line one</w:t><w:br/><w:t xml:space="preserve">Line two</w:t>"#
        ));
        assert!(document.contains("AdaLovelace"));
        assert!(read_part(&bytes, "docProps/core.xml").contains("<dc:title>AdaLovelace</dc:title>"));
    }

    #[test]
    fn test_core_properties_record_title_and_timestamp() {
        let bytes = encode_docx(&[], "Full Name", created()).unwrap();
        let core = read_part(&bytes, "docProps/core.xml");
        assert!(core.contains("<dc:title>Full Name</dc:title>"));
        assert!(core.contains("2024-03-01T12:00:00Z"));
    }
}
