//! Word document export.
//!
//! Every actionable line becomes a paragraph holding one hyperlink to a plain
//! search for the line; blank lines become blank paragraphs. Links use a
//! single character style registered once per document.

use docx_rs::{Docx, Hyperlink, HyperlinkType, Paragraph, Run, Style, StyleType};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use crate::models::Line;
use crate::utils::SearchEngine;

/// Default name of the exported file
pub const DEFAULT_FILE_NAME: &str = "interactive-document.docx";

/// Character style id used by link runs
pub const HYPERLINK_STYLE_ID: &str = "MyHyperlinkStyle";

/// Display name of the link style
pub const HYPERLINK_STYLE_NAME: &str = "My Hyperlink Style";

/// Link color (RGB hex, no leading `#`)
pub const HYPERLINK_COLOR: &str = "0056b3";

/// Errors that can occur while exporting
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The document could not be packed
    #[error("Failed to pack document: {0}")]
    Pack(String),

    /// IO error (file system)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid output file name
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),
}

/// A paragraph of the exported document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportParagraph {
    /// Plain text (blank lines)
    Plain(String),
    /// A hyperlinked run showing `text` and pointing at `url`
    Link { text: String, url: String },
}

/// Map lines to export paragraphs
pub fn export_paragraphs(lines: &[Line], engine: &SearchEngine) -> Vec<ExportParagraph> {
    lines
        .iter()
        .map(|line| {
            if line.actionable {
                ExportParagraph::Link {
                    text: line.raw.clone(),
                    url: engine.search_url(&line.trimmed),
                }
            } else {
                ExportParagraph::Plain(line.raw.clone())
            }
        })
        .collect()
}

fn hyperlink_style() -> Style {
    Style::new(HYPERLINK_STYLE_ID, StyleType::Character)
        .name(HYPERLINK_STYLE_NAME)
        .based_on("DefaultParagraphFont")
        .color(HYPERLINK_COLOR)
        .underline("single")
}

fn to_docx_paragraph(paragraph: &ExportParagraph) -> Paragraph {
    match paragraph {
        ExportParagraph::Plain(text) => Paragraph::new().add_run(Run::new().add_text(text)),
        ExportParagraph::Link { text, url } => Paragraph::new().add_hyperlink(
            Hyperlink::new(url, HyperlinkType::External)
                .add_run(Run::new().add_text(text).style(HYPERLINK_STYLE_ID)),
        ),
    }
}

/// Build the document in memory and return the packed `.docx` bytes
pub fn build_document(lines: &[Line], engine: &SearchEngine) -> Result<Vec<u8>, ExportError> {
    let paragraphs = export_paragraphs(lines, engine);

    let docx = paragraphs
        .iter()
        .fold(Docx::new().add_style(hyperlink_style()), |docx, p| {
            docx.add_paragraph(to_docx_paragraph(p))
        });

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| ExportError::Pack(e.to_string()))?;

    tracing::debug!(
        paragraphs = paragraphs.len(),
        bytes = buffer.get_ref().len(),
        "Packed document"
    );
    Ok(buffer.into_inner())
}

/// Build the document and write it to `dir/file_name`.
///
/// The bytes go to a temporary file first and are moved into place only once
/// complete, so a failed export never leaves a partial file.
pub fn export_to_file(
    lines: &[Line],
    engine: &SearchEngine,
    dir: &Path,
    file_name: &str,
) -> Result<PathBuf, ExportError> {
    let is_plain_name = Path::new(file_name)
        .file_name()
        .map(|name| name == file_name)
        .unwrap_or(false);
    if !is_plain_name {
        return Err(ExportError::InvalidFileName(file_name.to_string()));
    }

    let bytes = build_document(lines, engine)?;

    fs::create_dir_all(dir)?;
    let target = dir.join(file_name);
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.flush()?;
    tmp.persist(&target).map_err(|e| ExportError::Io(e.error))?;

    tracing::info!("Exported {} lines to {}", lines.len(), target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::segment;
    use tempfile::tempdir;

    #[test]
    fn test_paragraph_mapping() {
        let lines = segment("Hello\n\ncat dog");
        let paragraphs = export_paragraphs(&lines, &SearchEngine::default());

        assert_eq!(
            paragraphs,
            vec![
                ExportParagraph::Link {
                    text: "Hello".to_string(),
                    url: "https://www.google.com/search?q=Hello".to_string(),
                },
                ExportParagraph::Plain(String::new()),
                ExportParagraph::Link {
                    text: "cat dog".to_string(),
                    url: "https://www.google.com/search?q=cat%20dog".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_link_keeps_raw_text_but_searches_trimmed() {
        let lines = segment("   padded  ");
        let paragraphs = export_paragraphs(&lines, &SearchEngine::default());
        assert_eq!(
            paragraphs[0],
            ExportParagraph::Link {
                text: "   padded  ".to_string(),
                url: "https://www.google.com/search?q=padded".to_string(),
            }
        );
    }

    #[test]
    fn test_whitespace_line_stays_plain() {
        let lines = segment(" \t ");
        let paragraphs = export_paragraphs(&lines, &SearchEngine::default());
        assert_eq!(paragraphs, vec![ExportParagraph::Plain(" \t ".to_string())]);
    }

    #[test]
    fn test_build_document_is_zip() {
        let lines = segment("Hello\n\ncat dog");
        let bytes = build_document(&lines, &SearchEngine::default()).unwrap();
        assert!(bytes.len() > 4);
        assert_eq!(&bytes[..2], b"PK");
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        use std::io::Read;
        use zip::ZipArchive;

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut xml = String::new();
        entry.read_to_string(&mut xml).unwrap();
        xml
    }

    fn count_elements(xml: &str, tag: &str) -> usize {
        let open = format!("<{}", tag);
        xml.match_indices(&open)
            .filter(|(i, _)| {
                matches!(
                    xml[i + open.len()..].chars().next(),
                    Some(' ') | Some('>') | Some('/')
                )
            })
            .count()
    }

    #[test]
    fn test_document_contents() {
        let lines = segment("Hello\n\n  cat dog");
        let bytes = build_document(&lines, &SearchEngine::default()).unwrap();

        let document = read_part(&bytes, "word/document.xml");
        assert_eq!(count_elements(&document, "w:p"), 3);
        assert_eq!(count_elements(&document, "w:hyperlink"), 2);
        assert_eq!(
            document.matches(&format!("w:val=\"{}\"", HYPERLINK_STYLE_ID)).count(),
            2
        );
        assert!(document.contains(">Hello</w:t>"));
        assert!(document.contains("xml:space=\"preserve\">  cat dog</w:t>"));
        let hello = document.find(">Hello<").unwrap();
        let cat = document.find(">  cat dog<").unwrap();
        assert!(hello < cat);

        let rels = read_part(&bytes, "word/_rels/document.xml.rels");
        assert!(rels.contains("Target=\"https://www.google.com/search?q=Hello\""));
        assert!(rels.contains("Target=\"https://www.google.com/search?q=cat%20dog\""));
        assert!(rels.contains("TargetMode=\"External\""));

        let styles = read_part(&bytes, "word/styles.xml");
        assert_eq!(
            styles.matches(&format!("w:styleId=\"{}\"", HYPERLINK_STYLE_ID)).count(),
            1
        );
        assert!(styles.contains(HYPERLINK_STYLE_NAME));
        assert!(styles.contains("w:type=\"character\""));
        assert!(styles.contains("DefaultParagraphFont"));
        assert!(styles.contains(&format!("w:val=\"{}\"", HYPERLINK_COLOR)));
        assert!(styles.contains("<w:u w:val=\"single\""));
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempdir().unwrap();
        let lines = segment("one\ntwo");
        let path =
            export_to_file(&lines, &SearchEngine::default(), dir.path(), DEFAULT_FILE_NAME)
                .unwrap();

        assert_eq!(path, dir.path().join("interactive-document.docx"));
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_export_rejects_path_in_file_name() {
        let dir = tempdir().unwrap();
        let lines = segment("one");
        let result = export_to_file(&lines, &SearchEngine::default(), dir.path(), "../escape.docx");
        assert!(matches!(result, Err(ExportError::InvalidFileName(_))));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
