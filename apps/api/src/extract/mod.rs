//! Text extraction from uploaded resume files.
//!
//! Supported: plain text / markdown, PDF (`pdf-extract`) and DOCX (`docx-rs`).
//! Extraction is synchronous and CPU-bound; handlers call it through
//! `tokio::task::spawn_blocking`.

mod docx;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("File is {size} bytes; the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("Unsupported file type: {0}. Upload a .txt, .md, .pdf or .docx file")]
    Unsupported(String),

    #[error("Could not read PDF: {0}")]
    Pdf(String),

    #[error("Could not read DOCX: {0}")]
    Docx(String),

    #[error("No text could be extracted from the file")]
    NoText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Text,
    Pdf,
    Docx,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedDocument {
    pub file_name: String,
    pub kind: DocumentKind,
    pub text: String,
}

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Works out the document kind from the file name, then the declared content
/// type, then the leading bytes.
pub fn detect_kind(
    file_name: &str,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<DocumentKind, ExtractError> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("txt") | Some("md") | Some("markdown") | Some("text") => return Ok(DocumentKind::Text),
        Some("pdf") => return Ok(DocumentKind::Pdf),
        Some("docx") => return Ok(DocumentKind::Docx),
        _ => {}
    }

    let content_type = content_type
        .map(|c| c.split(';').next().unwrap_or(c).trim().to_ascii_lowercase())
        .unwrap_or_default();
    match content_type.as_str() {
        "text/plain" | "text/markdown" => return Ok(DocumentKind::Text),
        "application/pdf" => return Ok(DocumentKind::Pdf),
        DOCX_MIME => return Ok(DocumentKind::Docx),
        _ => {}
    }

    if bytes.starts_with(b"%PDF-") {
        Ok(DocumentKind::Pdf)
    } else if bytes.starts_with(b"PK\x03\x04") {
        Ok(DocumentKind::Docx)
    } else {
        Err(ExtractError::Unsupported(file_name.to_string()))
    }
}

/// Extracts normalized plain text from an uploaded file.
pub fn extract_text(
    file_name: &str,
    content_type: Option<&str>,
    bytes: &[u8],
    max_bytes: usize,
) -> Result<ExtractedDocument, ExtractError> {
    if bytes.len() > max_bytes {
        return Err(ExtractError::TooLarge {
            size: bytes.len(),
            limit: max_bytes,
        });
    }

    let kind = detect_kind(file_name, content_type, bytes)?;
    let raw = match kind {
        DocumentKind::Text => String::from_utf8_lossy(bytes).into_owned(),
        DocumentKind::Pdf => extract_pdf(bytes)?,
        DocumentKind::Docx => docx::extract_docx(bytes)?,
    };

    let text = normalize_text(&raw);
    if text.is_empty() {
        return Err(ExtractError::NoText);
    }
    debug!(
        "Extracted {} chars from {:?} file '{}'",
        text.chars().count(),
        kind,
        file_name
    );

    Ok(ExtractedDocument {
        file_name: file_name.to_string(),
        kind,
        text,
    })
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    // pdf-extract panics on some malformed inputs instead of returning an error.
    let result = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));
    match result {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ExtractError::Pdf(e.to_string())),
        Err(_) => Err(ExtractError::Pdf("the PDF structure is not supported".to_string())),
    }
}

/// CRLF → LF, strips a BOM, trims line ends and collapses blank-line runs.
pub fn normalize_text(raw: &str) -> String {
    let raw = raw.trim_start_matches('\u{feff}');
    let mut out = String::with_capacity(raw.len());
    let mut blank_run = 0usize;

    for line in raw.replace("\r\n", "\n").replace('\r', "\n").lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
            if blank_run > 0 {
                out.push('\n');
            }
        }
        blank_run = 0;
        out.push_str(line);
    }
    out
}
