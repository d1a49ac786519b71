//! Preview and export of a `CvData` record: print-ready HTML, PDF and DOCX.

pub mod docx;
pub mod html;
pub mod pdf;

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::AppError;
use crate::models::CvData;

pub use docx::render_docx;
pub use html::render_html;
pub use pdf::render_pdf;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("DOCX generation failed: {0}")]
    Docx(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error(
        "PDF export supports Latin-script text only; export DOCX or HTML instead \
         (unsupported characters in: {0})"
    )]
    UnsupportedText(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Html,
    Pdf,
    Docx,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Html => "text/html; charset=utf-8",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }

    /// Download name built from the candidate's name, e.g. `Jane_Doe_CV.pdf`.
    pub fn filename(self, cv: &CvData) -> String {
        let stem: String = cv
            .full_name
            .split_whitespace()
            .map(|word| {
                word.chars()
                    .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '\''))
                    .collect::<String>()
            })
            .filter(|word| !word.is_empty())
            .collect::<Vec<_>>()
            .join("_");
        if stem.is_empty() {
            format!("CV.{}", self.extension())
        } else {
            format!("{stem}_CV.{}", self.extension())
        }
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(ExportFormat::Html),
            "pdf" => Ok(ExportFormat::Pdf),
            "docx" => Ok(ExportFormat::Docx),
            other => Err(AppError::NotFound(format!(
                "Unknown export format '{other}'. Use html, pdf or docx"
            ))),
        }
    }
}

/// Rendered document bytes plus the headers needed to serve them.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

/// Renders `cv` in the requested format. CPU-bound; call from a blocking task.
pub fn export(cv: &CvData, format: ExportFormat) -> Result<ExportedDocument, ExportError> {
    let bytes = match format {
        ExportFormat::Html => render_html(cv).into_bytes(),
        ExportFormat::Pdf => render_pdf(cv)?,
        ExportFormat::Docx => render_docx(cv)?,
    };
    tracing::debug!("Exported {:?} ({} bytes)", format, bytes.len());
    Ok(ExportedDocument {
        bytes,
        content_type: format.content_type(),
        filename: format.filename(cv),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> CvData {
        CvData {
            full_name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_filename_joins_name_words() {
        assert_eq!(ExportFormat::Pdf.filename(&named("Jane Doe")), "Jane_Doe_CV.pdf");
        assert_eq!(
            ExportFormat::Docx.filename(&named("  Omar   Al-Farsi ")),
            "Omar_Al-Farsi_CV.docx"
        );
    }

    #[test]
    fn test_filename_drops_path_characters() {
        assert_eq!(
            ExportFormat::Html.filename(&named("../etc/passwd \"x\"")),
            "etcpasswd_x_CV.html"
        );
        assert_eq!(ExportFormat::Pdf.filename(&named("   ")), "CV.pdf");
    }

    #[test]
    fn test_format_parses_case_insensitively() {
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!("docx".parse::<ExportFormat>().unwrap(), ExportFormat::Docx);
        assert!(matches!(
            "png".parse::<ExportFormat>(),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_export_sets_content_type() {
        let doc = export(&named("Jane Doe"), ExportFormat::Html).unwrap();
        assert_eq!(doc.content_type, "text/html; charset=utf-8");
        assert_eq!(doc.filename, "Jane_Doe_CV.html");
        assert!(String::from_utf8(doc.bytes).unwrap().contains("Jane Doe"));
    }
}
