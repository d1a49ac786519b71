//! Multipart uploads in, rendered documents out.

use axum::{
    extract::{multipart::MultipartError, Multipart},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use crate::errors::AppError;
use crate::extract::{extract_text, ExtractedDocument};
use crate::models::CvData;
use crate::render::{export, ExportFormat};

/// Name of the multipart field carrying the file.
pub const FILE_FIELD: &str = "file";

pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("Invalid multipart body: {}", e.body_text()))
    }
}

/// Reads the first `file` field of a multipart body; other fields are skipped.
pub async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(Upload {
            file_name,
            content_type,
            bytes,
        });
    }
    Err(AppError::Validation(format!(
        "Multipart body has no '{FILE_FIELD}' field"
    )))
}

/// Text extraction on the blocking pool.
pub async fn extract_upload(
    upload: Upload,
    max_bytes: usize,
) -> Result<ExtractedDocument, AppError> {
    let document = tokio::task::spawn_blocking(move || {
        extract_text(
            &upload.file_name,
            upload.content_type.as_deref(),
            &upload.bytes,
            max_bytes,
        )
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Extraction task failed: {e}")))??;
    Ok(document)
}

/// Renders on the blocking pool and wraps the bytes with download headers.
/// HTML is served inline so it can be previewed and printed from the browser.
pub async fn export_response(cv: CvData, format: ExportFormat) -> Result<Response, AppError> {
    let document = tokio::task::spawn_blocking(move || export(&cv, format))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Export task failed: {e}")))??;

    let disposition = match format {
        ExportFormat::Html => "inline",
        ExportFormat::Pdf | ExportFormat::Docx => "attachment",
    };
    let disposition = HeaderValue::from_str(&format!(
        "{disposition}; filename=\"{}\"",
        document.filename
    ))
    .map_err(|e| AppError::Internal(e.into()))?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static(document.content_type),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    )
        .into_response())
}
