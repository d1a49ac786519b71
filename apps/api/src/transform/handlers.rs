//! Stateless endpoints: extract, transform and render without a session.

use axum::{
    extract::{Multipart, Path, State},
    response::Response,
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::extract::ExtractedDocument;
use crate::models::cv::RawCvData;
use crate::models::CvData;
use crate::render::ExportFormat;
use crate::routes::files::{export_response, extract_upload, read_upload};
use crate::state::AppState;
use crate::transform::validate_input;

#[derive(Debug, Deserialize)]
pub struct TransformRequest {
    pub text: String,
}

/// POST /api/v1/extract
pub async fn handle_extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractedDocument>, AppError> {
    let upload = read_upload(multipart).await?;
    let document = extract_upload(upload, state.config.max_upload_bytes).await?;
    Ok(Json(document))
}

/// POST /api/v1/transform
pub async fn handle_transform(
    State(state): State<AppState>,
    Json(req): Json<TransformRequest>,
) -> Result<Json<CvData>, AppError> {
    let text = validate_input(&req.text, state.config.max_input_chars)?;
    let cv = state.transformer.transform(text).await?;
    Ok(Json(cv))
}

/// POST /api/v1/render/:format
///
/// The posted record gets the same clean-up as a model response, so an
/// out-of-range `atsScore` is clamped before it is printed.
pub async fn handle_render(
    Path(format): Path<String>,
    Json(raw): Json<RawCvData>,
) -> Result<Response, AppError> {
    let format: ExportFormat = format.parse()?;
    export_response(CvData::from(raw), format).await
}
