//! Axum route handlers for the session workflow.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::edit::EditCommand;
use crate::errors::AppError;
use crate::models::Photo;
use crate::render::ExportFormat;
use crate::routes::files::{export_response, extract_upload, read_upload};
use crate::session::Session;
use crate::state::AppState;
use crate::transform::validate_input;

#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
    /// Falls back to the session's draft text (e.g. from an upload) when absent.
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub commands: Vec<EditCommand>,
}

/// POST /api/v1/sessions
pub async fn handle_create(State(state): State<AppState>) -> (StatusCode, Json<Session>) {
    (StatusCode::CREATED, Json(state.sessions.create().await))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, AppError> {
    Ok(Json(state.sessions.get(id).await?))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<Session>, AppError> {
    // Fail fast on the phase before spending time on extraction.
    let phase = state.sessions.get(id).await?.phase;
    if !matches!(phase, super::Phase::Input | super::Phase::Error) {
        return Err(AppError::Conflict(format!(
            "Cannot load a file while the session is in the {phase:?} phase"
        )));
    }
    let upload = read_upload(multipart).await?;
    let document = extract_upload(upload, state.config.max_upload_bytes).await?;
    Ok(Json(state.sessions.set_draft_text(id, document.text).await?))
}

/// POST /api/v1/sessions/:id/submit
///
/// Responds once the rewrite has finished, with the session in either the
/// preview or the error phase.
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<Session>, AppError> {
    let text = match req.text {
        Some(text) => text,
        None => state.sessions.get(id).await?.draft_text,
    };
    let text = validate_input(&text, state.config.max_input_chars)?.to_string();
    state.sessions.begin_processing(id, text.clone()).await?;

    // Detached so a dropped connection cannot strand the session in Processing.
    let task = tokio::spawn(async move {
        let outcome = state.transformer.transform(&text).await;
        state.sessions.finish_processing(id, outcome).await
    });
    let session = task
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Transform task failed: {e}")))??;
    Ok(Json(session))
}

/// POST /api/v1/sessions/:id/retry
pub async fn handle_retry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, AppError> {
    Ok(Json(state.sessions.retry(id).await?))
}

/// POST /api/v1/sessions/:id/back
pub async fn handle_back(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, AppError> {
    Ok(Json(state.sessions.back_to_input(id).await?))
}

/// POST /api/v1/sessions/:id/edit
pub async fn handle_begin_edit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, AppError> {
    Ok(Json(state.sessions.begin_edit(id).await?))
}

/// PATCH /api/v1/sessions/:id/edit
pub async fn handle_apply_edits(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EditRequest>,
) -> Result<Json<Session>, AppError> {
    Ok(Json(state.sessions.apply_edits(id, req.commands).await?))
}

/// POST /api/v1/sessions/:id/edit/photo
pub async fn handle_upload_photo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<Session>, AppError> {
    let upload = read_upload(multipart).await?;
    let mime = upload.content_type.unwrap_or_default();
    let photo = Photo::from_upload(upload.bytes.to_vec(), &mime, state.config.max_photo_bytes)?;
    Ok(Json(
        state.sessions.set_photo(id, Some(photo.to_data_url())).await?,
    ))
}

/// DELETE /api/v1/sessions/:id/edit/photo
pub async fn handle_remove_photo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, AppError> {
    Ok(Json(state.sessions.set_photo(id, None).await?))
}

/// POST /api/v1/sessions/:id/edit/save
pub async fn handle_save_edit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, AppError> {
    Ok(Json(state.sessions.save_edit(id).await?))
}

/// POST /api/v1/sessions/:id/edit/cancel
pub async fn handle_cancel_edit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, AppError> {
    Ok(Json(state.sessions.cancel_edit(id).await?))
}

/// GET /api/v1/sessions/:id/export/:format
pub async fn handle_export(
    State(state): State<AppState>,
    Path((id, format)): Path<(Uuid, String)>,
) -> Result<Response, AppError> {
    let format: ExportFormat = format.parse()?;
    let cv = state.sessions.get(id).await?.exportable()?;
    export_response(cv, format).await
}
