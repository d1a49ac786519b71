//! Per-user workflow state: Input → Processing → Preview ⇄ Editing, with Error
//! as the failure branch of Processing.
//!
//! Sessions are in-memory only and vanish on restart or after sitting idle
//! longer than the configured TTL. Every transition takes
//! the write lock briefly; the rewrite itself runs between
//! [`SessionStore::begin_processing`] and [`SessionStore::finish_processing`]
//! with no lock held.

pub mod handlers;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::edit::{apply_all, EditCommand};
use crate::errors::{AppError, TRANSFORM_FAILED_MESSAGE};
use crate::models::CvData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Input,
    Processing,
    Preview,
    Editing,
    Error,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub phase: Phase,
    /// Resume text as typed or extracted, kept across retries.
    pub draft_text: String,
    /// Last successful rewrite, or the last saved edit.
    pub cv: Option<CvData>,
    /// Working copy while `phase == Editing`.
    pub draft: Option<CvData>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Monotonic twin of `updated_at`, used for idle expiry.
    #[serde(skip)]
    last_active: Instant,
}

impl Session {
    fn new() -> Self {
        let now = Utc::now();
        Session {
            id: Uuid::new_v4(),
            phase: Phase::Input,
            draft_text: String::new(),
            cv: None,
            draft: None,
            error: None,
            created_at: now,
            updated_at: now,
            last_active: Instant::now(),
        }
    }

    fn expect_phase(&self, allowed: &[Phase], action: &str) -> Result<(), AppError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(AppError::Conflict(format!(
                "Cannot {action} while the session is in the {:?} phase",
                self.phase
            )))
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.last_active = Instant::now();
    }

    /// The record an export should render: the live draft while editing.
    pub fn exportable(&self) -> Result<CvData, AppError> {
        match self.phase {
            Phase::Preview => self.cv.clone(),
            Phase::Editing => self.draft.clone().map(CvData::sanitized),
            _ => None,
        }
        .ok_or_else(|| {
            AppError::Conflict(format!(
                "Nothing to export while the session is in the {:?} phase",
                self.phase
            ))
        })
    }
}

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> Session {
        let session = Session::new();
        self.inner.write().await.insert(session.id, session.clone());
        info!("Created session {}", session.id);
        session
    }

    pub async fn get(&self, id: Uuid) -> Result<Session, AppError> {
        self.inner
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.inner
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }

    /// Runs `f` against the session under the write lock and returns a snapshot.
    async fn update<F>(&self, id: Uuid, f: F) -> Result<Session, AppError>
    where
        F: FnOnce(&mut Session) -> Result<(), AppError>,
    {
        let mut sessions = self.inner.write().await;
        let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        f(session)?;
        session.touch();
        Ok(session.clone())
    }

    /// Stores text extracted from an uploaded file as the editable draft.
    pub async fn set_draft_text(&self, id: Uuid, text: String) -> Result<Session, AppError> {
        self.update(id, |s| {
            s.expect_phase(&[Phase::Input, Phase::Error], "load a file")?;
            s.phase = Phase::Input;
            s.error = None;
            s.draft_text = text;
            Ok(())
        })
        .await
    }

    /// Marks the session busy. A second submit while busy is a conflict.
    pub async fn begin_processing(&self, id: Uuid, text: String) -> Result<Session, AppError> {
        self.update(id, |s| {
            s.expect_phase(&[Phase::Input, Phase::Error], "submit")?;
            s.phase = Phase::Processing;
            s.error = None;
            s.draft_text = text;
            Ok(())
        })
        .await
    }

    /// Records the rewrite outcome. Failures of any kind surface to the user as
    /// the same fixed message; the cause is only logged.
    pub async fn finish_processing(
        &self,
        id: Uuid,
        outcome: Result<CvData, AppError>,
    ) -> Result<Session, AppError> {
        self.update(id, |s| {
            s.expect_phase(&[Phase::Processing], "finish processing")?;
            match outcome {
                Ok(cv) => {
                    s.cv = Some(cv);
                    s.phase = Phase::Preview;
                }
                Err(e) => {
                    error!("Transform failed for session {}: {e}", s.id);
                    s.error = Some(TRANSFORM_FAILED_MESSAGE.to_string());
                    s.phase = Phase::Error;
                }
            }
            Ok(())
        })
        .await
    }

    pub async fn retry(&self, id: Uuid) -> Result<Session, AppError> {
        self.update(id, |s| {
            s.expect_phase(&[Phase::Error], "retry")?;
            s.phase = Phase::Input;
            s.error = None;
            Ok(())
        })
        .await
    }

    /// Preview → Input. The record is kept so the text can be resubmitted.
    pub async fn back_to_input(&self, id: Uuid) -> Result<Session, AppError> {
        self.update(id, |s| {
            s.expect_phase(&[Phase::Preview], "return to input")?;
            s.phase = Phase::Input;
            Ok(())
        })
        .await
    }

    pub async fn begin_edit(&self, id: Uuid) -> Result<Session, AppError> {
        self.update(id, |s| {
            s.expect_phase(&[Phase::Preview], "edit")?;
            s.draft = s.cv.clone();
            s.phase = Phase::Editing;
            Ok(())
        })
        .await
    }

    /// Applies commands to the draft atomically: one bad command rejects the batch.
    pub async fn apply_edits(
        &self,
        id: Uuid,
        commands: Vec<EditCommand>,
    ) -> Result<Session, AppError> {
        self.update(id, |s| {
            s.expect_phase(&[Phase::Editing], "apply edits")?;
            let draft = s.draft.get_or_insert_with(CvData::default);
            apply_all(draft, commands)
        })
        .await
    }

    /// Sets or clears the draft photo (a data URL).
    pub async fn set_photo(&self, id: Uuid, photo: Option<String>) -> Result<Session, AppError> {
        self.update(id, |s| {
            s.expect_phase(&[Phase::Editing], "change the photo")?;
            s.draft.get_or_insert_with(CvData::default).photo = photo;
            Ok(())
        })
        .await
    }

    /// Editing → Preview with the sanitized draft as the new record.
    pub async fn save_edit(&self, id: Uuid) -> Result<Session, AppError> {
        self.update(id, |s| {
            s.expect_phase(&[Phase::Editing], "save")?;
            if let Some(draft) = s.draft.take() {
                s.cv = Some(draft.sanitized());
            }
            s.phase = Phase::Preview;
            Ok(())
        })
        .await
    }

    pub async fn cancel_edit(&self, id: Uuid) -> Result<Session, AppError> {
        self.update(id, |s| {
            s.expect_phase(&[Phase::Editing], "cancel editing")?;
            s.draft = None;
            s.phase = Phase::Preview;
            Ok(())
        })
        .await
    }

    pub async fn count(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Drops sessions unchanged for longer than `ttl` and returns how many went.
    /// A session in Processing is kept: its rewrite task still has to report back.
    pub async fn prune_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.phase == Phase::Processing || s.last_active.elapsed() <= ttl);
        before - sessions.len()
    }

    /// Sweeps idle sessions in the background, checking a few times per TTL.
    pub fn spawn_sweeper(&self, ttl: Duration) -> JoinHandle<()> {
        let store = self.clone();
        let period = (ttl / 4).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let expired = store.prune_idle(ttl).await;
                if expired > 0 {
                    info!(
                        "Expired {expired} idle sessions; {} remain",
                        store.count().await
                    );
                } else {
                    debug!("Session sweep found nothing idle");
                }
            }
        })
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}
