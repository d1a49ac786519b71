//! CV rewrite: pluggable, trait-based transformer from raw resume text to `CvData`.
//!
//! Default: `GeminiTransformer` (calls the model through `llm_client`).
//! `AppState` holds an `Arc<dyn CvTransformer>` so tests can swap in a stub.

pub mod handlers;

use async_trait::async_trait;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::{build_transform_prompt, cv_response_schema, CV_SYSTEM_INSTRUCTION};
use crate::llm_client::{JsonRequest, LlmClient, LlmError};
use crate::models::cv::RawCvData;
use crate::models::CvData;

/// The transformer trait. Implement this to swap backends without touching
/// the endpoint, handler, or caller code.
#[async_trait]
pub trait CvTransformer: Send + Sync {
    async fn transform(&self, cv_text: &str) -> Result<CvData, AppError>;
}

pub struct GeminiTransformer {
    llm: LlmClient,
    schema: serde_json::Value,
}

impl GeminiTransformer {
    pub fn new(llm: LlmClient) -> Self {
        Self {
            llm,
            schema: cv_response_schema(),
        }
    }
}

#[async_trait]
impl CvTransformer for GeminiTransformer {
    async fn transform(&self, cv_text: &str) -> Result<CvData, AppError> {
        if !self.llm.has_api_key() {
            return Err(AppError::MissingCredential);
        }

        let prompt = build_transform_prompt(cv_text);
        let raw: RawCvData = self
            .llm
            .call_json(JsonRequest {
                system: CV_SYSTEM_INSTRUCTION,
                prompt: &prompt,
                schema: Some(&self.schema),
            })
            .await
            .map_err(|e| match e {
                LlmError::MissingApiKey => AppError::MissingCredential,
                other => AppError::Llm(format!("CV transformation failed: {other}")),
            })?;

        let cv = CvData::from(raw);
        info!(
            "CV transformed: {} experience entries, {} skills, ats_score={:?}",
            cv.experience.len(),
            cv.skills.len(),
            cv.ats_score
        );
        Ok(cv)
    }
}

/// Checks submitted text before it reaches the model and returns it trimmed.
pub fn validate_input(text: &str, max_chars: usize) -> Result<&str, AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("CV text cannot be empty".to_string()));
    }
    let chars = text.chars().count();
    if chars > max_chars {
        return Err(AppError::PayloadTooLarge(format!(
            "CV text is {chars} characters; the limit is {max_chars}"
        )));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_input_rejects_blank_text() {
        assert!(matches!(
            validate_input(" \n\t ", 100),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_input_counts_characters_not_bytes() {
        let text = "é".repeat(10);
        assert!(validate_input(&text, 10).is_ok());
        assert!(matches!(
            validate_input(&text, 9),
            Err(AppError::PayloadTooLarge(_))
        ));
    }

    #[test]
    fn test_validate_input_trims() {
        assert_eq!(validate_input("  Jane Doe \n", 100).unwrap(), "Jane Doe");
    }

    #[tokio::test]
    async fn test_gemini_transformer_without_key_is_missing_credential() {
        let transformer = GeminiTransformer::new(LlmClient::new(None, 1));
        let err = transformer.transform("Jane Doe").await.unwrap_err();
        assert!(matches!(err, AppError::MissingCredential));
    }
}
