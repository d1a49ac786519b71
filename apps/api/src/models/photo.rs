//! Profile photos, carried inside `CvData` as base64 data URLs.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PhotoError {
    #[error("File is too large. Please upload an image smaller than {limit_mib}MB.")]
    TooLarge { limit_mib: usize },

    #[error("Expected an image upload, got '{0}'")]
    NotAnImage(String),

    #[error("The photo is empty")]
    Empty,

    #[error("Malformed photo data URL")]
    MalformedDataUrl,
}

/// A decoded photo: mime type plus raw image bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Photo {
    /// Validates an uploaded image and returns it ready to be stored as a data URL.
    pub fn from_upload(bytes: Vec<u8>, mime: &str, max_bytes: usize) -> Result<Self, PhotoError> {
        let mime = mime.trim().to_ascii_lowercase();
        if !mime.starts_with("image/") {
            return Err(PhotoError::NotAnImage(mime));
        }
        if bytes.is_empty() {
            return Err(PhotoError::Empty);
        }
        if bytes.len() > max_bytes {
            return Err(PhotoError::TooLarge {
                limit_mib: (max_bytes / (1024 * 1024)).max(1),
            });
        }
        Ok(Photo { mime, bytes })
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }

    /// Parses `data:<mime>;base64,<payload>`.
    pub fn decode(data_url: &str) -> Result<Self, PhotoError> {
        let rest = data_url
            .strip_prefix("data:")
            .ok_or(PhotoError::MalformedDataUrl)?;
        let (meta, payload) = rest.split_once(',').ok_or(PhotoError::MalformedDataUrl)?;
        let mime = meta
            .strip_suffix(";base64")
            .ok_or(PhotoError::MalformedDataUrl)?;
        if !mime.starts_with("image/") {
            return Err(PhotoError::NotAnImage(mime.to_string()));
        }
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|_| PhotoError::MalformedDataUrl)?;
        if bytes.is_empty() {
            return Err(PhotoError::Empty);
        }
        Ok(Photo {
            mime: mime.to_string(),
            bytes,
        })
    }
}
