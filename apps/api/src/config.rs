use anyhow::{Context, Result};

/// Default upload ceiling for resume files and request bodies: 5 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
/// Default ceiling on resume text sent to the model.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 50_000;
/// Profile photos larger than 2 MiB are rejected.
pub const DEFAULT_MAX_PHOTO_BYTES: usize = 2 * 1024 * 1024;
/// Sessions idle for an hour are dropped.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60;

/// Application configuration loaded from environment variables.
///
/// The Gemini key is optional at startup: a missing key is reported per request
/// as a missing-credential error so the rest of the service stays usable.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
    pub max_input_chars: usize,
    pub max_photo_bytes: usize,
    pub llm_max_attempts: u32,
    /// Idle lifetime of a session in seconds; 0 keeps sessions until deleted.
    pub session_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            port: parse_env("PORT", 8080u16).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            max_input_chars: parse_env("MAX_INPUT_CHARS", DEFAULT_MAX_INPUT_CHARS)
                .context("MAX_INPUT_CHARS must be a character count")?,
            max_photo_bytes: parse_env("MAX_PHOTO_BYTES", DEFAULT_MAX_PHOTO_BYTES)
                .context("MAX_PHOTO_BYTES must be a byte count")?,
            llm_max_attempts: parse_env("LLM_MAX_ATTEMPTS", 1u32)
                .context("LLM_MAX_ATTEMPTS must be a positive integer")?
                .max(1),
            session_ttl_secs: parse_env("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)
                .context("SESSION_TTL_SECS must be a number of seconds")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gemini_api_key: None,
            port: 8080,
            rust_log: "info".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            max_photo_bytes: DEFAULT_MAX_PHOTO_BYTES,
            llm_max_attempts: 1,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }
}

/// Blank values count as unset, so `GEMINI_API_KEY=` in a .env file behaves like no key.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Invalid value '{raw}' for environment variable '{key}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let config = Config::default();
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.max_photo_bytes, 2 * 1024 * 1024);
        assert_eq!(config.llm_max_attempts, 1);
        assert_eq!(config.session_ttl_secs, 3600);
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn test_parse_env_falls_back_to_default_when_unset() {
        let value: u16 = parse_env("CV_ARCHITECT_TEST_UNSET_VAR", 4242).unwrap();
        assert_eq!(value, 4242);
    }
}
