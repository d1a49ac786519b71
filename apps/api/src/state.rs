use std::sync::Arc;

use crate::config::Config;
use crate::session::SessionStore;
use crate::transform::CvTransformer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable rewrite service. Default: GeminiTransformer; tests swap in a stub.
    pub transformer: Arc<dyn CvTransformer>,
    pub sessions: SessionStore,
}
