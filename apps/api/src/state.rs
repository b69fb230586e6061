use std::sync::Arc;

use crate::config::Config;
use crate::feedback::service::FeedbackService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Owns the dataset store and the sentiment pipeline.
    pub feedback: Arc<FeedbackService>,
}
