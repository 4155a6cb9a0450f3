use std::sync::Arc;

use crate::config::Config;
use crate::editing::ResumeSession;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The single live resume. All edits and exports go through it.
    pub session: Arc<ResumeSession>,
    pub config: Config,
}
