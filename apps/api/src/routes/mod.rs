pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::editing::handlers as editing;
use crate::export::handlers as export;
use crate::layout::handlers as layout;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Editing
        .route(
            "/api/v1/resume",
            get(editing::handle_get_resume).patch(editing::handle_edit_field),
        )
        .route("/api/v1/resume/field", get(editing::handle_get_field))
        .route("/api/v1/resume/lists/:list", post(editing::handle_append))
        .route(
            "/api/v1/resume/lists/:list/:index",
            delete(editing::handle_remove),
        )
        .route(
            "/api/v1/resume/lists/:list/:index/dates",
            put(editing::handle_set_dates),
        )
        .route(
            "/api/v1/resume/skills/commit",
            post(editing::handle_commit_skills),
        )
        .route(
            "/api/v1/resume/skills/clear",
            post(editing::handle_clear_skills),
        )
        .route(
            "/api/v1/resume/photo",
            put(editing::handle_upload_photo).delete(editing::handle_remove_photo),
        )
        .route("/api/v1/resume/sample", post(editing::handle_fill_sample))
        .route("/api/v1/resume/reset", post(editing::handle_reset))
        .route("/api/v1/preferences", put(editing::handle_set_preferences))
        // Layout
        .route("/api/v1/layout/estimate", post(layout::handle_estimate))
        // Export / import
        .route(
            "/api/v1/export/snapshot",
            get(export::handle_export_snapshot),
        )
        .route("/api/v1/export/docx", get(export::handle_export_docx))
        .route("/api/v1/export/pdf", post(export::handle_export_pdf))
        .route("/api/v1/import/snapshot", post(export::handle_import))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
