use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::editing::lists::{append, remove_at, ListField};
use crate::editing::path::{mutate_str, read, FieldPath};
use crate::editing::transforms::{clear_photo, clear_skills, commit_skills, set_date_range, set_photo};
use crate::errors::AppError;
use crate::export::snapshot::Snapshot;
use crate::models::Resume;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FieldEdit {
    pub path: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct FieldQuery {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct FieldValue {
    pub path: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct DateRangeEdit {
    pub value: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PreferencesUpdate {
    pub dark: Option<bool>,
    pub compact: Option<bool>,
}

/// GET /api/v1/resume
pub async fn handle_get_resume(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.session.current().await)
}

/// GET /api/v1/resume/field?path=...
pub async fn handle_get_field(
    State(state): State<AppState>,
    Query(query): Query<FieldQuery>,
) -> Result<Json<FieldValue>, AppError> {
    let path: FieldPath = query.path.parse()?;
    let resume = state.session.resume().await;
    let value = read(&resume, &path)?.to_string();
    Ok(Json(FieldValue {
        path: path.to_string(),
        value,
    }))
}

/// PATCH /api/v1/resume
pub async fn handle_edit_field(
    State(state): State<AppState>,
    Json(req): Json<FieldEdit>,
) -> Result<Json<Snapshot>, AppError> {
    let FieldEdit { path, value } = req;
    let snapshot = state
        .session
        .apply(move |resume| mutate_str(resume, &path, value))
        .await?;
    Ok(Json(snapshot))
}

/// POST /api/v1/resume/lists/:list
pub async fn handle_append(
    State(state): State<AppState>,
    Path(list): Path<String>,
) -> Result<Json<Snapshot>, AppError> {
    let list: ListField = list.parse()?;
    let snapshot = state
        .session
        .apply(|resume| Ok(append(resume, list)))
        .await?;
    Ok(Json(snapshot))
}

/// DELETE /api/v1/resume/lists/:list/:index
pub async fn handle_remove(
    State(state): State<AppState>,
    Path((list, index)): Path<(String, usize)>,
) -> Result<Json<Snapshot>, AppError> {
    let list: ListField = list.parse()?;
    let snapshot = state
        .session
        .apply(|resume| remove_at(resume, list, index))
        .await?;
    Ok(Json(snapshot))
}

/// PUT /api/v1/resume/lists/:list/:index/dates
pub async fn handle_set_dates(
    State(state): State<AppState>,
    Path((list, index)): Path<(String, usize)>,
    Json(req): Json<DateRangeEdit>,
) -> Result<Json<Snapshot>, AppError> {
    let list: ListField = list.parse()?;
    let snapshot = state
        .session
        .apply(|resume| set_date_range(resume, list, index, &req.value))
        .await?;
    Ok(Json(snapshot))
}

/// POST /api/v1/resume/skills/commit
pub async fn handle_commit_skills(
    State(state): State<AppState>,
) -> Result<Json<Snapshot>, AppError> {
    let snapshot = state.session.apply(|resume| Ok(commit_skills(resume))).await?;
    Ok(Json(snapshot))
}

/// POST /api/v1/resume/skills/clear
pub async fn handle_clear_skills(
    State(state): State<AppState>,
) -> Result<Json<Snapshot>, AppError> {
    let snapshot = state.session.apply(|resume| Ok(clear_skills(resume))).await?;
    Ok(Json(snapshot))
}

/// PUT /api/v1/resume/photo
///
/// Multipart upload; the image travels in the `photo` field.
pub async fn handle_upload_photo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Snapshot>, AppError> {
    let mut photo = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        if field.name() == Some("photo") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Could not read photo: {e}")))?;
            photo = Some(bytes);
            break;
        }
    }

    let photo = photo.ok_or_else(|| AppError::Validation("Missing 'photo' field".to_string()))?;
    let snapshot = state.session.apply(|resume| set_photo(resume, &photo)).await?;
    Ok(Json(snapshot))
}

/// DELETE /api/v1/resume/photo
pub async fn handle_remove_photo(
    State(state): State<AppState>,
) -> Result<Json<Snapshot>, AppError> {
    let snapshot = state.session.apply(|resume| Ok(clear_photo(resume))).await?;
    Ok(Json(snapshot))
}

/// POST /api/v1/resume/sample
pub async fn handle_fill_sample(
    State(state): State<AppState>,
) -> Result<Json<Snapshot>, AppError> {
    let snapshot = state.session.apply(|_| Ok(Resume::sample())).await?;
    Ok(Json(snapshot))
}

/// POST /api/v1/resume/reset
pub async fn handle_reset(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.session.reset().await)
}

/// PUT /api/v1/preferences
pub async fn handle_set_preferences(
    State(state): State<AppState>,
    Json(req): Json<PreferencesUpdate>,
) -> Json<Snapshot> {
    let snapshot = state
        .session
        .update_preferences(|prefs| {
            if let Some(dark) = req.dark {
                prefs.dark = dark;
            }
            if let Some(compact) = req.compact {
                prefs.compact = compact;
            }
        })
        .await;
    Json(snapshot)
}
