//! Subject and tag handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{ApiError, AppState, RequireAdmin};
use solvehub_core::{
    CreateSubjectRequest, Subject, SubjectRepository, Tag, TagRepository,
};

#[derive(Debug, Deserialize)]
pub struct ListSubjectsQuery {
    #[serde(default)]
    pub popular: bool,
}

/// All subjects, ordered by name.
pub async fn list_subjects(
    State(state): State<AppState>,
    Query(query): Query<ListSubjectsQuery>,
) -> Result<Json<Vec<Subject>>, ApiError> {
    let subjects = state.db.subjects.list(query.popular).await?;
    Ok(Json(subjects))
}

/// Create a subject (admin). Duplicate names map to 409.
pub async fn create_subject(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Json(req): Json<CreateSubjectRequest>,
) -> Result<(StatusCode, Json<Subject>), ApiError> {
    let subject = state.db.subjects.insert(req).await?;
    tracing::info!(
        subsystem = "api",
        user_id = %admin.user.id,
        subject = %subject.name,
        "Subject created"
    );
    Ok((StatusCode::CREATED, Json(subject)))
}

/// Subject lookup by slug.
pub async fn get_subject(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Subject>, ApiError> {
    let subject = state
        .db
        .subjects
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Subject '{}' not found", slug)))?;
    Ok(Json(subject))
}

/// All tags with usage counts.
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<Tag>>, ApiError> {
    let tags = state.db.tags.list().await?;
    Ok(Json(tags))
}
