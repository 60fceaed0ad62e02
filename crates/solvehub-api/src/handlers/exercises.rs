//! Exercise handlers: listing, CRUD, votes, and saved/completed toggles.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiError, AppState, Auth, ListResponse, RequireAuth};
use solvehub_core::{
    CreateExerciseRequest, ExerciseFull, ExerciseRepository, ExerciseSummary,
    ListExercisesRequest, NewNotification, NotificationKind, UserRepository, VoteKind,
    VoteSummary,
};

#[derive(Debug, Deserialize)]
pub struct ListExercisesQuery {
    /// Subject slug filter.
    pub subject: Option<String>,
    pub tag: Option<String>,
    pub author: Option<Uuid>,
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// List exercises, newest first.
pub async fn list_exercises(
    State(state): State<AppState>,
    auth: Auth,
    Query(query): Query<ListExercisesQuery>,
) -> Result<Json<ListResponse<ExerciseSummary>>, ApiError> {
    let viewer = auth.user.as_ref().map(|user| user.id);
    let response = state
        .db
        .exercises
        .list(
            ListExercisesRequest {
                subject_slug: query.subject,
                tag: query.tag,
                author_id: query.author,
                saved_by: None,
                completed_by: None,
                limit: query.limit,
                offset: query.offset,
            },
            viewer,
        )
        .await?;

    let (limit, offset) = (query.limit.max(1) as usize, query.offset.max(0) as usize);
    Ok(Json(ListResponse::new(
        response.exercises,
        response.total as usize,
        limit,
        offset,
    )))
}

/// Create a new exercise.
pub async fn create_exercise(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(req): Json<CreateExerciseRequest>,
) -> Result<(StatusCode, Json<ExerciseFull>), ApiError> {
    let id = state.db.exercises.insert(auth.user.id, req).await?;
    let full = state.db.exercises.fetch(id, Some(auth.user.id)).await?;
    tracing::info!(subsystem = "api", exercise_id = %id, user_id = %auth.user.id, "Exercise created");
    Ok((StatusCode::CREATED, Json(full)))
}

/// Exercise detail.
pub async fn get_exercise(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Uuid>,
) -> Result<Json<ExerciseFull>, ApiError> {
    let viewer = auth.user.as_ref().map(|user| user.id);
    let full = state.db.exercises.fetch(id, viewer).await?;
    Ok(Json(full))
}

/// Delete an exercise (author, moderator, or admin).
pub async fn delete_exercise(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let author = state
        .db
        .exercises
        .author_of(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Exercise {} not found", id)))?;
    if author != auth.user.id && !auth.user.role.can_moderate() {
        return Err(ApiError::Forbidden(
            "Only the author or a moderator can delete an exercise".to_string(),
        ));
    }

    state.db.exercises.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Toggle a vote on an exercise. A newly added like notifies the author
/// (subject to their preferences); the vote itself never fails because of
/// notification delivery.
pub async fn vote_exercise(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
    kind: VoteKind,
) -> Result<Json<VoteSummary>, ApiError> {
    let full = state.db.exercises.fetch(id, Some(auth.user.id)).await?;
    let result = state.db.exercises.vote(id, auth.user.id, kind).await?;

    if result.added_like && full.author.id != auth.user.id {
        let _ = state
            .dispatcher
            .dispatch(NewNotification {
                recipient_id: full.author.id,
                kind: NotificationKind::Like,
                message: format!("{} liked your exercise \"{}\"", auth.user.username, full.title),
                link: format!("/exercises/{}", id),
                exercise_id: Some(id),
                answer_id: None,
            })
            .await;
    }

    Ok(Json(result.summary))
}

/// Add/remove the exercise from the caller's saved collection.
pub async fn set_saved(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
    saved: bool,
) -> Result<StatusCode, ApiError> {
    if state.db.exercises.author_of(id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Exercise {} not found", id)));
    }
    state.db.users.set_saved(auth.user.id, id, saved).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add/remove the exercise from the caller's completed collection.
pub async fn set_completed(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
    completed: bool,
) -> Result<StatusCode, ApiError> {
    if state.db.exercises.author_of(id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Exercise {} not found", id)));
    }
    state
        .db
        .users
        .set_completed(auth.user.id, id, completed)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
