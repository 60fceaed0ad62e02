//! Profile, settings, and saved/completed collection handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ApiError, AppState, ListResponse, RequireAuth};
use solvehub_core::{
    ExerciseRepository, ExerciseSummary, ListExercisesRequest, NotificationPreferences,
    PreferenceRepository, Role, UpdateProfileRequest, UserProfile, UserRepository,
};

/// Own profile.
pub async fn get_profile(auth: RequireAuth) -> Json<UserProfile> {
    Json(auth.user.profile())
}

/// Partial profile update.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = state.db.users.update_profile(auth.user.id, req).await?;
    Ok(Json(user.profile()))
}

/// Effective notification preferences (defaults when never saved).
pub async fn get_preferences(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<NotificationPreferences>, ApiError> {
    let prefs = state.db.preferences.effective_for(auth.user.id).await?;
    Ok(Json(prefs))
}

/// Store explicit notification preferences.
pub async fn put_preferences(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(prefs): Json<NotificationPreferences>,
) -> Result<Json<NotificationPreferences>, ApiError> {
    state.db.preferences.upsert(auth.user.id, prefs).await?;
    Ok(Json(prefs))
}

/// Public profile view: no email, no preference flags.
#[derive(Debug, Serialize)]
pub struct PublicProfileResponse {
    pub id: uuid::Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub created_at_utc: DateTime<Utc>,
}

pub async fn public_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<PublicProfileResponse>, ApiError> {
    let user = state
        .db
        .users
        .fetch_by_username(&username)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", username)))?;

    Ok(Json(PublicProfileResponse {
        id: user.id,
        username: user.username,
        display_name: user.display_name,
        bio: user.bio,
        avatar_url: user.avatar_url,
        role: user.role,
        created_at_utc: user.created_at_utc,
    }))
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// Exercises the user saved.
pub async fn list_saved(
    State(state): State<AppState>,
    auth: RequireAuth,
    Query(page): Query<PageQuery>,
) -> Result<Json<ListResponse<ExerciseSummary>>, ApiError> {
    let response = state
        .db
        .exercises
        .list(
            ListExercisesRequest {
                saved_by: Some(auth.user.id),
                limit: page.limit,
                offset: page.offset,
                ..Default::default()
            },
            Some(auth.user.id),
        )
        .await?;
    let (limit, offset) = (page.limit.max(1) as usize, page.offset.max(0) as usize);
    Ok(Json(ListResponse::new(
        response.exercises,
        response.total as usize,
        limit,
        offset,
    )))
}

/// Exercises the user completed.
pub async fn list_completed(
    State(state): State<AppState>,
    auth: RequireAuth,
    Query(page): Query<PageQuery>,
) -> Result<Json<ListResponse<ExerciseSummary>>, ApiError> {
    let response = state
        .db
        .exercises
        .list(
            ListExercisesRequest {
                completed_by: Some(auth.user.id),
                limit: page.limit,
                offset: page.offset,
                ..Default::default()
            },
            Some(auth.user.id),
        )
        .await?;
    let (limit, offset) = (page.limit.max(1) as usize, page.offset.max(0) as usize);
    Ok(Json(ListResponse::new(
        response.exercises,
        response.total as usize,
        limit,
        offset,
    )))
}
