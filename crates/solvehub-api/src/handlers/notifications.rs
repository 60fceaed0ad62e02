//! Notification feed and read-state handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiError, AppState, RequireAuth};
use solvehub_core::{ListNotificationsRequest, Notification, NotificationRepository};

#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    #[serde(default)]
    pub unread: bool,
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// The caller's notifications, newest first.
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: RequireAuth,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let notifications = state
        .db
        .notifications
        .list_for(
            auth.user.id,
            ListNotificationsRequest {
                unread_only: query.unread,
                limit: query.limit,
                offset: query.offset,
            },
        )
        .await?;
    Ok(Json(notifications))
}

/// Count of unread notifications.
pub async fn unread_count(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<serde_json::Value>, ApiError> {
    let unread = state.db.notifications.unread_count(auth.user.id).await?;
    Ok(Json(serde_json::json!({ "unread": unread })))
}

/// Mark one notification read.
pub async fn set_notification_read(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    set_read_state(&state, auth.user.id, id, true).await
}

/// Mark one notification unread again.
pub async fn set_notification_unread(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    set_read_state(&state, auth.user.id, id, false).await
}

async fn set_read_state(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
    read: bool,
) -> Result<StatusCode, ApiError> {
    // The recipient check is part of the query: toggling someone else's
    // notification reports not-found, not forbidden.
    let changed = state.db.notifications.set_read(id, user_id, read).await?;
    if !changed {
        return Err(ApiError::NotFound(format!("Notification {} not found", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Mark everything read.
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<serde_json::Value>, ApiError> {
    let updated = state.db.notifications.mark_all_read(auth.user.id).await?;
    Ok(Json(serde_json::json!({ "updated": updated })))
}
