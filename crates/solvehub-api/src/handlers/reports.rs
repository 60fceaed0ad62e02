//! Report intake and moderation handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiError, AppState, RequireAdmin, RequireAuth};
use solvehub_db::reports::intake;
use solvehub_core::{
    CreateReportRequest, Report, ReportRepository, ReportStatus, UserRepository,
};

/// File a report against an exercise or answer.
///
/// Target kind and reason are validated by typed deserialization before
/// this handler runs; target existence is checked by the intake step.
pub async fn create_report(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(req): Json<CreateReportRequest>,
) -> Result<(StatusCode, Json<Report>), ApiError> {
    let report = intake(&state.db, auth.user.id, req).await?;
    tracing::info!(
        subsystem = "api",
        user_id = %auth.user.id,
        report_id = %report.id,
        reason = report.reason.as_str(),
        "Report filed"
    );
    Ok((StatusCode::CREATED, Json(report)))
}

#[derive(Debug, Deserialize)]
pub struct ListReportsQuery {
    pub status: Option<ReportStatus>,
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// List reports for moderation review (admin).
pub async fn list_reports(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(query): Query<ListReportsQuery>,
) -> Result<Json<Vec<Report>>, ApiError> {
    let reports = state
        .db
        .reports
        .list(query.status, query.limit, query.offset)
        .await?;
    Ok(Json(reports))
}

#[derive(Debug, Deserialize)]
pub struct ResolveReportRequest {
    pub status: ReportStatus,
}

/// Update a report's status (admin). The only transition is to `resolved`.
pub async fn resolve_report(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(req): Json<ResolveReportRequest>,
) -> Result<Json<Report>, ApiError> {
    if req.status != ReportStatus::Resolved {
        return Err(ApiError::BadRequest(
            "Reports can only be moved to 'resolved'".to_string(),
        ));
    }
    let report = state.db.reports.resolve(id, admin.user.id).await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

/// Activate or deactivate an account (admin).
pub async fn set_user_active(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(req): Json<SetActiveRequest>,
) -> Result<StatusCode, ApiError> {
    if id == admin.user.id {
        return Err(ApiError::BadRequest(
            "Administrators cannot deactivate their own account".to_string(),
        ));
    }
    state.db.users.set_active(id, req.active).await?;
    tracing::info!(
        subsystem = "api",
        user_id = %id,
        active = req.active,
        moderator_id = %admin.user.id,
        "Account active flag changed"
    );
    Ok(StatusCode::NO_CONTENT)
}
