//! Report repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use solvehub_core::{
    AnswerRepository, CreateReportRequest, Error, ExerciseRepository, NewReport, Report,
    ReportReason, ReportRepository, ReportStatus, ReportTargetKind, Result,
    REPORT_DETAILS_MAX_LEN,
};

/// Report intake: verify the target exists, resolve the denormalized
/// exercise id, and persist the report.
///
/// The target kind and reason enums are validated upstream by typed
/// deserialization, before any persistence access happens here.
pub async fn intake(
    db: &crate::Database,
    reporter_id: uuid::Uuid,
    req: CreateReportRequest,
) -> Result<Report> {
    let exercise_id = match req.target_kind {
        ReportTargetKind::Exercise => {
            if db.exercises.author_of(req.target_id).await?.is_none() {
                return Err(Error::ExerciseNotFound(req.target_id));
            }
            Some(req.target_id)
        }
        ReportTargetKind::Answer => {
            // The answer's parent exercise is denormalized onto the report.
            Some(
                db.answers
                    .exercise_of(req.target_id)
                    .await?
                    .ok_or(Error::AnswerNotFound(req.target_id))?,
            )
        }
    };

    db.reports
        .insert(NewReport {
            reporter_id,
            target_kind: req.target_kind,
            target_id: req.target_id,
            exercise_id,
            reason: req.reason,
            details: req.details.filter(|d| !d.trim().is_empty()),
        })
        .await
}

fn map_report(row: &PgRow) -> Result<Report> {
    let target_kind_str: String = row.get("target_kind");
    let reason_str: String = row.get("reason");
    let status_str: String = row.get("status");

    let target_kind = ReportTargetKind::parse(&target_kind_str).ok_or_else(|| {
        Error::Internal(format!("Unknown report target in database: {}", target_kind_str))
    })?;
    let reason = ReportReason::parse(&reason_str).ok_or_else(|| {
        Error::Internal(format!("Unknown report reason in database: {}", reason_str))
    })?;
    let status = ReportStatus::parse(&status_str).ok_or_else(|| {
        Error::Internal(format!("Unknown report status in database: {}", status_str))
    })?;

    Ok(Report {
        id: row.get("id"),
        reporter_id: row.get("reporter_id"),
        target_kind,
        target_id: row.get("target_id"),
        exercise_id: row.get("exercise_id"),
        reason,
        details: row.get("details"),
        status,
        resolved_by: row.get("resolved_by"),
        created_at_utc: row.get("created_at_utc"),
        resolved_at_utc: row.get("resolved_at_utc"),
    })
}

const REPORT_COLUMNS: &str = "id, reporter_id, target_kind, target_id, exercise_id, reason, \
                              details, status, resolved_by, created_at_utc, resolved_at_utc";

/// PostgreSQL implementation of ReportRepository.
#[derive(Clone)]
pub struct PgReportRepository {
    pool: Pool<Postgres>,
}

impl PgReportRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn insert(&self, report: NewReport) -> Result<Report> {
        if let Some(details) = &report.details {
            if details.chars().count() > REPORT_DETAILS_MAX_LEN {
                return Err(Error::InvalidInput(format!(
                    "Details must be at most {} characters",
                    REPORT_DETAILS_MAX_LEN
                )));
            }
        }

        let id = Uuid::now_v7();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO report \
             (id, reporter_id, target_kind, target_id, exercise_id, reason, details, status, \
              created_at_utc) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', $8)",
        )
        .bind(id)
        .bind(report.reporter_id)
        .bind(report.target_kind.as_str())
        .bind(report.target_id)
        .bind(report.exercise_id)
        .bind(report.reason.as_str())
        .bind(&report.details)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Report {
            id,
            reporter_id: report.reporter_id,
            target_kind: report.target_kind,
            target_id: report.target_id,
            exercise_id: report.exercise_id,
            reason: report.reason,
            details: report.details,
            status: ReportStatus::Pending,
            resolved_by: None,
            created_at_utc: now,
            resolved_at_utc: None,
        })
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Report>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM report WHERE id = $1",
            REPORT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(map_report).transpose()
    }

    async fn list(
        &self,
        status: Option<ReportStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Report>> {
        let limit = if limit <= 0 { 50 } else { limit.min(200) };
        let offset = offset.max(0);

        let rows = match status {
            Some(status) => sqlx::query(&format!(
                "SELECT {} FROM report WHERE status = $1 \
                 ORDER BY created_at_utc DESC LIMIT $2 OFFSET $3",
                REPORT_COLUMNS
            ))
            .bind(status.as_str())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?,
            None => sqlx::query(&format!(
                "SELECT {} FROM report \
                 ORDER BY created_at_utc DESC LIMIT $1 OFFSET $2",
                REPORT_COLUMNS
            ))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?,
        };

        rows.iter().map(map_report).collect()
    }

    async fn resolve(&self, id: Uuid, admin_id: Uuid) -> Result<Report> {
        let row = sqlx::query(&format!(
            "UPDATE report SET status = 'resolved', resolved_by = $2, resolved_at_utc = $3 \
             WHERE id = $1 RETURNING {}",
            REPORT_COLUMNS
        ))
        .bind(id)
        .bind(admin_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(row) => map_report(&row),
            None => Err(Error::NotFound(format!("Report {} not found", id))),
        }
    }
}
