//! Notification repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use solvehub_core::{
    Error, ListNotificationsRequest, NewNotification, Notification, NotificationKind,
    NotificationRepository, Result,
};

const LIST_DEFAULT_LIMIT: i64 = 50;
const LIST_MAX_LIMIT: i64 = 200;

fn map_notification(row: &PgRow) -> Result<Notification> {
    let kind_str: String = row.get("kind");
    let kind = NotificationKind::parse(&kind_str).ok_or_else(|| {
        Error::Internal(format!("Unknown notification kind in database: {}", kind_str))
    })?;
    Ok(Notification {
        id: row.get("id"),
        recipient_id: row.get("recipient_id"),
        kind,
        message: row.get("message"),
        link: row.get("link"),
        is_read: row.get("is_read"),
        exercise_id: row.get("exercise_id"),
        answer_id: row.get("answer_id"),
        created_at_utc: row.get("created_at_utc"),
    })
}

/// PostgreSQL implementation of NotificationRepository.
#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: Pool<Postgres>,
}

impl PgNotificationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn insert(&self, req: &NewNotification) -> Result<Notification> {
        let notification = Notification {
            id: Uuid::now_v7(),
            recipient_id: req.recipient_id,
            kind: req.kind,
            message: req.message.clone(),
            link: req.link.clone(),
            is_read: false,
            exercise_id: req.exercise_id,
            answer_id: req.answer_id,
            created_at_utc: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO notification \
             (id, recipient_id, kind, message, link, is_read, exercise_id, answer_id, \
              created_at_utc) \
             VALUES ($1, $2, $3, $4, $5, FALSE, $6, $7, $8)",
        )
        .bind(notification.id)
        .bind(notification.recipient_id)
        .bind(notification.kind.as_str())
        .bind(&notification.message)
        .bind(&notification.link)
        .bind(notification.exercise_id)
        .bind(notification.answer_id)
        .bind(notification.created_at_utc)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(notification)
    }

    async fn list_for(
        &self,
        recipient_id: Uuid,
        req: ListNotificationsRequest,
    ) -> Result<Vec<Notification>> {
        let limit = if req.limit <= 0 {
            LIST_DEFAULT_LIMIT
        } else {
            req.limit.min(LIST_MAX_LIMIT)
        };
        let offset = req.offset.max(0);

        let unread_filter = if req.unread_only {
            "AND NOT is_read"
        } else {
            ""
        };
        let rows = sqlx::query(&format!(
            "SELECT id, recipient_id, kind, message, link, is_read, exercise_id, answer_id, \
             created_at_utc \
             FROM notification WHERE recipient_id = $1 {} \
             ORDER BY created_at_utc DESC LIMIT $2 OFFSET $3",
            unread_filter
        ))
        .bind(recipient_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(map_notification).collect()
    }

    async fn unread_count(&self, recipient_id: Uuid) -> Result<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS unread FROM notification \
             WHERE recipient_id = $1 AND NOT is_read",
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.get("unread"))
    }

    async fn set_read(&self, id: Uuid, recipient_id: Uuid, read: bool) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE notification SET is_read = $3 WHERE id = $1 AND recipient_id = $2",
        )
        .bind(id)
        .bind(recipient_id)
        .bind(read)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read(&self, recipient_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notification SET is_read = TRUE \
             WHERE recipient_id = $1 AND NOT is_read",
        )
        .bind(recipient_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(result.rows_affected())
    }
}
