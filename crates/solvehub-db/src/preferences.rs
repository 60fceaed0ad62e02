//! Notification preference repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use solvehub_core::{Error, NotificationPreferences, PreferenceRepository, Result};

/// PostgreSQL implementation of PreferenceRepository.
///
/// Users without a stored row get [`NotificationPreferences::default`].
#[derive(Clone)]
pub struct PgPreferenceRepository {
    pool: Pool<Postgres>,
}

impl PgPreferenceRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceRepository for PgPreferenceRepository {
    async fn effective_for(&self, user_id: Uuid) -> Result<NotificationPreferences> {
        let row = sqlx::query(
            "SELECT reply_to_exercise, reply_to_answer, like_on_exercise \
             FROM notification_preference WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(match row {
            Some(row) => NotificationPreferences {
                reply_to_exercise: row.get("reply_to_exercise"),
                reply_to_answer: row.get("reply_to_answer"),
                like_on_exercise: row.get("like_on_exercise"),
            },
            None => NotificationPreferences::default(),
        })
    }

    async fn upsert(&self, user_id: Uuid, prefs: NotificationPreferences) -> Result<()> {
        sqlx::query(
            "INSERT INTO notification_preference \
             (user_id, reply_to_exercise, reply_to_answer, like_on_exercise, updated_at_utc) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id) DO UPDATE SET \
             reply_to_exercise = EXCLUDED.reply_to_exercise, \
             reply_to_answer = EXCLUDED.reply_to_answer, \
             like_on_exercise = EXCLUDED.like_on_exercise, \
             updated_at_utc = EXCLUDED.updated_at_utc",
        )
        .bind(user_id)
        .bind(prefs.reply_to_exercise)
        .bind(prefs.reply_to_answer)
        .bind(prefs.like_on_exercise)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }
}
