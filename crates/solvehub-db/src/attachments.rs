//! Attachment repository implementation.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use solvehub_core::{Attachment, AttachmentOwner, Error, Result, StorageLocation};

fn map_attachment(row: &PgRow) -> Result<Attachment> {
    let storage_kind: String = row.get("storage_kind");
    let storage = match storage_kind.as_str() {
        "local_legacy" => StorageLocation::LocalLegacy {
            path: row
                .get::<Option<String>, _>("local_path")
                .ok_or_else(|| Error::Internal("local_legacy attachment without path".into()))?,
        },
        "hosted" => StorageLocation::Hosted {
            url: row
                .get::<Option<String>, _>("url")
                .ok_or_else(|| Error::Internal("hosted attachment without url".into()))?,
            storage_key: row
                .get::<Option<String>, _>("storage_key")
                .ok_or_else(|| Error::Internal("hosted attachment without storage key".into()))?,
            size: row.get("size_bytes"),
        },
        other => {
            return Err(Error::Internal(format!(
                "Unknown storage kind in database: {}",
                other
            )))
        }
    };

    Ok(Attachment {
        id: row.get("id"),
        exercise_id: row.get("exercise_id"),
        answer_id: row.get("answer_id"),
        filename: row.get("filename"),
        content_type: row.get("content_type"),
        size_bytes: row.get("size_bytes"),
        storage,
        created_at_utc: row.get("created_at_utc"),
    })
}

const ATTACHMENT_COLUMNS: &str = "id, exercise_id, answer_id, filename, content_type, \
                                  size_bytes, storage_kind, local_path, url, storage_key, \
                                  created_at_utc";

/// Attachments for one exercise, oldest first.
pub(crate) async fn list_for_exercise(
    pool: &Pool<Postgres>,
    exercise_id: Uuid,
) -> Result<Vec<Attachment>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM attachment WHERE exercise_id = $1 ORDER BY created_at_utc",
        ATTACHMENT_COLUMNS
    ))
    .bind(exercise_id)
    .fetch_all(pool)
    .await
    .map_err(Error::Database)?;

    rows.iter().map(map_attachment).collect()
}

/// Attachments for a batch of answers, grouped by answer.
pub(crate) async fn list_for_answers(
    pool: &Pool<Postgres>,
    answer_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Attachment>>> {
    if answer_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = sqlx::query(&format!(
        "SELECT {} FROM attachment WHERE answer_id = ANY($1) ORDER BY created_at_utc",
        ATTACHMENT_COLUMNS
    ))
    .bind(answer_ids)
    .fetch_all(pool)
    .await
    .map_err(Error::Database)?;

    let mut map: HashMap<Uuid, Vec<Attachment>> = HashMap::new();
    for row in &rows {
        let attachment = map_attachment(row)?;
        let answer_id = attachment
            .answer_id
            .ok_or_else(|| Error::Internal("answer attachment without answer_id".into()))?;
        map.entry(answer_id).or_default().push(attachment);
    }
    Ok(map)
}

/// PostgreSQL implementation of the attachment store.
#[derive(Clone)]
pub struct PgAttachmentRepository {
    pool: Pool<Postgres>,
}

impl PgAttachmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Record an attachment for an exercise or answer.
    pub async fn insert(
        &self,
        owner: AttachmentOwner,
        filename: &str,
        content_type: &str,
        storage: StorageLocation,
    ) -> Result<Attachment> {
        let (exercise_id, answer_id) = match owner {
            AttachmentOwner::Exercise(id) => (Some(id), None),
            AttachmentOwner::Answer(id) => (None, Some(id)),
        };
        let (local_path, url, storage_key, size_bytes) = match &storage {
            StorageLocation::LocalLegacy { path } => (Some(path.clone()), None, None, 0i64),
            StorageLocation::Hosted {
                url,
                storage_key,
                size,
            } => (None, Some(url.clone()), Some(storage_key.clone()), *size),
        };

        let attachment = Attachment {
            id: Uuid::now_v7(),
            exercise_id,
            answer_id,
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            size_bytes,
            storage,
            created_at_utc: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO attachment \
             (id, exercise_id, answer_id, filename, content_type, size_bytes, storage_kind, \
              local_path, url, storage_key, created_at_utc) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(attachment.id)
        .bind(attachment.exercise_id)
        .bind(attachment.answer_id)
        .bind(&attachment.filename)
        .bind(&attachment.content_type)
        .bind(attachment.size_bytes)
        .bind(attachment.storage.kind_str())
        .bind(&local_path)
        .bind(&url)
        .bind(&storage_key)
        .bind(attachment.created_at_utc)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(attachment)
    }

    /// Fetch one attachment.
    pub async fn fetch(&self, id: Uuid) -> Result<Option<Attachment>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM attachment WHERE id = $1",
            ATTACHMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(map_attachment).transpose()
    }

    /// Delete an attachment record.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM attachment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Attachment {} not found", id)));
        }
        Ok(())
    }

    /// Attachments still on legacy local storage, oldest first. Used by the
    /// `attachment-migrate` tool; records already `hosted` never show up, so
    /// re-running the tool skips them.
    pub async fn list_local_legacy(&self, limit: i64) -> Result<Vec<Attachment>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM attachment WHERE storage_kind = 'local_legacy' \
             ORDER BY created_at_utc LIMIT $1",
            ATTACHMENT_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(map_attachment).collect()
    }

    /// Rewrite a legacy attachment as hosted after a successful upload.
    ///
    /// Guarded on `storage_kind = 'local_legacy'` so a concurrent or repeated
    /// migration cannot clobber an already-hosted record.
    pub async fn mark_hosted(
        &self,
        id: Uuid,
        url: &str,
        storage_key: &str,
        size_bytes: i64,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE attachment SET storage_kind = 'hosted', url = $2, storage_key = $3, \
             size_bytes = $4, local_path = NULL \
             WHERE id = $1 AND storage_kind = 'local_legacy'",
        )
        .bind(id)
        .bind(url)
        .bind(storage_key)
        .bind(size_bytes)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!(
                "Attachment {} not found or already hosted",
                id
            )));
        }
        Ok(())
    }
}
