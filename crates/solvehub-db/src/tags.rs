//! Tag repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};

use solvehub_core::{Error, Result, Tag, TagRepository};

/// Validate a tag name.
///
/// Rules: 1-50 characters; lowercase alphanumeric, hyphens, and plus signs
/// (for names like "c++"). No spaces or other special characters.
pub fn validate_tag_name(tag: &str) -> std::result::Result<(), String> {
    if tag.is_empty() {
        return Err("Tag name cannot be empty".to_string());
    }
    if tag.chars().count() > 50 {
        return Err("Tag name must be 50 characters or less".to_string());
    }
    if !tag
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '+')
    {
        return Err(format!(
            "Invalid tag name: {}. Only lowercase letters, digits, hyphens, and '+' are allowed",
            tag
        ));
    }
    Ok(())
}

/// PostgreSQL implementation of TagRepository.
#[derive(Clone)]
pub struct PgTagRepository {
    pool: Pool<Postgres>,
}

impl PgTagRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn ensure(&self, name: &str) -> Result<()> {
        validate_tag_name(name).map_err(Error::InvalidInput)?;

        sqlx::query("INSERT INTO tag (name, created_at_utc) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(name)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            r#"
            SELECT
                t.name,
                t.created_at_utc,
                COUNT(et.exercise_id) AS exercise_count
            FROM tag t
            LEFT JOIN exercise_tag et ON t.name = et.tag_name
            GROUP BY t.name, t.created_at_utc
            ORDER BY t.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| Tag {
                name: row.get("name"),
                created_at_utc: row.get("created_at_utc"),
                exercise_count: row.get("exercise_count"),
            })
            .collect())
    }
}
