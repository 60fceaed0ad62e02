//! Subject repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use solvehub_core::slug::{is_valid_slug, slugify};
use solvehub_core::{CreateSubjectRequest, Error, Result, Subject, SubjectRepository};

fn map_subject(row: &PgRow) -> Subject {
    Subject {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        is_popular: row.get("is_popular"),
        created_at_utc: row.get("created_at_utc"),
    }
}

fn is_unique_violation(err: &Error) -> bool {
    match err {
        Error::Database(e) => {
            let msg = e.to_string();
            msg.contains("duplicate key") || msg.contains("unique constraint")
        }
        _ => false,
    }
}

/// PostgreSQL implementation of SubjectRepository.
#[derive(Clone)]
pub struct PgSubjectRepository {
    pool: Pool<Postgres>,
}

impl PgSubjectRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubjectRepository for PgSubjectRepository {
    async fn insert(&self, req: CreateSubjectRequest) -> Result<Subject> {
        let name = req.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::InvalidInput("Subject name cannot be empty".to_string()));
        }

        // Slug is derived once at creation when absent.
        let slug = match req.slug {
            Some(slug) => {
                if !is_valid_slug(&slug) {
                    return Err(Error::InvalidInput(format!("Invalid slug: {}", slug)));
                }
                slug
            }
            None => {
                let derived = slugify(&name);
                if derived.is_empty() {
                    return Err(Error::InvalidInput(format!(
                        "Cannot derive a slug from subject name: {}",
                        name
                    )));
                }
                derived
            }
        };

        let subject = Subject {
            id: Uuid::now_v7(),
            name,
            slug,
            is_popular: req.is_popular,
            created_at_utc: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO subject (id, name, slug, is_popular, created_at_utc) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(subject.id)
        .bind(&subject.name)
        .bind(&subject.slug)
        .bind(subject.is_popular)
        .bind(subject.created_at_utc)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(subject)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Subject>> {
        let row = sqlx::query(
            "SELECT id, name, slug, is_popular, created_at_utc FROM subject WHERE name = $1",
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(map_subject))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Subject>> {
        let row = sqlx::query(
            "SELECT id, name, slug, is_popular, created_at_utc FROM subject WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(map_subject))
    }

    async fn find_or_create(&self, name: &str) -> Result<Subject> {
        if let Some(existing) = self.find_by_name(name).await? {
            return Ok(existing);
        }

        match self
            .insert(CreateSubjectRequest {
                name: name.to_string(),
                slug: None,
                is_popular: false,
            })
            .await
        {
            Ok(subject) => Ok(subject),
            // Lost a creation race: another writer inserted the same name
            // between our lookup and insert. The lookup is authoritative.
            Err(e) if is_unique_violation(&e) => self
                .find_by_name(name)
                .await?
                .ok_or_else(|| Error::NotFound(format!("Subject {} vanished after conflict", name))),
            Err(e) => Err(e),
        }
    }

    async fn list(&self, popular_only: bool) -> Result<Vec<Subject>> {
        let query = if popular_only {
            "SELECT id, name, slug, is_popular, created_at_utc FROM subject \
             WHERE is_popular ORDER BY name"
        } else {
            "SELECT id, name, slug, is_popular, created_at_utc FROM subject ORDER BY name"
        };

        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.iter().map(map_subject).collect())
    }
}
