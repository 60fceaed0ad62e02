//! Exercise repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use solvehub_core::{
    CreateExerciseRequest, Error, ExerciseFull, ExerciseRepository, ExerciseSummary,
    ListExercisesRequest, ListExercisesResponse, Result, Role, Subject, UserSummary, VoteKind,
    VoteResult,
};

use crate::attachments;
use crate::tags::validate_tag_name;
use crate::votes::{self, VoteTable};

/// Maximum number of tags on one exercise.
pub const MAX_TAGS_PER_EXERCISE: usize = 10;

const LIST_DEFAULT_LIMIT: i64 = 20;
const LIST_MAX_LIMIT: i64 = 100;

fn map_author(row: &PgRow) -> Result<UserSummary> {
    let role_str: String = row.get("author_role");
    let role = Role::parse(&role_str)
        .ok_or_else(|| Error::Internal(format!("Unknown role in database: {}", role_str)))?;
    Ok(UserSummary {
        id: row.get("author_id"),
        username: row.get("author_username"),
        display_name: row.get("author_display_name"),
        avatar_url: row.get("author_avatar_url"),
        role,
    })
}

fn map_subject(row: &PgRow) -> Option<Subject> {
    let id: Option<Uuid> = row.get("subject_id");
    id.map(|id| Subject {
        id,
        name: row.get("subject_canonical_name"),
        slug: row.get("subject_slug"),
        is_popular: row.get("subject_is_popular"),
        created_at_utc: row.get("subject_created_at_utc"),
    })
}

/// Shared SELECT column list for exercise rows with author and subject joins.
const EXERCISE_COLUMNS: &str = "\
    e.id, e.title, e.description, e.subject_name, e.answer_count, \
    e.created_at_utc, e.updated_at_utc, \
    u.id AS author_id, u.username AS author_username, \
    u.display_name AS author_display_name, u.avatar_url AS author_avatar_url, \
    u.role AS author_role, \
    s.id AS subject_id, s.name AS subject_canonical_name, s.slug AS subject_slug, \
    s.is_popular AS subject_is_popular, s.created_at_utc AS subject_created_at_utc";

const EXERCISE_FROM: &str = "\
    FROM exercise e \
    JOIN app_user u ON e.author_id = u.id \
    LEFT JOIN subject s ON e.subject_id = s.id";

/// PostgreSQL implementation of ExerciseRepository.
#[derive(Clone)]
pub struct PgExerciseRepository {
    pool: Pool<Postgres>,
}

impl PgExerciseRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Tags for a batch of exercises, ordered by name within each exercise.
    async fn tags_for(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<String>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query(
            "SELECT exercise_id, tag_name FROM exercise_tag \
             WHERE exercise_id = ANY($1) ORDER BY tag_name",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut map: HashMap<Uuid, Vec<String>> = HashMap::new();
        for row in rows {
            map.entry(row.get("exercise_id"))
                .or_default()
                .push(row.get("tag_name"));
        }
        Ok(map)
    }
}

/// Normalize and validate the tag list of a create request.
fn normalize_tags(tags: Vec<String>) -> Result<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() {
            continue;
        }
        validate_tag_name(&tag).map_err(Error::InvalidInput)?;
        if !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    if normalized.len() > MAX_TAGS_PER_EXERCISE {
        return Err(Error::InvalidInput(format!(
            "At most {} tags per exercise",
            MAX_TAGS_PER_EXERCISE
        )));
    }
    Ok(normalized)
}

#[async_trait]
impl ExerciseRepository for PgExerciseRepository {
    async fn insert(&self, author_id: Uuid, req: CreateExerciseRequest) -> Result<Uuid> {
        let title = req.title.trim().to_string();
        let description = req.description.trim().to_string();
        if title.is_empty() {
            return Err(Error::InvalidInput("Title is required".to_string()));
        }
        if description.is_empty() {
            return Err(Error::InvalidInput("Description is required".to_string()));
        }
        let tags = normalize_tags(req.tags)?;
        let subject_name = req
            .subject_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        if let Some(subject_id) = req.subject_id {
            let exists = sqlx::query("SELECT 1 FROM subject WHERE id = $1")
                .bind(subject_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(Error::Database)?;
            if exists.is_none() {
                return Err(Error::NotFound(format!("Subject {} not found", subject_id)));
            }
        }

        let id = Uuid::now_v7();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO exercise \
             (id, title, description, subject_name, subject_id, author_id, answer_count, \
              created_at_utc, updated_at_utc) \
             VALUES ($1, $2, $3, $4, $5, $6, 0, $7, $7)",
        )
        .bind(id)
        .bind(&title)
        .bind(&description)
        .bind(&subject_name)
        .bind(req.subject_id)
        .bind(author_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        for tag in &tags {
            sqlx::query(
                "INSERT INTO tag (name, created_at_utc) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(tag)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

            sqlx::query(
                "INSERT INTO exercise_tag (exercise_id, tag_name) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(tag)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(id)
    }

    async fn fetch(&self, id: Uuid, viewer: Option<Uuid>) -> Result<ExerciseFull> {
        let row = sqlx::query(&format!(
            "SELECT {} {} WHERE e.id = $1",
            EXERCISE_COLUMNS, EXERCISE_FROM
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::ExerciseNotFound(id))?;

        let ids = [id];
        let mut tags = self.tags_for(&ids).await?;
        let mut vote_map =
            votes::summaries_for(&self.pool, VoteTable::Exercise, &ids, viewer).await?;
        let attachments = attachments::list_for_exercise(&self.pool, id).await?;

        Ok(ExerciseFull {
            id,
            title: row.get("title"),
            description: row.get("description"),
            subject_name: row.get("subject_name"),
            subject: map_subject(&row),
            tags: tags.remove(&id).unwrap_or_default(),
            author: map_author(&row)?,
            answer_count: row.get("answer_count"),
            votes: vote_map.remove(&id).unwrap_or_default(),
            attachments,
            created_at_utc: row.get("created_at_utc"),
            updated_at_utc: row.get("updated_at_utc"),
        })
    }

    async fn list(
        &self,
        req: ListExercisesRequest,
        viewer: Option<Uuid>,
    ) -> Result<ListExercisesResponse> {
        let limit = if req.limit <= 0 {
            LIST_DEFAULT_LIMIT
        } else {
            req.limit.min(LIST_MAX_LIMIT)
        };
        let offset = req.offset.max(0);

        // Build the filter clause; parameters are bound in clause order.
        let mut clauses: Vec<String> = Vec::new();
        let mut param_idx: usize = 0;
        let mut next_param = || {
            param_idx += 1;
            param_idx
        };

        let subject_param = req.subject_slug.as_ref().map(|_| next_param());
        if let Some(n) = subject_param {
            clauses.push(format!("s.slug = ${}", n));
        }
        let tag_param = req.tag.as_ref().map(|_| next_param());
        if let Some(n) = tag_param {
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM exercise_tag et \
                 WHERE et.exercise_id = e.id AND et.tag_name = ${})",
                n
            ));
        }
        let author_param = req.author_id.map(|_| next_param());
        if let Some(n) = author_param {
            clauses.push(format!("e.author_id = ${}", n));
        }
        let saved_param = req.saved_by.map(|_| next_param());
        if let Some(n) = saved_param {
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM saved_exercise se \
                 WHERE se.exercise_id = e.id AND se.user_id = ${})",
                n
            ));
        }
        let completed_param = req.completed_by.map(|_| next_param());
        if let Some(n) = completed_param {
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM completed_exercise ce \
                 WHERE ce.exercise_id = e.id AND ce.user_id = ${})",
                n
            ));
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) AS total {} {}", EXERCISE_FROM, where_clause);
        let page_sql = format!(
            "SELECT {} {} {} ORDER BY e.created_at_utc DESC LIMIT ${} OFFSET ${}",
            EXERCISE_COLUMNS,
            EXERCISE_FROM,
            where_clause,
            next_param(),
            next_param()
        );

        let mut count_query = sqlx::query(&count_sql);
        let mut page_query = sqlx::query(&page_sql);
        if let Some(slug) = &req.subject_slug {
            count_query = count_query.bind(slug);
            page_query = page_query.bind(slug);
        }
        if let Some(tag) = &req.tag {
            count_query = count_query.bind(tag);
            page_query = page_query.bind(tag);
        }
        if let Some(author_id) = req.author_id {
            count_query = count_query.bind(author_id);
            page_query = page_query.bind(author_id);
        }
        if let Some(saved_by) = req.saved_by {
            count_query = count_query.bind(saved_by);
            page_query = page_query.bind(saved_by);
        }
        if let Some(completed_by) = req.completed_by {
            count_query = count_query.bind(completed_by);
            page_query = page_query.bind(completed_by);
        }
        page_query = page_query.bind(limit).bind(offset);

        let total: i64 = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?
            .get("total");

        let rows = page_query
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.get("id")).collect();
        let mut tags = self.tags_for(&ids).await?;
        let mut vote_map =
            votes::summaries_for(&self.pool, VoteTable::Exercise, &ids, viewer).await?;

        let mut exercises = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: Uuid = row.get("id");
            exercises.push(ExerciseSummary {
                id,
                title: row.get("title"),
                subject_name: row.get("subject_name"),
                subject: map_subject(row),
                tags: tags.remove(&id).unwrap_or_default(),
                author: map_author(row)?,
                answer_count: row.get("answer_count"),
                votes: vote_map.remove(&id).unwrap_or_default(),
                created_at_utc: row.get("created_at_utc"),
            });
        }

        Ok(ListExercisesResponse { exercises, total })
    }

    async fn author_of(&self, id: Uuid) -> Result<Option<Uuid>> {
        let row = sqlx::query("SELECT author_id FROM exercise WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.map(|row| row.get("author_id")))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM exercise WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        if result.rows_affected() == 0 {
            return Err(Error::ExerciseNotFound(id));
        }
        Ok(())
    }

    async fn vote(&self, id: Uuid, user_id: Uuid, kind: VoteKind) -> Result<VoteResult> {
        let exists = sqlx::query("SELECT 1 FROM exercise WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        if exists.is_none() {
            return Err(Error::ExerciseNotFound(id));
        }

        votes::toggle(&self.pool, VoteTable::Exercise, id, user_id, kind).await
    }

    async fn list_unmigrated_subjects(&self, limit: i64) -> Result<Vec<(Uuid, String)>> {
        let rows = sqlx::query(
            "SELECT id, subject_name FROM exercise \
             WHERE subject_id IS NULL \
               AND subject_name IS NOT NULL \
               AND TRIM(subject_name) <> '' \
             ORDER BY created_at_utc \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get("id"), row.get("subject_name")))
            .collect())
    }

    async fn set_subject(&self, id: Uuid, subject_id: Uuid) -> Result<()> {
        let result = sqlx::query("UPDATE exercise SET subject_id = $2 WHERE id = $1")
            .bind(id)
            .bind(subject_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        if result.rows_affected() == 0 {
            return Err(Error::ExerciseNotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tags_dedups_and_lowercases() {
        let tags = normalize_tags(vec![
            "Derivatives".to_string(),
            "derivatives".to_string(),
            "  c++  ".to_string(),
            "".to_string(),
        ])
        .unwrap();
        assert_eq!(tags, vec!["derivatives".to_string(), "c++".to_string()]);
    }

    #[test]
    fn test_normalize_tags_rejects_invalid() {
        assert!(normalize_tags(vec!["has space".to_string()]).is_err());
    }

    #[test]
    fn test_normalize_tags_enforces_cap() {
        let tags: Vec<String> = (0..11).map(|i| format!("tag-{}", i)).collect();
        assert!(normalize_tags(tags).is_err());
    }
}
