//! Answer repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use solvehub_core::{
    Answer, AnswerOrder, AnswerRepository, CreateAnswerRequest, Error, Result, Role, UserSummary,
    VoteKind, VoteResult,
};

use crate::attachments;
use crate::votes::{self, VoteTable};

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

const ANSWER_COLUMNS: &str = "\
    a.id, a.exercise_id, a.parent_answer_id, a.content, a.created_at_utc, \
    u.id AS author_id, u.username AS author_username, \
    u.display_name AS author_display_name, u.avatar_url AS author_avatar_url, \
    u.role AS author_role";

const ANSWER_FROM: &str = "FROM answer a JOIN app_user u ON a.author_id = u.id";

/// PostgreSQL implementation of AnswerRepository.
#[derive(Clone)]
pub struct PgAnswerRepository {
    pool: Pool<Postgres>,
}

impl PgAnswerRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn build_answers(&self, rows: Vec<PgRow>, viewer: Option<Uuid>) -> Result<Vec<Answer>> {
        let ids: Vec<Uuid> = rows.iter().map(|row| row.get("id")).collect();
        let mut vote_map = votes::summaries_for(&self.pool, VoteTable::Answer, &ids, viewer).await?;
        let mut attachment_map = attachments::list_for_answers(&self.pool, &ids).await?;

        let mut answers = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: Uuid = row.get("id");
            answers.push(Answer {
                id,
                exercise_id: row.get("exercise_id"),
                parent_answer_id: row.get("parent_answer_id"),
                content: row.get("content"),
                author: map_author(row)?,
                votes: vote_map.remove(&id).unwrap_or_default(),
                attachments: attachment_map.remove(&id).unwrap_or_default(),
                created_at_utc: row.get("created_at_utc"),
            });
        }
        Ok(answers)
    }
}

/// Order answers as threads: top-level answers newest first, each followed
/// by its replies oldest first (recursively, for replies to replies).
fn thread_order(answers: Vec<Answer>) -> Vec<Answer> {
    let mut children: HashMap<Uuid, Vec<Answer>> = HashMap::new();
    let mut roots: Vec<Answer> = Vec::new();

    for answer in answers {
        match answer.parent_answer_id {
            Some(parent) => children.entry(parent).or_default().push(answer),
            None => roots.push(answer),
        }
    }

    roots.sort_by(|a, b| b.created_at_utc.cmp(&a.created_at_utc));
    for replies in children.values_mut() {
        replies.sort_by(|a, b| a.created_at_utc.cmp(&b.created_at_utc));
    }

    fn append(out: &mut Vec<Answer>, node: Answer, children: &mut HashMap<Uuid, Vec<Answer>>) {
        let id = node.id;
        out.push(node);
        if let Some(replies) = children.remove(&id) {
            for reply in replies {
                append(out, reply, children);
            }
        }
    }

    let mut ordered = Vec::new();
    for root in roots {
        append(&mut ordered, root, &mut children);
    }
    // Orphaned replies (parent deleted mid-listing) go at the end rather
    // than silently disappearing.
    let mut leftovers: Vec<Answer> = children.into_values().flatten().collect();
    leftovers.sort_by(|a, b| a.created_at_utc.cmp(&b.created_at_utc));
    ordered.extend(leftovers);
    ordered
}

#[async_trait]
impl AnswerRepository for PgAnswerRepository {
    async fn insert(
        &self,
        exercise_id: Uuid,
        author_id: Uuid,
        req: CreateAnswerRequest,
    ) -> Result<Uuid> {
        let content = req.content.trim().to_string();
        if content.is_empty() {
            return Err(Error::InvalidInput("Content is required".to_string()));
        }

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let exists = sqlx::query("SELECT 1 FROM exercise WHERE id = $1")
            .bind(exercise_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::Database)?;
        if exists.is_none() {
            return Err(Error::ExerciseNotFound(exercise_id));
        }

        if let Some(parent_id) = req.parent_answer_id {
            let parent_exercise: Option<Uuid> =
                sqlx::query("SELECT exercise_id FROM answer WHERE id = $1")
                    .bind(parent_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(Error::Database)?
                    .map(|row| row.get("exercise_id"));
            match parent_exercise {
                None => return Err(Error::AnswerNotFound(parent_id)),
                Some(pe) if pe != exercise_id => {
                    return Err(Error::InvalidInput(
                        "Parent answer belongs to a different exercise".to_string(),
                    ));
                }
                Some(_) => {}
            }
        }

        let id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO answer \
             (id, exercise_id, parent_answer_id, author_id, content, created_at_utc) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id)
        .bind(exercise_id)
        .bind(req.parent_answer_id)
        .bind(author_id)
        .bind(&content)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        // Denormalized count, bumped in the same transaction as the insert.
        sqlx::query("UPDATE exercise SET answer_count = answer_count + 1 WHERE id = $1")
            .bind(exercise_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(id)
    }

    async fn fetch(&self, id: Uuid, viewer: Option<Uuid>) -> Result<Answer> {
        let row = sqlx::query(&format!(
            "SELECT {} {} WHERE a.id = $1",
            ANSWER_COLUMNS, ANSWER_FROM
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::AnswerNotFound(id))?;

        let answers = self.build_answers(vec![row], viewer).await?;
        Ok(answers.into_iter().next().expect("one row maps to one answer"))
    }

    async fn list_for_exercise(
        &self,
        exercise_id: Uuid,
        order: AnswerOrder,
        viewer: Option<Uuid>,
    ) -> Result<Vec<Answer>> {
        let rows = sqlx::query(&format!(
            "SELECT {} {} WHERE a.exercise_id = $1 ORDER BY a.created_at_utc DESC",
            ANSWER_COLUMNS, ANSWER_FROM
        ))
        .bind(exercise_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let answers = self.build_answers(rows, viewer).await?;
        Ok(match order {
            AnswerOrder::Recent => answers,
            AnswerOrder::Thread => thread_order(answers),
        })
    }

    async fn author_of(&self, id: Uuid) -> Result<Option<Uuid>> {
        let row = sqlx::query("SELECT author_id FROM answer WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.map(|row| row.get("author_id")))
    }

    async fn exercise_of(&self, id: Uuid) -> Result<Option<Uuid>> {
        let row = sqlx::query("SELECT exercise_id FROM answer WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.map(|row| row.get("exercise_id")))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let exercise_id: Uuid = sqlx::query("SELECT exercise_id FROM answer WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::Database)?
            .map(|row| row.get("exercise_id"))
            .ok_or(Error::AnswerNotFound(id))?;

        sqlx::query("DELETE FROM answer WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        // Replies cascade, so recount instead of decrementing.
        sqlx::query(
            "UPDATE exercise SET answer_count = \
             (SELECT COUNT(*) FROM answer WHERE exercise_id = $1) \
             WHERE id = $1",
        )
        .bind(exercise_id)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn vote(&self, id: Uuid, user_id: Uuid, kind: VoteKind) -> Result<VoteResult> {
        let exists = sqlx::query("SELECT 1 FROM answer WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        if exists.is_none() {
            return Err(Error::AnswerNotFound(id));
        }

        votes::toggle(&self.pool, VoteTable::Answer, id, user_id, kind).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use solvehub_core::VoteSummary;

    fn answer(id: u128, parent: Option<u128>, minutes_ago: i64) -> Answer {
        Answer {
            id: Uuid::from_u128(id),
            exercise_id: Uuid::from_u128(999),
            parent_answer_id: parent.map(Uuid::from_u128),
            content: format!("answer {}", id),
            author: UserSummary {
                id: Uuid::from_u128(1),
                username: "ana".to_string(),
                display_name: None,
                avatar_url: None,
                role: Role::Student,
            },
            votes: VoteSummary::default(),
            attachments: Vec::new(),
            created_at_utc: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn test_thread_order_groups_replies_under_parents() {
        // Two top-level answers (1 older, 2 newer); 3 and 4 reply to 1.
        let answers = vec![
            answer(1, None, 60),
            answer(2, None, 10),
            answer(3, Some(1), 50),
            answer(4, Some(1), 40),
        ];

        let ordered: Vec<u128> = thread_order(answers)
            .into_iter()
            .map(|a| a.id.as_u128())
            .collect();

        // Newest top-level first; replies oldest-first under their parent.
        assert_eq!(ordered, vec![2, 1, 3, 4]);
    }

    #[test]
    fn test_thread_order_handles_nested_replies() {
        let answers = vec![
            answer(1, None, 60),
            answer(2, Some(1), 50),
            answer(3, Some(2), 40),
        ];

        let ordered: Vec<u128> = thread_order(answers)
            .into_iter()
            .map(|a| a.id.as_u128())
            .collect();

        assert_eq!(ordered, vec![1, 2, 3]);
    }

    #[test]
    fn test_thread_order_keeps_orphans() {
        let answers = vec![answer(1, None, 60), answer(5, Some(42), 30)];
        let ordered = thread_order(answers);
        assert_eq!(ordered.len(), 2);
    }
}
