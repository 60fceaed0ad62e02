//! Shared like/dislike vote plumbing for exercises and answers.
//!
//! Both vote tables have the same shape; the queries differ only in table
//! and target-column names, which are fixed strings picked by [`VoteTable`].

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use solvehub_core::{Error, Result, VoteKind, VoteResult, VoteSummary};

/// Which vote table a query targets.
#[derive(Debug, Clone, Copy)]
pub(crate) enum VoteTable {
    Exercise,
    Answer,
}

impl VoteTable {
    fn table(&self) -> &'static str {
        match self {
            VoteTable::Exercise => "exercise_vote",
            VoteTable::Answer => "answer_vote",
        }
    }

    fn id_column(&self) -> &'static str {
        match self {
            VoteTable::Exercise => "exercise_id",
            VoteTable::Answer => "answer_id",
        }
    }
}

/// Toggle a vote: the same vote twice removes it, the opposite vote
/// replaces it. Returns the post-toggle summary and whether a like was
/// newly added.
pub(crate) async fn toggle(
    pool: &Pool<Postgres>,
    table: VoteTable,
    target_id: Uuid,
    user_id: Uuid,
    kind: VoteKind,
) -> Result<VoteResult> {
    let mut tx = pool.begin().await.map_err(Error::Database)?;

    let existing: Option<i16> = sqlx::query(&format!(
        "SELECT vote FROM {} WHERE {} = $1 AND user_id = $2 FOR UPDATE",
        table.table(),
        table.id_column()
    ))
    .bind(target_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(Error::Database)?
    .map(|row| row.get("vote"));

    let mut added_like = false;
    match existing {
        Some(v) if v == kind.value() => {
            sqlx::query(&format!(
                "DELETE FROM {} WHERE {} = $1 AND user_id = $2",
                table.table(),
                table.id_column()
            ))
            .bind(target_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        }
        Some(_) => {
            sqlx::query(&format!(
                "UPDATE {} SET vote = $3, created_at_utc = $4 WHERE {} = $1 AND user_id = $2",
                table.table(),
                table.id_column()
            ))
            .bind(target_id)
            .bind(user_id)
            .bind(kind.value())
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
            added_like = kind == VoteKind::Like;
        }
        None => {
            sqlx::query(&format!(
                "INSERT INTO {} ({}, user_id, vote, created_at_utc) VALUES ($1, $2, $3, $4)",
                table.table(),
                table.id_column()
            ))
            .bind(target_id)
            .bind(user_id)
            .bind(kind.value())
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
            added_like = kind == VoteKind::Like;
        }
    }

    let row = sqlx::query(&format!(
        "SELECT \
         COUNT(*) FILTER (WHERE vote = 1) AS likes, \
         COUNT(*) FILTER (WHERE vote = -1) AS dislikes, \
         MAX(vote) FILTER (WHERE user_id = $2) AS own_vote \
         FROM {} WHERE {} = $1",
        table.table(),
        table.id_column()
    ))
    .bind(target_id)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(Error::Database)?;

    tx.commit().await.map_err(Error::Database)?;

    let summary = VoteSummary {
        likes: row.get("likes"),
        dislikes: row.get("dislikes"),
        own_vote: row
            .get::<Option<i16>, _>("own_vote")
            .and_then(VoteKind::from_value),
    };

    Ok(VoteResult {
        summary,
        added_like,
    })
}

/// Vote summaries for a batch of targets, including the viewer's own vote.
pub(crate) async fn summaries_for(
    pool: &Pool<Postgres>,
    table: VoteTable,
    target_ids: &[Uuid],
    viewer: Option<Uuid>,
) -> Result<HashMap<Uuid, VoteSummary>> {
    if target_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query(&format!(
        "SELECT {id}, \
         COUNT(*) FILTER (WHERE vote = 1) AS likes, \
         COUNT(*) FILTER (WHERE vote = -1) AS dislikes, \
         MAX(vote) FILTER (WHERE user_id = $2) AS own_vote \
         FROM {table} WHERE {id} = ANY($1) GROUP BY {id}",
        id = table.id_column(),
        table = table.table()
    ))
    .bind(target_ids)
    .bind(viewer)
    .fetch_all(pool)
    .await
    .map_err(Error::Database)?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let id: Uuid = row.get(0);
            let summary = VoteSummary {
                likes: row.get("likes"),
                dislikes: row.get("dislikes"),
                own_vote: row
                    .get::<Option<i16>, _>("own_vote")
                    .and_then(VoteKind::from_value),
            };
            (id, summary)
        })
        .collect())
}
