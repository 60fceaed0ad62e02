//! Answer handlers: listing, creation, votes, deletion.
//!
//! Answer creation is the main notification trigger: a top-level answer
//! produces a `comment` event for the exercise author, a reply produces a
//! `reply` event for the parent answer's author. Notification delivery is
//! best-effort and never fails the write.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiError, AppState, Auth, RequireAuth};
use solvehub_core::{
    Answer, AnswerOrder, AnswerRepository, CreateAnswerRequest, ExerciseRepository,
    NewNotification, NotificationKind, VoteKind, VoteSummary,
};

#[derive(Debug, Deserialize)]
pub struct ListAnswersQuery {
    #[serde(default)]
    pub order: AnswerOrder,
}

/// All answers for an exercise.
pub async fn list_answers(
    State(state): State<AppState>,
    auth: Auth,
    Path(exercise_id): Path<Uuid>,
    Query(query): Query<ListAnswersQuery>,
) -> Result<Json<Vec<Answer>>, ApiError> {
    // Listing answers of a missing exercise is a 404, not an empty list.
    if state.db.exercises.author_of(exercise_id).await?.is_none() {
        return Err(ApiError::NotFound(format!(
            "Exercise {} not found",
            exercise_id
        )));
    }

    let viewer = auth.user.as_ref().map(|user| user.id);
    let answers = state
        .db
        .answers
        .list_for_exercise(exercise_id, query.order, viewer)
        .await?;
    Ok(Json(answers))
}

/// Post an answer or a reply.
pub async fn create_answer(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(exercise_id): Path<Uuid>,
    Json(req): Json<CreateAnswerRequest>,
) -> Result<(StatusCode, Json<Answer>), ApiError> {
    let parent_answer_id = req.parent_answer_id;
    let answer_id = state
        .db
        .answers
        .insert(exercise_id, auth.user.id, req)
        .await?;
    let answer = state.db.answers.fetch(answer_id, Some(auth.user.id)).await?;

    // Route the notification: reply → parent answer author, answer →
    // exercise author. Never notify the acting user about their own post.
    let link = format!("/exercises/{}", exercise_id);
    match parent_answer_id {
        Some(parent_id) => {
            if let Some(parent_author) = state.db.answers.author_of(parent_id).await? {
                if parent_author != auth.user.id {
                    let _ = state
                        .dispatcher
                        .dispatch(NewNotification {
                            recipient_id: parent_author,
                            kind: NotificationKind::Reply,
                            message: format!("{} replied to your answer", auth.user.username),
                            link: link.clone(),
                            exercise_id: Some(exercise_id),
                            answer_id: Some(answer_id),
                        })
                        .await;
                }
            }
        }
        None => {
            if let Some(exercise_author) = state.db.exercises.author_of(exercise_id).await? {
                if exercise_author != auth.user.id {
                    let _ = state
                        .dispatcher
                        .dispatch(NewNotification {
                            recipient_id: exercise_author,
                            kind: NotificationKind::Comment,
                            message: format!("{} answered your exercise", auth.user.username),
                            link: link.clone(),
                            exercise_id: Some(exercise_id),
                            answer_id: Some(answer_id),
                        })
                        .await;
                }
            }
        }
    }

    tracing::info!(
        subsystem = "api",
        exercise_id = %exercise_id,
        answer_id = %answer_id,
        user_id = %auth.user.id,
        "Answer created"
    );
    Ok((StatusCode::CREATED, Json(answer)))
}

/// Delete an answer (author, moderator, or admin).
pub async fn delete_answer(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let author = state
        .db
        .answers
        .author_of(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Answer {} not found", id)))?;
    if author != auth.user.id && !auth.user.role.can_moderate() {
        return Err(ApiError::Forbidden(
            "Only the author or a moderator can delete an answer".to_string(),
        ));
    }

    state.db.answers.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Toggle a vote on an answer. Answer likes carry no notification.
pub async fn vote_answer(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
    kind: VoteKind,
) -> Result<Json<VoteSummary>, ApiError> {
    let result = state.db.answers.vote(id, auth.user.id, kind).await?;
    Ok(Json(result.summary))
}
