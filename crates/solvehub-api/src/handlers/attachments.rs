//! Attachment upload and download handlers.
//!
//! Uploads are multipart: up to 5 files per request, 10 MB each, images or
//! PDFs only. Files go straight to the configured storage backend and are
//! recorded as `hosted`; the legacy `local_legacy` variant only exists for
//! records awaiting the `attachment-migrate` tool.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Redirect,
    Json,
};
use uuid::Uuid;

use crate::config::{MAX_UPLOAD_BYTES, MAX_UPLOAD_FILES};
use crate::{ApiError, AppState, RequireAuth};
use solvehub_core::{
    AnswerRepository, Attachment, AttachmentOwner, ExerciseRepository, StorageLocation, User,
};
use solvehub_db::{generate_storage_key, StorageBackend};

/// Allowed upload MIME types: any image, or PDF.
fn allowed_content_type(content_type: &str) -> bool {
    content_type.starts_with("image/") || content_type == mime::APPLICATION_PDF.as_ref()
}

/// Upload attachments to an exercise (author or moderator).
pub async fn upload_exercise_attachments(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Vec<Attachment>>), ApiError> {
    let author = state
        .db
        .exercises
        .author_of(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Exercise {} not found", id)))?;
    authorize_owner(&auth.user, author)?;

    let attachments = store_files(&state, AttachmentOwner::Exercise(id), multipart).await?;
    Ok((StatusCode::CREATED, Json(attachments)))
}

/// Upload attachments to an answer (author or moderator).
pub async fn upload_answer_attachments(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Vec<Attachment>>), ApiError> {
    let author = state
        .db
        .answers
        .author_of(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Answer {} not found", id)))?;
    authorize_owner(&auth.user, author)?;

    let attachments = store_files(&state, AttachmentOwner::Answer(id), multipart).await?;
    Ok((StatusCode::CREATED, Json(attachments)))
}

fn authorize_owner(user: &User, author: Uuid) -> Result<(), ApiError> {
    if author != user.id && !user.role.can_moderate() {
        return Err(ApiError::Forbidden(
            "Only the author can attach files".to_string(),
        ));
    }
    Ok(())
}

async fn store_files(
    state: &AppState,
    owner: AttachmentOwner,
    mut multipart: Multipart,
) -> Result<Vec<Attachment>, ApiError> {
    let mut attachments = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart request: {}", e)))?
    {
        if attachments.len() >= MAX_UPLOAD_FILES {
            return Err(ApiError::BadRequest(format!(
                "At most {} files per request",
                MAX_UPLOAD_FILES
            )));
        }

        let filename = field
            .file_name()
            .map(String::from)
            .ok_or_else(|| ApiError::BadRequest("Multipart field has no filename".to_string()))?;
        let content_type = field
            .content_type()
            .map(String::from)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        if !allowed_content_type(&content_type) {
            return Err(ApiError::BadRequest(format!(
                "Unsupported content type {}: only images and PDF are accepted",
                content_type
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
        if data.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError::BadRequest(format!(
                "File {} exceeds the {} MB limit",
                filename,
                MAX_UPLOAD_BYTES / (1024 * 1024)
            )));
        }
        if data.is_empty() {
            return Err(ApiError::BadRequest(format!("File {} is empty", filename)));
        }

        let key = generate_storage_key(&state.config.storage_folder, &filename);
        let stored = state.storage.store(&key, &content_type, &data).await?;

        let attachment = state
            .db
            .attachments
            .insert(
                owner,
                &filename,
                &content_type,
                StorageLocation::Hosted {
                    url: stored.url,
                    storage_key: stored.storage_key,
                    size: stored.size_bytes,
                },
            )
            .await?;
        attachments.push(attachment);
    }

    if attachments.is_empty() {
        return Err(ApiError::BadRequest("No files in request".to_string()));
    }
    Ok(attachments)
}

/// Redirect to the hosted file.
pub async fn download_attachment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Redirect, ApiError> {
    let attachment = state
        .db
        .attachments
        .fetch(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Attachment {} not found", id)))?;

    match attachment.storage {
        StorageLocation::Hosted { url, .. } => Ok(Redirect::temporary(&url)),
        StorageLocation::LocalLegacy { .. } => Err(ApiError::NotFound(
            "Attachment is awaiting migration to hosted storage".to_string(),
        )),
    }
}

/// Delete an attachment (owner of the parent content, or moderator).
///
/// The record removal is authoritative; blob cleanup is best-effort and a
/// failure there is logged and swallowed.
pub async fn delete_attachment(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let attachment = state
        .db
        .attachments
        .fetch(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Attachment {} not found", id)))?;

    let author = match (attachment.exercise_id, attachment.answer_id) {
        (Some(exercise_id), _) => state.db.exercises.author_of(exercise_id).await?,
        (_, Some(answer_id)) => state.db.answers.author_of(answer_id).await?,
        _ => None,
    };
    let author =
        author.ok_or_else(|| ApiError::NotFound(format!("Attachment {} is orphaned", id)))?;
    authorize_owner(&auth.user, author)?;

    state.db.attachments.delete(id).await?;

    if let StorageLocation::Hosted { storage_key, .. } = &attachment.storage {
        if let Err(e) = state.storage.delete(storage_key).await {
            tracing::warn!(
                subsystem = "api",
                storage_key = %storage_key,
                error = %e,
                "Blob cleanup failed after attachment delete"
            );
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
