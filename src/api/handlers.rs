use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::extract::AppJson;
use crate::errors::AppError;
use crate::models::idea::Idea;
use crate::service::{Attachment, IdeaPatch, PriorityBoard, Submission};
use crate::AppState;

// ── Request / Response DTOs ──────────────────────────────────

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct PriorityRequest {
    pub priority: Option<String>,
}

#[derive(Deserialize)]
pub struct CommentRequest {
    pub comment: Option<String>,
}

#[derive(Deserialize)]
pub struct PatchRequest {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub comment: Option<String>,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub message: String,
    pub idea: Idea,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub message: String,
    pub updated_idea: Idea,
}

// ── Handlers ─────────────────────────────────────────────────

/// POST /api/ideas: multipart form {name, email, ideaDesc, file?}
pub async fn submit_idea(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    let submission = read_submission(multipart).await?;
    let idea = state.ideas.submit(submission).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            message: "Idea submitted successfully!".to_string(),
            idea,
        }),
    ))
}

/// GET /api/ideas: every idea in submission order
pub async fn list_ideas(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Idea>>, AppError> {
    Ok(Json(state.ideas.list_all().await?))
}

/// GET /api/ideas/:id
pub async fn get_idea(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Idea>, AppError> {
    Ok(Json(state.ideas.get(&id).await?))
}

/// PATCH /api/ideas/:id: any subset of {status, priority, comment}
pub async fn patch_idea(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<PatchRequest>,
) -> Result<Json<Idea>, AppError> {
    let patch = IdeaPatch {
        status: payload.status,
        priority: payload.priority,
        comment: payload.comment,
    };
    Ok(Json(state.ideas.patch(&id, patch).await?))
}

/// GET /api/priority-board: ideas grouped into the dashboard's columns
pub async fn priority_board(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PriorityBoard>, AppError> {
    Ok(Json(state.ideas.priority_board().await?))
}

/// POST /api/update-idea/:id: {status}
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<StatusRequest>,
) -> Result<Json<Idea>, AppError> {
    Ok(Json(
        state.ideas.set_status(&id, payload.status.as_deref()).await?,
    ))
}

/// POST /api/update-priority/:id: {priority}
pub async fn update_priority(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<PriorityRequest>,
) -> Result<Json<Idea>, AppError> {
    Ok(Json(
        state
            .ideas
            .set_priority(&id, payload.priority.as_deref())
            .await?,
    ))
}

/// POST /api/update-comment/:id: {comment}; "" clears, absent is 400
pub async fn update_comment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<CommentRequest>,
) -> Result<Json<CommentResponse>, AppError> {
    let updated_idea = state
        .ideas
        .set_comment(&id, payload.comment.as_deref())
        .await?;

    Ok(Json(CommentResponse {
        message: "Comment updated successfully".to_string(),
        updated_idea,
    }))
}

/// DELETE /api/delete-idea/:id
pub async fn delete_idea(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.ideas.delete(&id).await?;
    Ok(Json(json!({ "message": "Idea deleted successfully" })))
}

/// Collect the submission form. Unknown parts are skipped.
async fn read_submission(mut multipart: Multipart) -> Result<Submission, AppError> {
    let mut submission = Submission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read upload: {}", e)))?;
                submission.attachment = Some(Attachment { file_name, data });
            }
            "name" | "email" | "ideaDesc" | "description" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read field {}: {}", name, e)))?;
                match name.as_str() {
                    "name" => submission.name = Some(text),
                    "email" => submission.email = Some(text),
                    _ => submission.description = Some(text),
                }
            }
            other => {
                tracing::debug!(field = other, "ignoring unknown submission field");
            }
        }
    }

    Ok(submission)
}
