//! Ownership-scoped task CRUD and AI suggestions.
//!
//! Per-request order is fixed: the `CurrentUser` extractor verifies the
//! token, the handler ensures the shared connection, then delegates to the
//! repository. The suggest endpoint skips the database entirely — the
//! suggestion set is transient and never persisted.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::models::*;
use crate::repo;
use crate::state::AppState;

/// Path ids must be syntactically valid before they touch the repository —
/// a malformed id is 400, a well-formed-but-absent one is 404.
fn parse_task_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::InvalidInput("Invalid task id"))
}

// ═══════════════════════════════════════════════════════════════════════
//  GET /tasks
// ═══════════════════════════════════════════════════════════════════════

#[utoipa::path(get, path = "/tasks", tag = "tasks",
    responses(
        (status = 200, description = "Caller's tasks", body = [Task]),
        (status = 401, description = "Missing or invalid token")
    ))]
pub async fn list_tasks(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
) -> Result<Json<Vec<Task>>, ApiError> {
    let pool = state.db.ensure().await?;
    let rows = repo::list(&pool, owner).await?;
    Ok(Json(rows.into_iter().map(Task::from).collect()))
}

// ═══════════════════════════════════════════════════════════════════════
//  POST /tasks
// ═══════════════════════════════════════════════════════════════════════

#[utoipa::path(post, path = "/tasks", tag = "tasks",
    request_body = TaskPayload,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Empty title or description"),
        (status = 401, description = "Missing or invalid token")
    ))]
pub async fn create_task(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    Json(req): Json<TaskPayload>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    // Reject bad input before any connection work.
    repo::validate_payload(&req.title, &req.description)?;

    let pool = state.db.ensure().await?;
    let row = repo::create(&pool, owner, &req.title, &req.description).await?;
    tracing::info!(task = %row.id, "task created");
    Ok((StatusCode::CREATED, Json(Task::from(row))))
}

// ═══════════════════════════════════════════════════════════════════════
//  PUT /tasks/{id}
// ═══════════════════════════════════════════════════════════════════════

#[utoipa::path(put, path = "/tasks/{id}", tag = "tasks",
    params(("id" = String, Path, description = "Task UUID")),
    request_body = TaskPayload,
    responses(
        (status = 200, description = "Updated task", body = Task),
        (status = 400, description = "Invalid id or empty fields"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Task not found or owned by another user")
    ))]
pub async fn update_task(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<TaskPayload>,
) -> Result<Json<Task>, ApiError> {
    let task_id = parse_task_id(&id)?;
    repo::validate_payload(&req.title, &req.description)?;

    let pool = state.db.ensure().await?;
    let row = repo::update(&pool, owner, task_id, &req.title, &req.description).await?;
    Ok(Json(Task::from(row)))
}

// ═══════════════════════════════════════════════════════════════════════
//  DELETE /tasks/{id}
// ═══════════════════════════════════════════════════════════════════════

#[utoipa::path(delete, path = "/tasks/{id}", tag = "tasks",
    params(("id" = String, Path, description = "Task UUID")),
    responses(
        (status = 200, description = "Task deleted"),
        (status = 400, description = "Invalid id"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Task not found or owned by another user")
    ))]
pub async fn delete_task(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let task_id = parse_task_id(&id)?;

    let pool = state.db.ensure().await?;
    repo::delete(&pool, owner, task_id).await?;
    tracing::info!(task = %task_id, "task deleted");
    Ok(Json(json!({ "message": "Task deleted successfully" })))
}

// ═══════════════════════════════════════════════════════════════════════
//  POST /tasks/suggest
// ═══════════════════════════════════════════════════════════════════════

#[utoipa::path(post, path = "/tasks/suggest", tag = "tasks",
    request_body = SuggestRequest,
    responses(
        (status = 200, description = "1-5 advisory suggestions", body = SuggestionsResponse),
        (status = 400, description = "Empty title or description"),
        (status = 401, description = "Missing or invalid token")
    ))]
pub async fn suggest_task(
    State(state): State<AppState>,
    CurrentUser(_owner): CurrentUser,
    Json(req): Json<SuggestRequest>,
) -> Result<Json<SuggestionsResponse>, ApiError> {
    if req.title.trim().is_empty() || req.description.trim().is_empty() {
        return Err(ApiError::InvalidInput("Title and description are required"));
    }

    let suggestions = state.suggestions.suggest(&req.title, &req.description).await;
    Ok(Json(SuggestionsResponse { suggestions }))
}
