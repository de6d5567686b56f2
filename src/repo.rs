//! Ownership-scoped task repository.
//!
//! Every read, update, and delete is scoped by `(id, owner)` in a single
//! statement, so "task does not exist" and "task belongs to someone else"
//! are the same outcome by construction — non-owners cannot probe for
//! existence. The owner column is written once at creation and never
//! appears in an UPDATE.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::TaskRow;

/// Trim title/description and reject empties. Returns the trimmed values so
/// stored fields never carry surrounding whitespace.
pub fn validate_payload<'a>(
    title: &'a str,
    description: &'a str,
) -> Result<(&'a str, &'a str), ApiError> {
    let title = title.trim();
    let description = description.trim();
    if title.is_empty() || description.is_empty() {
        return Err(ApiError::InvalidInput("Title and description are required"));
    }
    Ok((title, description))
}

pub async fn create(
    pool: &PgPool,
    owner: Uuid,
    title: &str,
    description: &str,
) -> Result<TaskRow, ApiError> {
    let (title, description) = validate_payload(title, description)?;
    let row = sqlx::query_as::<_, TaskRow>(
        "INSERT INTO tf_tasks (title, description, owner) VALUES ($1, $2, $3) \
         RETURNING id, title, description, owner, created_at, updated_at",
    )
    .bind(title)
    .bind(description)
    .bind(owner)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Insertion order — stable across repeated identical queries.
pub async fn list(pool: &PgPool, owner: Uuid) -> Result<Vec<TaskRow>, ApiError> {
    let rows = sqlx::query_as::<_, TaskRow>(
        "SELECT id, title, description, owner, created_at, updated_at \
         FROM tf_tasks WHERE owner = $1 ORDER BY created_at, id",
    )
    .bind(owner)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn update(
    pool: &PgPool,
    owner: Uuid,
    task_id: Uuid,
    title: &str,
    description: &str,
) -> Result<TaskRow, ApiError> {
    let (title, description) = validate_payload(title, description)?;
    sqlx::query_as::<_, TaskRow>(
        "UPDATE tf_tasks SET title = $1, description = $2, updated_at = NOW() \
         WHERE id = $3 AND owner = $4 \
         RETURNING id, title, description, owner, created_at, updated_at",
    )
    .bind(title)
    .bind(description)
    .bind(task_id)
    .bind(owner)
    .fetch_optional(pool)
    .await?
    .ok_or(ApiError::NotFound)
}

pub async fn delete(pool: &PgPool, owner: Uuid, task_id: Uuid) -> Result<(), ApiError> {
    let result = sqlx::query("DELETE FROM tf_tasks WHERE id = $1 AND owner = $2")
        .bind(task_id)
        .bind(owner)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(())
}
