//! Registration and login.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::auth::sign_token;
use crate::error::ApiError;
use crate::models::*;
use crate::state::AppState;

// ═══════════════════════════════════════════════════════════════════════
//  POST /auth/register
// ═══════════════════════════════════════════════════════════════════════

#[utoipa::path(post, path = "/auth/register", tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Missing fields or email already registered")
    ))]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let username = req.username.trim();
    let email = req.email.trim();
    if username.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(ApiError::InvalidInput(
            "Username, email and password are required",
        ));
    }

    let pool = state.db.ensure().await?;

    // bcrypt is CPU-bound — keep it off the async workers.
    let password = req.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || {
        bcrypt::hash(password, bcrypt::DEFAULT_COST)
    })
    .await
    .map_err(|err| ApiError::Internal(anyhow::Error::new(err).context("hash task panicked")))?
    .map_err(|err| ApiError::Internal(anyhow::Error::new(err).context("password hashing failed")))?;

    let row = sqlx::query_as::<_, UserRow>(
        "INSERT INTO tf_users (email, password_hash, username) VALUES ($1, $2, $3) \
         RETURNING id, email, password_hash, username, created_at",
    )
    .bind(email)
    .bind(&password_hash)
    .bind(username)
    .fetch_one(&pool)
    .await
    .map_err(|err| {
        if matches!(&err, sqlx::Error::Database(db) if db.is_unique_violation()) {
            ApiError::InvalidInput("Email already registered")
        } else {
            ApiError::from(err)
        }
    })?;

    tracing::info!(user = %row.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Registration successful",
            "user": User::from(row),
        })),
    ))
}

// ═══════════════════════════════════════════════════════════════════════
//  POST /auth/login
// ═══════════════════════════════════════════════════════════════════════

#[utoipa::path(post, path = "/auth/login", tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Invalid email or password")
    ))]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = req.email.trim();
    if email.is_empty() || req.password.is_empty() {
        return Err(ApiError::InvalidInput("Email and password are required"));
    }

    let pool = state.db.ensure().await?;

    // Unknown email and wrong password produce the same 401 — the response
    // must not reveal whether the email exists.
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, email, password_hash, username, created_at FROM tf_users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(&pool)
    .await?
    .ok_or(ApiError::InvalidCredentials)?;

    let password = req.password.clone();
    let hash = row.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|err| ApiError::Internal(anyhow::Error::new(err).context("verify task panicked")))?
        .map_err(|err| {
            ApiError::Internal(anyhow::Error::new(err).context("password verification failed"))
        })?;
    if !valid {
        return Err(ApiError::InvalidCredentials);
    }

    let secret = state
        .jwt_secret
        .as_deref()
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;
    let token = sign_token(secret, row.id)?;

    tracing::info!(user = %row.id, "login successful");

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        user: User::from(row),
        token,
    }))
}
