//! Bearer token identity verification.
//!
//! Tokens are HS256 JWTs carrying the user id as `sub`. Verification trusts
//! the signature and expiry alone — no database lookup. Every failure mode
//! (missing header, malformed prefix, bad signature, expiry, garbled
//! subject) collapses into the same 401 so the response never reveals why a
//! token was rejected.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header;
use axum::http::request::Parts;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Tokens are valid for one day, matching the issue policy of the login
/// endpoint.
pub const TOKEN_TTL_SECS: i64 = 86_400;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

/// Issue a signed token for the given user. Signing requires the secret;
/// its absence is a configuration failure, not an auth failure.
pub fn sign_token(secret: &str, user_id: Uuid) -> Result<String, ApiError> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: Utc::now().timestamp() + TOKEN_TTL_SECS,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| ApiError::Internal(anyhow::Error::new(err).context("token signing failed")))
}

/// Decode and validate a token, yielding the subject's user id.
/// Returns `None` for any structural, signature, expiry, or subject-format
/// problem — callers must not distinguish these.
pub fn verify_token(secret: &str, token: &str) -> Option<Uuid> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()?;
    Uuid::parse_str(&data.claims.sub).ok()
}

/// Extractor establishing the caller's identity from the `Authorization`
/// header. Runs before the handler body, so verification always precedes
/// any database work in the request.
pub struct CurrentUser(pub Uuid);

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let Some(secret) = state.jwt_secret.as_deref() else {
            // No signing secret means no token can be valid. Fail closed.
            tracing::warn!("JWT_SECRET not configured — rejecting request");
            return Err(ApiError::Unauthenticated);
        };

        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthenticated)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthenticated)?;

        verify_token(secret, token)
            .map(CurrentUser)
            .ok_or(ApiError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn token_round_trips_to_same_subject() {
        let user_id = Uuid::new_v4();
        let token = sign_token(SECRET, user_id).unwrap();
        assert_eq!(verify_token(SECRET, &token), Some(user_id));
    }

    #[test]
    fn wrong_key_fails_verification() {
        let token = sign_token(SECRET, Uuid::new_v4()).unwrap();
        assert_eq!(verify_token("a-different-secret", &token), None);
    }

    #[test]
    fn expired_token_fails_verification() {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            // Well past the default validation leeway.
            exp: Utc::now().timestamp() - 600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(verify_token(SECRET, &token), None);
    }

    #[test]
    fn garbage_token_fails_verification() {
        assert_eq!(verify_token(SECRET, "not-a-jwt"), None);
        assert_eq!(verify_token(SECRET, ""), None);
    }

    #[test]
    fn non_uuid_subject_fails_verification() {
        let claims = Claims {
            sub: "alice".to_string(),
            exp: Utc::now().timestamp() + 60,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(verify_token(SECRET, &token), None);
    }
}
