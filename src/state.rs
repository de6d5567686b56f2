// Application state — constructed once in main, cloned into every request.

use std::time::Instant;

use crate::db::Database;
use crate::suggest::SuggestionEngine;

/// Central application state. Clone-friendly — `Database` and the
/// suggestion engine are both cheap handles.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Token-signing secret from `JWT_SECRET`. `None` means no token can be
    /// issued or verified — protected routes fail closed.
    pub jwt_secret: Option<String>,
    pub suggestions: SuggestionEngine,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").ok().filter(|s| !s.is_empty());
        if jwt_secret.is_some() {
            tracing::info!("JWT_SECRET configured — token auth enabled");
        } else {
            tracing::warn!("JWT_SECRET not set — all protected routes will reject");
        }

        let gemini_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|s| !s.is_empty());
        if gemini_key.is_some() {
            tracing::info!("GEMINI_API_KEY configured — live AI suggestions enabled");
        } else {
            tracing::info!("GEMINI_API_KEY not set — using deterministic fallback suggestions");
        }

        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .timeout(std::time::Duration::from_secs(120))
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .expect("Failed to build HTTP client");

        let suggestions = SuggestionEngine::new(http_client, gemini_key);

        Self {
            db,
            jwt_secret,
            suggestions,
            start_time: Instant::now(),
        }
    }

    /// Test-only constructor — the pool is `connect_lazy`, so no real
    /// database is needed. Only suitable for paths that reject or respond
    /// before issuing SQL. The suggestion engine has no provider key, so
    /// it never touches the network.
    #[doc(hidden)]
    pub fn new_test() -> Self {
        use futures_util::FutureExt;
        use std::sync::Arc;

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .expect("Failed to build HTTP client");

        let db = Database::with_connector(Arc::new(|| {
            let fut: futures_util::future::BoxFuture<'static, anyhow::Result<sqlx::PgPool>> =
                async {
                    let pool = sqlx::PgPool::connect_lazy("postgres://test@localhost:19999/test")?;
                    Ok(pool)
                }
                .boxed();
            fut
        }));

        Self {
            db,
            jwt_secret: Some("test-secret".to_string()),
            suggestions: SuggestionEngine::new(http_client, None),
            start_time: Instant::now(),
        }
    }
}
