pub mod auth;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repo;
pub mod state;
pub mod suggest;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

// ═══════════════════════════════════════════════════════════════════════
//  Request correlation ID middleware
// ═══════════════════════════════════════════════════════════════════════

/// Middleware that generates a UUID v4 correlation ID for each request.
///
/// - Adds it to the current tracing span as `request_id`
/// - Returns it in the `X-Request-Id` response header
/// - Accepts an incoming `X-Request-Id` header to propagate from upstream
async fn request_id_middleware(
    req: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    tracing::Span::current().record("request_id", request_id.as_str());

    let mut response = next.run(req).await;

    if let Ok(header_value) = axum::http::HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", header_value);
    }

    response
}

// ── OpenAPI documentation ────────────────────────────────────────────────────

#[derive(OpenApi)]
#[openapi(
    info(
        title = "TaskForge API",
        version = "0.1.0",
        description = "Multi-user task tracking with AI-assisted suggestions"
    ),
    paths(
        handlers::health_check,
        handlers::register,
        handlers::login,
        handlers::list_tasks,
        handlers::create_task,
        handlers::update_task,
        handlers::delete_task,
        handlers::suggest_task,
    ),
    components(schemas(
        models::User,
        models::RegisterRequest,
        models::LoginRequest,
        models::LoginResponse,
        models::Task,
        models::TaskPayload,
        models::SuggestRequest,
        models::SuggestionsResponse,
        models::HealthResponse,
        models::ProviderInfo,
    )),
    tags(
        (name = "health", description = "Liveness"),
        (name = "auth", description = "Registration & login"),
        (name = "tasks", description = "Ownership-scoped tasks & suggestions"),
    )
)]
pub struct ApiDoc;

/// Build the application router with the given shared state.
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a network port.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route(
            "/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/tasks/{id}",
            put(handlers::update_task).delete(handlers::delete_task),
        )
        .route("/tasks/suggest", post(handlers::suggest_task))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // 1 MB body limit — must be before .with_state() for Json extractor
        .layer(DefaultBodyLimit::max(1024 * 1024))
        // Request correlation ID — adds X-Request-Id header to every response
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}
