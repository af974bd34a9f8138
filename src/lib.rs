use axum::{
    extract::{FromRef, Request},
    http::{HeaderName, StatusCode},
};
use std::sync::Arc;
use utoipa::OpenApi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Request routing and the credential gate.
pub mod auth;
pub mod router;

// Blog API served through the router.
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;

// --- Public Re-exports ---

pub use auth::{AuthGate, TokenKeys};
pub use config::AppConfig;
pub use repository::{PostgresRepository, RepositoryState};
pub use router::{RequestScope, Router};

/// ApiDoc
///
/// OpenAPI description of the blog API, assembled from the `#[utoipa::path]`
/// annotations on the handlers. Served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health, handlers::signup, handlers::login,
        handlers::list_articles, handlers::list_articles_by_username, handlers::dashboard,
        handlers::get_article, handlers::create_article, handlers::update_article,
        handlers::delete_article
    ),
    components(
        schemas(
            models::Article, models::ArticleInput, models::SignupRequest, models::LoginRequest,
        )
    ),
    tags(
        (name = "blog", description = "Blog API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// The single container of shared services handed to every handler. Cloned
/// per request; everything inside is either `Arc`-backed or cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Persistence collaborator.
    pub repo: RepositoryState,
    /// The loaded, immutable configuration.
    pub config: AppConfig,
    /// Keys derived from the configured secret; used by `AuthGate` and login.
    pub keys: TokenKeys,
}

impl AppState {
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        let keys = TokenKeys::from_config(&config);
        Self { repo, config, keys }
    }
}

// --- FromRef Projections ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for TokenKeys {
    fn from_ref(app_state: &AppState) -> TokenKeys {
        app_state.keys.clone()
    }
}

/// create_app
///
/// Wraps the route table in the HTTP transport shell. The axum router has no
/// routes of its own: every request falls through to `routes`, which does all
/// matching. The shell contributes request ids, tracing, the request timeout
/// and CORS.
pub fn create_app(routes: Router<AppState>, state: AppState) -> axum::Router {
    let routes = Arc::new(routes);
    let timeout = state.config.request_timeout();

    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Every request is dispatched by the route table.
    let base_router = axum::Router::new().fallback(move |request: Request| {
        let routes = Arc::clone(&routes);
        let state = state.clone();
        async move { routes.handle(state, request).await }
    });

    // 3. Observability, correlation and deadline layers.
    let timeout_layer = TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id))
                .layer(timeout_layer),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: method, uri and the `x-request-id` header, so
/// every log line of a request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
