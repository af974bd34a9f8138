use crate::{AppState, auth::AuthGate, error::RouteError, handlers, router::Router};

/// Route Table
///
/// The blog API in registration order. The first matching route wins, so the
/// order below is part of the behavior:
/// - `/blog/username/:username` and `/blog/dashboard` precede `/blog/:id`,
///   otherwise `username` and `dashboard` would be captured as ids.
/// - Every pattern starts with `/`, which makes it prefix-flagged: extra
///   trailing segments are tolerated (`/blog/<id>/anything` still reaches
///   `/blog/:id`).
///
/// Routes wrapped in `AuthGate` only run for callers holding a valid
/// credential and receive the caller's identity in their `RequestScope`.
///
/// # Errors
/// Fails on the first malformed method or pattern; startup aborts on it.
pub fn blog_routes() -> Result<Router<AppState>, RouteError> {
    Router::new()
        // --- Service ---
        .route("GET", "/health", handlers::health)?
        .route("GET", "/api-docs/openapi.json", handlers::openapi_spec)?
        // --- Accounts ---
        .route("POST", "/signup", handlers::signup)?
        .route("POST", "/login", handlers::login)?
        // --- Articles ---
        // Public listing of one author's articles.
        .route("GET", "/blog/username/:username", handlers::list_articles_by_username)?
        // The caller's own articles, private included.
        .route("GET", "/blog/dashboard", AuthGate::new(handlers::dashboard))?
        .route("GET", "/blog/:id", handlers::get_article)?
        .route("PUT", "/blog/:id", AuthGate::new(handlers::update_article))?
        .route("DELETE", "/blog/:id", AuthGate::new(handlers::delete_article))?
        .route("POST", "/blog/", AuthGate::new(handlers::create_article))?
        .route("GET", "/blog/", handlers::list_articles)
}
