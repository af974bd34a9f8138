use crate::{
    ApiDoc, AppState,
    error::ApiError,
    models::{Article, ArticleInput, LoginRequest, SignupRequest, User},
    router::{Identity, RequestScope},
};
use argon2::{
    Argon2,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use axum::{
    Json,
    extract::Request,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use utoipa::OpenApi;
use uuid::Uuid;

/// Upper bound on JSON request bodies.
pub const MAX_BODY_BYTES: usize = 1 << 20;

// --- Helpers ---

async fn read_json<T: DeserializeOwned>(request: Request) -> Result<T, ApiError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::BadRequest(e.to_string()))
}

// Only reachable behind an AuthGate; a missing identity is a wiring bug.
fn identity(scope: &RequestScope) -> Result<&Identity, ApiError> {
    scope.identity().ok_or(ApiError::MissingIdentity)
}

// Ids that are not UUIDs cannot name an article, so they read as not found.
fn article_id(scope: &RequestScope) -> Result<Uuid, ApiError> {
    scope
        .param("id")
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or(ApiError::NotFound)
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(ApiError::PasswordHash)?;
    Ok(hash.to_string())
}

fn verify_password(expected_hash: &str, candidate: &str) -> Result<bool, ApiError> {
    let parsed = PasswordHash::new(expected_hash).map_err(ApiError::PasswordHash)?;
    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(detail) => Err(ApiError::PasswordHash(detail)),
    }
}

// --- Service ---

/// health
///
/// [Public Route] Liveness probe.
#[utoipa::path(get, path = "/health", responses((status = 200, description = "Alive")))]
pub async fn health(_state: AppState, _scope: RequestScope, _request: Request) -> &'static str {
    "ok"
}

/// openapi_spec
///
/// [Public Route] Serves the generated OpenAPI document.
pub async fn openapi_spec(
    _state: AppState,
    _scope: RequestScope,
    _request: Request,
) -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

// --- Accounts ---

/// signup
///
/// [Public Route] Registers a new author. The password is stored as an argon2
/// hash; usernames are unique.
#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Registered"),
        (status = 400, description = "Malformed body"),
        (status = 409, description = "Username taken")
    )
)]
pub async fn signup(
    state: AppState,
    _scope: RequestScope,
    request: Request,
) -> Result<StatusCode, ApiError> {
    let payload: SignupRequest = read_json(request).await?;
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "username and password are required".to_string(),
        ));
    }

    if state.repo.get_user(&payload.username).await?.is_some() {
        return Err(ApiError::UsernameTaken);
    }

    let user = User {
        password_hash: hash_password(&payload.password)?,
        username: payload.username,
        email: payload.email,
    };
    let created = state.repo.create_user(user).await?;

    tracing::info!(username = %created.username, "user registered");
    Ok(StatusCode::CREATED)
}

/// login
///
/// [Public Route] Checks the password and hands out a signed credential in the
/// `authentication` cookie. Unknown users and wrong passwords look the same.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credential set in the `authentication` cookie"),
        (status = 401, description = "Invalid username or password")
    )
)]
pub async fn login(
    state: AppState,
    _scope: RequestScope,
    request: Request,
) -> Result<Response, ApiError> {
    let payload: LoginRequest = read_json(request).await?;

    let stored = state
        .repo
        .get_user(&payload.username)
        .await?
        .ok_or(ApiError::InvalidLogin)?;

    if !verify_password(&stored.password_hash, &payload.password)? {
        return Err(ApiError::InvalidLogin);
    }

    let issued = state.keys.issue(&stored.username)?;
    tracing::debug!(username = %stored.username, expires_at = %issued.expires_at, "credential issued");

    Ok((StatusCode::OK, [(header::SET_COOKIE, issued.cookie())]).into_response())
}

// --- Articles ---

/// list_articles
///
/// [Public Route] Every public article.
#[utoipa::path(
    get,
    path = "/blog/",
    responses((status = 200, description = "Public articles", body = [Article]))
)]
pub async fn list_articles(
    state: AppState,
    _scope: RequestScope,
    _request: Request,
) -> Result<Json<Vec<Article>>, ApiError> {
    Ok(Json(state.repo.get_public_articles().await?))
}

/// list_articles_by_username
///
/// [Public Route] Public articles of one author.
#[utoipa::path(
    get,
    path = "/blog/username/{username}",
    params(("username" = String, Path, description = "Author")),
    responses((status = 200, description = "Public articles of the author", body = [Article]))
)]
pub async fn list_articles_by_username(
    state: AppState,
    scope: RequestScope,
    _request: Request,
) -> Result<Json<Vec<Article>>, ApiError> {
    let username = scope.param("username").unwrap_or_default();
    Ok(Json(state.repo.get_public_articles_by(username).await?))
}

/// dashboard
///
/// [Authenticated Route] Every article of the caller, private ones included.
#[utoipa::path(
    get,
    path = "/blog/dashboard",
    responses(
        (status = 200, description = "Caller's articles", body = [Article]),
        (status = 401, description = "Missing, invalid or expired credential")
    )
)]
pub async fn dashboard(
    state: AppState,
    scope: RequestScope,
    _request: Request,
) -> Result<Json<Vec<Article>>, ApiError> {
    let caller = identity(&scope)?;
    Ok(Json(state.repo.get_articles_by(&caller.username).await?))
}

/// get_article
///
/// [Public Route] One article by id. Private articles are reported as missing.
#[utoipa::path(
    get,
    path = "/blog/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Found", body = Article),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_article(
    state: AppState,
    scope: RequestScope,
    _request: Request,
) -> Result<Json<Article>, ApiError> {
    let id = article_id(&scope)?;
    state
        .repo
        .get_article(id)
        .await?
        .filter(|article| !article.private)
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// create_article
///
/// [Authenticated Route] Publishes a new article owned by the caller.
#[utoipa::path(
    post,
    path = "/blog/",
    request_body = ArticleInput,
    responses(
        (status = 201, description = "Created", body = Article),
        (status = 400, description = "Malformed body or credential"),
        (status = 401, description = "Missing, invalid or expired credential")
    )
)]
pub async fn create_article(
    state: AppState,
    scope: RequestScope,
    request: Request,
) -> Result<(StatusCode, Json<Article>), ApiError> {
    let caller = identity(&scope)?;
    let input: ArticleInput = read_json(request).await?;
    let article = state.repo.create_article(&caller.username, input).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

/// update_article
///
/// [Authenticated Route] Replaces the caller's article.
///
/// *Ownership*: an article owned by someone else is reported as missing.
#[utoipa::path(
    put,
    path = "/blog/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    request_body = ArticleInput,
    responses(
        (status = 200, description = "Updated", body = Article),
        (status = 404, description = "Not Found or Not Yours")
    )
)]
pub async fn update_article(
    state: AppState,
    scope: RequestScope,
    request: Request,
) -> Result<Json<Article>, ApiError> {
    let caller = identity(&scope)?;
    let id = article_id(&scope)?;
    let input: ArticleInput = read_json(request).await?;
    state
        .repo
        .update_article(id, &caller.username, input)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// delete_article
///
/// [Authenticated Route] Removes the caller's article.
#[utoipa::path(
    delete,
    path = "/blog/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found or Not Yours")
    )
)]
pub async fn delete_article(
    state: AppState,
    scope: RequestScope,
    _request: Request,
) -> Result<StatusCode, ApiError> {
    let caller = identity(&scope)?;
    let id = article_id(&scope)?;
    if state.repo.delete_article(id, &caller.username).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
