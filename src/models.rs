use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Stored Records ---

/// User
///
/// A registered author, stored in the `users` table. The password is only
/// ever held as an argon2 PHC string and is never serialized.
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    // Primary key; the identity carried by credentials.
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Article
///
/// A blog post from the `articles` table. Private articles are only visible
/// to their author through the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub content: String,
    // FK to users.username (owner).
    pub username: String,
    pub private: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Request Payloads ---

/// ArticleInput
///
/// Body of `POST /blog/` and `PUT /blog/{id}`. The owner is never taken from
/// the body; it always comes from the admitted identity.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ArticleInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub private: bool,
}

/// SignupRequest
///
/// Body of `POST /signup`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// LoginRequest
///
/// Body of `POST /login`. On success the credential is returned in the
/// `authentication` cookie.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}
