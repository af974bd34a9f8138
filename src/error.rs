use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::repository::RepoError;

/// RouteError
///
/// Failures raised by the router: at registration time for a malformed route,
/// and at dispatch time when nothing matches.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("no route matches {method} {path}")]
    NoMatch { method: String, path: String },

    #[error("invalid route method `{0}`")]
    InvalidMethod(String),

    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern {
        pattern: String,
        reason: &'static str,
    },
}

/// ApiError
///
/// Everything a blog handler can fail with. Each variant answers with one
/// fixed status; server-side failures are logged and their detail is not
/// leaked to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request wasn't well formatted: {0}")]
    BadRequest(String),

    #[error("invalid username or password")]
    InvalidLogin,

    #[error("a user with that username already exists")]
    UsernameTaken,

    #[error("the item that you are looking for doesn't exist")]
    NotFound,

    #[error("handler requires an identity but none was admitted")]
    MissingIdentity,

    #[error("password hashing failed: {0}")]
    PasswordHash(argon2::password_hash::Error),

    #[error("failed to sign credential: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Repository(#[from] RepoError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidLogin => StatusCode::UNAUTHORIZED,
            Self::UsernameTaken => StatusCode::CONFLICT,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Repository(RepoError::Conflict) => StatusCode::CONFLICT,
            Self::MissingIdentity
            | Self::PasswordHash(_)
            | Self::Token(_)
            | Self::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            return (status, "internal server error").into_response();
        }
        (status, self.to_string()).into_response()
    }
}
