use axum::{
    extract::{FromRef, Request},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    config::AppConfig,
    router::{Handler, HandlerFuture, Identity, RequestScope},
};

/// Name of the cookie (and fallback header) carrying the credential.
pub const AUTH_COOKIE: &str = "authentication";

/// Claims
///
/// Payload of the signed credential issued at login. `exp` and `iat` are Unix
/// seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

/// AuthError
///
/// Why the gate turned a request away. Every variant is terminal for the
/// request and maps to exactly one status code.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("no credential was presented")]
    MissingCredential,

    #[error("credential signature is invalid")]
    InvalidSignature,

    #[error("credential is malformed")]
    MalformedCredential,

    #[error("credential is expired or its claims are invalid")]
    ExpiredOrInvalidClaims,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedCredential => StatusCode::BAD_REQUEST,
            Self::MissingCredential | Self::InvalidSignature | Self::ExpiredOrInvalidClaims => {
                StatusCode::UNAUTHORIZED
            }
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Self::InvalidSignature,
            ErrorKind::ExpiredSignature
            | ErrorKind::ImmatureSignature
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::InvalidSubject => Self::ExpiredOrInvalidClaims,
            _ => Self::MalformedCredential,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.status().into_response()
    }
}

/// IssuedToken
///
/// A freshly signed credential and the instant it stops being accepted.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Renders the `Set-Cookie` value handing this credential to the client.
    pub fn cookie(&self) -> String {
        format!(
            "{AUTH_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Expires={}",
            self.token,
            self.expires_at.format("%a, %d %b %Y %H:%M:%S GMT"),
        )
    }
}

/// TokenKeys
///
/// Signing and verification keys derived from the process-wide secret, plus the
/// lifetime given to new credentials. Cheap to clone.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn from_secret(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::from_secret(config.jwt_secret.as_bytes(), config.token_ttl())
    }

    /// Signs a credential for `username` valid for the configured lifetime.
    pub fn issue(&self, username: &str) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        let expires_at = Utc::now() + self.ttl;
        let token = self.issue_until(username, expires_at)?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Signs a credential for `username` expiring at `expires_at`.
    pub fn issue_until(
        &self,
        username: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            username: username.to_string(),
            exp: expires_at.timestamp(),
            iat: Utc::now().timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// verify
    ///
    /// Checks the signature first, then the claims. Expiry is enforced with no
    /// leeway.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }

    /// verify_request
    ///
    /// Runs the whole gate decision for one request: find the credential,
    /// verify it, and produce the identity to admit.
    pub fn verify_request(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
        let token = extract_credential(headers)?;
        let claims = self.verify(token)?;
        Ok(Identity {
            username: claims.username,
        })
    }
}

/// The `authentication` cookie wins over an `authentication` header.
///
/// Cookie pairs are parsed one at a time on raw bytes, so an unrelated cookie
/// carrying non-ASCII data never hides the credential.
fn extract_credential(headers: &HeaderMap) -> Result<&str, AuthError> {
    for value in headers.get_all(header::COOKIE) {
        let found = value
            .as_bytes()
            .split(|byte| *byte == b';')
            .filter_map(split_cookie_pair)
            .find(|(name, _)| *name == AUTH_COOKIE.as_bytes());
        if let Some((_, token)) = found {
            let token =
                std::str::from_utf8(token).map_err(|_| AuthError::MalformedCredential)?;
            return Ok(token.trim_matches('"'));
        }
    }

    match headers.get(AUTH_COOKIE) {
        Some(value) => value.to_str().map_err(|_| AuthError::MalformedCredential),
        None => Err(AuthError::MissingCredential),
    }
}

fn split_cookie_pair(pair: &[u8]) -> Option<(&[u8], &[u8])> {
    let pair = pair.trim_ascii();
    let eq = pair.iter().position(|byte| *byte == b'=')?;
    Some((&pair[..eq], &pair[eq + 1..]))
}

/// AuthGate
///
/// Wraps a handler so it only runs for requests carrying a valid credential.
/// The keys are pulled from the application state through `FromRef`, the same
/// way axum extractors reach shared configuration.
///
/// On success the caller's username is admitted into the [`RequestScope`]
/// before the inner handler is called. On failure the inner handler never
/// runs and the rejection status is returned directly.
pub struct AuthGate<H> {
    inner: H,
}

impl<H> AuthGate<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<S, H> Handler<S> for AuthGate<H>
where
    S: Send + 'static,
    H: Handler<S>,
    TokenKeys: FromRef<S>,
{
    fn call(&self, state: S, mut scope: RequestScope, request: Request) -> HandlerFuture {
        let keys = TokenKeys::from_ref(&state);
        match keys.verify_request(request.headers()) {
            Ok(identity) => {
                tracing::debug!(username = %identity.username, "credential admitted");
                scope.admit(identity);
                self.inner.call(state, scope, request)
            }
            Err(rejection) => {
                tracing::warn!(
                    reason = %rejection,
                    path = request.uri().path(),
                    "credential rejected"
                );
                Box::pin(async move { rejection.into_response() })
            }
        }
    }
}
