//! Ordered path router.
//!
//! Routes are tried in registration order and the first match wins. There is
//! no conflict detection: a route shadowed by an earlier one is simply never
//! reached. A `Router` is built once at startup and then shared read-only.

use std::sync::Arc;

use axum::{
    extract::Request,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::RouteError;

pub mod handler;
pub mod pattern;
pub mod scope;

pub use handler::{Handler, HandlerFuture};
pub use pattern::{Pattern, SegmentSpec, split_path};
pub use scope::{Identity, ParamBindings, RequestScope};

/// MethodFilter
///
/// Which request methods a route accepts. Names are compared lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodFilter {
    Any,
    Exact(String),
}

impl MethodFilter {
    /// `*` accepts every method; anything else must be a valid HTTP method token.
    pub fn parse(method: &str) -> Result<Self, RouteError> {
        if method == "*" {
            return Ok(Self::Any);
        }
        Method::from_bytes(method.as_bytes())
            .map_err(|_| RouteError::InvalidMethod(method.to_string()))?;
        Ok(Self::Exact(method.to_ascii_lowercase()))
    }

    fn accepts(&self, lowered: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(method) => method == lowered,
        }
    }
}

struct Route<S> {
    method: MethodFilter,
    pattern: Pattern,
    handler: Arc<dyn Handler<S>>,
}

/// RouteMatch
///
/// The outcome of a successful dispatch: the bound handler and the parameters
/// captured from the path.
pub struct RouteMatch<'r, S> {
    pub handler: &'r Arc<dyn Handler<S>>,
    pub pattern: &'r str,
    pub params: ParamBindings,
}

/// Router
///
/// Holds the registered routes and the handler used when none of them match.
pub struct Router<S> {
    routes: Vec<Route<S>>,
    not_found: Arc<dyn Handler<S>>,
}

impl<S> Default for Router<S>
where
    S: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Router<S>
where
    S: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            not_found: Arc::new(default_not_found::<S>),
        }
    }

    /// route
    ///
    /// Registers `handler` for `method` (case-insensitive, `*` for any) and
    /// `pattern`. Appends to the route list, so earlier registrations win.
    ///
    /// # Errors
    /// Returns `RouteError::InvalidMethod` or `RouteError::InvalidPattern`; the
    /// route table is expected to be rejected as a whole at startup.
    pub fn route<H>(mut self, method: &str, pattern: &str, handler: H) -> Result<Self, RouteError>
    where
        H: Handler<S>,
    {
        let method = MethodFilter::parse(method)?;
        let pattern = Pattern::parse(pattern)?;
        tracing::trace!(?method, pattern = pattern.as_str(), "route registered");
        self.routes.push(Route {
            method,
            pattern,
            handler: Arc::new(handler),
        });
        Ok(self)
    }

    /// Replaces the handler invoked when no route matches.
    pub fn not_found<H>(mut self, handler: H) -> Self
    where
        H: Handler<S>,
    {
        self.not_found = Arc::new(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// dispatch
    ///
    /// Finds the first route accepting `method` whose pattern matches `path`.
    ///
    /// # Errors
    /// `RouteError::NoMatch` when every route was rejected.
    pub fn dispatch(&self, method: &str, path: &str) -> Result<RouteMatch<'_, S>, RouteError> {
        let lowered = method.to_ascii_lowercase();
        let segments = split_path(path);

        self.routes
            .iter()
            .filter(|route| route.method.accepts(&lowered))
            .find_map(|route| {
                route.pattern.matches(&segments).map(|params| RouteMatch {
                    handler: &route.handler,
                    pattern: route.pattern.as_str(),
                    params,
                })
            })
            .ok_or_else(|| RouteError::NoMatch {
                method: method.to_string(),
                path: path.to_string(),
            })
    }

    /// handle
    ///
    /// Dispatches `request` and runs the matched handler with a fresh
    /// [`RequestScope`], or the not-found handler when nothing matches.
    pub async fn handle(&self, state: S, request: Request) -> Response {
        let found = self.dispatch(request.method().as_str(), request.uri().path());
        match found {
            Ok(found) => {
                tracing::debug!(
                    pattern = found.pattern,
                    params = found.params.len(),
                    "route matched"
                );
                let scope = RequestScope::new(found.params);
                found.handler.call(state, scope, request).await
            }
            Err(err) => {
                tracing::debug!(%err, "no route matched");
                self.not_found
                    .call(state, RequestScope::default(), request)
                    .await
            }
        }
    }
}

async fn default_not_found<S>(_state: S, _scope: RequestScope, _request: Request) -> Response {
    (StatusCode::NOT_FOUND, "404 page not found").into_response()
}
