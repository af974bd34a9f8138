use std::{future::Future, pin::Pin};

use axum::{
    extract::Request,
    response::{IntoResponse, Response},
};

use crate::router::scope::RequestScope;

pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Handler
///
/// Anything the router can invoke for a matched route. The shared state, the
/// request scope and the request itself are passed by value, so the returned
/// future owns everything it touches.
///
/// Implemented for every `async fn(S, RequestScope, Request) -> impl IntoResponse`
/// and for [`crate::auth::AuthGate`].
pub trait Handler<S>: Send + Sync + 'static {
    fn call(&self, state: S, scope: RequestScope, request: Request) -> HandlerFuture;
}

impl<S, F, Fut, R> Handler<S> for F
where
    S: Send + 'static,
    F: Fn(S, RequestScope, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    fn call(&self, state: S, scope: RequestScope, request: Request) -> HandlerFuture {
        let fut = self(state, scope, request);
        Box::pin(async move { fut.await.into_response() })
    }
}
