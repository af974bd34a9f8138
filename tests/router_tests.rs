use axum::{
    body::Body,
    extract::Request,
    http::{Method, StatusCode},
    response::Response,
};
use blog_router::{
    error::RouteError,
    router::{RequestScope, Router},
};

// --- Helper Functions ---

// Handlers in these tests run without shared state.
type TestRouter = Router<()>;

fn request(method: Method, uri: &str) -> Request {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn first(_: (), _: RequestScope, _: Request) -> &'static str {
    "first"
}

async fn second(_: (), _: RequestScope, _: Request) -> &'static str {
    "second"
}

async fn echo_id(_: (), scope: RequestScope, _: Request) -> String {
    scope.param("id").unwrap_or("<none>").to_string()
}

// --- Dispatch ---

#[test]
fn test_literal_route_matches_with_empty_params() {
    let router = TestRouter::new()
        .route("get", "/blog/dashboard", first)
        .unwrap();

    let found = router.dispatch("GET", "/blog/dashboard").unwrap();
    assert_eq!(found.pattern, "/blog/dashboard");
    assert!(found.params.is_empty());
}

#[test]
fn test_method_is_case_insensitive() {
    let router = TestRouter::new().route("Post", "/login", first).unwrap();

    assert!(router.dispatch("POST", "/login").is_ok());
    assert!(router.dispatch("post", "/login").is_ok());
    assert!(router.dispatch("GET", "/login").is_err());
}

#[test]
fn test_named_parameter_binding() {
    let router = TestRouter::new().route("GET", "/blog/:id", first).unwrap();

    let found = router
        .dispatch("GET", "/blog/507f1f77bcf86cd799439011")
        .unwrap();
    assert_eq!(found.params.get("id"), Some("507f1f77bcf86cd799439011"));
    assert_eq!(found.params.len(), 1);
}

#[test]
fn test_parameter_value_is_not_decoded() {
    let router = TestRouter::new()
        .route("GET", "/blog/username/:username", first)
        .unwrap();

    let found = router.dispatch("GET", "/blog/username/jorge%20e").unwrap();
    assert_eq!(found.params.get("username"), Some("jorge%20e"));
}

#[test]
fn test_first_registered_route_wins() {
    let router = TestRouter::new()
        .route("GET", "/blog/:id", first)
        .unwrap()
        .route("GET", "/blog/dashboard", second)
        .unwrap();

    let found = router.dispatch("GET", "/blog/dashboard").unwrap();
    assert_eq!(found.pattern, "/blog/:id");
    assert_eq!(found.params.get("id"), Some("dashboard"));
}

#[tokio::test]
async fn test_duplicate_registration_is_unreachable() {
    let router = TestRouter::new()
        .route("GET", "/health", first)
        .unwrap()
        .route("GET", "/health", second)
        .unwrap();

    assert_eq!(router.len(), 2);
    let response = router.handle((), request(Method::GET, "/health")).await;
    assert_eq!(body_text(response).await, "first");
}

#[test]
fn test_any_method_route() {
    let router = TestRouter::new().route("*", "/ping", first).unwrap();

    assert!(router.dispatch("GET", "/ping").is_ok());
    assert!(router.dispatch("DELETE", "/ping").is_ok());
    assert!(router.dispatch("PATCH", "/ping").is_ok());
}

// --- Segment Counts & Prefix Flag ---

#[test]
fn test_extra_segments_rejected_for_non_prefix_route() {
    let router = TestRouter::new().route("GET", "blog/:id", first).unwrap();

    assert!(router.dispatch("GET", "/blog/1").is_ok());
    assert!(router.dispatch("GET", "/blog/1/extra").is_err());
}

#[test]
fn test_extra_segments_tolerated_for_rooted_route() {
    let router = TestRouter::new().route("GET", "/blog/:id", first).unwrap();

    let found = router.dispatch("GET", "/blog/1/extra/segments").unwrap();
    assert_eq!(found.params.get("id"), Some("1"));
}

#[test]
fn test_missing_segments_never_match() {
    let router = TestRouter::new()
        .route("GET", "/blog/username/:username", first)
        .unwrap();

    assert!(router.dispatch("GET", "/blog/username").is_err());
    assert!(router.dispatch("GET", "/blog").is_err());
}

#[test]
fn test_root_route() {
    let router = TestRouter::new().route("GET", "/", first).unwrap();

    assert!(router.dispatch("GET", "/").is_ok());
    // The root literal is an empty segment; "/x" does not equal it.
    assert!(router.dispatch("GET", "/x").is_err());
}

// --- Trailing Wildcard ---

#[test]
fn test_trailing_wildcard_matches_prefix_and_extra_segments() {
    let router = TestRouter::new().route("GET", "/static...", first).unwrap();

    assert!(router.dispatch("GET", "/static").is_ok());
    assert!(router.dispatch("GET", "/staticfiles").is_ok());
    assert!(router.dispatch("GET", "/static/css/site.css").is_ok());
    assert!(router.dispatch("GET", "/public/static").is_err());
}

#[test]
fn test_trailing_wildcard_skips_later_segments() {
    // Segments after the marker are never compared.
    let router = TestRouter::new()
        .route("GET", "/files/img.../meta", first)
        .unwrap();

    assert!(router.dispatch("GET", "/files/img001/anything").is_ok());
    assert!(router.dispatch("GET", "/files/img001").is_ok());
    assert!(router.dispatch("GET", "/other/img001/meta").is_err());
}

// --- No Match ---

#[test]
fn test_no_match_on_empty_router() {
    let router = TestRouter::new();

    let err = router.dispatch("GET", "/nonexistent/path").err().unwrap();
    assert_eq!(
        err,
        RouteError::NoMatch {
            method: "GET".to_string(),
            path: "/nonexistent/path".to_string(),
        }
    );
}

#[test]
fn test_no_match_on_disjoint_routes() {
    let router = TestRouter::new()
        .route("GET", "/blog/:id", first)
        .unwrap()
        .route("POST", "/nonexistent/path", second)
        .unwrap();

    assert!(router.dispatch("GET", "/nonexistent/path").is_err());
}

// --- Registration Errors ---

#[test]
fn test_malformed_routes_fail_fast() {
    assert!(matches!(
        TestRouter::new().route("GET", "/blog/:", first),
        Err(RouteError::InvalidPattern { .. })
    ));
    assert!(matches!(
        TestRouter::new().route("GET", "/blog/:id...", first),
        Err(RouteError::InvalidPattern { .. })
    ));
    assert!(matches!(
        TestRouter::new().route("GET", "/:a/x/:a", first),
        Err(RouteError::InvalidPattern { .. })
    ));
    assert!(matches!(
        TestRouter::new().route("GE T", "/blog", first),
        Err(RouteError::InvalidMethod(_))
    ));
}

// --- Handling ---

#[tokio::test]
async fn test_handle_invokes_matched_handler_with_params() {
    let router = TestRouter::new().route("GET", "/blog/:id", echo_id).unwrap();

    let response = router.handle((), request(Method::GET, "/blog/42")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "42");
}

#[tokio::test]
async fn test_handle_uses_first_registered_handler() {
    let router = TestRouter::new()
        .route("GET", "/blog/:id", first)
        .unwrap()
        .route("GET", "/blog/:slug", second)
        .unwrap();

    let response = router.handle((), request(Method::GET, "/blog/7")).await;
    assert_eq!(body_text(response).await, "first");
}

#[tokio::test]
async fn test_default_not_found() {
    let router = TestRouter::new().route("GET", "/blog/:id", first).unwrap();

    let response = router
        .handle((), request(Method::GET, "/nonexistent/path"))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "404 page not found");
}

#[tokio::test]
async fn test_custom_not_found() {
    async fn gone(_: (), _: RequestScope, _: Request) -> (StatusCode, &'static str) {
        (StatusCode::GONE, "nothing here")
    }

    let router = TestRouter::new().not_found(gone);

    let response = router.handle((), request(Method::GET, "/anything")).await;
    assert_eq!(response.status(), StatusCode::GONE);
    assert_eq!(body_text(response).await, "nothing here");
}

#[tokio::test]
async fn test_method_mismatch_falls_through_to_not_found() {
    let router = TestRouter::new().route("POST", "/blog/", first).unwrap();

    let response = router.handle((), request(Method::GET, "/blog/")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
