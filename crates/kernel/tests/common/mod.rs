#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! [`TestApp`] runs the REAL kernel router and state over the in-memory
//! block store, seeded with a small site: the built-in content types, one
//! section, one page, and a user per role.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use blockcms_kernel::config::{Site, SiteConfig};
use blockcms_kernel::content::{BlockStore, MemoryBlockStore};
use blockcms_kernel::models::{ContentBlock, Page, permission};
use blockcms_kernel::{AppState, Config, build_router};
use blockcms_test_utils::{admin, editor, publisher, test_user};

pub const EDITOR_TOKEN: &str = "editor-token";
pub const PUBLISHER_TOKEN: &str = "publisher-token";
pub const READER_TOKEN: &str = "reader-token";
pub const VISITOR_TOKEN: &str = "visitor-token";
pub const ADMIN_TOKEN: &str = "admin-token";

const SITE: &str = r#"
[[section]]
name = "News"
path = "/news"

[[page]]
name = "Press Room"
path = "/press"
section = "/news"
"#;

/// Test application wrapper using the REAL kernel routes and state.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Create a fresh application with its own empty store.
    pub async fn new() -> Self {
        let mut site: Site = SiteConfig::parse(SITE)
            .expect("Failed to parse site")
            .resolve()
            .expect("Failed to resolve site");
        site.users = vec![
            editor(EDITOR_TOKEN),
            publisher(PUBLISHER_TOKEN),
            admin(ADMIN_TOKEN),
            // May open the CMS but not change anything.
            test_user("reader", READER_TOKEN, &[permission::ACCESS_CMS]),
            // Authenticated but without CMS access.
            test_user("visitor", VISITOR_TOKEN, &[permission::ACCESS_CONTENT]),
        ];

        let config = Config::in_memory();
        let store: Arc<dyn BlockStore> = Arc::new(MemoryBlockStore::new());
        let state = AppState::from_parts(&config, site, store, None)
            .await
            .expect("Failed to initialize AppState");
        let router = build_router(state.clone(), &config);

        Self { router, state }
    }

    pub fn store(&self) -> &Arc<dyn BlockStore> {
        self.state.store()
    }

    /// The seeded `/press` page.
    pub async fn press_page(&self) -> Page {
        let id = blockcms_kernel::models::path_id("/press");
        self.store().find_page(id).await.unwrap().unwrap()
    }

    /// Send a request through the router.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        self.request(build(Method::GET, uri, token, None, "")).await
    }

    /// GET carrying the cookies of an earlier response.
    pub async fn get_with_cookies(&self, uri: &str, token: Option<&str>, cookies: &str) -> Response {
        self.request(build(Method::GET, uri, token, None, cookies)).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>) -> Response {
        self.request(build(Method::POST, uri, token, None, "")).await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> Response {
        self.request(build(Method::POST, uri, token, Some(body), "")).await
    }

    /// Look up a block by type key and slug.
    pub async fn block(&self, content_type: &str, slug: &str) -> Option<ContentBlock> {
        self.store().find_by_slug(content_type, slug).await.unwrap()
    }

    /// Create a block through the HTTP surface and return it.
    pub async fn create(&self, route: &str, token: &str, body: Value) -> ContentBlock {
        let response = self
            .post_json(&format!("/cms/{route}"), Some(token), body)
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let id = location(&response)
            .rsplit('/')
            .next()
            .unwrap()
            .parse()
            .expect("redirect to the new block");
        self.store().find(id).await.unwrap().unwrap()
    }
}

fn build(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
    cookies: &str,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    if !cookies.is_empty() {
        builder = builder.header(header::COOKIE, cookies);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Read a response body as JSON.
pub async fn json_body(response: Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).expect("response body is JSON")
}

/// Read a response body as text.
pub async fn text_body(response: Response) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(body.to_vec()).unwrap()
}

/// The `Location` header of a redirect.
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Extract Set-Cookie headers from a response for use in subsequent requests.
pub fn extract_cookies(response: &Response) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}
