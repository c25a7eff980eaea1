//! Shared helpers for router-level tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use api_lib::routes::create_router;
use api_lib::state::AppState;
use platform::{DocumentStore, Platform, PlatformConfig};

pub const USER: &str = "user-1";
pub const OTHER_USER: &str = "user-2";

/// PNG signature followed by a few bytes of payload
pub const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];

const BOUNDARY: &str = "imagefactory-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<dyn DocumentStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(PlatformConfig::default())
    }

    pub fn with_config(config: PlatformConfig) -> Self {
        let platform = Platform::in_memory(config).expect("in-memory platform");
        let store = platform.store.clone();
        let router = create_router(AppState::from_platform(platform));
        Self { router, store }
    }

    /// Send a request and decode the JSON body (`Null` when empty).
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, user: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, user, Body::empty())).await
    }

    pub async fn delete(&self, uri: &str, user: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::DELETE, uri, user, Body::empty())).await
    }

    pub async fn put(&self, uri: &str, user: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::PUT, uri, user, Body::empty())).await
    }

    pub async fn post_json(&self, uri: &str, user: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut req = request(Method::POST, uri, user, Body::from(body.to_string()));
        req.headers_mut()
            .insert(CONTENT_TYPE, "application/json".parse().unwrap());
        self.send(req).await
    }

    pub async fn upload(&self, uri: &str, user: &str, file_name: &str, bytes: &[u8]) -> (StatusCode, Value) {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let mut req = request(Method::POST, uri, Some(user), Body::from(body));
        req.headers_mut().insert(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}").parse().unwrap(),
        );
        self.send(req).await
    }
}

fn request(method: Method, uri: &str, user: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    builder.body(body).unwrap()
}
