//! Shared harness for HTTP integration tests.
//!
//! Builds the production router over [`MemoryStore`], a [`ManualClock`] and a
//! recording SMS sender, then drives it with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::TimeDelta;
use http_body_util::BodyExt;
use serde_json::Value;
use streamshort_api::auth::jwt::JwtConfig;
use streamshort_api::config::{LogFormat, ServerConfig};
use streamshort_api::router::build_app_router;
use streamshort_api::sms::{SmsError, SmsSender};
use streamshort_api::state::AppState;
use streamshort_core::clock::ManualClock;
use streamshort_db::MemoryStore;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        otp_ttl: TimeDelta::seconds(300),
        log_format: LogFormat::Text,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            access_ttl: TimeDelta::seconds(3600),
            refresh_ttl: TimeDelta::days(7),
        },
    }
}

/// Records every `(phone, code)` handed to it.
#[derive(Default)]
pub struct RecordingSmsSender {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingSmsSender {
    /// Most recent code sent to `phone`.
    pub fn last_code_for(&self, phone: &str) -> String {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(p, _)| p == phone)
            .map(|(_, c)| c.clone())
            .expect("no OTP was sent to this phone")
    }
}

#[async_trait]
impl SmsSender for RecordingSmsSender {
    async fn send_otp(&self, phone: &str, code: &str) -> Result<(), SmsError> {
        self.sent
            .lock()
            .unwrap()
            .push((phone.to_string(), code.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub sms: Arc<RecordingSmsSender>,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub fn new() -> Self {
        let config = test_config();
        let store = Arc::new(MemoryStore::new());
        let sms = Arc::new(RecordingSmsSender::default());
        let clock = Arc::new(ManualClock::starting_now());

        let state = AppState::new(
            config.clone(),
            store.clone(),
            store.clone(),
            sms.clone(),
            clock.clone(),
        );
        let router = build_app_router(state, &config);

        Self {
            router,
            store,
            sms,
            clock,
        }
    }

    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Run the OTP flow for `phone` and return the verify response body.
    pub async fn login_with_otp(&self, phone: &str) -> Value {
        let response = post_json(
            self.app(),
            "/auth/otp/send",
            serde_json::json!({ "phone": phone }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let code = self.sms.last_code_for(phone);
        let response = post_json(
            self.app(),
            "/auth/otp/verify",
            serde_json::json!({ "phone": phone, "otp": code }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await
    }

    /// Log in via OTP and return just the access token.
    pub async fn access_token(&self, phone: &str) -> String {
        let json = self.login_with_otp(phone).await;
        json["access_token"].as_str().unwrap().to_string()
    }

    /// Log in via OTP, onboard as a creator and return `(token, creator_id)`.
    pub async fn creator(&self, phone: &str) -> (String, String) {
        let token = self.access_token(phone).await;
        let response = post_json_auth(
            self.app(),
            "/api/creators/onboard",
            serde_json::json!({
                "display_name": format!("Creator {phone}"),
                "kyc_document_s3_path": "s3://kyc/doc.pdf",
            }),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        (token, json["id"].as_str().unwrap().to_string())
    }

    /// Create a series owned by the holder of `token` and return its id.
    pub async fn series(&self, token: &str, title: &str) -> String {
        let response = post_json_auth(
            self.app(),
            "/api/content/series",
            serde_json::json!({
                "title": title,
                "synopsis": "A short drama",
                "language": "en",
                "category_tags": ["drama"],
            }),
            token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["id"].as_str().unwrap().to_string()
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, request(Method::GET, uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::GET, uri, Some(token), None)).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, request(Method::POST, uri, None, Some(body))).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, request(Method::POST, uri, Some(token), Some(body))).await
}

/// POST `body` verbatim, with `content_type` if given.
pub async fn post_raw(app: Router, uri: &str, content_type: Option<&str>, body: &str) -> Response {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(CONTENT_TYPE, content_type);
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::POST, uri, Some(token), None)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, request(Method::PUT, uri, Some(token), Some(body))).await
}

pub async fn patch_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, request(Method::PATCH, uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::DELETE, uri, Some(token), None)).await
}

/// Collect the response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
