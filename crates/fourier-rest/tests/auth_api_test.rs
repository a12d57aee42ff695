//! End-to-end tests of the HTTP surface against in-memory SQLite.

use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
        HeaderMap, Method, Request, StatusCode,
    },
    Router,
};
use chrono::Duration;
use fourier_config::{SecurityConfig, ServerConfig};
use fourier_core::{RoleKind, UserFilter, UserPatch};
use fourier_repository::{connect_in_memory, Dao, SessionManager, UserDao};
use fourier_rest::{create_router, AppState, WELCOME_MESSAGE};
use fourier_security::{PasswordHasher, TokenProvider};
use fourier_service::AuthServiceImpl;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    sessions: SessionManager,
    tokens: Arc<TokenProvider>,
}

impl TestApp {
    async fn new() -> Self {
        let pool = connect_in_memory()
            .await
            .expect("Failed to open in-memory database");
        let sessions = SessionManager::new(pool.clone());
        let tokens = Arc::new(
            TokenProvider::new(&SecurityConfig::default()).expect("Failed to build token provider"),
        );
        let service = AuthServiceImpl::new(
            sessions.clone(),
            Arc::new(PasswordHasher::with_cost(1)),
            tokens.clone(),
        );
        let state = AppState::new(Arc::new(service), pool);
        Self {
            router: create_router(state, &ServerConfig::default()),
            sessions,
            tokens,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Body is not JSON")
        };
        (status, headers, body)
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, HeaderMap, Value) {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(COOKIE, format!("users_access_token={token}"));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn register(&self, email: &str, password: &str) -> (StatusCode, Value) {
        let (status, _, body) = self
            .post(
                "/auth/register",
                json!({ "email": email, "password": password, "confirm_password": password }),
            )
            .await;
        (status, body)
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let (status, _, body) = self
            .post(
                "/auth/login",
                json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["access_token"]
            .as_str()
            .expect("token in body")
            .to_string()
    }

    async fn set_role(&self, email: &str, role: RoleKind) {
        let email = email.to_string();
        self.sessions
            .with_transaction(move |session| {
                Box::pin(async move {
                    UserDao::new()
                        .update(
                            session,
                            &UserFilter::by_email(email),
                            &UserPatch {
                                role_id: Some(role.id()),
                                ..UserPatch::default()
                            },
                        )
                        .await
                })
            })
            .await
            .expect("Failed to change role");
    }
}

#[tokio::test]
async fn test_root_returns_welcome_message() {
    let app = TestApp::new().await;
    let (status, _, body) = app.get("/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], WELCOME_MESSAGE);
}

#[tokio::test]
async fn test_register_login_me_and_forbidden_listing() {
    let app = TestApp::new().await;

    let (status, body) = app.register("a@x.com", "abcde").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(
        body["data"]["message"],
        "You have been registered successfully!"
    );

    let (status, body) = app.register("a@x.com", "zzzzz").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "USER_ALREADY_EXISTS");
    assert_eq!(body["error"]["message"], "User already exists");

    let (status, _, body) = app
        .post(
            "/auth/login",
            json!({ "email": "a@x.com", "password": "wrong" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Incorrect email or password");

    let (status, headers, body) = app
        .post(
            "/auth/login",
            json!({ "email": "a@x.com", "password": "abcde" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ok"], true);
    assert_eq!(body["data"]["message"], "Authorization is successful!");
    let token = body["data"]["access_token"].as_str().unwrap().to_string();
    assert!(!token.is_empty());

    let cookie = headers
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("login sets a cookie");
    assert!(cookie.starts_with(&format!("users_access_token={token}")));
    assert!(cookie.contains("HttpOnly"));

    let (status, _, body) = app.get("/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "a@x.com");
    assert_eq!(body["data"]["role_id"], 1);
    assert_eq!(body["data"]["role_name"], "user");
    assert!(body["data"].get("password").is_none());

    let (status, _, body) = app.get("/auth/all_users", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "Insufficient permissions");
}

#[tokio::test]
async fn test_me_rejects_missing_invalid_and_expired_tokens() {
    let app = TestApp::new().await;
    app.register("a@x.com", "abcde").await;

    let (status, _, body) = app.get("/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Token not found");

    let (status, _, body) = app.get("/auth/me", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Invalid token");

    let expired = app
        .tokens
        .issue_with_expiry(1, Duration::hours(-1))
        .unwrap();
    let (status, _, body) = app.get("/auth/me", Some(&expired)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Token has expired");

    let orphan = app.tokens.create_access_token(404).unwrap();
    let (status, _, body) = app.get("/auth/me", Some(&orphan)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "User not found");
}

#[tokio::test]
async fn test_register_validation_errors() {
    let app = TestApp::new().await;

    let (status, _, body) = app
        .post(
            "/auth/register",
            json!({ "email": "a@x.com", "password": "abcde", "confirm_password": "abcdf" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let details = body["error"]["details"].as_array().expect("field details");
    assert!(details.iter().any(|d| d["field"] == "confirm_password"
        && d["message"] == "Passwords are not the same"));

    let (status, _, body) = app
        .post(
            "/auth/register",
            json!({ "email": "nope", "password": "abc", "confirm_password": "abc" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["field"].as_str())
        .collect();
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let app = TestApp::new().await;
    let (status, _, body) = app
        .send(
            Request::builder()
                .method(Method::POST)
                .uri("/auth/login")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_JSON");
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = TestApp::new().await;
    let (status, headers, body) = app.post("/auth/logout", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "User is logged out");
    let cookie = headers
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("logout resets the cookie");
    assert!(cookie.starts_with("users_access_token="));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_admin_lists_users() {
    let app = TestApp::new().await;
    for email in ["admin@x.com", "b@x.com", "c@x.com"] {
        app.register(email, "abcde").await;
    }
    app.set_role("admin@x.com", RoleKind::Admin).await;
    let token = app.login("admin@x.com", "abcde").await;

    let (status, _, body) = app.get("/auth/all_users", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let users = body["data"].as_array().expect("user list");
    assert_eq!(users.len(), 3);
    assert_eq!(users[0]["role_name"], "admin");
    assert_eq!(users[2]["email"], "c@x.com");

    let (status, _, body) = app
        .get("/auth/all_users?page=2&size=2", Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_elements"], 3);
    assert_eq!(body["data"]["total_pages"], 2);
    assert_eq!(body["data"]["content"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_superadmin_passes_admin_guard() {
    let app = TestApp::new().await;
    app.register("root@x.com", "abcde").await;
    app.set_role("root@x.com", RoleKind::SuperAdmin).await;
    let token = app.login("root@x.com", "abcde").await;

    let (status, _, _) = app.get("/auth/all_users", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_probes_and_openapi() {
    let app = TestApp::new().await;

    let (status, _, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, _, body) = app.get("/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");

    let (status, _, _) = app.get("/live", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = app.get("/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/auth/login"].is_object());
}
