//! End-to-end tests for the HTTP API.
//!
//! Requests go through the real router, middleware and JSON file store.
//! Google is replaced at the `CalendarService` trait level.
//!
//! Run with: cargo test -p api --test http_tests

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use api_lib::adapters::{JsonFileStore, MemorySessionStore};
use api_lib::config::Config;
use api_lib::web::{self, state::AppState};
use study_buddy_core::domain::{
    CalendarEvents, CalendarToken, CreatedCalendarEvent, NewCalendarEvent,
};
use study_buddy_core::ports::{CalendarService, PortError, PortResult};

// ============================================================================
// Fake Calendar
// ============================================================================

#[derive(Default)]
struct FakeCalendar {
    fail: bool,
    refreshed: Option<CalendarToken>,
}

#[async_trait]
impl CalendarService for FakeCalendar {
    fn authorization_url(&self) -> String {
        "https://accounts.example/consent?client_id=test".to_string()
    }

    async fn exchange_code(&self, code: &str) -> PortResult<CalendarToken> {
        if code != "good-code" {
            return Err(PortError::Unauthorized);
        }
        Ok(CalendarToken {
            access_token: Some("access-1".to_string()),
            refresh_token: Some("refresh-1".to_string()),
            scope: Some("calendar".to_string()),
            ..Default::default()
        })
    }

    async fn list_upcoming_events(&self, token: &CalendarToken) -> PortResult<CalendarEvents> {
        if self.fail {
            return Err(PortError::Unexpected("quota exceeded".to_string()));
        }
        Ok(CalendarEvents {
            items: vec![json!({
                "summary": "Study session",
                "token": token.access_token,
            })],
            refreshed: self.refreshed.clone(),
        })
    }

    async fn create_event(
        &self,
        _token: &CalendarToken,
        event: &NewCalendarEvent,
    ) -> PortResult<CreatedCalendarEvent> {
        if self.fail {
            return Err(PortError::Unexpected("quota exceeded".to_string()));
        }
        Ok(CreatedCalendarEvent {
            event: json!({ "id": "evt-1", "summary": event.summary, "start": { "dateTime": event.start } }),
            refreshed: self.refreshed.clone(),
        })
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

fn test_config(data_path: PathBuf) -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        data_path,
        log_level: tracing::Level::INFO,
        frontend_origin: "http://localhost:5173".to_string(),
        cookie_secure: false,
        google: None,
        calendar_time_zone: "America/New_York".to_string(),
    }
}

async fn create_app(temp_dir: &TempDir, calendar: Option<FakeCalendar>) -> Router {
    let config = test_config(temp_dir.path().join("db.json"));
    let store = JsonFileStore::new(config.data_path.clone());
    store.ensure_exists().await.unwrap();

    let state = Arc::new(AppState {
        users: Arc::new(store),
        calendar: calendar.map(|c| Arc::new(c) as Arc<dyn CalendarService>),
        sessions: Arc::new(MemorySessionStore::new()),
        config: Arc::new(config),
    });
    web::router(state).unwrap()
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

impl TestResponse {
    /// The `name=value` part of the session cookie the server set.
    fn session_cookie(&self) -> String {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .expect("no Set-Cookie header")
            .to_string()
    }
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    cookie: Option<&str>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        headers,
        body,
    }
}

async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, Method::GET, uri, None, None).await
}

async fn post(app: &Router, uri: &str, body: Value) -> TestResponse {
    send(app, Method::POST, uri, Some(body), None).await
}

async fn sign_up(app: &Router, email: &str, classes: Value, availability: Value) -> TestResponse {
    post(
        app,
        "/api/users",
        json!({
            "email": email,
            "password": "correct horse",
            "classes": classes,
            "availability": availability,
        }),
    )
    .await
}

fn emails(users: &Value) -> Vec<&str> {
    users
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["email"].as_str().unwrap())
        .collect()
}

// ============================================================================
// Health and Users
// ============================================================================

#[tokio::test]
async fn test_health() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_app(&temp_dir, None).await;

    let response = get(&app, "/api/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "ok": true }));
}

#[tokio::test]
async fn test_sign_up_normalizes_and_hides_password() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_app(&temp_dir, None).await;

    let response = sign_up(
        &app,
        "a@x",
        json!("MTH121, BEM329, "),
        json!("Mon 15:00-16:00, wed 18:00-19:00"),
    )
    .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["message"], "User added successfully!");
    assert_eq!(
        response.body["user"],
        json!({
            "email": "a@x",
            "classes": ["MTH121", "BEM329"],
            "availability": [
                { "day": "Mon", "start": "15:00", "end": "16:00" },
                { "day": "Wed", "start": "18:00", "end": "19:00" }
            ]
        })
    );

    let users = get(&app, "/api/users").await;
    assert_eq!(users.status, StatusCode::OK);
    assert_eq!(emails(&users.body), vec!["a@x"]);
    assert!(users.body[0].get("password").is_none());

    let on_disk = std::fs::read_to_string(temp_dir.path().join("db.json")).unwrap();
    assert!(on_disk.contains("$argon2"));
    assert!(!on_disk.contains("correct horse"));
}

#[tokio::test]
async fn test_sign_up_requires_email_and_password() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_app(&temp_dir, None).await;

    let no_password = post(&app, "/api/users", json!({ "email": "a@x" })).await;
    assert_eq!(no_password.status, StatusCode::BAD_REQUEST);
    assert_eq!(no_password.body["error"], "Email and password required.");

    let blank_email = post(&app, "/api/users", json!({ "email": "", "password": "pw" })).await;
    assert_eq!(blank_email.status, StatusCode::BAD_REQUEST);

    assert_eq!(get(&app, "/api/users").await.body, json!([]));
}

#[tokio::test]
async fn test_sign_up_rejects_unreadable_availability() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_app(&temp_dir, None).await;

    let response = sign_up(
        &app,
        "a@x",
        json!(["MTH121"]),
        json!([{ "day": "Someday", "start": "15:00", "end": "16:00" }]),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid availability"));
}

#[tokio::test]
async fn test_sign_up_slot_missing_end_is_bad_request() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_app(&temp_dir, None).await;

    let response = sign_up(
        &app,
        "a@x",
        json!(["MTH121"]),
        json!([{ "day": "Mon", "start": "15:00" }]),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid availability"));
    assert_eq!(get(&app, "/api/users").await.body, json!([]));
}

#[tokio::test]
async fn test_sign_up_non_string_class_code_is_bad_request() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_app(&temp_dir, None).await;

    let response = sign_up(&app, "a@x", json!(["MTH121", 5]), json!([])).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid classes"));
}

#[tokio::test]
async fn test_sign_up_malformed_body_is_bad_request() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_app(&temp_dir, None).await;

    let numeric_email = post(&app, "/api/users", json!({ "email": 5, "password": "p" })).await;
    assert_eq!(numeric_email.status, StatusCode::BAD_REQUEST);
    assert!(numeric_email.body["error"].is_string());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let not_json = app.clone().oneshot(request).await.unwrap();
    assert_eq!(not_json.status(), StatusCode::BAD_REQUEST);

    assert_eq!(get(&app, "/api/users").await.body, json!([]));
}

#[tokio::test]
async fn test_duplicate_sign_up_leaves_store_unchanged() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_app(&temp_dir, None).await;

    assert_eq!(
        sign_up(&app, "a@x", json!(["MTH121"]), json!([])).await.status,
        StatusCode::CREATED
    );
    let duplicate = sign_up(&app, "a@x", json!(["BEM329"]), json!([])).await;

    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate.body["error"], "User already exists.");
    let users = get(&app, "/api/users").await.body;
    assert_eq!(users.as_array().unwrap().len(), 1);
    assert_eq!(users[0]["classes"], json!(["MTH121"]));
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_app(&temp_dir, None).await;
    sign_up(&app, "a@x", json!(["MTH121"]), json!([])).await;

    let ok = post(
        &app,
        "/api/login",
        json!({ "email": "a@x", "password": "correct horse" }),
    )
    .await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body["message"], "Login successful");
    assert_eq!(ok.body["user"]["email"], "a@x");
    assert!(ok.body["user"].get("password").is_none());
}

#[tokio::test]
async fn test_login_failures_look_identical() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_app(&temp_dir, None).await;
    sign_up(&app, "a@x", json!(["MTH121"]), json!([])).await;

    let wrong_password = post(
        &app,
        "/api/login",
        json!({ "email": "a@x", "password": "battery staple" }),
    )
    .await;
    let unknown_email = post(
        &app,
        "/api/login",
        json!({ "email": "nobody@x", "password": "correct horse" }),
    )
    .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_email.body);
    assert_eq!(wrong_password.body["error"], "Invalid email or password");
}

// ============================================================================
// Matching and Groups
// ============================================================================

#[tokio::test]
async fn test_match_uses_half_open_overlap() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_app(&temp_dir, None).await;
    sign_up(
        &app,
        "a@x",
        json!(["MTH121"]),
        json!([{ "day": "Mon", "start": "15:00", "end": "16:00" }]),
    )
    .await;
    sign_up(&app, "b@x", json!(["BEM329"]), json!("Mon 15:00-16:00")).await;

    let touching = post(
        &app,
        "/api/match",
        json!({ "className": "MTH121", "day": "Mon", "start": "16:00", "end": "17:00" }),
    )
    .await;
    assert_eq!(touching.status, StatusCode::OK);
    assert_eq!(touching.body, json!({ "matches": [] }));

    let partial = post(
        &app,
        "/api/match",
        json!({ "className": "MTH121", "day": "Mon", "start": "15:30", "end": "16:30" }),
    )
    .await;
    assert_eq!(emails(&partial.body["matches"]), vec!["a@x"]);

    let by_slot = post(
        &app,
        "/api/match",
        json!({ "className": "BEM329", "timeSlot": "Mon 15:45-17:00" }),
    )
    .await;
    assert_eq!(emails(&by_slot.body["matches"]), vec!["b@x"]);
}

#[tokio::test]
async fn test_match_validates_request() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_app(&temp_dir, None).await;

    let no_class = post(
        &app,
        "/api/match",
        json!({ "day": "Mon", "start": "15:00", "end": "16:00" }),
    )
    .await;
    assert_eq!(no_class.status, StatusCode::BAD_REQUEST);

    let no_window = post(&app, "/api/match", json!({ "className": "MTH121" })).await;
    assert_eq!(no_window.status, StatusCode::BAD_REQUEST);

    let bad_time = post(
        &app,
        "/api/match",
        json!({ "className": "MTH121", "day": "Mon", "start": "noon", "end": "16:00" }),
    )
    .await;
    assert_eq!(bad_time.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_match_class_name_is_exact() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_app(&temp_dir, None).await;
    sign_up(&app, "a@x", json!(["MTH121"]), json!("Mon 15:00-16:00")).await;

    let window = |class_name: &str| {
        json!({ "className": class_name, "day": "Mon", "start": "15:00", "end": "16:00" })
    };
    let exact = post(&app, "/api/match", window("MTH121")).await;
    assert_eq!(emails(&exact.body["matches"]), vec!["a@x"]);

    for other in [" MTH121 ", "mth121"] {
        let response = post(&app, "/api/match", window(other)).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, json!({ "matches": [] }));
    }
}

#[tokio::test]
async fn test_stored_record_without_string_email_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("db.json"),
        json!({
            "users": [
                { "email": "a@x", "password": "p", "classes": ["MTH121"], "availability": [] },
                { "email": 123, "password": "p", "classes": ["MTH121"] }
            ]
        })
        .to_string(),
    )
    .unwrap();
    let app = create_app(&temp_dir, None).await;

    let users = get(&app, "/api/users").await;
    assert_eq!(users.status, StatusCode::OK);
    assert_eq!(emails(&users.body), vec!["a@x"]);

    let groups = get(&app, "/api/groups").await;
    assert_eq!(groups.status, StatusCode::OK);
    assert_eq!(groups.body["groups"][0]["members"].as_array().unwrap().len(), 1);

    assert_eq!(
        sign_up(&app, "b@x", json!(["MTH121"]), json!([])).await.status,
        StatusCode::CREATED
    );
    let on_disk: Value =
        serde_json::from_str(&std::fs::read_to_string(temp_dir.path().join("db.json")).unwrap())
            .unwrap();
    assert_eq!(on_disk["users"][1]["email"], 123);
}

#[tokio::test]
async fn test_groups_in_first_seen_order() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_app(&temp_dir, None).await;
    sign_up(&app, "a@x", json!("MTH121, BEM329"), json!("Mon 15:00-16:00")).await;
    sign_up(&app, "b@x", json!(["MTH121"]), json!([])).await;

    let response = get(&app, "/api/groups").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({
            "groups": [
                {
                    "className": "MTH121",
                    "members": [
                        { "email": "a@x", "availability": [{ "day": "Mon", "start": "15:00", "end": "16:00" }] },
                        { "email": "b@x", "availability": [] }
                    ]
                },
                {
                    "className": "BEM329",
                    "members": [
                        { "email": "a@x", "availability": [{ "day": "Mon", "start": "15:00", "end": "16:00" }] }
                    ]
                }
            ]
        })
    );

    let mine = get(&app, "/api/groups?email=b@x").await;
    let names: Vec<_> = mine.body["groups"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["className"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["MTH121"]);
}

// ============================================================================
// Calendar
// ============================================================================

#[tokio::test]
async fn test_calendar_requires_connection() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_app(&temp_dir, Some(FakeCalendar::default())).await;

    let response = get(&app, "/api/calendar/events").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body, json!({ "error": "Not connected" }));

    let unknown_session = send(
        &app,
        Method::GET,
        "/api/calendar/events",
        None,
        Some("sb_sess=made-up"),
    )
    .await;
    assert_eq!(unknown_session.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_calendar_connect_list_and_disconnect() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_app(&temp_dir, Some(FakeCalendar::default())).await;

    // 1. Start the OAuth flow
    let start = get(&app, "/auth/google").await;
    assert_eq!(start.status, StatusCode::SEE_OTHER);
    assert_eq!(
        start.headers[header::LOCATION],
        "https://accounts.example/consent?client_id=test"
    );
    let cookie = start.session_cookie();
    assert!(cookie.starts_with("sb_sess="));

    // 2. Google redirects back with a code
    let callback = send(
        &app,
        Method::GET,
        "/auth/google/callback?code=good-code",
        None,
        Some(&cookie),
    )
    .await;
    assert_eq!(callback.status, StatusCode::SEE_OTHER);
    assert_eq!(callback.headers[header::LOCATION], "http://localhost:5173/");
    assert_eq!(callback.session_cookie(), cookie);

    // 3. The session can now read events
    let events = send(&app, Method::GET, "/api/calendar/events", None, Some(&cookie)).await;
    assert_eq!(events.status, StatusCode::OK);
    assert_eq!(events.body[0]["summary"], "Study session");
    assert_eq!(events.body[0]["token"], "access-1");

    let debug = send(&app, Method::GET, "/api/debug/session", None, Some(&cookie)).await;
    assert_eq!(debug.body["hasTokens"], true);
    assert_eq!(debug.body["scope"], "calendar");

    // 4. Disconnect forgets the token
    let disconnect = send(
        &app,
        Method::POST,
        "/api/calendar/disconnect",
        None,
        Some(&cookie),
    )
    .await;
    assert_eq!(disconnect.status, StatusCode::OK);
    assert_eq!(disconnect.body, json!({ "ok": true }));

    let after = send(&app, Method::GET, "/api/calendar/events", None, Some(&cookie)).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_calendar_callback_failure_is_auth_error() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_app(&temp_dir, Some(FakeCalendar::default())).await;

    let missing_code = get(&app, "/auth/google/callback").await;
    assert_eq!(missing_code.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(missing_code.body["error"], "Auth error");

    let bad_code = get(&app, "/auth/google/callback?code=bad").await;
    assert_eq!(bad_code.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_calendar_refreshed_token_is_kept() {
    let temp_dir = TempDir::new().unwrap();
    let calendar = FakeCalendar {
        refreshed: Some(CalendarToken {
            access_token: Some("access-2".to_string()),
            refresh_token: Some("refresh-1".to_string()),
            scope: Some("calendar.refreshed".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    };
    let app = create_app(&temp_dir, Some(calendar)).await;

    let cookie = get(&app, "/auth/google").await.session_cookie();
    send(&app, Method::GET, "/auth/google/callback?code=good-code", None, Some(&cookie)).await;
    send(&app, Method::GET, "/api/calendar/events", None, Some(&cookie)).await;

    let debug = send(&app, Method::GET, "/api/debug/session", None, Some(&cookie)).await;
    assert_eq!(debug.body["scope"], "calendar.refreshed");
}

#[tokio::test]
async fn test_calendar_token_refreshed_on_create_is_kept() {
    let temp_dir = TempDir::new().unwrap();
    let calendar = FakeCalendar {
        refreshed: Some(CalendarToken {
            access_token: Some("access-2".to_string()),
            refresh_token: Some("refresh-1".to_string()),
            scope: Some("calendar.refreshed".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    };
    let app = create_app(&temp_dir, Some(calendar)).await;

    let cookie = get(&app, "/auth/google").await.session_cookie();
    send(&app, Method::GET, "/auth/google/callback?code=good-code", None, Some(&cookie)).await;
    let created = send(
        &app,
        Method::POST,
        "/api/calendar/events",
        Some(json!({
            "summary": "MTH121 review",
            "start": "2026-10-19T15:00:00-04:00",
            "end": "2026-10-19T16:00:00-04:00"
        })),
        Some(&cookie),
    )
    .await;
    assert_eq!(created.status, StatusCode::OK);

    let debug = send(&app, Method::GET, "/api/debug/session", None, Some(&cookie)).await;
    assert_eq!(debug.body["scope"], "calendar.refreshed");
}

#[tokio::test]
async fn test_calendar_upstream_failure_is_generic() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_app(
        &temp_dir,
        Some(FakeCalendar {
            fail: true,
            ..Default::default()
        }),
    )
    .await;

    let cookie = get(&app, "/auth/google").await.session_cookie();
    send(&app, Method::GET, "/auth/google/callback?code=good-code", None, Some(&cookie)).await;

    let events = send(&app, Method::GET, "/api/calendar/events", None, Some(&cookie)).await;
    assert_eq!(events.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(events.body, json!({ "error": "Google error" }));
}

#[tokio::test]
async fn test_calendar_create_event() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_app(&temp_dir, Some(FakeCalendar::default())).await;

    let cookie = get(&app, "/auth/google").await.session_cookie();
    send(&app, Method::GET, "/auth/google/callback?code=good-code", None, Some(&cookie)).await;

    let missing = send(
        &app,
        Method::POST,
        "/api/calendar/events",
        Some(json!({ "summary": "MTH121 review" })),
        Some(&cookie),
    )
    .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["error"], "Missing summary/start/end");

    let created = send(
        &app,
        Method::POST,
        "/api/calendar/events",
        Some(json!({
            "summary": "MTH121 review",
            "start": "2026-10-19T15:00:00-04:00",
            "end": "2026-10-19T16:00:00-04:00"
        })),
        Some(&cookie),
    )
    .await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.body["id"], "evt-1");
    assert_eq!(created.body["summary"], "MTH121 review");
}

#[tokio::test]
async fn test_calendar_disabled_without_google_config() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_app(&temp_dir, None).await;

    let response = get(&app, "/auth/google").await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);

    // Disconnect and debug do not need Google at all.
    assert_eq!(
        post(&app, "/api/calendar/disconnect", json!({})).await.status,
        StatusCode::OK
    );
    let debug = get(&app, "/api/debug/session").await;
    assert_eq!(debug.body["hasTokens"], false);
}
