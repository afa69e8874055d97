#![allow(clippy::unwrap_used, clippy::expect_used)]

use animeden::{
    api,
    auth::{
        hash_password,
        store::{LoginAttempt, Member, MemoryCredentialStore},
        unix_now, AuthState, SessionConfig, SessionStore, SESSION_COOKIE_NAME,
    },
};
use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE, USER_AGENT},
        Method, Request, StatusCode,
    },
    response::Response,
    Router,
};
use std::sync::Arc;
use tower::ServiceExt;

const FIREFOX: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";
const SALT: &str = "0f3c7d2a";

fn app() -> (Router, Arc<MemoryCredentialStore>) {
    let store = Arc::new(MemoryCredentialStore::new());
    store.insert_member(
        "a@x.com",
        Member {
            id: 7,
            username: "alice".to_string(),
            password_hash: hash_password("p1", SALT),
            salt: SALT.to_string(),
        },
    );
    let state = Arc::new(AuthState::new(
        store.clone(),
        SessionStore::new(SessionConfig::new()),
    ));
    (api::router(state), store)
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

fn get(uri: &str, cookie: Option<&str>, user_agent: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(USER_AGENT, user_agent);
    if let Some(id) = cookie {
        builder = builder.header(COOKIE, format!("{SESSION_COOKIE_NAME}={id}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, cookie: Option<&str>, form: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(USER_AGENT, FIREFOX)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(id) = cookie {
        builder = builder.header(COOKIE, format!("{SESSION_COOKIE_NAME}={id}"));
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

fn session_cookie(response: &Response) -> Option<String> {
    let value = response.headers().get(SET_COOKIE)?.to_str().ok()?;
    let pair = value.split(';').next()?;
    pair.strip_prefix(&format!("{SESSION_COOKIE_NAME}="))
        .map(ToString::to_string)
}

fn location(response: &Response) -> String {
    response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Log in as alice and return the session cookie value.
async fn logged_in(app: &Router) -> String {
    let response = send(app, post_form("/login", None, "email=a%40x.com&password=p1")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/members");
    session_cookie(&response).expect("login sets a session cookie")
}

#[tokio::test]
async fn login_form_starts_a_session() {
    let (app, _) = app();
    let response = send(&app, get("/login", None, FIREFOX)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cookie.starts_with("sec_session_id="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Secure"));

    let body = body_text(response).await;
    assert!(body.contains("action=\"/login\""));
    assert!(body.contains("Currently logged out."));
    assert!(!body.contains("Error Logging In!"));
}

#[tokio::test]
async fn login_form_shows_error_flag() {
    let (app, _) = app();
    let response = send(&app, get("/login?error=1", None, FIREFOX)).await;
    assert!(body_text(response).await.contains("Error Logging In!"));
}

#[tokio::test]
async fn successful_login_reaches_members_page() {
    let (app, store) = app();
    let cookie = logged_in(&app).await;
    assert_eq!(store.attempts_for(7), 0);

    let response = send(&app, get("/members", Some(&cookie), FIREFOX)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let next = session_cookie(&response).expect("session cookie");
    assert_ne!(next, cookie);
    assert!(body_text(response).await.contains("Welcome alice!"));

    let response = send(&app, get("/session", Some(&next), FIREFOX)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["user_id"], "7");
    assert_eq!(body["username"], "alice");
}

#[tokio::test]
async fn legacy_password_field_is_accepted() {
    let (app, _) = app();
    let response = send(&app, post_form("/login", None, "email=a%40x.com&p=p1")).await;
    assert_eq!(location(&response), "/members");
}

#[tokio::test]
async fn session_id_rotates_on_every_request() {
    let (app, _) = app();
    let first = logged_in(&app).await;

    let response = send(&app, get("/session", Some(&first), FIREFOX)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let second = session_cookie(&response).expect("session cookie");
    assert_ne!(second, first);

    let response = send(&app, get("/session", Some(&second), FIREFOX)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_ne!(session_cookie(&response).expect("session cookie"), second);
}

#[tokio::test]
async fn concurrent_requests_with_same_cookie_stay_logged_in() {
    let (app, _) = app();
    let cookie = logged_in(&app).await;

    let (a, b) = tokio::join!(
        send(&app, get("/members", Some(&cookie), FIREFOX)),
        send(&app, get("/session", Some(&cookie), FIREFOX)),
    );
    assert_eq!(a.status(), StatusCode::OK);
    assert_eq!(b.status(), StatusCode::OK);

    // Whichever rotated id the browser keeps last still works.
    let last = session_cookie(&b).expect("session cookie");
    let response = send(&app, get("/session", Some(&last), FIREFOX)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn replaced_session_id_stops_working_after_grace() {
    let store = Arc::new(MemoryCredentialStore::new());
    store.insert_member(
        "a@x.com",
        Member {
            id: 7,
            username: "alice".to_string(),
            password_hash: hash_password("p1", SALT),
            salt: SALT.to_string(),
        },
    );
    let sessions = SessionStore::new(
        SessionConfig::new().with_rotation_grace(std::time::Duration::from_millis(20)),
    );
    let app = api::router(Arc::new(AuthState::new(store, sessions)));
    let first = logged_in(&app).await;

    let response = send(&app, get("/session", Some(&first), FIREFOX)).await;
    assert_eq!(response.status(), StatusCode::OK);

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let response = send(&app, get("/session", Some(&first), FIREFOX)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn members_page_requires_login() {
    let (app, _) = app();
    let response = send(&app, get("/members", None, FIREFOX)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&response).is_some());
    assert!(body_text(response)
        .await
        .contains("You are not authorized to access this page."));
}

#[tokio::test]
async fn different_user_agent_is_rejected() {
    let (app, _) = app();
    let cookie = logged_in(&app).await;

    let response = send(&app, get("/members", Some(&cookie), "curl/8.5.0")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn password_change_ends_session() {
    let (app, store) = app();
    let cookie = logged_in(&app).await;
    store.set_password_hash(7, &hash_password("p2", SALT));

    let response = send(&app, get("/session", Some(&cookie), FIREFOX)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn wrong_password_redirects_back_and_records_attempt() {
    let (app, store) = app();
    let response = send(&app, post_form("/login", None, "email=a%40x.com&password=nope")).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?error=1");
    assert_eq!(store.attempts_for(7), 1);
}

#[tokio::test]
async fn unknown_email_redirects_back_without_recording() {
    let (app, store) = app();
    let response = send(&app, post_form("/login", None, "email=b%40x.com&password=p1")).await;

    assert_eq!(location(&response), "/login?error=1");
    assert_eq!(store.attempts_for(7), 0);
}

#[tokio::test]
async fn locked_account_refuses_correct_password() {
    let (app, store) = app();
    let now = unix_now();
    for _ in 0..6 {
        store.push_attempt(LoginAttempt {
            user_id: 7,
            timestamp: now - 3600,
        });
    }

    let response = send(&app, post_form("/login", None, "email=a%40x.com&password=p1")).await;
    assert_eq!(location(&response), "/login?error=1");
    assert_eq!(store.attempts_for(7), 6);
}

#[tokio::test]
async fn database_failure_redirects_to_error_page() {
    let (app, store) = app();
    store.set_unavailable(true);

    let response = send(&app, post_form("/login", None, "email=a%40x.com&password=p1")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response);
    assert_eq!(
        target,
        "/error?err=Database+error%3A+cannot+prepare+statement"
    );

    let response = send(&app, get(&target, None, FIREFOX)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response)
        .await
        .contains("Database error: cannot prepare statement"));
}

#[tokio::test]
async fn database_failure_keeps_the_rotated_session() {
    let (app, store) = app();
    let cookie = logged_in(&app).await;

    store.set_unavailable(true);
    let response = send(&app, get("/members", Some(&cookie), FIREFOX)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/error?err="));
    let next = session_cookie(&response).expect("error redirect carries the session cookie");
    assert_ne!(next, cookie);

    store.set_unavailable(false);
    let response = send(&app, get("/members", Some(&next), FIREFOX)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn incomplete_login_form_is_an_invalid_request() {
    let (app, store) = app();
    let response = send(&app, post_form("/login", None, "email=a%40x.com")).await;

    assert_eq!(location(&response), "/error?err=Invalid+Request");
    assert_eq!(store.attempts_for(7), 0);
}

#[tokio::test]
async fn session_id_in_query_string_is_ignored() {
    let (app, _) = app();
    let cookie = logged_in(&app).await;

    let uri = format!("/session?{SESSION_COOKIE_NAME}={cookie}");
    let response = send(&app, get(&uri, None, FIREFOX)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The cookie itself is still good.
    let response = send(&app, get("/session", Some(&cookie), FIREFOX)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_expires_cookie() {
    let (app, _) = app();
    let cookie = logged_in(&app).await;

    let response = send(&app, post_form("/logout", Some(&cookie), "")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    let set_cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(set_cookie.starts_with("sec_session_id=;"));
    assert!(set_cookie.contains("Max-Age=0"));

    // Logging out also drops the id the logout request carried.
    let response = send(&app, get("/session", Some(&cookie), FIREFOX)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn error_page_escapes_message() {
    let (app, _) = app();
    let response = send(&app, get("/error?err=%3Cb%3Ehi%3C%2Fb%3E", None, FIREFOX)).await;
    let body = body_text(response).await;
    assert!(body.contains("&lt;b&gt;hi&lt;/b&gt;"));

    let response = send(&app, get("/error", None, FIREFOX)).await;
    assert!(body_text(response)
        .await
        .contains("Oops! An unknown error happened."));
}

#[tokio::test]
async fn health_reports_database_and_request_id() {
    let (app, store) = app();
    let response = send(&app, get("/health", None, FIREFOX)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert!(response.headers().contains_key("X-App"));

    store.set_unavailable(true);
    let response = send(&app, get("/health", None, FIREFOX)).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["database"], "error");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (app, _) = app();
    let response = send(&app, get("/openapi.json", None, FIREFOX)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(body["paths"]["/session"].is_object());
}
