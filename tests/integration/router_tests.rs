//! Router tests that need no running database.
//!
//! The pool is created lazily and never connects; every request here is
//! answered before a query would be issued.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use bookshelf_server::{
    api, config::AppConfig, repository::Repository, session::MemoryStore, AppState,
};

fn app() -> Router {
    let config = AppConfig::default();
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database.url)
        .unwrap();
    let state = AppState::new(config, Repository::new(pool), Arc::new(MemoryStore::new()));
    api::create_router(state)
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, form: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

/// `name=value` part of the session Set-Cookie header
fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("bookshelf_session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn flash_messages(body: &Value) -> Vec<String> {
    body["flashes"]
        .as_array()
        .map(|flashes| {
            flashes
                .iter()
                .filter_map(|f| f["message"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn test_health() {
    let response = app().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_landing_page_is_public() {
    let response = app().oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["logged_in"], false);
    assert_eq!(body["flashes"], Value::Array(vec![]));
}

#[tokio::test]
async fn test_explore_requires_login() {
    let response = app().oneshot(get("/explore", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?next=%2Fexplore");
    assert!(session_cookie(&response).is_some());
}

#[tokio::test]
async fn test_login_gate_keeps_query_in_next() {
    let response = app().oneshot(get("/explore?page=2", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?next=%2Fexplore%3Fpage%3D2");
}

#[tokio::test]
async fn test_unparsable_page_still_hits_login_gate() {
    for uri in ["/explore?page=abc", "/explore?page="] {
        let response = app().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert!(location(&response).starts_with("/login?next=%2Fexplore"), "{}", uri);
    }
}

#[tokio::test]
async fn test_gate_flash_shown_once_on_login_page() {
    let app = app();

    let response = app.clone().oneshot(get("/explore", None)).await.unwrap();
    let cookie = session_cookie(&response).unwrap();

    let response = app
        .clone()
        .oneshot(get("/login", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(
        flash_messages(&body),
        vec!["Please log in to access this page.".to_string()]
    );
    assert_eq!(body["flashes"][0]["category"], "error");

    let response = app.oneshot(get("/login", Some(&cookie))).await.unwrap();
    let body = json_body(response).await;
    assert!(flash_messages(&body).is_empty());
}

#[tokio::test]
async fn test_each_gate_has_its_own_message() {
    let cases = [
        ("/mylist", "Please log in to access your list."),
        ("/search", "Please log in to use the search functionality."),
        ("/profile", "Please log in to access your profile."),
        ("/bookmark/1", "Please log in to bookmark a book."),
        ("/change_password", "Please log in to change your password."),
    ];

    for (path, message) in cases {
        let app = app();
        let response = app.clone().oneshot(get(path, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", path);
        let cookie = session_cookie(&response).unwrap();

        let response = app.oneshot(get("/login", Some(&cookie))).await.unwrap();
        let body = json_body(response).await;
        assert_eq!(flash_messages(&body), vec![message.to_string()], "{}", path);
    }
}

#[tokio::test]
async fn test_logout_redirects_to_login() {
    let app = app();

    let response = app.clone().oneshot(get("/logout", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    let cookie = session_cookie(&response).unwrap();

    let response = app.oneshot(get("/login", Some(&cookie))).await.unwrap();
    let body = json_body(response).await;
    assert_eq!(flash_messages(&body), vec!["Logout successful".to_string()]);
    assert_eq!(body["logged_in"], false);
}

#[tokio::test]
async fn test_forged_cookie_is_ignored() {
    let forged = "bookshelf_session=0000000000000000000000000000000000000000000000000000000000000000";
    let response = app().oneshot(get("/explore", Some(forged))).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let issued = session_cookie(&response).unwrap();
    assert_ne!(issued, forged);
}

#[tokio::test]
async fn test_invalid_signup_is_rejected() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_form(
            "/signup",
            "username=&password=pw&first_name=Ada&last_name=Lovelace&email=not-an-email",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let cookie = session_cookie(&response);
    let body = json_body(response).await;
    assert_eq!(body["flashes"][0]["category"], "error");
    assert!(cookie.is_some());
}

#[tokio::test]
async fn test_blank_login_is_unauthorized() {
    let response = app()
        .oneshot(post_form("/login", "username=&password=", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(
        flash_messages(&body),
        vec!["Invalid username or password".to_string()]
    );
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let response = app()
        .oneshot(get("/api-docs/openapi.json", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert!(body["paths"]["/explore"].is_object());
}
