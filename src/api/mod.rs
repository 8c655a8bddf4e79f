//! HTTP handlers for Bookshelf pages and probes

pub mod auth;
pub mod bookmarks;
pub mod books;
pub mod health;
pub mod openapi;
pub mod users;

use axum::{
    http::{header::REFERER, HeaderMap},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::ToSchema;

use crate::{
    session::{session_layer, PageContext, Session},
    AppState,
};

/// Landing page after login and fallback for "go back" redirects
pub const HOME_PATH: &str = "/explore";

/// Page with no content besides the shared context (forms, landing page)
#[derive(Serialize, ToSchema)]
pub struct PageView {
    #[serde(flatten)]
    pub context: PageContext,
}

impl PageView {
    pub async fn render(session: &Session) -> Self {
        Self {
            context: session.context().await,
        }
    }
}

/// `303 See Other` to `to`
pub fn redirect(to: &str) -> Response {
    Redirect::to(to).into_response()
}

/// True for same-site absolute paths such as `/book/3?x=1`
pub fn is_local_path(target: &str) -> bool {
    target.starts_with('/')
        && !target.starts_with("//")
        && !target.starts_with("/\\")
        && !target.chars().any(char::is_control)
}

/// Path of the page the request came from, taken from the Referer header
pub fn back_target(headers: &HeaderMap, fallback: &str) -> String {
    let Some(referer) = headers.get(REFERER).and_then(|v| v.to_str().ok()) else {
        return fallback.to_string();
    };

    let path = match url::Url::parse(referer) {
        Ok(url) => match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        },
        Err(_) => referer.to_string(),
    };

    if is_local_path(&path) {
        path
    } else {
        fallback.to_string()
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let pages = Router::new()
        // Catalogue
        .route("/", get(books::index))
        .route("/explore", get(books::explore))
        .route("/book/:book_id", get(books::book_details))
        .route("/search", get(books::search_page).post(books::search))
        // Bookmarks
        .route("/bookmark/:book_id", get(bookmarks::bookmark))
        .route("/toggle_bookmark/:book_id", get(bookmarks::toggle_bookmark))
        .route("/mylist", get(bookmarks::my_list))
        // Authentication
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        // Account
        .route("/profile", get(users::profile))
        .route(
            "/update_profile",
            get(users::update_profile_page).post(users::update_profile),
        )
        .route(
            "/change_password",
            get(users::change_password_page).post(users::change_password),
        )
        .layer(middleware::from_fn_with_state(state.clone(), session_layer));

    let probes = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check));

    Router::new()
        .merge(pages)
        .merge(probes)
        .with_state(state)
        .merge(openapi::create_openapi_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
