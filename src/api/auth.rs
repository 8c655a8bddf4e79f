//! Login, logout and signup

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::{AppError, AppResult},
    models::user::{LoginForm, SignupForm},
    session::{FlashCategory, Session},
};

use super::{is_local_path, redirect, PageView, HOME_PATH};

/// Query parameters of the login form
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct LoginParams {
    /// Local path to return to after a successful login
    pub next: Option<String>,
}

/// Login form page
#[utoipa::path(
    get,
    path = "/login",
    tag = "auth",
    params(LoginParams),
    responses(
        (status = 200, description = "Login form", body = PageView)
    )
)]
pub async fn login_page(session: Session) -> Json<PageView> {
    Json(PageView::render(&session).await)
}

/// Log in with username and password
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    params(LoginParams),
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Logged in, redirect to `next` or /explore"),
        (status = 401, description = "Invalid username or password", body = PageView)
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    session: Session,
    Query(params): Query<LoginParams>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    match state.services.users.authenticate(&form).await {
        Ok(user_id) => {
            session.login(user_id).await;
            tracing::info!(user_id, "User logged in");

            let target = params
                .next
                .as_deref()
                .filter(|next| is_local_path(next))
                .unwrap_or(HOME_PATH);
            Ok(redirect(target))
        }
        Err(AppError::Authentication(msg)) => {
            session.flash(FlashCategory::Error, msg).await;
            Ok((StatusCode::UNAUTHORIZED, Json(PageView::render(&session).await)).into_response())
        }
        Err(e) => Err(e),
    }
}

/// Log out
#[utoipa::path(
    get,
    path = "/logout",
    tag = "auth",
    responses(
        (status = 303, description = "Redirect to /login")
    )
)]
pub async fn logout(session: Session) -> Response {
    if let Some(user_id) = session.user_id().await {
        tracing::info!(user_id, "User logged out");
    }
    session.logout().await;
    session.flash(FlashCategory::Success, "Logout successful").await;
    redirect("/login")
}

/// Signup form page
#[utoipa::path(
    get,
    path = "/signup",
    tag = "auth",
    responses(
        (status = 200, description = "Signup form", body = PageView)
    )
)]
pub async fn signup_page(session: Session) -> Json<PageView> {
    Json(PageView::render(&session).await)
}

/// Create an account
#[utoipa::path(
    post,
    path = "/signup",
    tag = "auth",
    request_body(content = SignupForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Account created, redirect to /login"),
        (status = 400, description = "Invalid form", body = PageView),
        (status = 409, description = "Username already taken", body = PageView)
    )
)]
pub async fn signup(
    State(state): State<crate::AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    let status = match state.services.users.signup(form).await {
        Ok(_) => {
            session
                .flash(FlashCategory::Success, "Signup successful. Please log in.")
                .await;
            return Ok(redirect("/login"));
        }
        Err(e @ AppError::Conflict(_)) => {
            session.flash(FlashCategory::Error, e.user_message()).await;
            StatusCode::CONFLICT
        }
        Err(e @ AppError::Validation(_)) => {
            session.flash(FlashCategory::Error, e.user_message()).await;
            StatusCode::BAD_REQUEST
        }
        Err(e) => return Err(e),
    };

    Ok((status, Json(PageView::render(&session).await)).into_response())
}
