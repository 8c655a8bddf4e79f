//! Account pages: profile, profile edit and password change

use axum::{
    extract::State,
    http::Uri,
    response::Response,
    Form, Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::user::{ChangePasswordForm, UpdateProfileForm, User},
    session::{FlashCategory, PageContext, Session},
};

use super::{redirect, PageView};

const LOGIN_TO_PROFILE: &str = "Please log in to access your profile.";
const LOGIN_TO_UPDATE: &str = "Please log in to update your profile.";
const LOGIN_TO_CHANGE_PASSWORD: &str = "Please log in to change your password.";

/// Profile page
#[derive(Serialize, ToSchema)]
pub struct ProfileView {
    #[serde(flatten)]
    pub context: PageContext,
    pub user: User,
}

/// Current user's profile
#[utoipa::path(
    get,
    path = "/profile",
    tag = "account",
    responses(
        (status = 200, description = "Profile of the logged-in user", body = ProfileView),
        (status = 303, description = "Not logged in, redirect to /login")
    )
)]
pub async fn profile(
    State(state): State<crate::AppState>,
    session: Session,
    uri: Uri,
) -> AppResult<Json<ProfileView>> {
    let user_id = session.require_user(LOGIN_TO_PROFILE, &uri).await?;
    let user = state.services.users.get_by_id(user_id).await?;

    Ok(Json(ProfileView {
        context: session.context().await,
        user,
    }))
}

/// Profile edit form
#[utoipa::path(
    get,
    path = "/update_profile",
    tag = "account",
    responses(
        (status = 200, description = "Profile form, prefilled", body = ProfileView),
        (status = 303, description = "Not logged in, redirect to /login")
    )
)]
pub async fn update_profile_page(
    State(state): State<crate::AppState>,
    session: Session,
    uri: Uri,
) -> AppResult<Json<ProfileView>> {
    let user_id = session.require_user(LOGIN_TO_UPDATE, &uri).await?;
    let user = state.services.users.get_by_id(user_id).await?;

    Ok(Json(ProfileView {
        context: session.context().await,
        user,
    }))
}

/// Update first name, last name or email. Blank fields are left unchanged.
#[utoipa::path(
    post,
    path = "/update_profile",
    tag = "account",
    request_body(content = UpdateProfileForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirect to /profile on success, back to the form otherwise")
    )
)]
pub async fn update_profile(
    State(state): State<crate::AppState>,
    session: Session,
    uri: Uri,
    Form(form): Form<UpdateProfileForm>,
) -> AppResult<Response> {
    let user_id = session.require_user(LOGIN_TO_UPDATE, &uri).await?;

    match state.services.users.update_profile(user_id, form).await {
        Ok(Some(_)) => {
            session
                .flash(FlashCategory::Success, "Profile updated successfully.")
                .await;
            Ok(redirect("/profile"))
        }
        Ok(None) => {
            session
                .flash(
                    FlashCategory::Info,
                    "No changes made. Please update at least one field.",
                )
                .await;
            Ok(redirect("/update_profile"))
        }
        Err(e @ AppError::Validation(_)) => {
            session.flash(FlashCategory::Error, e.user_message()).await;
            Ok(redirect("/update_profile"))
        }
        Err(e) => Err(e),
    }
}

/// Password change form
#[utoipa::path(
    get,
    path = "/change_password",
    tag = "account",
    responses(
        (status = 200, description = "Password change form", body = PageView),
        (status = 303, description = "Not logged in, redirect to /login")
    )
)]
pub async fn change_password_page(session: Session, uri: Uri) -> AppResult<Json<PageView>> {
    session.require_user(LOGIN_TO_CHANGE_PASSWORD, &uri).await?;
    Ok(Json(PageView::render(&session).await))
}

/// Change the password. On success the user is sent through logout to sign in again.
#[utoipa::path(
    post,
    path = "/change_password",
    tag = "account",
    request_body(content = ChangePasswordForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirect to /logout on success, back to the form otherwise")
    )
)]
pub async fn change_password(
    State(state): State<crate::AppState>,
    session: Session,
    uri: Uri,
    Form(form): Form<ChangePasswordForm>,
) -> AppResult<Response> {
    let user_id = session.require_user(LOGIN_TO_CHANGE_PASSWORD, &uri).await?;

    match state.services.users.change_password(user_id, form).await {
        Ok(()) => {
            session
                .flash(FlashCategory::Success, "Password changed successfully.")
                .await;
            Ok(redirect("/logout"))
        }
        Err(e @ (AppError::Authentication(_) | AppError::Validation(_))) => {
            session.flash(FlashCategory::Error, e.user_message()).await;
            Ok(redirect("/change_password"))
        }
        Err(e) => Err(e),
    }
}
