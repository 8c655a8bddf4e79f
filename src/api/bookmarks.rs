//! Bookmark actions and the reading list

use axum::{
    extract::{Path, State},
    http::{HeaderMap, Uri},
    response::Response,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, Pagination},
    session::{FlashCategory, PageContext, Session},
};

use super::{back_target, redirect, HOME_PATH};

const LOGIN_TO_BOOKMARK: &str = "Please log in to bookmark a book.";
const LOGIN_TO_LIST: &str = "Please log in to access your list.";

/// Reading list page
#[derive(Serialize, ToSchema)]
pub struct MyListView {
    #[serde(flatten)]
    pub context: PageContext,
    pub books: Vec<Book>,
    pub pagination: Pagination,
}

/// Toggle a bookmark and report the outcome as a flash
#[utoipa::path(
    get,
    path = "/bookmark/{book_id}",
    tag = "bookmarks",
    params(
        ("book_id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 303, description = "Back to the referring page, or to /login")
    )
)]
pub async fn bookmark(
    State(state): State<crate::AppState>,
    session: Session,
    uri: Uri,
    headers: HeaderMap,
    Path(book_id): Path<i32>,
) -> AppResult<Response> {
    let user_id = session.require_user(LOGIN_TO_BOOKMARK, &uri).await?;

    match state.services.bookmarks.toggle(user_id, book_id).await {
        Ok(outcome) => session.flash(FlashCategory::Success, outcome.message()).await,
        Err(AppError::NotFound(msg)) => session.flash(FlashCategory::Error, msg).await,
        Err(e) => return Err(e),
    }

    Ok(redirect(&back_target(&headers, HOME_PATH)))
}

/// Toggle a bookmark without a flash (inline list buttons)
#[utoipa::path(
    get,
    path = "/toggle_bookmark/{book_id}",
    tag = "bookmarks",
    params(
        ("book_id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 303, description = "Back to the referring page, or to /login")
    )
)]
pub async fn toggle_bookmark(
    State(state): State<crate::AppState>,
    session: Session,
    uri: Uri,
    headers: HeaderMap,
    Path(book_id): Path<i32>,
) -> AppResult<Response> {
    let user_id = session.require_user(LOGIN_TO_BOOKMARK, &uri).await?;

    match state.services.bookmarks.toggle(user_id, book_id).await {
        Ok(_) => {}
        Err(AppError::NotFound(msg)) => session.flash(FlashCategory::Error, msg).await,
        Err(e) => return Err(e),
    }

    Ok(redirect(&back_target(&headers, HOME_PATH)))
}

/// The user's bookmarked books
#[utoipa::path(
    get,
    path = "/mylist",
    tag = "bookmarks",
    responses(
        (status = 200, description = "Bookmarked books", body = MyListView),
        (status = 303, description = "Not logged in, redirect to /login")
    )
)]
pub async fn my_list(
    State(state): State<crate::AppState>,
    session: Session,
    uri: Uri,
) -> AppResult<Json<MyListView>> {
    let user_id = session.require_user(LOGIN_TO_LIST, &uri).await?;

    let books = state.services.bookmarks.list_for_user(user_id).await?;
    let pagination = Pagination::single(books.len() as i64);

    Ok(Json(MyListView {
        context: session.context().await,
        books,
        pagination,
    }))
}
