//! Catalogue pages: landing, explore, book details and search

use axum::{
    extract::{Path, Query, State},
    http::Uri,
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::book::{Book, PageQuery, Pagination},
    session::{FlashCategory, PageContext, Session},
};

use super::{redirect, PageView, HOME_PATH};

const LOGIN_TO_VIEW: &str = "Please log in to access this page.";
const LOGIN_TO_SEARCH: &str = "Please log in to use the search functionality.";
const NO_RESULTS: &str = "No results found. Please try a different search query.";

/// Explore page: one page of the catalogue
#[derive(Serialize, ToSchema)]
pub struct ExploreView {
    #[serde(flatten)]
    pub context: PageContext,
    pub books: Vec<Book>,
    pub pagination: Pagination,
}

/// Book details page
#[derive(Serialize, ToSchema)]
pub struct BookView {
    #[serde(flatten)]
    pub context: PageContext,
    pub book: Book,
}

/// Search form
#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchForm {
    #[serde(default)]
    pub search_query: String,
}

/// Search results page
#[derive(Serialize, ToSchema)]
pub struct SearchResultsView {
    #[serde(flatten)]
    pub context: PageContext,
    pub query: String,
    pub results: Vec<Book>,
}

/// Landing page
#[utoipa::path(
    get,
    path = "/",
    tag = "catalog",
    responses(
        (status = 200, description = "Landing page", body = PageView)
    )
)]
pub async fn index(session: Session) -> Json<PageView> {
    Json(PageView::render(&session).await)
}

/// Paginated catalogue
#[utoipa::path(
    get,
    path = "/explore",
    tag = "catalog",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of books", body = ExploreView),
        (status = 303, description = "Not logged in, redirect to /login")
    )
)]
pub async fn explore(
    State(state): State<crate::AppState>,
    session: Session,
    uri: Uri,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ExploreView>> {
    let user_id = session.require_user(LOGIN_TO_VIEW, &uri).await?;

    let (books, pagination) = state
        .services
        .catalog
        .list_books(query.page, Some(user_id))
        .await?;

    Ok(Json(ExploreView {
        context: session.context().await,
        books,
        pagination,
    }))
}

/// Book details
#[utoipa::path(
    get,
    path = "/book/{book_id}",
    tag = "catalog",
    params(
        ("book_id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookView),
        (status = 303, description = "Not logged in, or unknown book (redirect to /explore)")
    )
)]
pub async fn book_details(
    State(state): State<crate::AppState>,
    session: Session,
    uri: Uri,
    Path(book_id): Path<i32>,
) -> AppResult<Response> {
    let user_id = session.require_user(LOGIN_TO_VIEW, &uri).await?;

    match state.services.catalog.get_book(book_id, Some(user_id)).await? {
        Some(book) => Ok(Json(BookView {
            context: session.context().await,
            book,
        })
        .into_response()),
        None => Ok(redirect(HOME_PATH)),
    }
}

/// Search form page
#[utoipa::path(
    get,
    path = "/search",
    tag = "catalog",
    responses(
        (status = 200, description = "Search form", body = PageView),
        (status = 303, description = "Not logged in, redirect to /login")
    )
)]
pub async fn search_page(session: Session, uri: Uri) -> AppResult<Json<PageView>> {
    session.require_user(LOGIN_TO_SEARCH, &uri).await?;
    Ok(Json(PageView::render(&session).await))
}

/// Search by title or author
#[utoipa::path(
    post,
    path = "/search",
    tag = "catalog",
    request_body(content = SearchForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Matching books", body = SearchResultsView),
        (status = 303, description = "No results (redirect to /search) or not logged in")
    )
)]
pub async fn search(
    State(state): State<crate::AppState>,
    session: Session,
    uri: Uri,
    Form(form): Form<SearchForm>,
) -> AppResult<Response> {
    let user_id = session.require_user(LOGIN_TO_SEARCH, &uri).await?;

    let results = state
        .services
        .catalog
        .search(&form.search_query, Some(user_id))
        .await?;

    if results.is_empty() {
        session.flash(FlashCategory::Info, NO_RESULTS).await;
        return Ok(redirect("/search"));
    }

    Ok(Json(SearchResultsView {
        context: session.context().await,
        query: form.search_query.trim().to_string(),
        results,
    })
    .into_response())
}
