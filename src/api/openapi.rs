//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, bookmarks, books, health, users, PageView};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookshelf",
        version = "0.4.0",
        description = "Book catalogue with reading lists. Pages are JSON view models; \
                       forms are posted as `application/x-www-form-urlencoded` and \
                       access is gated by a session cookie."
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Catalogue
        books::index,
        books::explore,
        books::book_details,
        books::search_page,
        books::search,
        // Bookmarks
        bookmarks::bookmark,
        bookmarks::toggle_bookmark,
        bookmarks::my_list,
        // Auth
        auth::login_page,
        auth::login,
        auth::logout,
        auth::signup_page,
        auth::signup,
        // Account
        users::profile,
        users::update_profile_page,
        users::update_profile,
        users::change_password_page,
        users::change_password,
    ),
    components(
        schemas(
            // Pages
            PageView,
            crate::session::PageContext,
            crate::session::Flash,
            crate::session::FlashCategory,
            // Catalogue
            books::ExploreView,
            books::BookView,
            books::SearchForm,
            books::SearchResultsView,
            crate::models::book::Book,
            crate::models::book::Pagination,
            // Bookmarks
            bookmarks::MyListView,
            crate::models::bookmark::BookmarkToggle,
            // Account
            users::ProfileView,
            crate::models::user::User,
            crate::models::user::LoginForm,
            crate::models::user::SignupForm,
            crate::models::user::UpdateProfileForm,
            crate::models::user::ChangePasswordForm,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Browse, view and search books"),
        (name = "bookmarks", description = "Reading list"),
        (name = "auth", description = "Signup, login and logout"),
        (name = "account", description = "Profile and password")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
