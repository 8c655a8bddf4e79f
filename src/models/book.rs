//! Book model and catalogue pagination

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Catalogue entry, annotated with the viewer's bookmark state
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub book_id: i32,
    pub title: String,
    /// Author names as stored, `/`-separated when there are several
    pub authors: String,
    pub average_rating: Option<f64>,
    pub isbn: Option<String>,
    pub isbn13: Option<String>,
    pub language_code: Option<String>,
    pub num_pages: Option<i32>,
    pub ratings_count: Option<i32>,
    pub text_reviews_count: Option<i32>,
    pub publication_date: Option<NaiveDate>,
    pub publisher: Option<String>,
    /// True when the current session user has bookmarked this book
    pub is_bookmarked: bool,
}

/// Query parameters for paginated listings
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct PageQuery {
    /// Page number (default: 1)
    #[serde(default, deserialize_with = "lenient_page")]
    #[param(value_type = Option<i64>)]
    #[schema(value_type = Option<i64>)]
    pub page: Option<i64>,
}

/// Unparsable page numbers read as absent, so the listing falls back to page 1
fn lenient_page<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.trim().parse().ok()))
}

/// Number of page links shown on each side of the current page
const PAGE_WINDOW: i64 = 2;

/// Position within a paginated listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_prev: bool,
    pub has_next: bool,
    /// Page numbers to offer as direct links around the current page
    pub window: Vec<i64>,
}

impl Pagination {
    pub fn new(page: Option<i64>, per_page: i64, total: i64) -> Self {
        let per_page = per_page.max(1);
        let page = page.unwrap_or(1).max(1);
        let total = total.max(0);
        let total_pages = (total + per_page - 1) / per_page;

        let first = page.saturating_sub(PAGE_WINDOW).max(1);
        let last = page.saturating_add(PAGE_WINDOW).min(total_pages);

        Self {
            page,
            per_page,
            total,
            total_pages,
            has_prev: page > 1,
            has_next: page < total_pages,
            window: (first..=last).collect(),
        }
    }

    /// A single page holding every row, as used by the reading list
    pub fn single(total: i64) -> Self {
        Self {
            page: 1,
            per_page: total.max(1),
            total,
            total_pages: 1,
            has_prev: false,
            has_next: false,
            window: vec![1],
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}
