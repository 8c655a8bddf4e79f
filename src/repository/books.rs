//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::book::{Book, Pagination},
};

/// Book columns plus the bookmark flag; expects `books b` LEFT JOINed with `bookmarks bm`
const BOOK_COLUMNS: &str = r#"
    b.book_id, b.title, b.authors, b.average_rating, b.isbn, b.isbn13,
    b.language_code, b.num_pages, b.ratings_count, b.text_reviews_count,
    b.publication_date, b.publisher,
    (bm.user_id IS NOT NULL) AS is_bookmarked
"#;

/// Escape LIKE metacharacters so user input only ever matches literally
pub fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Case-insensitive `%term%` pattern for a search query
pub fn contains_pattern(query: &str) -> String {
    format!("%{}%", escape_like(&query.trim().to_lowercase()))
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Total number of books in the catalogue
    pub async fn count(&self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    /// One page of books in catalogue order
    pub async fn list(&self, pagination: &Pagination, user_id: Option<i32>) -> AppResult<Vec<Book>> {
        let query = format!(
            r#"
            SELECT {}
            FROM books b
            LEFT JOIN bookmarks bm ON bm.book_id = b.book_id AND bm.user_id = $1
            ORDER BY b.book_id
            LIMIT $2 OFFSET $3
            "#,
            BOOK_COLUMNS
        );

        let books = sqlx::query_as::<_, Book>(&query)
            .bind(user_id)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }

    /// Get a book by ID
    pub async fn get_by_id(&self, book_id: i32, user_id: Option<i32>) -> AppResult<Option<Book>> {
        let query = format!(
            r#"
            SELECT {}
            FROM books b
            LEFT JOIN bookmarks bm ON bm.book_id = b.book_id AND bm.user_id = $1
            WHERE b.book_id = $2
            "#,
            BOOK_COLUMNS
        );

        let book = sqlx::query_as::<_, Book>(&query)
            .bind(user_id)
            .bind(book_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    /// Substring search on title or authors
    pub async fn search(&self, query: &str, user_id: Option<i32>) -> AppResult<Vec<Book>> {
        let pattern = contains_pattern(query);

        let sql = format!(
            r#"
            SELECT {}
            FROM books b
            LEFT JOIN bookmarks bm ON bm.book_id = b.book_id AND bm.user_id = $1
            WHERE LOWER(b.title) LIKE $2 ESCAPE '\'
               OR LOWER(b.authors) LIKE $2 ESCAPE '\'
            ORDER BY b.title, b.book_id
            "#,
            BOOK_COLUMNS
        );

        let books = sqlx::query_as::<_, Book>(&sql)
            .bind(user_id)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }
}
