//! Bookmarks repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{book::Book, bookmark::BookmarkToggle},
};

#[derive(Clone)]
pub struct BookmarksRepository {
    pool: Pool<Postgres>,
}

impl BookmarksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Remove the bookmark if present, otherwise add it.
    /// The delete doubles as the existence check.
    pub async fn toggle(&self, user_id: i32, book_id: i32) -> AppResult<BookmarkToggle> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM bookmarks WHERE user_id = $1 AND book_id = $2")
            .bind(user_id)
            .bind(book_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed > 0 {
            tx.commit().await?;
            return Ok(BookmarkToggle::Removed);
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO bookmarks (user_id, book_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, book_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {
                tx.commit().await?;
                Ok(BookmarkToggle::Added)
            }
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => Err(
                AppError::NotFound(format!("Book with id {} not found", book_id)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    /// Books bookmarked by a user, most recent bookmark first
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT b.book_id, b.title, b.authors, b.average_rating, b.isbn, b.isbn13,
                   b.language_code, b.num_pages, b.ratings_count, b.text_reviews_count,
                   b.publication_date, b.publisher,
                   TRUE AS is_bookmarked
            FROM bookmarks bm
            JOIN books b ON b.book_id = bm.book_id
            WHERE bm.user_id = $1
            ORDER BY bm.created_at DESC, b.book_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }
}
