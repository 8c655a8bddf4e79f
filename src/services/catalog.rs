//! Catalogue browsing and search service

use crate::{
    error::AppResult,
    models::book::{Book, Pagination},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    per_page: i64,
}

impl CatalogService {
    pub fn new(repository: Repository, per_page: i64) -> Self {
        Self {
            repository,
            per_page,
        }
    }

    /// One page of the catalogue with its pagination
    pub async fn list_books(&self, page: Option<i64>, user_id: Option<i32>) -> AppResult<(Vec<Book>, Pagination)> {
        let total = self.repository.books.count().await?;
        let pagination = Pagination::new(page, self.per_page, total);

        let books = self.repository.books.list(&pagination, user_id).await?;
        Ok((books, pagination))
    }

    /// Get a book, `None` when the ID is unknown
    pub async fn get_book(&self, book_id: i32, user_id: Option<i32>) -> AppResult<Option<Book>> {
        self.repository.books.get_by_id(book_id, user_id).await
    }

    /// Search by title or author; a blank query matches nothing
    pub async fn search(&self, query: &str, user_id: Option<i32>) -> AppResult<Vec<Book>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let books = self.repository.books.search(query, user_id).await?;
        tracing::debug!(query = %query.trim(), results = books.len(), "Catalogue search");
        Ok(books)
    }
}
