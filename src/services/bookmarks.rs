//! Bookmarks service

use crate::{
    error::AppResult,
    models::{book::Book, bookmark::BookmarkToggle},
    repository::Repository,
};

#[derive(Clone)]
pub struct BookmarksService {
    repository: Repository,
}

impl BookmarksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Add or remove a bookmark
    pub async fn toggle(&self, user_id: i32, book_id: i32) -> AppResult<BookmarkToggle> {
        let outcome = self.repository.bookmarks.toggle(user_id, book_id).await?;
        tracing::info!(user_id, book_id, ?outcome, "Bookmark toggled");
        Ok(outcome)
    }

    /// The user's reading list
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Book>> {
        self.repository.bookmarks.list_for_user(user_id).await
    }
}
