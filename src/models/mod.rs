//! Data models for Bookshelf

pub mod book;
pub mod bookmark;
pub mod user;

// Re-export commonly used types
pub use book::{Book, PageQuery, Pagination};
pub use bookmark::BookmarkToggle;
pub use user::{User, UserCredential};
