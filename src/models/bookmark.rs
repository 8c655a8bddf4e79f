//! Bookmark toggle outcome

use serde::Serialize;
use utoipa::ToSchema;

/// What a bookmark toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookmarkToggle {
    Added,
    Removed,
}

impl BookmarkToggle {
    /// Flash text shown after an explicit bookmark action
    pub fn message(&self) -> &'static str {
        match self {
            BookmarkToggle::Added => "Bookmarked successfully!",
            BookmarkToggle::Removed => "Bookmark removed successfully!",
        }
    }
}
