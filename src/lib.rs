//! Bookshelf Server
//!
//! A book catalogue with reading lists: browse and search books, bookmark
//! them, and manage a reader account. Pages are served as JSON view models
//! and access is gated by server-side sessions.

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod session;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub sessions: Arc<dyn session::SessionStore>,
    /// Signs the session cookie
    pub cookie_key: Key,
}

impl AppState {
    /// Assemble the state. The session secret must already be validated
    /// (see [`AppConfig::validate`]).
    pub fn new(
        config: AppConfig,
        repository: repository::Repository,
        sessions: Arc<dyn session::SessionStore>,
    ) -> Self {
        let cookie_key = Key::derive_from(config.session.secret.as_bytes());
        let services = services::Services::new(repository, &config.catalog);

        Self {
            config: Arc::new(config),
            services: Arc::new(services),
            sessions,
            cookie_key,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
