//! Server-side sessions carried by a signed cookie.
//!
//! Every request gets a [`Session`] handle from [`session_layer`]. The
//! session is only written back to the store (and the cookie only re-issued)
//! when a handler changed it, so anonymous page views stay stateless.

pub mod redis_store;
pub mod store;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use utoipa::ToSchema;

use crate::{
    config::SessionConfig,
    error::{AppError, AppResult},
    AppState,
};

pub use store::{MemoryStore, SessionStore};

/// Name of the cookie holding the signed session id
pub const SESSION_COOKIE: &str = "bookshelf_session";

/// Flash message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Success,
    Error,
    Info,
}

/// One-shot message shown on the next rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

/// Persisted session contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: Option<i32>,
    #[serde(default)]
    pub flashes: Vec<Flash>,
}

/// Fields every rendered page carries
#[derive(Debug, Serialize, ToSchema)]
pub struct PageContext {
    pub logged_in: bool,
    pub flashes: Vec<Flash>,
}

#[derive(Default)]
struct SessionState {
    id: Option<String>,
    data: SessionData,
    dirty: bool,
    rotate: bool,
}

/// Handle to the current request's session
#[derive(Clone, Default)]
pub struct Session {
    inner: Arc<Mutex<SessionState>>,
}

impl Session {
    pub fn new(id: Option<String>, data: SessionData) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionState {
                id,
                data,
                dirty: false,
                rotate: false,
            })),
        }
    }

    pub async fn user_id(&self) -> Option<i32> {
        self.inner.lock().await.data.user_id
    }

    /// Current user, or flash `message` and fail with a redirect to the login page
    pub async fn require_user(&self, message: &str, uri: &Uri) -> AppResult<i32> {
        if let Some(user_id) = self.user_id().await {
            return Ok(user_id);
        }

        self.flash(FlashCategory::Error, message).await;
        let next = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string());
        Err(AppError::LoginRequired { next })
    }

    /// Attach a user and issue a fresh session id
    pub async fn login(&self, user_id: i32) {
        let mut state = self.inner.lock().await;
        state.data.user_id = Some(user_id);
        state.rotate = true;
        state.dirty = true;
    }

    /// Detach the user, keeping pending flashes
    pub async fn logout(&self) {
        let mut state = self.inner.lock().await;
        if state.data.user_id.take().is_some() {
            state.dirty = true;
        }
    }

    pub async fn flash(&self, category: FlashCategory, message: impl Into<String>) {
        let mut state = self.inner.lock().await;
        state.data.flashes.push(Flash {
            category,
            message: message.into(),
        });
        state.dirty = true;
    }

    /// Drain pending flashes
    pub async fn take_flashes(&self) -> Vec<Flash> {
        let mut state = self.inner.lock().await;
        if state.data.flashes.is_empty() {
            return Vec::new();
        }
        state.dirty = true;
        std::mem::take(&mut state.data.flashes)
    }

    /// Login state and consumed flashes for a page render
    pub async fn context(&self) -> PageContext {
        let flashes = self.take_flashes().await;
        PageContext {
            logged_in: self.user_id().await.is_some(),
            flashes,
        }
    }

    /// Persist a modified session, returning the id the cookie must carry
    pub async fn commit(&self, store: &dyn SessionStore, ttl_seconds: u64) -> AppResult<Option<String>> {
        let mut state = self.inner.lock().await;
        if !state.dirty {
            return Ok(None);
        }

        let rotate = state.rotate;
        let id = match state.id.take() {
            Some(old) if rotate => {
                store.remove(&old).await?;
                new_session_id()
            }
            Some(existing) => existing,
            None => new_session_id(),
        };

        store.save(&id, &state.data, ttl_seconds).await?;

        state.id = Some(id.clone());
        state.dirty = false;
        state.rotate = false;
        Ok(Some(id))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("Session layer is not installed".to_string()))
    }
}

/// 256 bits of randomness, hex encoded
pub fn new_session_id() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

fn session_cookie(id: String, config: &SessionConfig) -> Cookie<'static> {
    let max_age = i64::try_from(config.ttl_seconds).unwrap_or(i64::MAX);

    Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .max_age(time::Duration::seconds(max_age))
        .build()
}

/// Middleware loading the session before the handler and saving it afterwards
pub async fn session_layer(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let session = match jar.get(SESSION_COOKIE) {
        Some(cookie) => {
            let id = cookie.value().to_owned();
            match state.sessions.load(&id).await {
                Ok(Some(data)) => Session::new(Some(id), data),
                Ok(None) => Session::default(),
                Err(e) => return e.into_response(),
            }
        }
        None => Session::default(),
    };

    request.extensions_mut().insert(session.clone());
    let response = next.run(request).await;

    let config = &state.config.session;
    match session.commit(state.sessions.as_ref(), config.ttl_seconds).await {
        Ok(Some(id)) => (jar.add(session_cookie(id, config)), response).into_response(),
        Ok(None) => response,
        Err(e) => e.into_response(),
    }
}
