//! Browser UI: an axum router serving one server-rendered page.
//!
//! | Route          | Purpose                                            |
//! |----------------|----------------------------------------------------|
//! | `GET /`        | render the page for the caller's session           |
//! | `POST /upload` | multipart PDF upload → extract → store in session  |
//! | `POST /ask`    | question + preset → model → append to history      |
//! | `POST /reset`  | end the session                                    |
//!
//! Sessions are identified by the `pdfqa_session` cookie.

pub mod handlers;
pub mod template;

use crate::assistant::Assistant;
use crate::config::AppConfig;
use crate::session::SessionStore;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use template::PageSettings;
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub assistant: Assistant,
    pub sessions: SessionStore,
    pub page: PageSettings,
}

impl AppState {
    pub fn new(assistant: Assistant, config: &AppConfig) -> Self {
        Self {
            assistant,
            sessions: SessionStore::new(config.session_ttl, config.default_preset),
            page: PageSettings {
                title: config.page_title.clone(),
                contact: config.contact.clone(),
            },
        }
    }
}

/// Build the router. `max_upload_bytes` caps the request body of uploads.
pub fn router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/upload", post(handlers::upload))
        .route("/ask", post(handlers::ask))
        .route("/reset", post(handlers::reset))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
