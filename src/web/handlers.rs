use axum::extract::{Form, Multipart, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::template;
use super::AppState;
use crate::error::{PdfQaError, Result};
use crate::pipeline::input::{is_pdf_filename, UploadedDocument};
use crate::preset::Preset;
use crate::progress::{ProgressCallback, TracingProgressCallback};
use crate::session::{Session, SessionId};

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "pdfqa_session";

/// Multipart field name of the file input.
const FILES_FIELD: &str = "files";

#[derive(Debug, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub question: String,
    pub preset: Option<String>,
}

pub async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (shared, created) = state.sessions.get_or_create(session_id(&headers)).await;
    let session = shared.lock().await;
    let html = template::render_page(&state.page, &session, None);
    with_session_cookie(Html(html).into_response(), created.then_some(session.id))
}

pub async fn upload(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let (shared, created) = state.sessions.get_or_create(session_id(&headers)).await;
    let mut session = shared.lock().await;
    let new_cookie = created.then_some(session.id);

    let result = match read_uploads(multipart).await {
        Ok(documents) => {
            let progress: ProgressCallback = Arc::new(TracingProgressCallback);
            state.assistant.ingest(documents, Some(progress)).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(extracted) => {
            session.documents = Some(extracted);
            see_other(new_cookie)
        }
        Err(e) => {
            warn!("Upload failed for session {}: {}", session.id, e);
            error_page(&state, &session, &e, new_cookie)
        }
    }
}

pub async fn ask(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<AskForm>,
) -> Response {
    let (shared, created) = state.sessions.get_or_create(session_id(&headers)).await;
    let mut session = shared.lock().await;
    let new_cookie = created.then_some(session.id);

    let preset = form
        .preset
        .as_deref()
        .map(Preset::from_label)
        .unwrap_or(session.preset);

    // Submitting an empty or whitespace-only box does nothing.
    if form.question.trim().is_empty() {
        session.preset = preset;
        return see_other(new_cookie);
    }

    match state
        .assistant
        .ask_in_session(&mut session, &form.question, preset)
        .await
    {
        Ok(_) => see_other(new_cookie),
        Err(e) => {
            warn!("Question failed for session {}: {}", session.id, e);
            error_page(&state, &session, &e, new_cookie)
        }
    }
}

pub async fn reset(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(id) = session_id(&headers) {
        state.sessions.end(id).await;
    }
    let mut resp = Redirect::to("/").into_response();
    resp.headers_mut().append(
        header::SET_COOKIE,
        HeaderValue::from_static("pdfqa_session=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax"),
    );
    resp
}

/// Collect every PDF part of the `files` field. Parts with a non-PDF name
/// (including the empty part browsers send for an untouched file input) are
/// skipped.
async fn read_uploads(mut multipart: Multipart) -> Result<Vec<UploadedDocument>> {
    let mut documents = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PdfQaError::InvalidUpload(format!("failed to read form field: {}", e)))?
    {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if !is_pdf_filename(&filename) {
            debug!("Ignoring non-PDF upload part '{}'", filename);
            continue;
        }

        let bytes = field.bytes().await.map_err(|e| {
            PdfQaError::InvalidUpload(format!("failed to read '{}': {}", filename, e))
        })?;
        documents.push(UploadedDocument::new(filename, bytes.to_vec()));
    }

    Ok(documents)
}

/// Read the session id from the `Cookie` header(s).
pub fn session_id(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

fn session_cookie(id: SessionId) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

fn with_session_cookie(mut resp: Response, id: Option<SessionId>) -> Response {
    if let Some(id) = id {
        if let Ok(value) = HeaderValue::from_str(&session_cookie(id)) {
            resp.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    resp
}

fn see_other(new_cookie: Option<SessionId>) -> Response {
    with_session_cookie(Redirect::to("/").into_response(), new_cookie)
}

fn status_for(error: &PdfQaError) -> StatusCode {
    if error.is_client_error() {
        StatusCode::BAD_REQUEST
    } else if error.is_upstream_error() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_page(
    state: &AppState,
    session: &Session,
    error: &PdfQaError,
    new_cookie: Option<SessionId>,
) -> Response {
    let html = template::render_page(&state.page, session, Some(error));
    with_session_cookie((status_for(error), Html(html)).into_response(), new_cookie)
}
