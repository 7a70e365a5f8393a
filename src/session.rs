//! Per-session state: processed documents and the running chat history.
//!
//! Sessions live in memory only. A session ends when the user resets it or
//! when it has been idle for longer than the configured TTL; either way its
//! history is gone. The history itself is append-only and unbounded for the
//! lifetime of the session.

use crate::pipeline::extract::ExtractedText;
use crate::preset::Preset;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Opaque session identifier (carried in a cookie by the web UI).
pub type SessionId = Uuid;

/// One answered question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
}

/// Append-only list of exchanges, oldest first.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    exchanges: Vec<Exchange>,
}

impl ChatHistory {
    pub fn push(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.exchanges.push(Exchange {
            question: question.into(),
            answer: answer.into(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter()
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    pub fn last(&self) -> Option<&Exchange> {
        self.exchanges.last()
    }
}

/// State owned by one user session.
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    /// Text of the most recently processed upload batch.
    pub documents: Option<ExtractedText>,
    pub history: ChatHistory,
    /// Preset used for the last question; pre-selected in the form.
    pub preset: Preset,
}

impl Session {
    pub fn new(id: SessionId, preset: Preset) -> Self {
        Self {
            id,
            documents: None,
            history: ChatHistory::default(),
            preset,
        }
    }

    pub fn has_documents(&self) -> bool {
        self.documents.is_some()
    }
}

pub type SharedSession = Arc<Mutex<Session>>;

struct Entry {
    session: SharedSession,
    last_access: Instant,
}

/// In-memory map of live sessions.
///
/// The outer lock guards the map only; each session has its own async mutex,
/// held for the whole of an interaction so one session's requests run one at
/// a time.
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionId, Entry>>,
    ttl: Duration,
    default_preset: Preset,
}

impl SessionStore {
    pub fn new(ttl: Duration, default_preset: Preset) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
            default_preset,
        }
    }

    /// Look up `id`, or start a fresh session when it is absent, unknown,
    /// or expired. Returns the session and whether it was just created.
    pub async fn get_or_create(&self, id: Option<SessionId>) -> (SharedSession, bool) {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        self.sweep_locked(&mut sessions, now);

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(&id) {
                entry.last_access = now;
                return (Arc::clone(&entry.session), false);
            }
        }

        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(Session::new(id, self.default_preset)));
        sessions.insert(
            id,
            Entry {
                session: Arc::clone(&session),
                last_access: now,
            },
        );
        debug!("Started session {}", id);
        (session, true)
    }

    /// Look up a live session without creating one.
    pub async fn get(&self, id: SessionId) -> Option<SharedSession> {
        let mut sessions = self.sessions.lock().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_access = Instant::now();
        Some(Arc::clone(&entry.session))
    }

    /// End a session, discarding its documents and history.
    pub async fn end(&self, id: SessionId) -> bool {
        let removed = self.sessions.lock().await.remove(&id).is_some();
        if removed {
            debug!("Ended session {}", id);
        }
        removed
    }

    /// End every session idle for longer than the TTL. Returns how many ended.
    ///
    /// A session whose lock is held is in use (an upload or a model call in
    /// flight) and is never swept, however long ago it was last looked up.
    pub async fn sweep_expired(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        self.sweep_locked(&mut sessions, Instant::now())
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    fn sweep_locked(&self, sessions: &mut HashMap<SessionId, Entry>, now: Instant) -> usize {
        let before = sessions.len();
        sessions.retain(|_, e| {
            e.session.try_lock().is_err() || now.duration_since(e.last_access) <= self.ttl
        });
        let expired = before - sessions.len();
        if expired > 0 {
            debug!("Expired {} idle session(s)", expired);
        }
        expired
    }
}
