use crate::error::ApiError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;
use widget_sync::Page;

/// One browser page instance. The mutex serializes requests of a session,
/// since a `Page` is not built for concurrent mutation.
#[derive(Debug)]
pub struct Session {
    pub page: Page,
    last_seen: Instant,
}

impl Session {
    fn new(page: Page) -> Self {
        Self {
            page,
            last_seen: Instant::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    fn is_idle(&self, idle: Duration) -> bool {
        self.last_seen.elapsed() >= idle
    }
}

pub type SharedSession = Arc<Mutex<Session>>;

#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SharedSession>>,
    max_sessions: usize,
    idle: Duration,
}

impl SessionStore {
    pub fn new(max_sessions: usize, idle: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
            idle,
        }
    }

    /// Register a new session, pruning idle ones first.
    ///
    /// # Errors
    ///
    /// `TooManySessions` when the store is full after pruning.
    pub async fn create(&self, page: Page) -> Result<(Uuid, SharedSession), ApiError> {
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        // A locked session is serving a request and therefore not idle.
        sessions.retain(|_, session| {
            session
                .try_lock()
                .map_or(true, |session| !session.is_idle(self.idle))
        });
        if sessions.len() < before {
            tracing::info!("pruned {} idle session(s)", before - sessions.len());
        }

        if sessions.len() >= self.max_sessions {
            tracing::warn!("refusing new session: {} live", sessions.len());
            return Err(ApiError::TooManySessions);
        }

        let id = Uuid::now_v7();
        let session = Arc::new(Mutex::new(Session::new(page)));
        sessions.insert(id, Arc::clone(&session));

        tracing::info!("created session {id}");

        Ok((id, session))
    }

    /// # Errors
    ///
    /// `SessionNotFound` for an unknown or malformed id.
    pub async fn get(&self, id: &str) -> Result<SharedSession, ApiError> {
        let id = parse_id(id)?;
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(ApiError::SessionNotFound)
    }

    /// # Errors
    ///
    /// `SessionNotFound` for an unknown or malformed id.
    pub async fn remove(&self, id: &str) -> Result<(), ApiError> {
        let id = parse_id(id)?;
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| tracing::info!("destroyed session {id}"))
            .ok_or(ApiError::SessionNotFound)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::SessionNotFound)
}
