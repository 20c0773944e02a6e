//! SSE sessions for the HTTP transport.
//!
//! A session is a replay buffer plus a broadcast channel. JSON-RPC
//! responses produced for a session are published to it so that SSE
//! clients (which read responses from the stream, not from the POST) and
//! reconnecting clients (`Last-Event-ID`) both see them.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use axum::response::sse::Event;
use tokio::sync::{RwLock, broadcast};

/// Events kept per session for replay.
const REPLAY_CAPACITY: usize = 64;

/// Sessions idle longer than this are dropped.
const IDLE_TIMEOUT: Duration = Duration::from_secs(3600);

/// How often idle sessions are swept.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// One event on a session stream.
#[derive(Clone, Debug)]
pub struct StreamEvent {
    /// Per-session sequence number, starting at 1.
    pub id: u64,
    /// SSE event name (`endpoint` or `message`).
    pub kind: String,
    /// Event payload.
    pub data: String,
}

impl StreamEvent {
    /// Convert to an axum SSE event.
    #[must_use]
    pub fn to_sse(&self) -> Event {
        Event::default().id(self.id.to_string()).event(&self.kind).data(&self.data)
    }
}

/// A single SSE session.
pub struct Session {
    /// Session identifier (UUID v4).
    pub id: String,
    tx: broadcast::Sender<StreamEvent>,
    backlog: RwLock<VecDeque<StreamEvent>>,
    next_id: AtomicU64,
    last_seen: RwLock<Instant>,
}

impl Session {
    fn new(id: String) -> Self {
        let (tx, _) = broadcast::channel(REPLAY_CAPACITY);
        Self {
            id,
            tx,
            backlog: RwLock::new(VecDeque::with_capacity(REPLAY_CAPACITY)),
            next_id: AtomicU64::new(1),
            last_seen: RwLock::new(Instant::now()),
        }
    }

    /// Record an event and deliver it to live subscribers. Returns its id.
    pub async fn publish(&self, kind: impl Into<String>, data: impl Into<String>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let event = StreamEvent { id, kind: kind.into(), data: data.into() };

        {
            let mut backlog = self.backlog.write().await;
            if backlog.len() == REPLAY_CAPACITY {
                backlog.pop_front();
            }
            backlog.push_back(event.clone());
        }

        // No subscribers is fine: the backlog still has it.
        let _ = self.tx.send(event);
        self.touch().await;
        id
    }

    /// Events with an id greater than `last_event_id`.
    pub async fn replay_after(&self, last_event_id: u64) -> Vec<StreamEvent> {
        self.backlog.read().await.iter().filter(|e| e.id > last_event_id).cloned().collect()
    }

    /// Subscribe to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StreamEvent> {
        self.tx.subscribe()
    }

    /// Returns true while an SSE stream is attached.
    #[must_use]
    pub fn has_listeners(&self) -> bool {
        self.tx.receiver_count() > 0
    }

    /// Mark the session as active.
    pub async fn touch(&self) {
        *self.last_seen.write().await = Instant::now();
    }

    async fn idle_for(&self) -> Duration {
        self.last_seen.read().await.elapsed()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("next_id", &self.next_id.load(Ordering::SeqCst))
            .finish()
    }
}

/// All live sessions.
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
    idle_timeout: Duration,
}

impl SessionManager {
    /// Create a manager with the default idle timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_idle_timeout(IDLE_TIMEOUT)
    }

    /// Create a manager with a custom idle timeout.
    #[must_use]
    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self { sessions: RwLock::new(HashMap::new()), idle_timeout }
    }

    /// Open a new session with a generated id.
    pub async fn create_session(&self) -> Arc<Session> {
        self.open(uuid::Uuid::new_v4().to_string()).await
    }

    async fn open(&self, id: String) -> Arc<Session> {
        let session = Arc::new(Session::new(id));
        self.sessions.write().await.insert(session.id.clone(), Arc::clone(&session));

        tracing::info!(session_id = %session.id, "Created session");
        session
    }

    /// Look up a session.
    pub async fn get_session(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Look up a session and mark it active.
    pub async fn resume(&self, id: &str) -> Option<Arc<Session>> {
        let session = self.get_session(id).await?;
        session.touch().await;
        Some(session)
    }

    /// Resume a known session or open a new one.
    ///
    /// An unknown id supplied by the client is adopted as-is.
    pub async fn get_or_create_session(&self, id: Option<&str>) -> Arc<Session> {
        match id {
            Some(id) => match self.resume(id).await {
                Some(session) => session,
                None => self.open(id.to_string()).await,
            },
            None => self.create_session().await,
        }
    }

    /// Drop sessions idle past the timeout. Returns how many were dropped.
    ///
    /// Sessions with an open stream are kept however long they are quiet.
    pub async fn sweep_idle(&self) -> usize {
        let mut idle = Vec::new();
        for (id, session) in self.sessions.read().await.iter() {
            if !session.has_listeners() && session.idle_for().await > self.idle_timeout {
                idle.push(id.clone());
            }
        }

        if !idle.is_empty() {
            let mut sessions = self.sessions.write().await;
            for id in &idle {
                sessions.remove(id);
                tracing::info!(session_id = %id, "Dropped idle session");
            }
        }

        idle.len()
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Sweep idle sessions periodically in the background.
    pub fn spawn_sweeper(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                let dropped = self.sweep_idle().await;
                if dropped > 0 {
                    tracing::debug!(count = dropped, "Session sweep completed");
                }
            }
        });
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").field("idle_timeout", &self.idle_timeout).finish()
    }
}
