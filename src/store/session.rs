//! Advisory session bookkeeping.
//!
//! Session ids are generated for clients that arrive without one and echoed
//! back otherwise. No handler consults them; they exist so clients get a
//! stable `Mcp-Session-Id` and the operator can see connection counts on
//! `/health`. The sweeper drops sessions on the same TTL as artifacts.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

use super::ARTIFACT_TTL;

#[derive(Debug, Clone)]
struct SessionRecord {
    created_at: Instant,
}

pub struct SessionRegistry {
    ttl: Duration,
    sessions: Mutex<HashMap<String, SessionRecord>>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::with_ttl(ARTIFACT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Create a fresh session and return its id.
    pub fn register(&self) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions.lock().insert(
            id.clone(),
            SessionRecord {
                created_at: Instant::now(),
            },
        );
        id
    }

    /// Track a client-supplied id without disturbing an existing record.
    pub fn ensure(&self, id: &str) {
        let mut sessions = self.sessions.lock();
        sessions.entry(id.to_string()).or_insert(SessionRecord {
            created_at: Instant::now(),
        });
    }

    pub fn remove(&self, id: &str) {
        self.sessions.lock().remove(id);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    /// Evict sessions older than the TTL. Returns the eviction count.
    pub fn sweep(&self) -> usize {
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        let ttl = self.ttl;
        sessions.retain(|_, record| record.created_at.elapsed() <= ttl);
        before - sessions.len()
    }
}
