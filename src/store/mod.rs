//! In-memory artifact store.
//!
//! Generated binaries and the bundles that group them live in one id
//! namespace. Entries carry their kind as an enum tag, so a download lookup
//! for a bundle id (or vice versa) misses instead of returning the wrong
//! record. Nothing here survives a restart; the expiry sweeper evicts entries
//! once they outlive the TTL, and every consumer must tolerate a miss on any
//! lookup.

pub mod session;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

/// Retention window for artifacts and bundles.
pub const ARTIFACT_TTL: Duration = Duration::from_secs(3600);

/// Cadence of the background eviction task.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("bundle must reference at least one artifact id")]
    EmptyBundle,
    #[error("artifact '{0}' not found")]
    MissingArtifact(String),
}

/// A stored binary result of one generation job.
#[derive(Debug, Clone)]
pub struct ArtifactRecord {
    pub id: String,
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub filename: String,
    pub created_at: DateTime<Utc>,
    stored_at: Instant,
}

/// A named group of artifacts, referenced weakly by id.
#[derive(Debug, Clone)]
pub struct BundleRecord {
    pub id: String,
    pub member_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    stored_at: Instant,
}

#[derive(Debug)]
enum StoreEntry {
    Artifact(ArtifactRecord),
    Bundle(BundleRecord),
}

impl StoreEntry {
    fn stored_at(&self) -> Instant {
        match self {
            StoreEntry::Artifact(record) => record.stored_at,
            StoreEntry::Bundle(record) => record.stored_at,
        }
    }
}

/// Process-wide map of artifact and bundle records.
pub struct ArtifactStore {
    ttl: Duration,
    entries: Mutex<HashMap<String, StoreEntry>>,
}

impl Default for ArtifactStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::with_ttl(ARTIFACT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Store artifact bytes and return the assigned id.
    pub fn put(&self, bytes: Vec<u8>, mime_type: &str, filename: &str) -> String {
        let mut entries = self.entries.lock();
        let id = fresh_id(&entries);
        let record = ArtifactRecord {
            id: id.clone(),
            bytes,
            mime_type: mime_type.to_string(),
            filename: filename.to_string(),
            created_at: Utc::now(),
            stored_at: Instant::now(),
        };
        entries.insert(id.clone(), StoreEntry::Artifact(record));
        id
    }

    /// Look up an artifact by id. Bundle ids miss here.
    pub fn get(&self, id: &str) -> Option<ArtifactRecord> {
        let entries = self.entries.lock();
        match entries.get(id) {
            Some(StoreEntry::Artifact(record)) => Some(record.clone()),
            _ => None,
        }
    }

    /// Create a bundle referencing existing artifacts.
    ///
    /// Creation is strict: every member must be present right now, and the
    /// error names the first id that is not. Serving is the lenient side.
    pub fn bundle(&self, artifact_ids: &[String]) -> Result<String, StoreError> {
        let mut entries = self.entries.lock();
        if artifact_ids.is_empty() {
            return Err(StoreError::EmptyBundle);
        }
        for member in artifact_ids {
            match entries.get(member) {
                Some(StoreEntry::Artifact(_)) => {}
                _ => return Err(StoreError::MissingArtifact(member.clone())),
            }
        }

        let id = fresh_id(&entries);
        let record = BundleRecord {
            id: id.clone(),
            member_ids: artifact_ids.to_vec(),
            created_at: Utc::now(),
            stored_at: Instant::now(),
        };
        entries.insert(id.clone(), StoreEntry::Bundle(record));
        Ok(id)
    }

    /// Resolve a bundle into `(filename, bytes)` pairs in member order.
    ///
    /// Members that have expired since creation are skipped silently; the
    /// archive packaging itself belongs to the HTTP layer.
    pub fn serve_bundle(&self, bundle_id: &str) -> Option<Vec<(String, Vec<u8>)>> {
        let entries = self.entries.lock();
        let bundle = match entries.get(bundle_id) {
            Some(StoreEntry::Bundle(record)) => record,
            _ => return None,
        };

        let mut members = Vec::new();
        for member_id in &bundle.member_ids {
            if let Some(StoreEntry::Artifact(record)) = entries.get(member_id) {
                members.push((record.filename.clone(), record.bytes.clone()));
            }
        }
        Some(members)
    }

    /// Evict entries older than the TTL. Returns the eviction count.
    pub fn sweep(&self) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.stored_at().elapsed() <= ttl);
        before - entries.len()
    }

    /// Current `(artifacts, bundles)` counts, for the health endpoint.
    pub fn counts(&self) -> (usize, usize) {
        let entries = self.entries.lock();
        let artifacts = entries
            .values()
            .filter(|e| matches!(e, StoreEntry::Artifact(_)))
            .count();
        (artifacts, entries.len() - artifacts)
    }
}

/// Short opaque id, re-drawn on the (vanishingly unlikely) collision so an
/// existing record is never overwritten by one of a different kind.
fn fresh_id(entries: &HashMap<String, StoreEntry>) -> String {
    loop {
        let mut candidate = Uuid::new_v4().simple().to_string();
        candidate.truncate(12);
        if !entries.contains_key(&candidate) {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_get_roundtrip() {
        let store = ArtifactStore::new();
        let id = store.put(b"svg bytes".to_vec(), "image/svg+xml", "visual.svg");
        let record = store.get(&id).expect("artifact should be present");
        assert_eq!(record.id, id);
        assert_eq!(record.bytes, b"svg bytes");
        assert_eq!(record.mime_type, "image/svg+xml");
        assert_eq!(record.filename, "visual.svg");
    }

    #[test]
    fn test_bundle_id_is_not_an_artifact() {
        let store = ArtifactStore::new();
        let a = store.put(b"a".to_vec(), "image/png", "a.png");
        let bundle_id = store.bundle(&[a]).unwrap();
        assert!(store.get(&bundle_id).is_none());
    }

    #[test]
    fn test_ids_are_short_and_opaque() {
        let store = ArtifactStore::new();
        let id = store.put(b"x".to_vec(), "image/png", "x.png");
        assert_eq!(id.len(), 12);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
