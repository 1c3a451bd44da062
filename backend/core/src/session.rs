//! Session file-path table: maps the numeric id carried in callback
//! buttons to the video file it was issued for.
//!
//! Entries expire after a fixed time-to-live. An expired entry resolves as
//! absent and is evicted on lookup or by [`FilePathTable::purge_expired`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

pub type SessionId = u64;

struct Entry {
    path: PathBuf,
    registered_at: Instant,
}

/// Shared, cloneable session table with TTL expiry.
#[derive(Clone)]
pub struct FilePathTable {
    ttl: Duration,
    next_id: Arc<AtomicU64>,
    entries: Arc<Mutex<HashMap<SessionId, Entry>>>,
}

impl FilePathTable {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            next_id: Arc::new(AtomicU64::new(1)),
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Register a file under a fresh id.
    pub async fn register(&self, path: impl Into<PathBuf>) -> SessionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.insert(id, path).await;
        id
    }

    /// Register a file under a caller-chosen id, replacing any previous entry.
    pub async fn insert(&self, id: SessionId, path: impl Into<PathBuf>) {
        let path = path.into();
        debug!(session_id = id, path = %path.display(), "Session registered");
        self.entries.lock().await.insert(
            id,
            Entry {
                path,
                registered_at: Instant::now(),
            },
        );
    }

    /// Resolve an id to its file. Expired entries are evicted and reported
    /// as absent.
    pub async fn resolve(&self, id: SessionId) -> Option<PathBuf> {
        let mut entries = self.entries.lock().await;
        let expired = match entries.get(&id) {
            None => return None,
            Some(entry) => entry.registered_at.elapsed() >= self.ttl,
        };
        if expired {
            debug!(session_id = id, "Session expired on lookup");
            entries.remove(&id);
            return None;
        }
        entries.get(&id).map(|e| e.path.clone())
    }

    /// Evict every expired entry and return the evicted paths, so the owner
    /// can delete files it downloaded.
    pub async fn purge_expired(&self) -> Vec<PathBuf> {
        let ttl = self.ttl;
        let mut evicted = Vec::new();
        self.entries.lock().await.retain(|_, entry| {
            let keep = entry.registered_at.elapsed() < ttl;
            if !keep {
                evicted.push(entry.path.clone());
            }
            keep
        });
        evicted
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether any live entry still points at `path`.
    pub async fn references(&self, path: &Path) -> bool {
        let ttl = self.ttl;
        self.entries
            .lock()
            .await
            .values()
            .any(|e| e.path == path && e.registered_at.elapsed() < ttl)
    }
}
