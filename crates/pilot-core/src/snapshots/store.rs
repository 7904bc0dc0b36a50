//! Transition snapshot store
//!
//! A bounded cache keyed by `(from, to)`. When a new key would push the cache
//! past its limit, the entry with the oldest timestamp is evicted first (ties
//! go to the entry stored earliest). Persistence is fire-and-forget: writes run
//! on spawned tasks, failures are logged, and [`TransitionSnapshotStore::flush_pending`]
//! waits for whatever is still in flight.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::findings::format_findings;
use super::full_snapshot::create_full_snapshot;
use super::storage::SnapshotStorage;
use super::types::{
    CacheStats, Findings, SNAPSHOT_MESSAGE_LIMIT, SnapshotInput, SnapshotKey, SnapshotMessage,
    TransitionSnapshot,
};
use crate::config::SnapshotConfig;
use crate::error::PilotResult;
use crate::modes::Mode;
use crate::time::{SharedClock, to_chrono};
use crate::types::{Message, tail};

struct CacheEntry {
    snapshot: TransitionSnapshot,
    /// Insertion order, used to break timestamp ties
    seq: u64,
}

#[derive(Default)]
struct Cache {
    entries: HashMap<SnapshotKey, CacheEntry>,
    next_seq: u64,
}

impl Cache {
    fn oldest_key(&self) -> Option<SnapshotKey> {
        self.entries
            .iter()
            .min_by_key(|(_, e)| (e.snapshot.timestamp, e.seq))
            .map(|(k, _)| *k)
    }
}

/// Where persisted snapshots go
struct Persistence {
    storage: Arc<dyn SnapshotStorage>,
    session_id: String,
}

/// Bounded, time-pruned cache of transition snapshots
pub struct TransitionSnapshotStore {
    cache: Mutex<Cache>,
    clock: SharedClock,
    config: SnapshotConfig,
    persistence: Option<Persistence>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl TransitionSnapshotStore {
    /// Create an in-memory store
    ///
    /// A `max_cache_size` of 0 is raised to 1; the cache always holds at
    /// least the snapshot just stored.
    pub fn new(clock: SharedClock, mut config: SnapshotConfig) -> Self {
        config.max_cache_size = config.max_cache_size.max(1);
        Self {
            cache: Mutex::new(Cache::default()),
            clock,
            config,
            persistence: None,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Mirror persisted snapshots into `storage` under `session_id`
    pub fn with_storage(
        mut self,
        storage: Arc<dyn SnapshotStorage>,
        session_id: impl Into<String>,
    ) -> Self {
        self.persistence = Some(Persistence {
            storage,
            session_id: session_id.into(),
        });
        self
    }

    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    /// Build a snapshot of the state being left behind
    pub fn create_transition_snapshot(
        &self,
        from: Mode,
        to: Mode,
        input: SnapshotInput,
    ) -> TransitionSnapshot {
        TransitionSnapshot {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: self.clock.now(),
            from_mode: from,
            to_mode: to,
            recent_messages: tail(&input.messages, SNAPSHOT_MESSAGE_LIMIT)
                .iter()
                .map(SnapshotMessage::from)
                .collect(),
            active_skills: input.active_skills,
            active_tools: input.active_tools,
            current_task: input.current_task,
            findings: input.findings,
        }
    }

    /// Insert or replace the snapshot for its `(from, to)` pair
    pub fn store_snapshot(&self, mut snapshot: TransitionSnapshot, persist: bool) {
        snapshot.recent_messages = {
            let skip = snapshot
                .recent_messages
                .len()
                .saturating_sub(SNAPSHOT_MESSAGE_LIMIT);
            snapshot.recent_messages.split_off(skip)
        };

        let key = snapshot.key();
        {
            let mut cache = self.cache.lock();
            if !cache.entries.contains_key(&key) {
                while cache.entries.len() >= self.config.max_cache_size {
                    let Some(oldest) = cache.oldest_key() else {
                        break;
                    };
                    cache.entries.remove(&oldest);
                    tracing::debug!("Evicted snapshot {} (cache full)", oldest);
                }
            }
            let seq = cache.next_seq;
            cache.next_seq += 1;
            cache.entries.insert(
                key,
                CacheEntry {
                    snapshot: snapshot.clone(),
                    seq,
                },
            );
        }
        tracing::debug!("Stored snapshot {}", key);

        if persist {
            self.persist(snapshot);
        }
    }

    fn persist(&self, snapshot: TransitionSnapshot) {
        let Some(persistence) = &self.persistence else {
            tracing::debug!("No snapshot storage configured, skipping persistence");
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(
                "No async runtime available, snapshot {} not persisted",
                snapshot.key()
            );
            return;
        };

        let storage = persistence.storage.clone();
        let session_id = persistence.session_id.clone();
        let task = handle.spawn(async move {
            if let Err(e) = storage.save(&session_id, &snapshot).await {
                tracing::warn!("Failed to persist snapshot {}: {}", snapshot.key(), e);
            }
        });

        let mut pending = self.pending.lock();
        pending.retain(|t| !t.is_finished());
        pending.push(task);
    }

    /// Wait for every in-flight persistence write
    pub async fn flush_pending(&self) {
        let tasks: Vec<_> = std::mem::take(&mut *self.pending.lock());
        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!("Snapshot persistence task failed: {}", e);
            }
        }
    }

    /// Load this session's persisted snapshots into the cache
    ///
    /// Returns the number of snapshots loaded. Without storage this is a no-op.
    pub async fn restore_from_storage(&self) -> PilotResult<usize> {
        let Some(persistence) = &self.persistence else {
            return Ok(0);
        };
        let snapshots = persistence
            .storage
            .load_all(&persistence.session_id)
            .await?;

        let count = snapshots.len();
        // Oldest first, so the cache bound keeps the newest
        for snapshot in snapshots {
            self.store_snapshot(snapshot, false);
        }
        tracing::info!(
            "Restored {} snapshots for session {}",
            count,
            persistence.session_id
        );
        Ok(count)
    }

    pub fn get_snapshot(&self, from: Mode, to: Mode) -> Option<TransitionSnapshot> {
        self.cache
            .lock()
            .entries
            .get(&SnapshotKey::new(from, to))
            .map(|e| e.snapshot.clone())
    }

    /// Most recent snapshot of any pair
    pub fn get_latest_snapshot(&self) -> Option<TransitionSnapshot> {
        self.cache
            .lock()
            .entries
            .values()
            .max_by_key(|e| (e.snapshot.timestamp, e.seq))
            .map(|e| e.snapshot.clone())
    }

    /// Attach findings to an existing snapshot; false if the pair is absent
    pub fn add_findings(&self, from: Mode, to: Mode, findings: Findings) -> bool {
        match self.cache.lock().entries.get_mut(&SnapshotKey::new(from, to)) {
            Some(entry) => {
                entry.snapshot.findings = Some(findings);
                true
            }
            None => false,
        }
    }

    /// Render a snapshot's findings; None iff it has none
    pub fn format_findings(&self, snapshot: &TransitionSnapshot) -> Option<String> {
        format_findings(snapshot)
    }

    pub fn remove_snapshot(&self, from: Mode, to: Mode) -> bool {
        self.cache
            .lock()
            .entries
            .remove(&SnapshotKey::new(from, to))
            .is_some()
    }

    /// Drop entries older than the configured age; returns how many were removed
    pub fn prune_snapshots(&self) -> usize {
        let cutoff = self.clock.now() - to_chrono(self.config.prune_after);
        let mut cache = self.cache.lock();
        let before = cache.entries.len();
        cache.entries.retain(|_, e| e.snapshot.timestamp >= cutoff);
        let removed = before - cache.entries.len();
        if removed > 0 {
            tracing::debug!("Pruned {} stale snapshots", removed);
        }
        removed
    }

    /// Structured export of a whole conversation
    pub fn create_full_snapshot(&self, messages: &[Message]) -> String {
        create_full_snapshot(messages)
    }

    pub fn get_cache_stats(&self) -> CacheStats {
        let cache = self.cache.lock();
        let mut keys: Vec<_> = cache.entries.keys().copied().collect();
        keys.sort();
        CacheStats {
            size: cache.entries.len(),
            max_size: self.config.max_cache_size,
            snapshots: keys.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn clear_cache(&self) {
        self.cache.lock().entries.clear();
    }
}

impl std::fmt::Debug for TransitionSnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionSnapshotStore")
            .field("stats", &self.get_cache_stats())
            .field("persistent", &self.persistence.is_some())
            .finish()
    }
}
