//! In-memory snapshot storage

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::SnapshotStorage;
use crate::error::PilotResult;
use crate::snapshots::types::{SnapshotKey, TransitionSnapshot};

/// In-memory snapshot storage (for testing)
#[derive(Debug, Default)]
pub struct MemorySnapshotStorage {
    sessions: RwLock<HashMap<String, HashMap<SnapshotKey, TransitionSnapshot>>>,
}

impl MemorySnapshotStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of snapshots stored for a session
    pub async fn count(&self, session_id: &str) -> usize {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map_or(0, |s| s.len())
    }
}

#[async_trait]
impl SnapshotStorage for MemorySnapshotStorage {
    async fn save(&self, session_id: &str, snapshot: &TransitionSnapshot) -> PilotResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_default()
            .insert(snapshot.key(), snapshot.clone());
        Ok(())
    }

    async fn load_all(&self, session_id: &str) -> PilotResult<Vec<TransitionSnapshot>> {
        let sessions = self.sessions.read().await;
        let mut snapshots: Vec<_> = sessions
            .get(session_id)
            .map(|s| s.values().cloned().collect())
            .unwrap_or_default();
        snapshots.sort_by_key(|s| s.timestamp);
        Ok(snapshots)
    }

    async fn delete_session(&self, session_id: &str) -> PilotResult<()> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }
}
