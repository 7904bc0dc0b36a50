//! File-based snapshot storage

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::SnapshotStorage;
use crate::error::{PilotError, PilotResult};
use crate::snapshots::types::TransitionSnapshot;

/// File-based snapshot storage
///
/// Stores snapshots in a directory structure:
/// ```text
/// base_path/
///   {session_id}/
///     snapshots/
///       {from}-{to}.json
/// ```
#[derive(Debug, Clone)]
pub struct FileSnapshotStorage {
    base_path: PathBuf,
}

impl FileSnapshotStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn session_dir(&self, session_id: &str) -> PathBuf {
        self.base_path.join(session_id)
    }

    fn snapshots_dir(&self, session_id: &str) -> PathBuf {
        self.session_dir(session_id).join("snapshots")
    }

    fn snapshot_path(&self, session_id: &str, snapshot: &TransitionSnapshot) -> PathBuf {
        self.snapshots_dir(session_id).join(format!(
            "{}-{}.json",
            snapshot.from_mode, snapshot.to_mode
        ))
    }
}

#[async_trait]
impl SnapshotStorage for FileSnapshotStorage {
    async fn save(&self, session_id: &str, snapshot: &TransitionSnapshot) -> PilotResult<()> {
        let dir = self.snapshots_dir(session_id);
        fs::create_dir_all(&dir).await.map_err(|e| {
            PilotError::storage(format!("Failed to create snapshots directory: {}", e))
        })?;

        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| PilotError::storage(format!("Failed to serialize snapshot: {}", e)))?;

        let path = self.snapshot_path(session_id, snapshot);
        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| PilotError::storage(format!("Failed to create snapshot file: {}", e)))?;
        file.write_all(json.as_bytes())
            .await
            .map_err(|e| PilotError::storage(format!("Failed to write snapshot file: {}", e)))?;
        file.flush()
            .await
            .map_err(|e| PilotError::storage(format!("Failed to flush snapshot file: {}", e)))?;

        tracing::debug!("Saved snapshot {} to {:?}", snapshot.key(), path);
        Ok(())
    }

    async fn load_all(&self, session_id: &str) -> PilotResult<Vec<TransitionSnapshot>> {
        let dir = self.snapshots_dir(session_id);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut snapshots = Vec::new();
        let mut entries = fs::read_dir(&dir).await.map_err(|e| {
            PilotError::storage(format!("Failed to read snapshots directory: {}", e))
        })?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PilotError::storage(format!("Failed to read directory entry: {}", e)))?
        {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }

            let content = match fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("Skipping unreadable snapshot {:?}: {}", path, e);
                    continue;
                }
            };
            match serde_json::from_str::<TransitionSnapshot>(&content) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => tracing::warn!("Skipping malformed snapshot {:?}: {}", path, e),
            }
        }

        snapshots.sort_by_key(|s| s.timestamp);
        Ok(snapshots)
    }

    async fn delete_session(&self, session_id: &str) -> PilotResult<()> {
        let dir = self.session_dir(session_id);
        if dir.exists() {
            fs::remove_dir_all(&dir).await.map_err(|e| {
                PilotError::storage(format!("Failed to delete session snapshots: {}", e))
            })?;
            tracing::debug!("Deleted snapshots for session {}", session_id);
        }
        Ok(())
    }
}
