//! Snapshot persistence backends

mod file_storage;
mod memory_storage;


use async_trait::async_trait;

use super::types::TransitionSnapshot;
use crate::error::PilotResult;

pub use file_storage::FileSnapshotStorage;
pub use memory_storage::MemorySnapshotStorage;

/// Per-session snapshot persistence
///
/// At most one snapshot is kept per `(from, to)` pair; saving again replaces it.
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    /// Save (or replace) a snapshot for a session
    async fn save(&self, session_id: &str, snapshot: &TransitionSnapshot) -> PilotResult<()>;

    /// Load every snapshot of a session, oldest first
    async fn load_all(&self, session_id: &str) -> PilotResult<Vec<TransitionSnapshot>>;

    /// Remove every snapshot of a session
    async fn delete_session(&self, session_id: &str) -> PilotResult<()>;
}
