//! Transition snapshots
//!
//! Recovery state captured when the assistant leaves a mode, so work done in
//! one mode (a debugging trace, a list of review issues) survives the switch.

mod findings;
mod full_snapshot;
mod storage;
mod store;
mod types;


pub use findings::format_findings;
pub use full_snapshot::{create_full_snapshot, escape_xml};
pub use storage::{FileSnapshotStorage, MemorySnapshotStorage, SnapshotStorage};
pub use store::TransitionSnapshotStore;
pub use types::{
    CacheStats, Findings, SNAPSHOT_MESSAGE_LIMIT, SnapshotInput, SnapshotKey, SnapshotMessage,
    TransitionSnapshot,
};
