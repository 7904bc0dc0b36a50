//! Configuration for the mode core
//!
//! Settings are read from JSON files (comments allowed) at user and project
//! level, merged, overridden from the environment and validated:
//!
//! ```text
//! ~/.config/pilot/modes.json     # user level
//! <project>/.pilot/modes.json    # project level (wins)
//! PILOT_* environment variables  # highest priority
//! ```

mod loader;
mod logging;
mod types;

pub use loader::{ConfigLoader, ConfigLocations};
pub use logging::{LoggingConfig, init_logging};
pub use types::{
    FOCUS_MAX_DURATION_MINUTES, FOCUS_MAX_EXTENSION_MINUTES, FocusConfig, PilotConfig, SnapshotConfig,
    SwitchingConfig,
};
