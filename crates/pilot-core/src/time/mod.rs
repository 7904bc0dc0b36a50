//! Time and scheduling ports
//!
//! Everything in the mode core that depends on wall-clock time goes through
//! [`Clock`], and every deferred callback goes through [`Scheduler`]. In
//! production these are [`SystemClock`] and [`TokioScheduler`]; tests use
//! [`ManualClock`], which implements both and only moves when told to.
//!
//! ```rust
//! use pilot_core::time::{Clock, ManualClock, Scheduler};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let fired = Arc::new(AtomicUsize::new(0));
//! let counter = fired.clone();
//! let _handle = clock.every(
//!     Duration::from_secs(1),
//!     Arc::new(move || {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     }),
//! );
//!
//! clock.advance(Duration::from_secs(3));
//! assert_eq!(fired.load(Ordering::SeqCst), 3);
//! ```

mod clock;
mod manual;
mod scheduler;

pub use clock::{Clock, SharedClock, SystemClock};
pub use manual::ManualClock;
pub use scheduler::{
    OnceTask, RepeatingTask, Scheduler, SharedScheduler, TimerHandle, TokioScheduler,
};

/// Convert a std duration into a chrono duration, saturating on overflow
pub(crate) fn to_chrono(duration: std::time::Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX)
}

/// Convert a (possibly negative) chrono duration into a std duration, clamped at zero
pub(crate) fn to_std(duration: chrono::Duration) -> std::time::Duration {
    duration.to_std().unwrap_or(std::time::Duration::ZERO)
}
