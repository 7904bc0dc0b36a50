//! Scheduling port and the tokio-backed implementation

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Callback run once when a timer fires
pub type OnceTask = Box<dyn FnOnce() + Send + 'static>;

/// Callback run on every tick of a repeating timer
pub type RepeatingTask = Arc<dyn Fn() + Send + Sync + 'static>;

/// Handle to a scheduled timer
///
/// Dropping the handle does not cancel the timer; call [`TimerHandle::cancel`].
#[derive(Debug, Clone)]
pub struct TimerHandle {
    token: CancellationToken,
}

impl TimerHandle {
    /// Wrap an existing cancellation token
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// A handle whose timer will never fire
    pub fn cancelled() -> Self {
        let token = CancellationToken::new();
        token.cancel();
        Self { token }
    }

    /// Cancel the timer. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the timer has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Port for one-shot and repeating timers
pub trait Scheduler: Send + Sync {
    /// Run `task` once after `delay`
    fn after(&self, delay: Duration, task: OnceTask) -> TimerHandle;

    /// Run `task` every `interval`, first run one interval from now
    fn every(&self, interval: Duration, task: RepeatingTask) -> TimerHandle;
}

/// Shared scheduler handle
pub type SharedScheduler = Arc<dyn Scheduler>;

/// Scheduler that spawns tasks on the current tokio runtime
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl TokioScheduler {
    /// Create a shared tokio scheduler
    pub fn shared() -> SharedScheduler {
        Arc::new(Self)
    }
}

impl Scheduler for TokioScheduler {
    fn after(&self, delay: Duration, task: OnceTask) -> TimerHandle {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No tokio runtime available; one-shot timer will not fire");
            return TimerHandle::cancelled();
        };

        let token = CancellationToken::new();
        let child = token.clone();
        runtime.spawn(async move {
            tokio::select! {
                _ = child.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if !child.is_cancelled() {
                        task();
                    }
                }
            }
        });

        TimerHandle::new(token)
    }

    fn every(&self, interval: Duration, task: RepeatingTask) -> TimerHandle {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No tokio runtime available; repeating timer will not fire");
            return TimerHandle::cancelled();
        };

        let token = CancellationToken::new();
        let child = token.clone();
        runtime.spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = ticker.tick() => {
                        if child.is_cancelled() {
                            break;
                        }
                        task();
                    }
                }
            }
        });

        TimerHandle::new(token)
    }
}
