//! Virtual clock for deterministic tests

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::clock::Clock;
use super::scheduler::{OnceTask, RepeatingTask, Scheduler, TimerHandle};
use super::to_chrono;

enum TimerTask {
    Once(OnceTask),
    Repeat(RepeatingTask, chrono::Duration),
}

struct PendingTimer {
    seq: u64,
    due: DateTime<Utc>,
    token: CancellationToken,
    task: TimerTask,
}

#[derive(Default)]
struct Timers {
    pending: Vec<PendingTimer>,
    next_seq: u64,
}

/// Clock and scheduler that only advance when [`ManualClock::advance`] is called
///
/// Timers fire in due-time order (scheduling order for equal due times), and
/// each callback runs with no internal lock held, so callbacks may freely read
/// the clock, cancel timers, or schedule new ones.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    timers: Mutex<Timers>,
}

impl ManualClock {
    /// Create a clock starting at a fixed, arbitrary instant
    pub fn new() -> Arc<Self> {
        let start = Utc
            .with_ymd_and_hms(2025, 1, 1, 9, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self::starting_at(start)
    }

    /// Create a clock starting at `start`
    pub fn starting_at(start: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(start),
            timers: Mutex::new(Timers::default()),
        })
    }

    /// Number of live (not cancelled) timers
    pub fn pending_timers(&self) -> usize {
        self.timers
            .lock()
            .pending
            .iter()
            .filter(|t| !t.token.is_cancelled())
            .count()
    }

    /// Move virtual time forward by `duration`, firing every timer that becomes due
    pub fn advance(&self, duration: Duration) {
        let target = *self.now.lock() + to_chrono(duration);

        loop {
            let fire = {
                let mut timers = self.timers.lock();
                timers.pending.retain(|t| !t.token.is_cancelled());

                let next = timers
                    .pending
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| (t.due, t.seq))
                    .map(|(idx, _)| idx);

                let Some(idx) = next else {
                    break;
                };

                let due = timers.pending[idx].due;
                *self.now.lock() = due;

                match &timers.pending[idx].task {
                    TimerTask::Once(_) => {
                        let timer = timers.pending.remove(idx);
                        match timer.task {
                            TimerTask::Once(task) => Fire::Once(task),
                            TimerTask::Repeat(..) => continue,
                        }
                    }
                    TimerTask::Repeat(task, interval) => {
                        let task = task.clone();
                        let interval = *interval;
                        let seq = timers.next_seq;
                        timers.next_seq += 1;
                        let timer = &mut timers.pending[idx];
                        timer.due = due + interval;
                        timer.seq = seq;
                        Fire::Repeat(task)
                    }
                }
            };

            match fire {
                Fire::Once(task) => task(),
                Fire::Repeat(task) => task(),
            }
        }

        *self.now.lock() = target;
    }

    fn schedule(&self, due: DateTime<Utc>, task: TimerTask) -> TimerHandle {
        let token = CancellationToken::new();
        let mut timers = self.timers.lock();
        let seq = timers.next_seq;
        timers.next_seq += 1;
        timers.pending.push(PendingTimer {
            seq,
            due,
            token: token.clone(),
            task,
        });
        TimerHandle::new(token)
    }
}

enum Fire {
    Once(OnceTask),
    Repeat(RepeatingTask),
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

impl Scheduler for ManualClock {
    fn after(&self, delay: Duration, task: OnceTask) -> TimerHandle {
        let due = self.now() + to_chrono(delay);
        self.schedule(due, TimerTask::Once(task))
    }

    fn every(&self, interval: Duration, task: RepeatingTask) -> TimerHandle {
        // A zero interval would spin forever inside advance()
        let interval = to_chrono(interval.max(Duration::from_millis(1)));
        let due = self.now() + interval;
        self.schedule(due, TimerTask::Repeat(task, interval))
    }
}

impl std::fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualClock")
            .field("now", &self.now())
            .field("pending_timers", &self.pending_timers())
            .finish()
    }
}
