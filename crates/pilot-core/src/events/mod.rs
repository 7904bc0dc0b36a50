//! Mode event bus
//!
//! A broadcast-based bus carrying the events the mode core exposes to its
//! collaborators (metrics, UI, workflow). Publishing is synchronous: by the
//! time a mutating call returns, its event is already queued on every live
//! subscription. Dropping a receiver removes the subscription.

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::config::FOCUS_MAX_DURATION_MINUTES;
use crate::focus::{FocusEndReason, FocusSession};
use crate::modes::{Mode, ModeTransition};

/// Capacity of [`EventBus::default`]
///
/// Countdown updates arrive once per second and share the channel with
/// every other event. This holds one tick per second of the longest focus
/// session, so a subscriber that reads only after a session has run its full
/// course still sees the mode changes published during it.
pub const DEFAULT_EVENT_CAPACITY: usize = 16_384;

const _: () = assert!(DEFAULT_EVENT_CAPACITY >= FOCUS_MAX_DURATION_MINUTES as usize * 60);

/// Events published by the mode core
#[derive(Debug, Clone, PartialEq)]
pub enum ModeEvent {
    /// A mode switch was accepted
    ModeChanged { transition: ModeTransition },

    /// A switch was refused by the focus lock
    ModeSwitchBlocked { target_mode: Mode, reason: String },

    /// Automatic switching was turned on or off
    AutoSwitchChanged { enabled: bool },

    /// A focus session started
    FocusStarted { session: FocusSession },

    /// A focus session ended
    FocusEnded {
        reason: FocusEndReason,
        session: FocusSession,
    },

    /// A focus session was extended
    FocusExtended {
        session: FocusSession,
        added_minutes: u32,
    },

    /// Focus countdown tick
    CountdownUpdate { remaining_ms: u64, formatted: String },
}

impl ModeEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ModeChanged { .. } => "mode-changed",
            Self::ModeSwitchBlocked { .. } => "mode-switch-blocked",
            Self::AutoSwitchChanged { .. } => "auto-switch-changed",
            Self::FocusStarted { .. } => "focus-started",
            Self::FocusEnded { .. } => "focus-ended",
            Self::FocusExtended { .. } => "focus-extended",
            Self::CountdownUpdate { .. } => "countdown-update",
        }
    }
}

/// Event bus for mode events
///
/// # Example
///
/// ```rust
/// use pilot_core::events::{EventBus, ModeEvent};
///
/// let bus = EventBus::new(16);
/// let mut subscriber = bus.subscribe();
///
/// bus.publish(ModeEvent::AutoSwitchChanged { enabled: false });
///
/// let event = subscriber.try_recv().unwrap();
/// assert_eq!(event.event_type(), "auto-switch-changed");
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ModeEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a new event bus with the specified capacity
    ///
    /// The capacity determines how many events can be buffered before
    /// slow subscribers start losing events. A lagging subscriber loses the
    /// oldest events first, whatever their type.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender, capacity }
    }

    /// Publish an event to all subscribers
    ///
    /// Returns the number of active receivers. Returns 0 if there are none.
    pub fn publish(&self, event: ModeEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ModeEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    /// Create an event bus with [`DEFAULT_EVENT_CAPACITY`]
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

/// Thread-safe wrapper around EventBus
pub type SharedEventBus = Arc<EventBus>;

/// Event filter for selective subscription
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    types: Option<Vec<&'static str>>,
}

impl EventFilter {
    /// Create a filter that matches everything
    pub fn new() -> Self {
        Self { types: None }
    }

    /// Filter by event types
    pub fn only_types(mut self, types: Vec<&'static str>) -> Self {
        self.types = Some(types);
        self
    }

    /// Check if an event matches the filter
    pub fn matches(&self, event: &ModeEvent) -> bool {
        match &self.types {
            Some(types) => types.contains(&event.event_type()),
            None => true,
        }
    }
}

/// Filtered event subscriber
pub struct FilteredSubscriber {
    receiver: broadcast::Receiver<ModeEvent>,
    filter: EventFilter,
}

impl FilteredSubscriber {
    /// Create a new filtered subscriber
    pub fn new(bus: &EventBus, filter: EventFilter) -> Self {
        Self {
            receiver: bus.subscribe(),
            filter,
        }
    }

    /// Receive the next matching event
    pub async fn recv(&mut self) -> Result<ModeEvent, broadcast::error::RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.filter.matches(&event) {
                return Ok(event);
            }
        }
    }

    /// Drain every matching event already queued, without waiting
    pub fn drain(&mut self) -> Vec<ModeEvent> {
        let mut events = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => events.push(event),
                Ok(_) => {}
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!("Event subscriber lagged, {} events dropped", skipped);
                }
                Err(_) => break,
            }
        }
        events
    }
}
