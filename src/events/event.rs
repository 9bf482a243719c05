//! # Events emitted by the wake-boost controller.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Power events**: wake/suspend notifications seen by the listener
//! - **Boost events**: boost window start, per-core override, unboost scheduling and revert
//! - **Lifecycle events**: controller start/stop, job panics
//! - **Subscriber events**: fan-out overflow and subscriber panics
//!
//! The [`Event`] struct carries additional metadata such as timestamps, core
//! index, frequencies and delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use wakeboost::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::BoostApplied)
//!     .with_cpu(2)
//!     .with_freq(2_000_000);
//!
//! assert_eq!(ev.kind, EventKind::BoostApplied);
//! assert_eq!(ev.cpu, Some(2));
//! assert_eq!(ev.freq_khz, Some(2_000_000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of controller events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Power events ===
    /// Device became active; the boost job was submitted.
    ///
    /// Sets:
    /// - `reason`: submit outcome (`queued`, `already_pending`, `rejected`)
    WakeObserved,

    /// Device is suspending.
    SuspendObserved,

    // === Boost events ===
    /// Boost job is running (phase set to `Boosting`).
    BoostStarting,

    /// Interceptor raised a core's minimum to its maximum.
    ///
    /// Sets:
    /// - `cpu`: core index
    /// - `freq_khz`: new minimum (= policy maximum)
    BoostApplied,

    /// Unboost job submission after a boost refresh.
    ///
    /// Sets:
    /// - `delay_ms`: delay before the revert
    /// - `reason`: submit outcome (`queued`, `already_pending`, `rejected`)
    UnboostScheduled,

    /// Suspend cancelled a pending unboost and forced it to run now.
    UnboostForced,

    /// Unboost job is running (phase set to `PendingRevert`).
    UnboostStarting,

    /// Interceptor restored a core's hardware minimum and reset the phase.
    ///
    /// Sets:
    /// - `cpu`: core index
    /// - `freq_khz`: restored minimum
    Reverted,

    /// A policy refresh over all online cores finished.
    ///
    /// Sets:
    /// - `reason`: `"cpus=N"`
    RefreshCompleted,

    // === Lifecycle events ===
    /// A work job panicked; the slot stays usable.
    ///
    /// Sets:
    /// - `work`: work name
    /// - `reason`: panic info
    WorkPanicked,

    /// Controller finished initialization.
    ControllerStarted,

    /// Controller teardown began.
    ControllerStopping,

    /// Controller teardown finished; subscriptions released.
    ControllerStopped,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `work`: subscriber name
    /// - `reason`: panic info
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `work`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,
}

/// Controller event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Core index, if applicable.
    pub cpu: Option<u32>,
    /// Frequency in kHz, if applicable.
    pub freq_khz: Option<u32>,
    /// Delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Name of the work item or subscriber, if applicable.
    pub work: Option<Arc<str>>,
    /// Human-readable reason (outcomes, panic details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            cpu: None,
            freq_khz: None,
            delay_ms: None,
            work: None,
            reason: None,
        }
    }

    /// Attaches a core index.
    #[inline]
    pub fn with_cpu(mut self, cpu: u32) -> Self {
        self.cpu = Some(cpu);
        self
    }

    /// Attaches a frequency (kHz).
    #[inline]
    pub fn with_freq(mut self, khz: u32) -> Self {
        self.freq_khz = Some(khz);
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a work item or subscriber name.
    #[inline]
    pub fn with_work(mut self, work: impl Into<Arc<str>>) -> Self {
        self.work = Some(work.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_work(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_work(subscriber)
            .with_reason(info)
    }
}
