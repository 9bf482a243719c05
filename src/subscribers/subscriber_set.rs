//! # Non-blocking event fan-out to multiple subscribers.
//!
//! Provides [`SubscriberSet`], which distributes events to multiple subscribers
//! concurrently without blocking the publisher.
//!
//! ## Architecture
//! ```text
//! emit(event)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!     │    (bounded)         └──────► panic → SubscriberPanicked
//!     ├──► [queue 2] ──► worker 2 ──► subscriber2.on_event()
//!     └──► [queue N] ──► worker N ──► subscriberN.on_event()
//! ```
//!
//! ## Rules
//! - **No cross-subscriber ordering**: subscriber A may process event N while B processes N+5
//! - **Overflow**: event dropped for that subscriber only, counted in
//!   [`SubscriberSet::dropped`], `SubscriberOverflow` published
//! - **Non-blocking**: `emit()` returns immediately (uses `try_send`)
//! - **Isolation**: slow/panicking subscriber doesn't affect others
//! - **Per-subscriber FIFO**: each subscriber sees events in order

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::{runtime::Handle, task::JoinHandle};

use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

/// Sending half of one subscriber's queue.
struct Lane {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
    dropped: AtomicU64,
}

impl Lane {
    /// Queues `ev` without waiting; on failure returns the overflow reason.
    fn offer(&self, ev: &Arc<Event>) -> Result<(), &'static str> {
        self.tx.try_send(Arc::clone(ev)).map_err(|e| {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            match e {
                TrySendError::Full(_) => "full",
                TrySendError::Closed(_) => "closed",
            }
        })
    }
}

/// Fan-out coordinator for multiple event subscribers.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber on `rt`.
    ///
    /// Queue capacity is `Subscribe::queue_capacity`, at least 1.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus, rt: &Handle) -> Self {
        let (lanes, workers) = subs
            .into_iter()
            .map(|sub| {
                let (tx, rx) = mpsc::channel(sub.queue_capacity().max(1));
                let lane = Lane {
                    name: sub.name(),
                    tx,
                    dropped: AtomicU64::new(0),
                };
                (lane, rt.spawn(drive(sub, rx, bus.clone())))
            })
            .unzip();

        Self {
            lanes,
            workers,
            bus,
        }
    }

    /// Offers `event` to every subscriber without waiting.
    ///
    /// A subscriber whose queue is full or closed misses the event and a
    /// `SubscriberOverflow` naming it is published. Overflow reports are
    /// themselves never reported.
    pub fn emit(&self, event: &Event) {
        let shared = Arc::new(event.clone());
        let report = shared.kind != EventKind::SubscriberOverflow;

        for lane in &self.lanes {
            if let Err(reason) = lane.offer(&shared) {
                if report {
                    self.bus.publish(Event::subscriber_overflow(lane.name, reason));
                }
            }
        }
    }

    /// Events each subscriber has missed so far, in registration order.
    pub fn dropped(&self) -> Vec<(&'static str, u64)> {
        self.lanes
            .iter()
            .map(|l| (l.name, l.dropped.load(Ordering::Relaxed)))
            .collect()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Closes every queue and waits for the workers to deliver what is left.
    pub async fn shutdown(self) {
        drop(self.lanes);
        futures::future::join_all(self.workers).await;
    }
}

/// Worker body: delivers queued events in order until the queue closes.
async fn drive(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(ev) = rx.recv().await {
        let delivery = AssertUnwindSafe(sub.on_event(&ev)).catch_unwind().await;
        if let Err(payload) = delivery {
            bus.publish(Event::subscriber_panicked(sub.name(), panic_message(&*payload)));
        }
    }
}

/// Extracts a printable message from a panic payload.
pub(crate) fn panic_message(any: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().push(event.kind);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Exploder;

    #[async_trait]
    impl Subscribe for Exploder {
        async fn on_event(&self, _event: &Event) {
            panic!("boom");
        }

        fn name(&self) -> &'static str {
            "exploder"
        }
    }

    #[tokio::test]
    async fn test_emit_delivers_in_order() {
        let bus = Bus::new(16);
        let rec = Arc::new(Recorder::default());
        let set = SubscriberSet::new(vec![rec.clone()], bus, &Handle::current());
        assert_eq!(set.len(), 1);

        set.emit(&Event::new(EventKind::WakeObserved));
        set.emit(&Event::new(EventKind::BoostStarting));
        set.shutdown().await;

        assert_eq!(
            *rec.seen.lock(),
            vec![EventKind::WakeObserved, EventKind::BoostStarting]
        );
    }

    #[tokio::test]
    async fn test_panicking_subscriber_is_reported() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Exploder)], bus, &Handle::current());

        set.emit(&Event::new(EventKind::WakeObserved));
        set.shutdown().await;

        let ev = rx.recv().await.expect("panic report");
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert_eq!(ev.work.as_deref(), Some("exploder"));
        assert_eq!(ev.reason.as_deref(), Some("boom"));
    }

    struct Idle;

    #[async_trait]
    impl Subscribe for Idle {
        async fn on_event(&self, _event: &Event) {}

        fn name(&self) -> &'static str {
            "idle"
        }

        fn queue_capacity(&self) -> usize {
            1
        }
    }

    #[tokio::test]
    async fn test_full_queue_drops_and_reports() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Idle)], bus, &Handle::current());

        // The worker has not run yet: only the first event fits.
        set.emit(&Event::new(EventKind::BoostStarting));
        set.emit(&Event::new(EventKind::BoostApplied));
        set.emit(&Event::subscriber_overflow("other", "full"));

        assert_eq!(set.dropped(), vec![("idle", 2)]);
        let report = rx.try_recv().expect("overflow report");
        assert_eq!(report.kind, EventKind::SubscriberOverflow);
        assert_eq!(report.work.as_deref(), Some("idle"));
        assert_eq!(report.reason.as_deref(), Some("full"));
        assert!(rx.try_recv().is_err());

        set.shutdown().await;
    }
}
