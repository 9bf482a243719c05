//! # PowerNotifier: priority-ordered wake/suspend chain.
//!
//! Listeners register with a priority; [`PowerNotifier::notify`] calls them
//! one after another, highest priority first, and returns once the last one
//! has finished handling the event.
//!
//! ```text
//! notify(Suspend)
//!   ├─► listener[prio = i32::MAX].on_power_event(Suspend).await
//!   ├─► listener[prio = 10      ].on_power_event(Suspend).await
//!   └─► listener[prio = 0       ].on_power_event(Suspend).await
//! ```
//!
//! ## Rules
//! - Equal priorities run in registration order.
//! - The chain is snapshotted at the start of `notify`; listeners added or
//!   removed meanwhile take effect on the next event.
//! - After [`close`](PowerNotifier::close), registration fails with
//!   `RegisterError::Closed`; already registered listeners keep receiving.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::RegisterError;

/// Device power-state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerEvent {
    /// The device just woke (screen on / resumed).
    Active,
    /// The device is going to sleep.
    Suspend,
}

/// Subscriber of the power notifier.
#[async_trait]
pub trait PowerListener: Send + Sync + 'static {
    /// Handles one transition.
    async fn on_power_event(&self, event: PowerEvent);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Registration handle returned by [`PowerNotifier::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registration {
    id: ListenerId,
    priority: i32,
    listener: Arc<dyn PowerListener>,
}

/// Priority-ordered notification chain.
#[derive(Default)]
pub struct PowerNotifier {
    chain: RwLock<Vec<Registration>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

impl PowerNotifier {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `listener` after every registration of priority `>= priority`.
    pub fn register(
        &self,
        listener: Arc<dyn PowerListener>,
        priority: i32,
    ) -> Result<ListenerId, RegisterError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(RegisterError::Closed);
        }
        let mut chain = self.chain.write();
        if chain
            .iter()
            .any(|r| std::ptr::addr_eq(Arc::as_ptr(&r.listener), Arc::as_ptr(&listener)))
        {
            return Err(RegisterError::Duplicate);
        }

        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let at = chain.partition_point(|r| r.priority >= priority);
        chain.insert(
            at,
            Registration {
                id,
                priority,
                listener,
            },
        );
        Ok(id)
    }

    /// Removes a listener; returns `false` if it was not registered.
    pub fn unregister(&self, id: ListenerId) -> bool {
        let mut chain = self.chain.write();
        let before = chain.len();
        chain.retain(|r| r.id != id);
        chain.len() != before
    }

    /// Delivers `event` to every listener, highest priority first.
    pub async fn notify(&self, event: PowerEvent) {
        let listeners: Vec<Arc<dyn PowerListener>> = self
            .chain
            .read()
            .iter()
            .map(|r| Arc::clone(&r.listener))
            .collect();

        for listener in listeners {
            listener.on_power_event(event).await;
        }
    }

    /// Stops accepting registrations.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.chain.read().len()
    }

    /// True if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.chain.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct Tagged {
        tag: &'static str,
        log: Arc<Mutex<Vec<(&'static str, PowerEvent)>>>,
    }

    #[async_trait]
    impl PowerListener for Tagged {
        async fn on_power_event(&self, event: PowerEvent) {
            self.log.lock().push((self.tag, event));
        }
    }

    fn tagged(tag: &'static str, log: &Arc<Mutex<Vec<(&'static str, PowerEvent)>>>) -> Arc<Tagged> {
        Arc::new(Tagged {
            tag,
            log: Arc::clone(log),
        })
    }

    #[tokio::test]
    async fn test_priority_order_with_stable_ties() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let notifier = PowerNotifier::new();
        notifier.register(tagged("low", &log), 0).expect("register");
        notifier.register(tagged("mid-a", &log), 10).expect("register");
        notifier.register(tagged("top", &log), i32::MAX).expect("register");
        notifier.register(tagged("mid-b", &log), 10).expect("register");

        notifier.notify(PowerEvent::Active).await;

        let order: Vec<_> = log.lock().iter().map(|(tag, _)| *tag).collect();
        assert_eq!(order, vec!["top", "mid-a", "mid-b", "low"]);
    }

    #[tokio::test]
    async fn test_unregister_stops_delivery() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let notifier = PowerNotifier::new();
        let id = notifier.register(tagged("a", &log), 0).expect("register");

        assert!(notifier.unregister(id));
        assert!(!notifier.unregister(id));
        notifier.notify(PowerEvent::Suspend).await;

        assert!(log.lock().is_empty());
        assert!(notifier.is_empty());
    }

    #[test]
    fn test_registration_errors() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let notifier = PowerNotifier::new();
        let a = tagged("a", &log);
        notifier.register(a.clone(), 0).expect("register");
        assert_eq!(notifier.register(a, 5).err(), Some(RegisterError::Duplicate));

        notifier.close();
        assert_eq!(
            notifier.register(tagged("b", &log), 0).err(),
            Some(RegisterError::Closed)
        );
        assert_eq!(notifier.len(), 1);
    }
}
