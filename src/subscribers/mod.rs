//! # Event subscribers for the wake-boost controller.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! fan-out used to deliver controller events from the [`Bus`](crate::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   publisher ── publish(Event) ──► Bus ──► fan-out ──► SubscriberSet::emit(&Event)
//!                                                          │
//!                                                ┌─────────┼─────────┐
//!                                                ▼         ▼         ▼
//!                                            LogWriter  Metrics   Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use wakeboost::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct BoostCounter;
//!
//! #[async_trait]
//! impl Subscribe for BoostCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::BoostStarting {
//!             // increment boost counter
//!         }
//!     }
//! }
//! ```

mod embedded;
mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
pub(crate) use subscriber_set::panic_message;
