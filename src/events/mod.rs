//! Controller events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the power listener, the boost and
//! unboost jobs, the policy interceptor and the controller lifecycle.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `WakeListener`, boost/unboost jobs, `PolicyInterceptor`,
//!   `Work` (panics), `WakeBoost` (start/stop), `SubscriberSet` (overflow/panic).
//! - **Consumers**: the controller fan-out (forwards to `SubscriberSet`) and any
//!   receiver obtained through `WakeBoost::subscribe`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
