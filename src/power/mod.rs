//! Power-state publisher: wake/suspend notifications.
//!
//! ## Contents
//! - [`PowerEvent`] the two states a listener can observe
//! - [`PowerListener`] async subscriber contract
//! - [`PowerNotifier`] priority-ordered notification chain

mod notifier;

pub use notifier::{ListenerId, PowerEvent, PowerListener, PowerNotifier};
