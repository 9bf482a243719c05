//! Error types used by the wake-boost controller and its collaborators.
//!
//! This module defines two error enums:
//!
//! - [`InitError`]: failures while bringing the controller up.
//! - [`RegisterError`]: failures while subscribing to a publisher (power
//!   notifier or governor hook chain).
//!
//! Both provide `as_label` for logs/metrics. There are no steady-state
//! errors: once started, the boost and unboost jobs and the policy
//! interceptor always succeed.

use thiserror::Error;

/// # Errors produced by a subscription attempt.
///
/// Returned by [`PowerNotifier::register`](crate::PowerNotifier::register)
/// and [`Governor::register_hook`](crate::Governor::register_hook).
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterError {
    /// The publisher no longer accepts subscribers.
    #[error("publisher closed")]
    Closed,

    /// The same subscriber is already registered.
    #[error("already registered")]
    Duplicate,
}

impl RegisterError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RegisterError::Closed => "register_closed",
            RegisterError::Duplicate => "register_duplicate",
        }
    }
}

/// # Errors produced while starting the controller.
///
/// Initialization is all-or-nothing: when any of these is returned, every
/// resource acquired before the failure has already been released.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum InitError {
    /// The work queue could not be allocated (no tokio runtime reachable).
    #[error("work queue {queue:?} unavailable: no tokio runtime")]
    NoRuntime {
        /// Name of the queue that failed to come up.
        queue: String,
    },

    /// The policy interceptor could not be attached to the governor.
    #[error("policy hook registration failed: {0}")]
    HookRegistration(#[source] RegisterError),

    /// The power-state listener could not be attached to the notifier.
    #[error("power listener registration failed: {0}")]
    ListenerRegistration(#[source] RegisterError),
}

impl InitError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use wakeboost::{InitError, RegisterError};
    ///
    /// let err = InitError::HookRegistration(RegisterError::Closed);
    /// assert_eq!(err.as_label(), "init_hook_registration");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            InitError::NoRuntime { .. } => "init_no_runtime",
            InitError::HookRegistration(_) => "init_hook_registration",
            InitError::ListenerRegistration(_) => "init_listener_registration",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            InitError::NoRuntime { queue } => format!("no runtime for queue={queue}"),
            InitError::HookRegistration(e) => format!("hook: {}", e.as_label()),
            InitError::ListenerRegistration(e) => format!("listener: {}", e.as_label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_labels_are_stable() {
        let err = InitError::NoRuntime {
            queue: "wake_boost_wq".into(),
        };
        assert_eq!(err.as_label(), "init_no_runtime");
        assert_eq!(err.as_message(), "no runtime for queue=wake_boost_wq");
        assert_eq!(RegisterError::Duplicate.as_label(), "register_duplicate");
    }

    #[test]
    fn test_registration_errors_keep_source() {
        let err = InitError::ListenerRegistration(RegisterError::Closed);
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("publisher closed"));
        assert_eq!(err.as_message(), "listener: register_closed");
    }
}
