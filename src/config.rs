//! # Controller configuration.
//!
//! Provides [`Config`], the plumbing settings of the controller runtime, and
//! [`BOOST_DURATION`], the fixed length of the boost window.
//!
//! The window length is a `const`, not a field.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by [`Config::bus_capacity_clamped`]

use std::borrow::Cow;
use std::time::Duration;

/// Length of the boost window started by a wake event.
pub const BOOST_DURATION: Duration = Duration::from_millis(3000);

/// Runtime configuration for [`WakeBoost`](crate::WakeBoost).
///
/// ## Field semantics
/// - `queue_name`: name of the dedicated work queue (shows up in events/errors)
/// - `priority`: priority of the power listener among all notifier subscribers
/// - `bus_capacity`: event bus ring buffer size (min 1)
#[derive(Clone, Debug)]
pub struct Config {
    /// Name of the work queue running the boost and unboost jobs.
    pub queue_name: Cow<'static, str>,

    /// Priority of the wake/suspend listener on the power notifier.
    ///
    /// Higher runs first. Defaults to `i32::MAX` so frequency policy is
    /// corrected before other wake-time consumers observe the device.
    pub priority: i32,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages skip
    /// older items.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `queue_name = "wake_boost_wq"`
    /// - `priority = i32::MAX` (first in the notifier chain)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            queue_name: Cow::Borrowed("wake_boost_wq"),
            priority: i32::MAX,
            bus_capacity: 1024,
        }
    }
}
