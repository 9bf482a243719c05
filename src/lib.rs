//! # wakeboost
//!
//! **wakeboost** raises every online core's frequency floor to its ceiling
//! for a short window after the device wakes, then hands the policy back to
//! the governor untouched.
//!
//! The controller owns nothing but a phase flag: it never writes frequencies
//! directly. Instead it sits in the governor's policy-recomputation chain and
//! nudges each recomputation while a boost is in effect.
//!
//! ## Architecture
//! ```text
//!  ┌───────────────┐  Active / Suspend   ┌──────────────┐
//!  │ PowerNotifier │ ──────────────────► │ WakeListener │
//!  └───────────────┘  (priority order)   └──────┬───────┘
//!                                               │ submit / cancel_sync / flush
//!                                               ▼
//!                         ┌──────────────────────────────────────────┐
//!                         │ WorkQueue (ordered, one job at a time)   │
//!                         │   wake_boost ──submit_after(3s)──►       │
//!                         │   wake_unboost                           │
//!                         └───────────────────┬──────────────────────┘
//!                                             │ refresh: update_policy(cpu)
//!                                             ▼   for every online core
//!  ┌───────────────┐  Adjust(policy)   ┌───────────────────┐
//!  │   Governor    │ ────────────────► │ PolicyInterceptor │  min = max (Boosting)
//!  │ (PolicyTable) │ ◄──────────────── │                   │  min = hw min (revert)
//!  └───────────────┘   modified policy └───────────────────┘
//!
//!  every component ──publish──► Bus ──► fan-out ──► SubscriberSet ──► Subscribe::on_event
//! ```
//!
//! ### Boost cycle
//! ```text
//! Active  ─► boost job:   Idle → Boosting, refresh, schedule unboost (+BOOST_DURATION)
//! timer   ─► unboost job: Boosting → PendingRevert, refresh, → Idle
//! Suspend ─► cancel the pending unboost and run it now
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types                                 |
//! |-------------------|--------------------------------------------------------------|-------------------------------------------|
//! | **Controller**    | Start/stop, phase inspection, event stream                   | [`WakeBoost`], [`Phase`]                  |
//! | **Work queue**    | Coalescing task slots on an ordered tokio-backed queue       | [`WorkQueue`], [`Work`]                   |
//! | **Governor**      | Hook-chain policy recomputation; in-process implementation   | [`Governor`], [`PolicyTable`]             |
//! | **Power**         | Priority-ordered wake/suspend notification chain             | [`PowerNotifier`], [`PowerListener`]      |
//! | **Subscriber API**| Plug custom observers into the event stream                  | [`Subscribe`]                             |
//! | **Errors**        | Typed initialization and registration failures               | [`InitError`], [`RegisterError`]          |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use wakeboost::{Config, CpuInfo, PolicyTable, PowerEvent, PowerNotifier, WakeBoost};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), wakeboost::InitError> {
//!     let table = Arc::new(PolicyTable::new());
//!     for cpu in 0..4 {
//!         table.add_cpu(cpu, CpuInfo { min_freq: 300_000, max_freq: 2_000_000 });
//!     }
//!     let notifier = Arc::new(PowerNotifier::new());
//!
//!     let boost = WakeBoost::builder(Config::default(), table.clone(), notifier.clone()).start()?;
//!
//!     notifier.notify(PowerEvent::Active).await;
//!     tokio::time::sleep(std::time::Duration::from_millis(10)).await;
//!     assert_eq!(table.policy(0).map(|p| p.min), Some(2_000_000));
//!
//!     boost.shutdown().await;
//!     Ok(())
//! }
//! ```

mod boost;
mod config;
mod error;
mod events;
mod governor;
mod power;
mod subscribers;
mod workqueue;

// ---- Public re-exports ----

pub use boost::{Phase, WakeBoost, WakeBoostBuilder};
pub use config::{BOOST_DURATION, Config};
pub use error::{InitError, RegisterError};
pub use events::{Bus, Event, EventKind};
pub use governor::{
    CpuId, CpuInfo, Governor, HookId, HookResult, Policy, PolicyHook, PolicyReason, PolicyTable,
};
pub use power::{ListenerId, PowerEvent, PowerListener, PowerNotifier};
pub use subscribers::{Subscribe, SubscriberSet};
pub use workqueue::{CancelOutcome, SubmitOutcome, Work, WorkQueue};

// Optional: expose a simple built-in logger subscriber (demo/reference).
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
