//! # Wake boost: the controller core.
//!
//! ```text
//!  PowerNotifier ──Active──► WakeListener ──submit──► [wake_boost] ─┐
//!                ──Suspend─►      │                                 │ refresh
//!                                 └─cancel/force──► [wake_unboost] ─┤ (every online core)
//!                                                                   ▼
//!  Governor.update_policy(cpu) ──Adjust──► PolicyInterceptor: min = max | restore
//! ```
//!
//! - `phase`: `Idle → Boosting → PendingRevert → Idle`
//! - `interceptor`: the per-core policy override
//! - `jobs`: boost and unboost bodies, run on one ordered work queue
//! - `listener`: power-event reactions
//! - `controller`: [`WakeBoost`] lifecycle

mod controller;
mod interceptor;
mod jobs;
mod listener;
mod phase;
mod refresh;

pub use controller::{WakeBoost, WakeBoostBuilder};
pub use phase::Phase;
