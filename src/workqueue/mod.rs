//! Execution substrate: an ordered work queue with single-instance task slots.
//!
//! ## Contents
//! - [`WorkQueue`] dedicated, ordered, cancellable pool bound to a tokio runtime
//! - [`Work`] one task slot: at most one outstanding instance, optional delay
//! - [`SubmitOutcome`], [`CancelOutcome`] definite results of submit/cancel
//!
//! ## Slot lifecycle
//! ```text
//!            submit_after(d)               delay elapsed + queue lock
//!   Idle ─────────────────────► Pending ─────────────────────────────► Running
//!    ▲                            │   │                                   │
//!    │       cancel_sync()        │   │ submit_after(..)                  │
//!    ├────────────────────────────┘   └─► AlreadyPending (no-op)          │
//!    │                                                                    │
//!    └──────────────────────────── job finished (or panicked) ◄───────────┘
//! ```
//!
//! A slot may be Pending and Running at the same time (resubmitted while its
//! previous instance executes); the new instance runs after the old one.

mod queue;
mod work;

pub use queue::WorkQueue;
pub use work::{CancelOutcome, SubmitOutcome, Work};
