//! # Boost phase and the state shared by every controller context.
//!
//! ```text
//!            begin_boost            request_revert          consume_revert
//!   Idle ───────────────► Boosting ───────────────► PendingRevert ─────────────► Idle
//!                           │  ▲
//!                           └──┘ begin_boost (repeated wake)
//! ```
//!
//! Every transition is a single atomic operation (`compare_exchange` or
//! `store` from a known predecessor); there is no read-then-write window.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Current stage of the boost cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    /// No override; policies pass through.
    Idle = 0,
    /// Every recomputation raises the minimum to the maximum.
    Boosting = 1,
    /// The next recomputation restores the hardware minimum.
    PendingRevert = 2,
}

impl Phase {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Phase::Boosting,
            2 => Phase::PendingRevert,
            _ => Phase::Idle,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Idle => "idle",
            Phase::Boosting => "boosting",
            Phase::PendingRevert => "pending_revert",
        };
        f.write_str(s)
    }
}

/// Phase plus the teardown flag, shared by the jobs, the listener and the
/// policy interceptor.
#[derive(Debug, Default)]
pub(crate) struct BoostState {
    phase: AtomicU8,
    draining: AtomicBool,
}

impl BoostState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// `Idle | Boosting → Boosting`. Fails while a revert is pending or
    /// teardown has begun.
    pub fn begin_boost(&self) -> bool {
        if self.is_draining() {
            return false;
        }
        self.phase
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |p| {
                (p != Phase::PendingRevert as u8).then_some(Phase::Boosting as u8)
            })
            .is_ok()
    }

    /// `Boosting → PendingRevert`.
    pub fn request_revert(&self) -> bool {
        self.transition(Phase::Boosting, Phase::PendingRevert)
    }

    /// `PendingRevert → Idle`; only the first caller of a batch wins.
    pub fn consume_revert(&self) -> bool {
        self.transition(Phase::PendingRevert, Phase::Idle)
    }

    fn transition(&self, from: Phase, to: Phase) -> bool {
        self.phase
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn begin_drain(&self) {
        self.draining.store(true, Ordering::Release);
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }
}
