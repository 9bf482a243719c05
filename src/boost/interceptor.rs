//! # Policy interceptor: writes the boost override into each core's policy.
//!
//! Invoked by the governor, inline, once per core per recomputation. Only the
//! `Adjust` reason is acted upon:
//!
//! | phase           | effect on `policy.min`                 | phase after |
//! |-----------------|----------------------------------------|-------------|
//! | `Idle`          | none                                   | `Idle`      |
//! | `Boosting`      | `= policy.max` (every core, every time)| `Boosting`  |
//! | `PendingRevert` | `= cpuinfo.min_freq` (first core only) | `Idle`      |
//!
//! The first core of a refresh batch consumes the revert; later cores observe
//! `Idle` and keep the minimum the governor computed from its user limits,
//! which already excludes the override. Core order is therefore observable.

use std::sync::Arc;

use crate::events::{Bus, Event, EventKind};
use crate::governor::{HookResult, Policy, PolicyHook, PolicyReason};

use super::phase::{BoostState, Phase};

pub(crate) struct PolicyInterceptor {
    state: Arc<BoostState>,
    bus: Bus,
}

impl PolicyInterceptor {
    pub fn new(state: Arc<BoostState>, bus: Bus) -> Self {
        Self { state, bus }
    }
}

impl PolicyHook for PolicyInterceptor {
    fn on_policy(&self, reason: PolicyReason, policy: &mut Policy) -> HookResult {
        if reason != PolicyReason::Adjust {
            return HookResult::Unchanged;
        }

        match self.state.phase() {
            Phase::PendingRevert => {
                if !self.state.consume_revert() {
                    return HookResult::Unchanged;
                }
                policy.min = policy.cpuinfo.min_freq;
                self.bus.publish(
                    Event::new(EventKind::Reverted)
                        .with_cpu(policy.cpu)
                        .with_freq(policy.min),
                );
                HookResult::Modified
            }
            Phase::Boosting if !self.state.is_draining() => {
                policy.min = policy.max;
                self.bus.publish(
                    Event::new(EventKind::BoostApplied)
                        .with_cpu(policy.cpu)
                        .with_freq(policy.min),
                );
                HookResult::Modified
            }
            _ => HookResult::Unchanged,
        }
    }

    fn name(&self) -> &'static str {
        "wake_boost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::governor::CpuInfo;

    fn policy(cpu: u32, min: u32) -> Policy {
        Policy {
            cpu,
            min,
            max: 2000,
            cpuinfo: CpuInfo {
                min_freq: 300,
                max_freq: 2000,
            },
        }
    }

    fn interceptor() -> (PolicyInterceptor, Arc<BoostState>) {
        let state = Arc::new(BoostState::new());
        (PolicyInterceptor::new(Arc::clone(&state), Bus::new(16)), state)
    }

    #[test]
    fn test_idle_passes_through() {
        let (hook, _) = interceptor();
        let mut p = policy(0, 700);
        assert_eq!(hook.on_policy(PolicyReason::Adjust, &mut p), HookResult::Unchanged);
        assert_eq!(p.min, 700);
    }

    #[test]
    fn test_non_adjust_reason_is_ignored() {
        let (hook, state) = interceptor();
        state.begin_boost();
        let mut p = policy(0, 300);
        assert_eq!(hook.on_policy(PolicyReason::Notify, &mut p), HookResult::Unchanged);
        assert_eq!(p.min, 300);
    }

    #[test]
    fn test_boosting_raises_every_core() {
        let (hook, state) = interceptor();
        state.begin_boost();
        for cpu in 0..4 {
            let mut p = policy(cpu, 300);
            assert_eq!(hook.on_policy(PolicyReason::Adjust, &mut p), HookResult::Modified);
            assert_eq!(p.min, 2000);
        }
        assert_eq!(state.phase(), Phase::Boosting);
    }

    #[test]
    fn test_revert_is_consumed_by_first_core() {
        let (hook, state) = interceptor();
        state.begin_boost();
        state.request_revert();

        let mut first = policy(0, 2000);
        assert_eq!(hook.on_policy(PolicyReason::Adjust, &mut first), HookResult::Modified);
        assert_eq!(first.min, 300);
        assert_eq!(state.phase(), Phase::Idle);

        let mut second = policy(1, 650);
        assert_eq!(hook.on_policy(PolicyReason::Adjust, &mut second), HookResult::Unchanged);
        assert_eq!(second.min, 650);
    }

    #[test]
    fn test_draining_stops_boost_override() {
        let (hook, state) = interceptor();
        state.begin_boost();
        state.begin_drain();
        let mut p = policy(0, 300);
        assert_eq!(hook.on_policy(PolicyReason::Adjust, &mut p), HookResult::Unchanged);
        assert_eq!(p.min, 300);
    }
}
