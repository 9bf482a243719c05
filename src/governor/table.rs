//! # PolicyTable: in-process frequency governor.
//!
//! Owns the per-core policies, the online-core set and the hook chain.
//!
//! ## Locking
//! ```text
//! online: RwLock<BTreeSet<CpuId>>   read  → for_each_online (whole iteration)
//!                                   write → set_online
//! cores:  Mutex<BTreeMap<..>>       held across one recomputation, hooks included
//! hooks:  RwLock<Vec<..>>           snapshotted before a recomputation
//! ```
//! `update_policy` never touches `online`, so it may be called from inside
//! `for_each_online`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};

use crate::error::RegisterError;

use super::policy::{CpuId, CpuInfo, Governor, HookId, Policy, PolicyHook, PolicyReason};

/// Per-core bookkeeping.
struct CoreEntry {
    cpuinfo: CpuInfo,
    /// User-requested limits; every recomputation starts from these.
    user_min: u32,
    user_max: u32,
    current: Policy,
}

/// In-process governor implementing [`Governor`].
///
/// ## Example
/// ```rust
/// use wakeboost::{CpuInfo, PolicyTable};
///
/// let table = PolicyTable::new();
/// table.add_cpu(0, CpuInfo { min_freq: 300_000, max_freq: 2_000_000 });
///
/// let policy = table.policy(0).unwrap();
/// assert_eq!(policy.min, 300_000);
/// assert_eq!(policy.max, 2_000_000);
/// ```
#[derive(Default)]
pub struct PolicyTable {
    online: RwLock<BTreeSet<CpuId>>,
    cores: Mutex<BTreeMap<CpuId, CoreEntry>>,
    hooks: RwLock<Vec<(HookId, Arc<dyn PolicyHook>)>>,
    next_hook: AtomicU64,
    closed: AtomicBool,
}

impl PolicyTable {
    /// Creates an empty governor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an online core whose user limits span the full hardware range.
    ///
    /// Re-adding an existing core resets its limits.
    pub fn add_cpu(&self, cpu: CpuId, cpuinfo: CpuInfo) {
        let policy = Policy {
            cpu,
            min: cpuinfo.min_freq,
            max: cpuinfo.max_freq,
            cpuinfo,
        };
        self.cores.lock().insert(
            cpu,
            CoreEntry {
                cpuinfo,
                user_min: cpuinfo.min_freq,
                user_max: cpuinfo.max_freq,
                current: policy,
            },
        );
        self.online.write().insert(cpu);
        self.update_policy(cpu);
    }

    /// Brings a known core online or offline.
    ///
    /// Returns `false` for unknown cores. A core coming online is recomputed.
    pub fn set_online(&self, cpu: CpuId, online: bool) -> bool {
        if !self.cores.lock().contains_key(&cpu) {
            return false;
        }
        let changed = {
            let mut set = self.online.write();
            if online { set.insert(cpu) } else { set.remove(&cpu) }
        };
        if changed && online {
            self.update_policy(cpu);
        }
        true
    }

    /// Sets the user limits of a core and recomputes it.
    ///
    /// Limits are clamped to the hardware range on the next recomputation.
    pub fn set_user_limits(&self, cpu: CpuId, min: u32, max: u32) -> bool {
        {
            let mut cores = self.cores.lock();
            let Some(entry) = cores.get_mut(&cpu) else {
                return false;
            };
            entry.user_min = min;
            entry.user_max = max;
        }
        self.update_policy(cpu);
        true
    }

    /// Last committed policy of `cpu`.
    pub fn policy(&self, cpu: CpuId) -> Option<Policy> {
        self.cores.lock().get(&cpu).map(|e| e.current)
    }

    /// Online cores, ascending.
    pub fn online(&self) -> Vec<CpuId> {
        self.online.read().iter().copied().collect()
    }

    /// Number of registered hooks.
    pub fn hook_count(&self) -> usize {
        self.hooks.read().len()
    }

    /// Stops accepting hook registrations. Existing hooks keep running.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

impl Governor for PolicyTable {
    fn register_hook(&self, hook: Arc<dyn PolicyHook>) -> Result<HookId, RegisterError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(RegisterError::Closed);
        }
        let mut hooks = self.hooks.write();
        if hooks
            .iter()
            .any(|(_, h)| std::ptr::addr_eq(Arc::as_ptr(h), Arc::as_ptr(&hook)))
        {
            return Err(RegisterError::Duplicate);
        }
        let id = HookId(self.next_hook.fetch_add(1, Ordering::Relaxed));
        hooks.push((id, hook));
        Ok(id)
    }

    fn unregister_hook(&self, id: HookId) -> bool {
        let mut hooks = self.hooks.write();
        let before = hooks.len();
        hooks.retain(|(hid, _)| *hid != id);
        hooks.len() != before
    }

    fn for_each_online(&self, f: &mut dyn FnMut(CpuId)) {
        let online = self.online.read();
        for &cpu in online.iter() {
            f(cpu);
        }
    }

    fn update_policy(&self, cpu: CpuId) {
        let hooks: Vec<Arc<dyn PolicyHook>> =
            self.hooks.read().iter().map(|(_, h)| Arc::clone(h)).collect();

        let mut cores = self.cores.lock();
        let Some(entry) = cores.get_mut(&cpu) else {
            return;
        };
        let info = entry.cpuinfo;

        let mut next = Policy {
            cpu,
            min: entry.user_min,
            max: entry.user_max,
            cpuinfo: info,
        };
        for hook in &hooks {
            hook.on_policy(PolicyReason::Adjust, &mut next);
        }

        next.max = next.max.min(info.max_freq).max(info.min_freq);
        next.min = next.min.max(info.min_freq).min(next.max);
        entry.current = next;

        for hook in &hooks {
            let mut committed = next;
            hook.on_policy(PolicyReason::Notify, &mut committed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::governor::HookResult;

    const INFO: CpuInfo = CpuInfo {
        min_freq: 300,
        max_freq: 2000,
    };

    /// Forces min to a fixed value during Adjust, records every call.
    struct FixedMin {
        min: u32,
        calls: Mutex<Vec<(PolicyReason, CpuId, u32)>>,
    }

    impl FixedMin {
        fn new(min: u32) -> Arc<Self> {
            Arc::new(Self {
                min,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    impl PolicyHook for FixedMin {
        fn on_policy(&self, reason: PolicyReason, policy: &mut Policy) -> HookResult {
            self.calls.lock().push((reason, policy.cpu, policy.min));
            if reason == PolicyReason::Adjust {
                policy.min = self.min;
                return HookResult::Modified;
            }
            HookResult::Unchanged
        }
    }

    #[test]
    fn test_hook_runs_adjust_then_notify() {
        let table = PolicyTable::new();
        table.add_cpu(0, INFO);
        let hook = FixedMin::new(1500);
        table.register_hook(hook.clone()).expect("register");

        table.update_policy(0);

        assert_eq!(table.policy(0).map(|p| p.min), Some(1500));
        assert_eq!(
            *hook.calls.lock(),
            vec![(PolicyReason::Adjust, 0, 300), (PolicyReason::Notify, 0, 1500)]
        );
    }

    #[test]
    fn test_recompute_restarts_from_user_limits() {
        let table = PolicyTable::new();
        table.add_cpu(0, INFO);
        let id = table.register_hook(FixedMin::new(1500)).expect("register");
        table.update_policy(0);
        assert_eq!(table.policy(0).map(|p| p.min), Some(1500));

        assert!(table.unregister_hook(id));
        assert!(!table.unregister_hook(id));
        table.update_policy(0);
        assert_eq!(table.policy(0).map(|p| p.min), Some(300));
    }

    #[test]
    fn test_bounds_are_clamped_to_hardware() {
        let table = PolicyTable::new();
        table.add_cpu(0, INFO);
        table.register_hook(FixedMin::new(9000)).expect("register");

        table.set_user_limits(0, 100, 1200);

        let p = table.policy(0).expect("policy");
        assert_eq!(p.max, 1200);
        assert_eq!(p.min, 1200);
    }

    #[test]
    fn test_online_iteration_is_ascending_and_skips_offline() {
        let table = PolicyTable::new();
        for cpu in [3, 1, 2, 0] {
            table.add_cpu(cpu, INFO);
        }
        assert!(table.set_online(2, false));
        assert!(!table.set_online(7, true));

        let mut seen = Vec::new();
        table.for_each_online(&mut |cpu| seen.push(cpu));
        assert_eq!(seen, vec![0, 1, 3]);
        assert_eq!(table.online(), vec![0, 1, 3]);
    }

    #[test]
    fn test_update_inside_iteration_does_not_deadlock() {
        let table = PolicyTable::new();
        table.add_cpu(0, INFO);
        table.add_cpu(1, INFO);
        table.register_hook(FixedMin::new(800)).expect("register");

        table.for_each_online(&mut |cpu| table.update_policy(cpu));

        assert_eq!(table.policy(1).map(|p| p.min), Some(800));
    }

    #[test]
    fn test_registration_errors() {
        let table = PolicyTable::new();
        let hook = FixedMin::new(500);
        table.register_hook(hook.clone()).expect("register");
        assert_eq!(
            table.register_hook(hook.clone()).err(),
            Some(RegisterError::Duplicate)
        );

        table.close();
        assert_eq!(
            table.register_hook(FixedMin::new(600)).err(),
            Some(RegisterError::Closed)
        );
        assert_eq!(table.hook_count(), 1);
    }
}
