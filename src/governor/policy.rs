//! # Governor data model and traits.

use std::sync::Arc;

use crate::error::RegisterError;

/// Logical core index.
pub type CpuId = u32;

/// Hardware-reported frequency range of a core (kHz). Read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuInfo {
    /// True hardware minimum.
    pub min_freq: u32,
    /// True hardware maximum.
    pub max_freq: u32,
}

/// Effective frequency constraints of one core (kHz).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    /// Core this policy belongs to.
    pub cpu: CpuId,
    /// Current minimum.
    pub min: u32,
    /// Current maximum.
    pub max: u32,
    /// Hardware range.
    pub cpuinfo: CpuInfo,
}

/// Why a hook is being invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyReason {
    /// Constraint-adjustment phase: `min`/`max` may be mutated.
    Adjust,
    /// The policy was committed; changes are ignored.
    Notify,
}

/// What a hook did with the policy it was handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookResult {
    /// Pass-through.
    Unchanged,
    /// The hook rewrote at least one bound.
    Modified,
}

/// Registration handle returned by [`Governor::register_hook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(pub(crate) u64);

/// Callback invoked by the governor on every policy recomputation.
///
/// ## Contract
/// - Runs synchronously, inline, while the governor holds its own locks:
///   it must never block, sleep or call back into the governor.
/// - Invoked once per core per recomputation, for any reason the governor has
///   to recompute (not only on behalf of the hook's owner).
pub trait PolicyHook: Send + Sync + 'static {
    /// Inspect or adjust `policy`.
    fn on_policy(&self, reason: PolicyReason, policy: &mut Policy) -> HookResult;

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// The frequency-governor operations the controller consumes.
pub trait Governor: Send + Sync + 'static {
    /// Adds `hook` to the recomputation chain.
    fn register_hook(&self, hook: Arc<dyn PolicyHook>) -> Result<HookId, RegisterError>;

    /// Removes a hook; returns `false` if it was not registered.
    fn unregister_hook(&self, id: HookId) -> bool;

    /// Calls `f` for every online core in ascending order.
    ///
    /// The online set cannot change until this returns.
    fn for_each_online(&self, f: &mut dyn FnMut(CpuId));

    /// Recomputes the policy of `cpu` now. Unknown cores are ignored.
    fn update_policy(&self, cpu: CpuId);
}
