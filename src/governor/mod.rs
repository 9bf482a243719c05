//! Frequency-governor interface and an in-process implementation.
//!
//! The governor owns one [`Policy`] per core and recomputes it on demand.
//! Every recomputation runs the registered [`PolicyHook`]s twice:
//!
//! ```text
//! update_policy(cpu)
//!   ├─► start from user limits (scaling_min / scaling_max)
//!   ├─► hooks.on_policy(Adjust, &mut policy)   ← bounds may be mutated here
//!   ├─► clamp to hardware range, commit
//!   └─► hooks.on_policy(Notify, &mut copy)     ← informational only
//! ```
//!
//! ## Contents
//! - [`Policy`], [`CpuInfo`], [`PolicyReason`], [`HookResult`] data model
//! - [`PolicyHook`], [`Governor`] traits (the seams the controller depends on)
//! - [`PolicyTable`] a complete in-process governor

mod policy;
mod table;

pub use policy::{CpuId, CpuInfo, Governor, HookId, HookResult, Policy, PolicyHook, PolicyReason};
pub use table::PolicyTable;
