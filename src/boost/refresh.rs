//! Policy refresh trigger.

use crate::governor::Governor;

/// Recomputes the policy of every online core, ascending, while the online
/// set is held stable. Returns the number of cores visited.
pub(crate) fn refresh_online_policies(governor: &dyn Governor) -> usize {
    let mut cpus = 0;
    governor.for_each_online(&mut |cpu| {
        governor.update_policy(cpu);
        cpus += 1;
    });
    cpus
}
