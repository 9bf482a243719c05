//! # Boost and unboost jobs.
//!
//! Both run on the controller's ordered work queue, so they never overlap.
//!
//! ```text
//! wake_boost:   phase = Boosting → refresh (override applied) → submit unboost(+BOOST_DURATION)
//! wake_unboost: phase = PendingRevert → refresh (first core restores, phase = Idle)
//! ```

use std::sync::Arc;

use crate::config::BOOST_DURATION;
use crate::events::{Bus, Event, EventKind};
use crate::governor::Governor;
use crate::workqueue::Work;

use super::phase::BoostState;
use super::refresh::refresh_online_policies;

/// Everything a job needs; shared by both jobs and the controller.
pub(crate) struct JobContext {
    pub state: Arc<BoostState>,
    pub governor: Arc<dyn Governor>,
    pub bus: Bus,
}

impl JobContext {
    fn refresh(&self) {
        let cpus = refresh_online_policies(&*self.governor);
        self.bus
            .publish(Event::new(EventKind::RefreshCompleted).with_reason(format!("cpus={cpus}")));
    }
}

pub(crate) async fn wake_boost(ctx: Arc<JobContext>, unboost: Work) {
    if !ctx.state.begin_boost() {
        return;
    }
    ctx.bus.publish(Event::new(EventKind::BoostStarting));
    ctx.refresh();

    // A pending unboost keeps its deadline: the window stays anchored to the first wake.
    let outcome = unboost.submit_after(BOOST_DURATION);
    ctx.bus.publish(
        Event::new(EventKind::UnboostScheduled)
            .with_delay(BOOST_DURATION)
            .with_reason(outcome.as_label()),
    );
}

pub(crate) async fn wake_unboost(ctx: Arc<JobContext>) {
    revert(&ctx);
}

/// `Boosting → PendingRevert → Idle`, refreshing every online core.
///
/// Returns `false` when no boost was in effect.
pub(crate) fn revert(ctx: &JobContext) -> bool {
    if !ctx.state.request_revert() {
        return false;
    }
    ctx.bus.publish(Event::new(EventKind::UnboostStarting));
    ctx.refresh();
    // No online core was there to consume it.
    ctx.state.consume_revert();
    true
}
