//! # Power listener: turns wake/suspend notifications into job submissions.
//!
//! ```text
//! Active  ─► boost.submit()                            (duplicates coalesce in the slot)
//! Suspend ─► boost.flush()                             (a queued boost schedules its unboost first)
//!            unboost.cancel_sync() == Cancelled ?
//!              └─► unboost.submit() + unboost.flush()  (revert now, before returning)
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::events::{Bus, Event, EventKind};
use crate::power::{PowerEvent, PowerListener};
use crate::workqueue::{CancelOutcome, Work};

use super::phase::BoostState;

pub(crate) struct WakeListener {
    pub state: Arc<BoostState>,
    pub boost: Work,
    pub unboost: Work,
    pub bus: Bus,
}

#[async_trait]
impl PowerListener for WakeListener {
    async fn on_power_event(&self, event: PowerEvent) {
        if self.state.is_draining() {
            return;
        }

        match event {
            PowerEvent::Active => {
                let outcome = self.boost.submit();
                self.bus
                    .publish(Event::new(EventKind::WakeObserved).with_reason(outcome.as_label()));
            }
            PowerEvent::Suspend => {
                self.bus.publish(Event::new(EventKind::SuspendObserved));
                self.boost.flush().await;

                if self.unboost.cancel_sync().await == CancelOutcome::Cancelled {
                    self.bus.publish(
                        Event::new(EventKind::UnboostForced).with_work(self.unboost.name()),
                    );
                    self.unboost.submit();
                    self.unboost.flush().await;
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "wake_boost"
    }
}
