//! # LogWriter: simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//!
//! ## Example output
//! ```text
//! [wake] submit=queued
//! [boost-starting]
//! [boost-applied] cpu=0 min=2000000
//! [unboost-scheduled] delay_ms=3000 submit=queued
//! [suspend]
//! [unboost-forced]
//! [reverted] cpu=0 min=300000
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let reason = e.reason.as_deref().unwrap_or("-");
        let work = e.work.as_deref().unwrap_or("unknown");
        let cpu = e.cpu.map_or_else(|| "-".to_string(), |v| v.to_string());
        let freq = e.freq_khz.map_or_else(|| "-".to_string(), |v| v.to_string());
        let delay = e.delay_ms.map_or_else(|| "-".to_string(), |v| v.to_string());
        match e.kind {
            EventKind::WakeObserved => println!("[wake] submit={reason}"),
            EventKind::SuspendObserved => println!("[suspend]"),
            EventKind::BoostStarting => println!("[boost-starting]"),
            EventKind::BoostApplied => {
                println!("[boost-applied] cpu={cpu} min={freq}");
            }
            EventKind::UnboostScheduled => {
                println!("[unboost-scheduled] delay_ms={delay} submit={reason}");
            }
            EventKind::UnboostForced => println!("[unboost-forced]"),
            EventKind::UnboostStarting => println!("[unboost-starting]"),
            EventKind::Reverted => {
                println!("[reverted] cpu={cpu} min={freq}");
            }
            EventKind::RefreshCompleted => println!("[refresh] {reason}"),
            EventKind::WorkPanicked => println!("[work-panicked] work={work} info={reason}"),
            EventKind::ControllerStarted => println!("[started] queue={work}"),
            EventKind::ControllerStopping => println!("[stopping]"),
            EventKind::ControllerStopped => println!("[stopped]"),
            EventKind::SubscriberPanicked => {
                println!("[subscriber-panicked] subscriber={work} info={reason}");
            }
            EventKind::SubscriberOverflow => {
                println!("[subscriber-overflow] subscriber={work} reason={reason}");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
