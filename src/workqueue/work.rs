//! # Work: a single-instance, delayable task slot.
//!
//! A [`Work`] wraps one job closure. Submitting it spawns an *instance* on the
//! owning [`WorkQueue`](super::WorkQueue); the slot guarantees that at most one
//! instance is outstanding (pending) at any time, and that instances of the
//! same slot never run concurrently.
//!
//! ## Flow of one instance
//! ```text
//! submit_after(delay)
//!   ├─► slot.pending = Some(id)            (AlreadyPending if one exists)
//!   └─► spawn execute(id):
//!         ├─► sleep(delay)                  (cancellable)
//!         ├─► acquire queue turn            (cancellable; queue is ordered)
//!         ├─► claim: pending.id == id ?     (lost claim → exit)
//!         │      pending = None, running = true
//!         ├─► job().await                   (panic → WorkPanicked event)
//!         └─► running = false, notify settled  (on drop, also when dropped mid-run)
//! ```
//!
//! ## Rules
//! - The claim under the slot lock is the single point where an instance
//!   becomes unstoppable; `cancel_sync` either wins it (instance never runs)
//!   or waits for the run to finish.
//! - `cancel_sync` and `flush` must not be awaited from a job running on the
//!   same queue (the queue is ordered; that would wait on itself).

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::{FutureExt, future::BoxFuture};
use parking_lot::Mutex;
use tokio::{sync::watch, time};
use tokio_util::sync::CancellationToken;

use crate::events::{Event, EventKind};
use crate::subscribers::panic_message;

use super::queue::QueueShared;

type Job = Box<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Result of [`Work::submit_after`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A new instance was queued.
    Queued,
    /// An instance was already pending; nothing changed (its delay is kept).
    AlreadyPending,
    /// The queue is closed.
    Rejected,
}

impl SubmitOutcome {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SubmitOutcome::Queued => "queued",
            SubmitOutcome::AlreadyPending => "already_pending",
            SubmitOutcome::Rejected => "rejected",
        }
    }
}

/// Result of [`Work::cancel_sync`].
///
/// On return, in every case, no instance of the slot is executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Nothing was pending or running.
    NotQueued,
    /// A pending instance was cancelled before it ran.
    Cancelled,
    /// Nothing was pending, but an instance was running; it ran to completion.
    Completed,
}

struct Pending {
    id: u64,
    cancel: CancellationToken,
}

#[derive(Default)]
struct SlotState {
    pending: Option<Pending>,
    running: bool,
    next_id: u64,
}

struct WorkInner {
    name: Arc<str>,
    queue: Arc<QueueShared>,
    job: Job,
    slot: Mutex<SlotState>,
    /// Bumped whenever an instance finishes, is cancelled or abandoned.
    settled: watch::Sender<u64>,
}

/// Handle to a task slot. Cheap to clone; clones share the slot.
#[derive(Clone)]
pub struct Work {
    inner: Arc<WorkInner>,
}

impl Work {
    pub(super) fn new<F, Fut>(name: Arc<str>, queue: Arc<QueueShared>, job: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let job: Job = Box::new(move || job().boxed());
        let (settled, _) = watch::channel(0);
        Self {
            inner: Arc::new(WorkInner {
                name,
                queue,
                job,
                slot: Mutex::new(SlotState::default()),
                settled,
            }),
        }
    }

    /// Slot name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Submits an instance that runs as soon as the queue allows.
    pub fn submit(&self) -> SubmitOutcome {
        self.submit_after(Duration::ZERO)
    }

    /// Submits an instance that runs after `delay`.
    ///
    /// Never replaces or duplicates a pending instance.
    pub fn submit_after(&self, delay: Duration) -> SubmitOutcome {
        let inner = &self.inner;
        let mut slot = inner.slot.lock();
        if inner.queue.token.is_cancelled() {
            return SubmitOutcome::Rejected;
        }
        if slot.pending.is_some() {
            return SubmitOutcome::AlreadyPending;
        }

        let id = slot.next_id;
        slot.next_id += 1;
        let cancel = inner.queue.token.child_token();
        slot.pending = Some(Pending {
            id,
            cancel: cancel.clone(),
        });
        drop(slot);

        let instance = Arc::clone(inner).execute(id, delay, cancel);
        inner.queue.tracker.spawn_on(instance, &inner.queue.rt);
        SubmitOutcome::Queued
    }

    /// True if an instance is waiting to run.
    pub fn is_pending(&self) -> bool {
        self.inner.slot.lock().pending.is_some()
    }

    /// True if an instance is executing right now.
    pub fn is_running(&self) -> bool {
        self.inner.slot.lock().running
    }

    /// Cancels the pending instance, if any, and waits for a running one.
    pub async fn cancel_sync(&self) -> CancelOutcome {
        let (cancelled, running) = {
            let mut slot = self.inner.slot.lock();
            let pending = slot.pending.take();
            if let Some(p) = &pending {
                p.cancel.cancel();
            }
            (pending.is_some(), slot.running)
        };

        if cancelled {
            self.inner.notify_settled();
        }
        if running {
            self.inner.wait_until(|s| !s.running).await;
        }

        match (cancelled, running) {
            (true, _) => CancelOutcome::Cancelled,
            (false, true) => CancelOutcome::Completed,
            (false, false) => CancelOutcome::NotQueued,
        }
    }

    /// Waits until the slot is neither pending nor running.
    ///
    /// A pending delayed instance is waited for, not hurried.
    pub async fn flush(&self) {
        self.inner
            .wait_until(|s| s.pending.is_none() && !s.running)
            .await;
    }
}

impl WorkInner {
    fn notify_settled(&self) {
        self.settled.send_modify(|n| *n = n.wrapping_add(1));
    }

    async fn wait_until(&self, done: impl Fn(&SlotState) -> bool) {
        let mut rx = self.settled.subscribe();
        loop {
            let ready = {
                let slot = self.slot.lock();
                done(&slot)
            };
            if ready || rx.changed().await.is_err() {
                return;
            }
        }
    }

    async fn execute(self: Arc<Self>, id: u64, delay: Duration, cancel: CancellationToken) {
        let mut instance = Instance {
            work: &*self,
            id,
            claimed: false,
        };

        if !delay.is_zero() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                _ = time::sleep(delay) => {}
            }
        }

        let queue = Arc::clone(&self.queue);
        let _turn = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            turn = queue.exec.lock() => turn,
        };

        if !instance.claim() {
            return;
        }

        if let Err(panic_err) = AssertUnwindSafe((self.job)()).catch_unwind().await {
            queue.bus.publish(
                Event::new(EventKind::WorkPanicked)
                    .with_work(Arc::clone(&self.name))
                    .with_reason(panic_message(&*panic_err)),
            );
        }
    }
}

/// One spawned instance of a slot.
///
/// Settles the slot when dropped, however the instance ended: finished,
/// cancelled, lost its claim, or was dropped with its runtime.
struct Instance<'a> {
    work: &'a WorkInner,
    id: u64,
    claimed: bool,
}

impl Instance<'_> {
    /// Takes the pending entry if it still belongs to this instance.
    fn claim(&mut self) -> bool {
        let mut slot = self.work.slot.lock();
        if !slot.pending.as_ref().is_some_and(|p| p.id == self.id) {
            return false;
        }
        slot.pending = None;
        slot.running = true;
        self.claimed = true;
        true
    }
}

impl Drop for Instance<'_> {
    fn drop(&mut self) {
        {
            let mut slot = self.work.slot.lock();
            if self.claimed {
                slot.running = false;
            } else if slot.pending.as_ref().is_some_and(|p| p.id == self.id) {
                slot.pending = None;
            }
        }
        self.work.notify_settled();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Bus;
    use crate::workqueue::WorkQueue;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    fn counting(wq: &WorkQueue, name: &'static str, run_for: Duration) -> (Work, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let work = wq.work(name, move || {
            let h = Arc::clone(&h);
            async move {
                if !run_for.is_zero() {
                    time::sleep(run_for).await;
                }
                h.fetch_add(1, Ordering::SeqCst);
            }
        });
        (work, hits)
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_submit_keeps_single_instance() {
        let wq = WorkQueue::new("wq", Bus::new(16)).expect("runtime");
        let (work, hits) = counting(&wq, "w", Duration::ZERO);

        assert_eq!(work.submit(), SubmitOutcome::Queued);
        assert_eq!(work.submit(), SubmitOutcome::AlreadyPending);
        work.flush().await;

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!work.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_delay_is_not_extended() {
        let wq = WorkQueue::new("wq", Bus::new(16)).expect("runtime");
        let (work, hits) = counting(&wq, "w", Duration::ZERO);
        let start = Instant::now();

        assert_eq!(work.submit_after(Duration::from_millis(100)), SubmitOutcome::Queued);
        time::sleep(Duration::from_millis(60)).await;
        assert_eq!(
            work.submit_after(Duration::from_millis(100)),
            SubmitOutcome::AlreadyPending
        );
        work.flush().await;

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(100) && elapsed < Duration::from_millis(160));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_run() {
        let wq = WorkQueue::new("wq", Bus::new(16)).expect("runtime");
        let (work, hits) = counting(&wq, "w", Duration::ZERO);

        assert_eq!(work.cancel_sync().await, CancelOutcome::NotQueued);

        work.submit_after(Duration::from_millis(100));
        time::sleep(Duration::from_millis(50)).await;
        assert_eq!(work.cancel_sync().await, CancelOutcome::Cancelled);

        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(work.submit(), SubmitOutcome::Queued);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_waits_for_running_instance() {
        let wq = WorkQueue::new("wq", Bus::new(16)).expect("runtime");
        let (work, hits) = counting(&wq, "w", Duration::from_millis(50));
        let start = Instant::now();

        work.submit();
        time::sleep(Duration::from_millis(1)).await;
        assert!(work.is_running());

        assert_eq!(work.cancel_sync().await, CancelOutcome::Completed);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!work.is_running());
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resubmit_while_running_runs_again_after() {
        let wq = WorkQueue::new("wq", Bus::new(16)).expect("runtime");
        let (work, hits) = counting(&wq, "w", Duration::from_millis(20));

        work.submit();
        time::sleep(Duration::from_millis(1)).await;
        assert!(work.is_running());
        assert_eq!(work.submit(), SubmitOutcome::Queued);
        assert!(work.is_pending());

        work.flush().await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queue_is_ordered() {
        let wq = WorkQueue::new("wq", Bus::new(16)).expect("runtime");
        let log = Arc::new(Mutex::new(Vec::new()));

        let make = |tag: &'static str| {
            let log = Arc::clone(&log);
            wq.work(tag, move || {
                let log = Arc::clone(&log);
                async move {
                    log.lock().push(format!("{tag}:start"));
                    time::sleep(Duration::from_millis(10)).await;
                    log.lock().push(format!("{tag}:end"));
                }
            })
        };
        let a = make("a");
        let b = make("b");

        a.submit();
        b.submit();
        a.flush().await;
        b.flush().await;

        assert_eq!(*log.lock(), vec!["a:start", "a:end", "b:start", "b:end"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_destroy_cancels_pending_and_rejects() {
        let wq = WorkQueue::new("wq", Bus::new(16)).expect("runtime");
        let (work, hits) = counting(&wq, "w", Duration::ZERO);

        work.submit_after(Duration::from_secs(1));
        wq.destroy().await;
        work.flush().await;

        assert!(!work.is_pending());
        assert_eq!(work.submit(), SubmitOutcome::Rejected);
        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_job_is_reported_and_slot_survives() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let wq = WorkQueue::new("wq", bus).expect("runtime");
        let work = wq.work("bad", || async {
            panic!("job exploded");
        });

        work.submit();
        work.flush().await;

        let ev = rx.recv().await.expect("event");
        assert_eq!(ev.kind, EventKind::WorkPanicked);
        assert_eq!(ev.work.as_deref(), Some("bad"));
        assert_eq!(ev.reason.as_deref(), Some("job exploded"));
        assert!(!work.is_running());
        assert_eq!(work.submit(), SubmitOutcome::Queued);
    }

    #[test]
    fn test_dropped_runtime_settles_slot() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .expect("runtime");

        let (stuck, idle) = rt.block_on(async {
            let wq = WorkQueue::new("wq", Bus::new(16)).expect("runtime");
            let stuck = wq.work("stuck", || std::future::pending::<()>());
            let idle = wq.work("idle", || async {});

            stuck.submit();
            idle.submit_after(Duration::from_secs(60));
            time::sleep(Duration::from_millis(5)).await;
            assert!(stuck.is_running());
            assert!(idle.is_pending());
            (stuck, idle)
        });
        drop(rt);

        assert!(!stuck.is_running());
        assert!(!idle.is_pending());
        futures::executor::block_on(async {
            stuck.flush().await;
            idle.flush().await;
        });
    }
}
