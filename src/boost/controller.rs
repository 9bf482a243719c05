//! # WakeBoost: controller lifecycle.
//!
//! [`WakeBoost::builder`] wires the pieces together; [`WakeBoost::shutdown`]
//! takes them apart in reverse.
//!
//! ## Start
//! ```text
//! 1. WorkQueue::new            ── NoRuntime ──────────────► Err (nothing to undo)
//! 2. bus fan-out task + works
//! 3. governor.register_hook    ── Err ─► close queue ─────► Err(HookRegistration)
//! 4. notifier.register         ── Err ─► unregister hook
//!                                        close queue ─────► Err(ListenerRegistration)
//! 5. ControllerStarted
//! ```
//!
//! ## Shutdown
//! ```text
//! draining = true ─► cancel_sync(boost) ─► cancel_sync(unboost) ─► queue.destroy()
//!     ─► revert if still boosting ─► unregister listener + hook ─► ControllerStopped
//! ```
//!
//! ## Rules
//! - Once draining, wake events are ignored and the boost override is no longer applied.
//! - No job is executing when the subscriptions are released.
//! - Dropping without [`WakeBoost::shutdown`] closes the queue, reverts a boost
//!   in effect and releases the subscriptions, without waiting for a running job.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::InitError;
use crate::events::{Bus, Event, EventKind};
use crate::governor::{Governor, HookId};
use crate::power::{ListenerId, PowerNotifier};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::workqueue::{Work, WorkQueue};

use super::interceptor::PolicyInterceptor;
use super::jobs::{self, JobContext};
use super::listener::WakeListener;
use super::phase::{BoostState, Phase};

/// Builder for [`WakeBoost`].
pub struct WakeBoostBuilder {
    cfg: Config,
    governor: Arc<dyn Governor>,
    notifier: Arc<PowerNotifier>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl WakeBoostBuilder {
    /// Attaches event subscribers (logging, metrics, tests).
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Brings the controller up on the current tokio runtime.
    ///
    /// All-or-nothing: on error, every resource acquired so far is released.
    pub fn start(self) -> Result<WakeBoost, InitError> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let queue = WorkQueue::new(self.cfg.queue_name.clone(), bus.clone())?;

        let set = SubscriberSet::new(self.subscribers, bus.clone(), queue.runtime());
        let fanout = Fanout::spawn(queue.runtime(), bus.subscribe(), set);

        let state = Arc::new(BoostState::new());
        let ctx = Arc::new(JobContext {
            state: Arc::clone(&state),
            governor: Arc::clone(&self.governor),
            bus: bus.clone(),
        });

        let unboost = {
            let ctx = Arc::clone(&ctx);
            queue.work("wake_unboost", move || jobs::wake_unboost(Arc::clone(&ctx)))
        };
        let boost = {
            let ctx = Arc::clone(&ctx);
            let unboost = unboost.clone();
            queue.work("wake_boost", move || {
                jobs::wake_boost(Arc::clone(&ctx), unboost.clone())
            })
        };

        let interceptor = Arc::new(PolicyInterceptor::new(Arc::clone(&state), bus.clone()));
        let hook = match self.governor.register_hook(interceptor) {
            Ok(id) => id,
            Err(e) => {
                queue.close();
                fanout.detach();
                return Err(InitError::HookRegistration(e));
            }
        };

        let listener = Arc::new(WakeListener {
            state: Arc::clone(&state),
            boost: boost.clone(),
            unboost: unboost.clone(),
            bus: bus.clone(),
        });
        let listener = match self.notifier.register(listener, self.cfg.priority) {
            Ok(id) => id,
            Err(e) => {
                self.governor.unregister_hook(hook);
                queue.close();
                fanout.detach();
                return Err(InitError::ListenerRegistration(e));
            }
        };

        bus.publish(Event::new(EventKind::ControllerStarted).with_work(queue.name()));

        Ok(WakeBoost {
            bus,
            ctx,
            queue,
            boost,
            unboost,
            governor: self.governor,
            notifier: self.notifier,
            subscriptions: Some(Subscriptions { hook, listener }),
            fanout: Some(fanout),
        })
    }
}

struct Subscriptions {
    hook: HookId,
    listener: ListenerId,
}

/// Wake-time CPU frequency boost controller.
///
/// ## Example
/// ```rust,no_run
/// use std::sync::Arc;
/// use wakeboost::{Config, CpuInfo, PolicyTable, PowerEvent, PowerNotifier, WakeBoost};
///
/// # async fn demo() -> Result<(), wakeboost::InitError> {
/// let table = Arc::new(PolicyTable::new());
/// table.add_cpu(0, CpuInfo { min_freq: 300_000, max_freq: 2_000_000 });
/// let notifier = Arc::new(PowerNotifier::new());
///
/// let boost = WakeBoost::builder(Config::default(), table.clone(), notifier.clone()).start()?;
/// notifier.notify(PowerEvent::Active).await;
/// // ... three seconds of max-frequency floors ...
/// boost.shutdown().await;
/// # Ok(())
/// # }
/// ```
pub struct WakeBoost {
    bus: Bus,
    ctx: Arc<JobContext>,
    queue: WorkQueue,
    boost: Work,
    unboost: Work,
    governor: Arc<dyn Governor>,
    notifier: Arc<PowerNotifier>,
    subscriptions: Option<Subscriptions>,
    fanout: Option<Fanout>,
}

impl WakeBoost {
    /// Starts building a controller over `governor` and `notifier`.
    pub fn builder(
        cfg: Config,
        governor: Arc<dyn Governor>,
        notifier: Arc<PowerNotifier>,
    ) -> WakeBoostBuilder {
        WakeBoostBuilder {
            cfg,
            governor,
            notifier,
            subscribers: Vec::new(),
        }
    }

    /// Current boost phase.
    pub fn phase(&self) -> Phase {
        self.ctx.state.phase()
    }

    /// Raw receiver on the controller's event bus.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Tears the controller down, restoring policies if a boost is in effect.
    pub async fn shutdown(mut self) {
        self.ctx.state.begin_drain();
        self.bus.publish(Event::new(EventKind::ControllerStopping));

        self.boost.cancel_sync().await;
        self.unboost.cancel_sync().await;
        self.queue.destroy().await;

        jobs::revert(&self.ctx);
        self.release();

        self.bus.publish(Event::new(EventKind::ControllerStopped));
        if let Some(fanout) = self.fanout.take() {
            fanout.stop().await;
        }
    }

    fn release(&mut self) {
        if let Some(subs) = self.subscriptions.take() {
            self.notifier.unregister(subs.listener);
            self.governor.unregister_hook(subs.hook);
        }
    }
}

impl Drop for WakeBoost {
    fn drop(&mut self) {
        if self.subscriptions.is_some() {
            self.ctx.state.begin_drain();
            self.queue.close();
            jobs::revert(&self.ctx);
            self.release();
        }
        if let Some(fanout) = self.fanout.take() {
            fanout.detach();
        }
    }
}

/// Forwards bus events to the subscriber set until stopped.
struct Fanout {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl Fanout {
    fn spawn(rt: &Handle, mut rx: broadcast::Receiver<Event>, set: SubscriberSet) -> Self {
        let token = CancellationToken::new();
        let stop = token.clone();

        let join = rt.spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    msg = rx.recv() => match msg {
                        Ok(ev) => set.emit(&ev),
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = stop.cancelled() => break,
                }
            }
            // Deliver whatever was published before the stop request.
            loop {
                match rx.try_recv() {
                    Ok(ev) => set.emit(&ev),
                    Err(TryRecvError::Lagged(_)) => continue,
                    Err(_) => break,
                }
            }
            set.shutdown().await;
        });

        Self { token, join }
    }

    /// Stops forwarding and waits until subscribers have drained.
    async fn stop(self) {
        self.token.cancel();
        let _ = self.join.await;
    }

    /// Stops forwarding without waiting.
    fn detach(self) {
        self.token.cancel();
    }
}
