//! # WorkQueue: ordered pool for controller jobs.
//!
//! A [`WorkQueue`] is bound to the tokio runtime that creates it and tracks
//! every job it spawns in a [`TaskTracker`], so teardown can wait for
//! in-flight jobs instead of abandoning them mid-way.
//!
//! ## Rules
//! - **Ordered**: at most one job of the queue executes at any time.
//! - **Cancellable**: [`destroy`](WorkQueue::destroy) cancels every pending
//!   instance; running jobs are allowed to finish.
//! - **Closed after destroy**: later submissions return `SubmitOutcome::Rejected`.

use std::future::Future;
use std::sync::Arc;

use tokio::{runtime::Handle, sync::Mutex};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::{error::InitError, events::Bus};

use super::work::Work;

/// State shared between the queue and all of its slots.
pub(super) struct QueueShared {
    pub name: Arc<str>,
    pub rt: Handle,
    pub tracker: TaskTracker,
    pub token: CancellationToken,
    /// Serializes job execution across the whole queue.
    pub exec: Mutex<()>,
    pub bus: Bus,
}

/// Dedicated ordered work queue.
pub struct WorkQueue {
    shared: Arc<QueueShared>,
}

impl WorkQueue {
    /// Allocates a queue on the current tokio runtime.
    ///
    /// Fails with [`InitError::NoRuntime`] when called outside a runtime.
    pub fn new(name: impl Into<Arc<str>>, bus: Bus) -> Result<Self, InitError> {
        let name = name.into();
        let rt = Handle::try_current().map_err(|_| InitError::NoRuntime {
            queue: name.to_string(),
        })?;

        Ok(Self {
            shared: Arc::new(QueueShared {
                name,
                rt,
                tracker: TaskTracker::new(),
                token: CancellationToken::new(),
                exec: Mutex::new(()),
                bus,
            }),
        })
    }

    /// Queue name.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Runtime the queue spawns onto.
    pub fn runtime(&self) -> &Handle {
        &self.shared.rt
    }

    /// Creates a task slot that runs `job` each time an instance executes.
    pub fn work<F, Fut>(&self, name: impl Into<Arc<str>>, job: F) -> Work
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Work::new(name.into(), Arc::clone(&self.shared), job)
    }

    /// True once [`close`](Self::close) or [`destroy`](Self::destroy) was called.
    pub fn is_closed(&self) -> bool {
        self.shared.token.is_cancelled()
    }

    /// Cancels every pending instance and stops accepting submissions.
    ///
    /// Does not wait; running jobs keep going. Use [`destroy`](Self::destroy)
    /// to also drain them.
    pub fn close(&self) {
        self.shared.token.cancel();
        self.shared.tracker.close();
    }

    /// Closes the queue and waits until no job of it is executing.
    pub async fn destroy(&self) {
        self.close();
        self.shared.tracker.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_outside_runtime_fails() {
        let err = WorkQueue::new("wq", Bus::new(4))
            .err()
            .expect("no runtime");
        assert_eq!(err.as_label(), "init_no_runtime");
    }

    #[tokio::test]
    async fn test_destroy_is_idempotent() {
        let wq = WorkQueue::new("wq", Bus::new(4)).expect("runtime");
        assert_eq!(wq.name(), "wq");
        assert!(!wq.is_closed());

        wq.destroy().await;
        wq.destroy().await;
        assert!(wq.is_closed());
    }
}
