//! Marshaling of callbacks onto the UI thread.
//!
//! Toolkit UI objects may only be touched from the UI thread. A
//! [`UiDispatcher`] accepts callbacks from any thread and queues them; the
//! shell drains the paired [`UiJobQueue`] from its event loop. Submission
//! order is preserved per submitter; there is no ordering guarantee across
//! submitters.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::warn;

pub type UiJob = Box<dyn FnOnce() + Send + 'static>;

#[derive(Clone)]
pub struct UiDispatcher {
    tx: UnboundedSender<UiJob>,
    waker: Arc<dyn Fn() + Send + Sync>,
}

impl UiDispatcher {
    /// Creates a dispatcher plus the queue the UI thread drains. `waker`
    /// runs after each submission and must nudge the UI event loop.
    pub fn new(waker: impl Fn() + Send + Sync + 'static) -> (Self, UiJobQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                waker: Arc::new(waker),
            },
            UiJobQueue { rx },
        )
    }

    /// Queues `job` to run later on the UI thread. The job is never invoked
    /// synchronously within this call.
    pub fn dispatch(&self, job: impl FnOnce() + Send + 'static) {
        if self.tx.send(Box::new(job)).is_err() {
            warn!("UI thread is gone; dropping dispatched callback");
            return;
        }
        (self.waker)();
    }
}

pub struct UiJobQueue {
    rx: UnboundedReceiver<UiJob>,
}

impl UiJobQueue {
    /// Runs every queued job in submission order. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }
}
