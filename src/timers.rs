//! Repeating timers bound to the UI thread.
//!
//! Tick scheduling runs on tokio; each tick is forwarded to the UI thread
//! through the registry's `on_tick` callback (the shell wires it to the
//! event-loop proxy), and only [`TimerRegistry::fire`] invokes the timer's
//! callback. Starting, stopping, and firing therefore all happen on the UI
//! thread.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::trace;

pub type TimerId = u32;

static NEXT_TIMER_ID: AtomicU32 = AtomicU32::new(1);

struct TimerSlot {
    // Taken while the callback runs so the callback may stop its own timer.
    callback: Option<Box<dyn FnMut()>>,
    cancel_tx: mpsc::UnboundedSender<()>,
}

pub struct TimerRegistry {
    tokio_handle: Handle,
    on_tick: Arc<dyn Fn(TimerId) + Send + Sync>,
    slots: HashMap<TimerId, TimerSlot>,
}

impl TimerRegistry {
    /// Must be called inside a tokio runtime. `on_tick` is invoked from a
    /// tokio task and must forward the id to the UI thread.
    pub fn new(on_tick: impl Fn(TimerId) + Send + Sync + 'static) -> Self {
        Self {
            tokio_handle: Handle::current(),
            on_tick: Arc::new(on_tick),
            slots: HashMap::new(),
        }
    }

    /// Starts a repeating timer. The first tick arrives one full interval
    /// after the call.
    pub fn start(
        registry: &Rc<RefCell<Self>>,
        interval: Duration,
        callback: Box<dyn FnMut()>,
    ) -> Timer {
        let timer_id = NEXT_TIMER_ID.fetch_add(1, Ordering::SeqCst);
        let (cancel_tx, mut cancel_rx) = mpsc::unbounded_channel();

        let mut reg = registry.borrow_mut();
        let on_tick = Arc::clone(&reg.on_tick);
        reg.tokio_handle.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // First tick completes immediately, skip it
            loop {
                tokio::select! {
                    _ = ticker.tick() => on_tick(timer_id),
                    _ = cancel_rx.recv() => break,
                }
            }
        });

        reg.slots.insert(
            timer_id,
            TimerSlot {
                callback: Some(callback),
                cancel_tx: cancel_tx.clone(),
            },
        );

        Timer {
            timer_id,
            registry: Rc::downgrade(registry),
            cancel_tx: Some(cancel_tx),
        }
    }

    /// Runs the callback for `timer_id` on the current thread. Ticks for
    /// stopped timers are ignored.
    pub fn fire(registry: &Rc<RefCell<Self>>, timer_id: TimerId) {
        let callback = registry
            .borrow_mut()
            .slots
            .get_mut(&timer_id)
            .and_then(|slot| slot.callback.take());
        let Some(mut callback) = callback else {
            trace!("tick for stopped timer {timer_id}");
            return;
        };

        callback();

        // The callback may have stopped its own timer; only restore it if
        // the slot survived.
        if let Some(slot) = registry.borrow_mut().slots.get_mut(&timer_id) {
            slot.callback = Some(callback);
        }
    }

    pub fn stop(&mut self, timer_id: TimerId) {
        if let Some(slot) = self.slots.remove(&timer_id) {
            let _ = slot.cancel_tx.send(());
        }
    }

    pub fn clear_all(&mut self) {
        for (_, slot) in self.slots.drain() {
            let _ = slot.cancel_tx.send(());
        }
    }

    pub fn active_timers(&self) -> usize {
        self.slots.len()
    }
}

impl Drop for TimerRegistry {
    fn drop(&mut self) {
        self.clear_all();
    }
}

/// Handle to a running timer. Dropping it stops the timer.
pub struct Timer {
    timer_id: TimerId,
    registry: Weak<RefCell<TimerRegistry>>,
    cancel_tx: Option<mpsc::UnboundedSender<()>>,
}

impl Timer {
    pub fn id(&self) -> TimerId {
        self.timer_id
    }

    /// Safe to call more than once; a stopped timer stays stopped.
    pub fn stop(&mut self) {
        let Some(cancel_tx) = self.cancel_tx.take() else {
            return;
        };
        let _ = cancel_tx.send(());
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().slots.remove(&self.timer_id);
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.stop();
    }
}
