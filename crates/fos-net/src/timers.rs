//! Timers
//!
//! One-shot timeouts behind the [`Scheduler`] trait. [`TimerQueue`] runs on
//! a virtual clock that only moves when [`TimerQueue::advance`] is called;
//! [`LocalScheduler`] sleeps for real on a single-threaded smol executor.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use smol::{LocalExecutor, Timer};

/// Callback run once when a timeout fires
pub type TimerCallback = Box<dyn FnOnce()>;

/// Handle for clearing a pending timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u32);

/// Something that can run a callback after a delay
pub trait Scheduler {
    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerId;

    /// Cancel a pending timeout. Unknown or already fired ids are ignored.
    fn clear_timeout(&self, id: TimerId);
}

struct Pending {
    id: u32,
    due: Duration,
    callback: TimerCallback,
}

/// Timeouts on a virtual clock
#[derive(Default)]
pub struct TimerQueue {
    now: Cell<Duration>,
    next_id: Cell<u32>,
    timers: RefCell<Vec<Pending>>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Check if there are pending timers
    pub fn has_pending(&self) -> bool {
        !self.timers.borrow().is_empty()
    }

    pub fn pending(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Get time until next timer fires
    pub fn time_until_next(&self) -> Option<Duration> {
        let now = self.now.get();
        self.timers
            .borrow()
            .iter()
            .map(|t| t.due.saturating_sub(now))
            .min()
    }

    /// Move the clock forward by `by`, firing every timer that comes due in
    /// order. Timers set by a firing callback run too if they fall inside
    /// the window. Returns how many fired.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now.get() + by;
        let mut fired = 0;
        while let Some(timer) = self.pop_due(target) {
            self.now.set(timer.due);
            (timer.callback)();
            fired += 1;
        }
        self.now.set(target);
        fired
    }

    /// Jump to the next pending timer and fire it
    pub fn fire_next(&self) -> bool {
        match self.time_until_next() {
            Some(wait) => self.advance(wait) > 0,
            None => false,
        }
    }

    fn pop_due(&self, target: Duration) -> Option<Pending> {
        let mut timers = self.timers.borrow_mut();
        let position = timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= target)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(i, _)| i)?;
        Some(timers.remove(position))
    }
}

impl Scheduler for TimerQueue {
    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let id = self.next_id.get().wrapping_add(1);
        self.next_id.set(id);
        self.timers.borrow_mut().push(Pending {
            id,
            due: self.now.get() + delay,
            callback,
        });
        TimerId(id)
    }

    fn clear_timeout(&self, id: TimerId) {
        self.timers.borrow_mut().retain(|t| t.id != id.0);
    }
}

impl fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("now", &self.now.get())
            .field("pending", &self.pending())
            .finish()
    }
}

/// Real timeouts as tasks on a local smol executor
pub struct LocalScheduler {
    executor: Rc<LocalExecutor<'static>>,
    next_id: Cell<u32>,
    live: Rc<RefCell<HashSet<u32>>>,
}

impl LocalScheduler {
    pub fn new(executor: Rc<LocalExecutor<'static>>) -> Self {
        Self {
            executor,
            next_id: Cell::new(0),
            live: Rc::new(RefCell::new(HashSet::new())),
        }
    }

    pub fn executor(&self) -> &Rc<LocalExecutor<'static>> {
        &self.executor
    }

    /// Timeouts set and not yet fired or cleared
    pub fn pending(&self) -> usize {
        self.live.borrow().len()
    }
}

impl Scheduler for LocalScheduler {
    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let id = self.next_id.get().wrapping_add(1);
        self.next_id.set(id);
        self.live.borrow_mut().insert(id);

        let live = Rc::clone(&self.live);
        self.executor
            .spawn(async move {
                Timer::after(delay).await;
                // Cleared timers still wake up but do nothing
                if live.borrow_mut().remove(&id) {
                    callback();
                }
            })
            .detach();
        TimerId(id)
    }

    fn clear_timeout(&self, id: TimerId) {
        self.live.borrow_mut().remove(&id.0);
    }
}

impl fmt::Debug for LocalScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}
