use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::clock::SharedClock;

use super::{Activity, ActivityQueue};

/// Deferred notification fired by the [`TimerEventQueue`].
pub type EventCallback = Rc<dyn Fn(&mut ActivityQueue)>;

enum TimerEvent {
    Wakeup(Weak<RefCell<Activity>>),
    Callback(EventCallback),
}

struct Scheduled {
    time: f64,
    seq: u64,
    event: TimerEvent,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    // Reversed so the max-heap pops the earliest time, then the oldest insert.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Events keyed by activation time on the master clock.
pub struct TimerEventQueue {
    clock: SharedClock,
    heap: BinaryHeap<Scheduled>,
    next_seq: u64,
}

impl fmt::Debug for TimerEventQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerEventQueue")
            .field("pending", &self.heap.len())
            .finish_non_exhaustive()
    }
}

impl TimerEventQueue {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    pub fn now(&self) -> f64 {
        self.clock.elapsed_time()
    }

    /// Fire `callback` once `delay` seconds have passed on the master clock.
    pub fn add_callback(&mut self, callback: EventCallback, delay: f64) {
        let time = self.now() + delay.max(0.0);
        self.push(time, TimerEvent::Callback(callback));
    }

    pub(crate) fn add_wakeup(&mut self, activity: Weak<RefCell<Activity>>, time: f64) {
        self.push(time, TimerEvent::Wakeup(activity));
    }

    fn push(&mut self, time: f64, event: TimerEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Scheduled { time, seq, event });
    }

    /// Fire every event whose activation time has been reached.
    pub fn process(&mut self, activities: &mut ActivityQueue) {
        let now = self.now();
        while self.heap.peek().is_some_and(|next| next.time <= now) {
            if let Some(next) = self.heap.pop() {
                Self::fire(next.event, activities);
            }
        }
    }

    /// Fire all pending events regardless of their time.
    pub fn force_empty(&mut self, activities: &mut ActivityQueue) {
        while let Some(next) = self.heap.pop() {
            Self::fire(next.event, activities);
        }
    }

    fn fire(event: TimerEvent, activities: &mut ActivityQueue) {
        match event {
            TimerEvent::Wakeup(activity) => {
                let Some(activity) = activity.upgrade() else {
                    return;
                };
                let charged = activity.borrow().wants_wakeup();
                if charged {
                    activities.add_activity(activity);
                }
            }
            TimerEvent::Callback(callback) => callback(activities),
        }
    }

    /// Seconds until the next event, or `None` when nothing is pending.
    pub fn next_timeout(&self) -> Option<f64> {
        self.heap.peek().map(|next| next.time - self.now())
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/activity/events.rs"]
mod tests;
