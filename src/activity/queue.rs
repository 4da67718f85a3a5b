use std::collections::VecDeque;
use std::fmt;

use crate::clock::SharedClock;

use super::{ActivityId, ActivityRef, TimerEventQueue};

/// Polls running activities once per tick.
///
/// Every queued activity sits in exactly one of three sets: `waiting` (polled
/// this tick), `reinsert` (polled next tick) or `dequeued` (ended this tick,
/// notified by [`ActivityQueue::process_dequeued`]).
///
/// The queue numbers activities the first time they are added.
pub struct ActivityQueue {
    clock: SharedClock,
    next_id: u64,
    waiting: VecDeque<ActivityRef>,
    reinsert: Vec<ActivityRef>,
    dequeued: Vec<ActivityRef>,
}

impl fmt::Debug for ActivityQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityQueue")
            .field("waiting", &self.waiting.len())
            .field("reinsert", &self.reinsert.len())
            .field("dequeued", &self.dequeued.len())
            .finish()
    }
}

impl ActivityQueue {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            next_id: 1,
            waiting: VecDeque::new(),
            reinsert: Vec::new(),
            dequeued: Vec::new(),
        }
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Queue an activity for the next tick. Invalid activities are refused.
    pub fn add_activity(&mut self, activity: ActivityRef) -> bool {
        let (id, valid) = {
            let mut a = activity.borrow_mut();
            if a.id() == ActivityId::UNQUEUED {
                a.assign_id(ActivityId(self.next_id));
                self.next_id += 1;
            }
            (a.id(), a.is_valid())
        };
        if !valid {
            tracing::warn!(%id, "refusing to queue invalid activity");
            return false;
        }
        self.waiting.push_back(activity);
        true
    }

    /// Run one tick: compensate lag once on the master clock, then perform
    /// every waiting activity in insertion order.
    pub fn process(&mut self, events: &mut TimerEventQueue) {
        let lag = self
            .waiting
            .iter()
            .map(|activity| activity.borrow_mut().calc_time_lag())
            .fold(0.0, f64::max);
        if lag > 0.0 {
            tracing::trace!(lag, "compensating activity lag");
            self.clock.adjust_timer(-lag, true);
        }

        while let Some(activity) = self.waiting.pop_front() {
            let keep = activity.borrow_mut().perform(events);
            if keep {
                self.reinsert.push(activity);
            } else {
                self.dequeued.push(activity);
            }
        }
        self.waiting.extend(self.reinsert.drain(..));
    }

    /// Notify activities that left the poll set during the last tick.
    pub fn process_dequeued(&mut self) {
        for activity in self.dequeued.drain(..) {
            activity.borrow_mut().dequeued();
        }
    }

    /// End every running activity, leaving each in its final state.
    pub fn end_all(&mut self, events: &mut TimerEventQueue) {
        for activity in self.waiting.drain(..).chain(self.reinsert.drain(..)) {
            activity.borrow_mut().end(events);
        }
    }

    /// Drop every activity, notifying each as dequeued.
    pub fn clear(&mut self) {
        for activity in self
            .waiting
            .drain(..)
            .chain(self.reinsert.drain(..))
            .chain(self.dequeued.drain(..))
        {
            activity.borrow_mut().dequeued();
        }
    }

    pub fn size(&self) -> usize {
        self.waiting.len() + self.reinsert.len() + self.dequeued.len()
    }

    /// No activity is waiting to be polled.
    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty() && self.reinsert.is_empty()
    }

    pub fn waiting(&self) -> impl Iterator<Item = &ActivityRef> {
        self.waiting.iter()
    }

    pub fn dequeued(&self) -> impl Iterator<Item = &ActivityRef> {
        self.dequeued.iter()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/activity/queue.rs"]
mod tests;
