use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

use crate::foundation::check::check;

/// Longest parent chain accepted when building a child clock.
const MAX_CLOCK_DEPTH: usize = 32;

/// Source of absolute time in seconds.
pub trait TimeSource: fmt::Debug {
    fn now(&self) -> f64;
}

/// Monotonic wall-clock time measured from construction.
#[derive(Debug)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Time source driven explicitly by the caller (simulation and tests).
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    now: Cell<f64>,
}

impl ManualTimeSource {
    pub fn new(start: f64) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, now: f64) {
        self.now.set(now);
    }

    pub fn advance(&self, delta: f64) {
        self.now.set(self.now.get() + delta);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

#[derive(Debug)]
enum TimeBase {
    Source(Rc<dyn TimeSource>),
    Parent(SharedClock),
}

/// Shared handle to a clock; children hold one to their parent.
pub type SharedClock = Rc<ElapsedTime>;

/// A resettable stopwatch that can be paused, held and shifted.
///
/// A root clock reads a [`TimeSource`]; a child clock reads the elapsed time of
/// its parent, so adjusting the parent moves every child with it.
#[derive(Debug)]
pub struct ElapsedTime {
    base: TimeBase,
    last_queried: Cell<f64>,
    start_time: Cell<f64>,
    frozen_time: Cell<f64>,
    paused: Cell<bool>,
    held: Cell<bool>,
}

impl ElapsedTime {
    pub fn new(source: Rc<dyn TimeSource>) -> Self {
        Self::with_base(TimeBase::Source(source))
    }

    /// Create a clock running on the elapsed time of `parent`.
    pub fn with_parent(parent: SharedClock) -> Self {
        check(
            parent.depth() < MAX_CLOCK_DEPTH,
            "clock parent chain is unexpectedly deep",
        );
        Self::with_base(TimeBase::Parent(parent))
    }

    fn with_base(base: TimeBase) -> Self {
        let clock = Self {
            base,
            last_queried: Cell::new(0.0),
            start_time: Cell::new(0.0),
            frozen_time: Cell::new(0.0),
            paused: Cell::new(false),
            held: Cell::new(false),
        };
        clock.start_time.set(clock.current_time());
        clock
    }

    pub fn parent(&self) -> Option<&SharedClock> {
        match &self.base {
            TimeBase::Parent(parent) => Some(parent),
            TimeBase::Source(_) => None,
        }
    }

    fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.parent();
        while let Some(parent) = cursor {
            depth += 1;
            cursor = parent.parent();
        }
        depth
    }

    /// Restart from zero; clears pause and hold.
    pub fn reset(&self) {
        self.last_queried.set(0.0);
        self.start_time.set(self.current_time());
        self.frozen_time.set(0.0);
        self.paused.set(false);
        self.held.set(false);
    }

    /// Current reading of the time base (parent elapsed time or source time).
    pub fn current_time(&self) -> f64 {
        match &self.base {
            TimeBase::Source(source) => source.now(),
            TimeBase::Parent(parent) => parent.elapsed_impl(),
        }
    }

    /// Elapsed seconds since the last reset, minus paused intervals.
    pub fn elapsed_time(&self) -> f64 {
        let elapsed = self.elapsed_impl();
        self.last_queried.set(elapsed);
        elapsed
    }

    fn elapsed_impl(&self) -> f64 {
        if self.held.get() || self.paused.get() {
            self.frozen_time.get()
        } else {
            self.current_time() - self.start_time.get()
        }
    }

    pub fn pause_timer(&self) {
        self.frozen_time.set(self.elapsed_impl());
        self.paused.set(true);
    }

    pub fn continue_timer(&self) {
        self.paused.set(false);
        let paused_for = self.elapsed_impl() - self.frozen_time.get();
        self.start_time.set(self.start_time.get() + paused_for);
    }

    /// Freeze the reading. Nested holds keep the first frozen value.
    pub fn hold_timer(&self) {
        self.frozen_time.set(self.elapsed_impl());
        self.held.set(true);
    }

    pub fn release_timer(&self) {
        self.held.set(false);
    }

    /// Shift elapsed time by `offset` seconds.
    ///
    /// With `limit_to_last_queried`, a negative offset never moves the clock
    /// behind the last value returned by [`ElapsedTime::elapsed_time`].
    pub fn adjust_timer(&self, offset: f64, limit_to_last_queried: bool) {
        let mut offset = offset;
        if limit_to_last_queried {
            let current = self.elapsed_impl();
            if self.last_queried.get() > current + offset {
                offset = self.last_queried.get() - current;
            }
        }
        self.start_time.set(self.start_time.get() - offset);
        if self.held.get() || self.paused.get() {
            self.frozen_time.set(self.frozen_time.get() + offset);
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    pub fn is_held(&self) -> bool {
        self.held.get()
    }
}

#[cfg(test)]
#[path = "../tests/unit/clock.rs"]
mod tests;
