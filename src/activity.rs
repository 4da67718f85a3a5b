//! Timed units of work polled by the [`ActivityQueue`].
//!
//! An [`Activity`] owns the timing state (repeat, auto-reverse, acceleration,
//! frame pacing) and hands computed [`Frame`]s to an [`ActivityHook`] that
//! applies them to whatever is being animated.

pub(crate) mod continuous;
pub(crate) mod discrete;
pub mod events;
pub mod queue;

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::clock::SharedClock;
use crate::foundation::check::check;

pub use self::discrete::{discrete_frame_index, discrete_repeat_count};
pub use self::events::{EventCallback, TimerEventQueue};
pub use self::queue::ActivityQueue;

use self::continuous::ContinuousTiming;
use self::discrete::DiscreteTiming;

pub type ActivityRef = Rc<RefCell<Activity>>;

/// How often an effect repeats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RepeatCount {
    Finite(f64),
    Indefinite,
}

impl RepeatCount {
    /// Repeat budget, or `None` when the activity runs until ended externally.
    pub fn limit(self) -> Option<f64> {
        match self {
            Self::Finite(n) if n > 0.0 => Some(n),
            _ => None,
        }
    }
}

impl Default for RepeatCount {
    fn default() -> Self {
        Self::Finite(1.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ActivityParams {
    pub repeat: RepeatCount,
    pub auto_reverse: bool,
    /// Simple duration in seconds.
    pub min_duration: f64,
    /// Frames that must be shown per simple duration.
    pub min_frame_count: f64,
    /// Key times for discrete and key-time activities.
    pub key_times: Vec<f64>,
    pub acceleration: f64,
    pub deceleration: f64,
}

impl Default for ActivityParams {
    fn default() -> Self {
        Self {
            repeat: RepeatCount::default(),
            auto_reverse: false,
            min_duration: 0.001,
            min_frame_count: 1.0,
            key_times: Vec::new(),
            acceleration: 0.0,
            deceleration: 0.0,
        }
    }
}

impl ActivityParams {
    /// Apply the acceleration/deceleration curve to a simple time in `[0, 1]`.
    ///
    /// Only the current repetition is shaped; the curve is ignored when the
    /// two fractions sum past 1.
    pub fn accelerated_time(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        let acc = self.acceleration;
        let dec = self.deceleration;
        if !((acc > 0.0 || dec > 0.0) && acc + dec <= 1.0) {
            return t;
        }

        let c = 1.0 - 0.5 * acc - 0.5 * dec;
        let shaped = if t < acc {
            0.5 * t * t / acc
        } else if t <= 1.0 - dec {
            0.5 * acc + (t - acc)
        } else {
            let rel = t - 1.0 + dec;
            0.5 * acc + (1.0 - acc - dec) + rel - 0.5 * rel * rel / dec
        };
        shaped / c
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimingMode {
    /// Stepped through `key_times` by wake-up events.
    Discrete,
    /// Polled every tick with a simple time in `[0, 1]`.
    Continuous,
    /// Polled every tick; the simple time is mapped onto `key_times` segments.
    KeyTimes,
}

/// Progress handed to an [`ActivityHook`] on every perform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Frame {
    Continuous { t: f64, repeat: u32 },
    KeyTime { index: usize, fraction: f64, repeat: u32 },
    Discrete { index: usize, repeat: u32 },
}

/// The animated side of an activity.
pub trait ActivityHook {
    fn start_animation(&mut self) {}

    fn perform(&mut self, frame: Frame);

    /// Show the final state when the activity is ended early.
    fn perform_end(&mut self, _auto_reverse: bool) {}

    fn end_animation(&mut self) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivityState {
    Inactive,
    Active,
    Ended,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActivityId(pub u64);

impl ActivityId {
    /// Placeholder carried until a queue numbers the activity.
    pub const UNQUEUED: Self = Self(0);
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "activity#{}", self.0)
    }
}

enum Timing {
    Discrete(DiscreteTiming),
    Continuous(ContinuousTiming),
}

pub struct Activity {
    id: ActivityId,
    params: ActivityParams,
    mode: TimingMode,
    timing: Timing,
    hook: Box<dyn ActivityHook>,
    state: ActivityState,
    first_perform_call: bool,
    end_event: Option<EventCallback>,
    valid: bool,
    self_ref: Weak<RefCell<Activity>>,
}

impl fmt::Debug for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activity")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("valid", &self.valid)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl Activity {
    /// Build an inactive activity whose clocks run on `master`.
    ///
    /// Malformed parameters produce an activity that reports
    /// [`Activity::is_valid`] `false` and is refused by the queue.
    pub fn new(
        params: ActivityParams,
        mode: TimingMode,
        master: &SharedClock,
        hook: Box<dyn ActivityHook>,
    ) -> ActivityRef {
        let valid = Self::validate(&params, mode);
        let timing = match mode {
            TimingMode::Discrete => Timing::Discrete(DiscreteTiming::new(master)),
            TimingMode::Continuous => Timing::Continuous(ContinuousTiming::new(master, None)),
            TimingMode::KeyTimes => {
                let stops = if valid {
                    params.key_times.clone()
                } else {
                    vec![0.0, 1.0]
                };
                Timing::Continuous(ContinuousTiming::new(master, Some(stops)))
            }
        };

        Rc::new_cyclic(|self_ref| {
            RefCell::new(Self {
                id: ActivityId::UNQUEUED,
                params,
                mode,
                timing,
                hook,
                state: ActivityState::Inactive,
                first_perform_call: true,
                end_event: None,
                valid,
                self_ref: self_ref.clone(),
            })
        })
    }

    fn validate(params: &ActivityParams, mode: TimingMode) -> bool {
        let mut valid = check(
            params.min_duration > 0.0,
            "activity duration must be positive",
        );
        valid &= check(
            params.min_frame_count > 0.0,
            "activity minimum frame count must be positive",
        );
        let keys = &params.key_times;
        match mode {
            TimingMode::Continuous => {}
            TimingMode::Discrete => {
                valid &= check(!keys.is_empty(), "discrete activity has no key times");
                valid &= check(
                    keys.windows(2).all(|w| w[0] <= w[1]),
                    "discrete key times are not ascending",
                );
            }
            TimingMode::KeyTimes => {
                valid &= check(keys.len() > 1, "key time vector needs two entries");
                valid &= check(
                    keys.first().is_some_and(|k| *k == 0.0),
                    "first key time must be 0",
                );
                valid &= check(
                    keys.last().is_some_and(|k| *k <= 1.0),
                    "last key time must not exceed 1",
                );
            }
        }
        valid
    }

    pub fn id(&self) -> ActivityId {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: ActivityId) {
        self.id = id;
    }

    pub fn params(&self) -> &ActivityParams {
        &self.params
    }

    pub fn mode(&self) -> TimingMode {
        self.mode
    }

    pub fn state(&self) -> ActivityState {
        self.state
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_active(&self) -> bool {
        self.state == ActivityState::Active
    }

    pub fn is_disposed(&self) -> bool {
        !self.is_active() && self.end_event.is_none()
    }

    /// Arm the activity; `end_event` fires through the timer queue when it ends.
    pub fn activate(&mut self, end_event: Option<EventCallback>) {
        tracing::debug!(id = %self.id, mode = ?self.mode, "activity activated");
        self.end_event = end_event;
        self.state = ActivityState::Active;
        self.first_perform_call = true;
        match &mut self.timing {
            Timing::Discrete(d) => d.activate(),
            Timing::Continuous(c) => c.activate(),
        }
    }

    fn start_animation(&mut self) {
        match &mut self.timing {
            Timing::Discrete(d) => d.start(),
            Timing::Continuous(c) => c.start(),
        }
        self.hook.start_animation();
    }

    fn ensure_started(&mut self) {
        if self.first_perform_call {
            self.first_perform_call = false;
            self.start_animation();
        }
    }

    /// Seconds this activity lags behind its required frame rate.
    ///
    /// The first call of an activation also starts the animation.
    pub fn calc_time_lag(&mut self) -> f64 {
        if !self.is_active() {
            return 0.0;
        }
        self.ensure_started();
        match &self.timing {
            Timing::Discrete(_) => 0.0,
            Timing::Continuous(c) => c.time_lag(&self.params),
        }
    }

    /// Advance one tick. Returns `true` to stay in the per-tick poll set.
    pub fn perform(&mut self, events: &mut TimerEventQueue) -> bool {
        if !self.is_active() {
            return false;
        }
        self.ensure_started();

        let finished = match &mut self.timing {
            Timing::Continuous(c) => {
                let (frame, ending) = c.step(&self.params);
                self.hook.perform(frame);
                ending
            }
            Timing::Discrete(d) => {
                let frame = d.frame(&self.params);
                self.hook.perform(frame);
                match d.advance(&self.params) {
                    Some(activation) => {
                        let at = activation.time(events.now());
                        events.add_wakeup(self.self_ref.clone(), at);
                        false
                    }
                    None => true,
                }
            }
        };

        if finished {
            self.end_activity(events);
        }
        match self.timing {
            Timing::Continuous(_) => self.is_active(),
            Timing::Discrete(_) => false,
        }
    }

    /// Jump to the final state and end.
    pub fn end(&mut self, events: &mut TimerEventQueue) {
        if !self.is_active() || self.is_disposed() {
            return;
        }
        self.ensure_started();
        self.hook.perform_end(self.params.auto_reverse);
        self.hook.end_animation();
        self.end_activity(events);
    }

    fn end_activity(&mut self, events: &mut TimerEventQueue) {
        tracing::debug!(id = %self.id, "activity ended");
        self.state = ActivityState::Ended;
        if let Timing::Discrete(d) = &mut self.timing {
            d.disarm();
        }
        if let Some(end_event) = self.end_event.take() {
            events.add_callback(end_event, 0.0);
        }
    }

    /// Called by the queue once the activity has left the poll set.
    pub fn dequeued(&mut self) {
        if !self.is_active() {
            self.hook.end_animation();
        }
    }

    /// Drop the end event and cancel pending wake-ups.
    pub fn dispose(&mut self) {
        if self.state == ActivityState::Active {
            tracing::debug!(id = %self.id, "activity disposed while running");
        }
        self.state = ActivityState::Ended;
        self.end_event = None;
        if let Timing::Discrete(d) = &mut self.timing {
            d.disarm();
        }
    }

    pub(crate) fn wants_wakeup(&self) -> bool {
        match &self.timing {
            Timing::Discrete(d) => self.is_active() && d.is_charged(),
            Timing::Continuous(_) => false,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/activity/activity.rs"]
mod tests;
