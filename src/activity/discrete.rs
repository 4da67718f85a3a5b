use crate::clock::{ElapsedTime, SharedClock};

use super::{ActivityParams, Frame};

/// Frame shown on perform call `calls` for a key time vector of `len` entries.
///
/// With auto-reverse the index runs forward and back as a triangle wave, so a
/// pass of `2 * len` calls touches index `len` once at the turning point.
pub fn discrete_frame_index(calls: u64, len: usize, auto_reverse: bool) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as u64;
    let index = if auto_reverse {
        let i = calls % (2 * len);
        if i >= len { 2 * len - i } else { i }
    } else {
        calls % len
    };
    index as usize
}

/// Completed repeats after `calls` perform calls; a forward plus backward pass counts once.
pub fn discrete_repeat_count(calls: u64, len: usize, auto_reverse: bool) -> u64 {
    if len == 0 {
        return 0;
    }
    let len = len as u64;
    if auto_reverse {
        calls / (2 * len)
    } else {
        calls / len
    }
}

/// Pending wake-up, relative to the wake-up clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Wakeup {
    elapsed: f64,
    next_time: f64,
}

impl Wakeup {
    /// Activation time on a clock currently reading `now`.
    pub(crate) fn time(&self, now: f64) -> f64 {
        (now - self.elapsed + self.next_time).max(now)
    }
}

pub(crate) struct DiscreteTiming {
    wakeup_clock: ElapsedTime,
    perform_calls: u64,
    charged: bool,
}

impl DiscreteTiming {
    pub(crate) fn new(master: &SharedClock) -> Self {
        Self {
            wakeup_clock: ElapsedTime::with_parent(master.clone()),
            perform_calls: 0,
            charged: false,
        }
    }

    pub(crate) fn activate(&mut self) {
        self.perform_calls = 0;
        self.charged = true;
    }

    pub(crate) fn start(&mut self) {
        self.wakeup_clock.reset();
    }

    pub(crate) fn frame(&self, params: &ActivityParams) -> Frame {
        let len = params.key_times.len();
        let auto_reverse = params.auto_reverse;
        Frame::Discrete {
            index: discrete_frame_index(self.perform_calls, len, auto_reverse),
            repeat: discrete_repeat_count(self.perform_calls, len, auto_reverse) as u32,
        }
    }

    /// Count the finished perform call and compute the next wake-up, or
    /// `None` once the repeat budget is spent.
    pub(crate) fn advance(&mut self, params: &ActivityParams) -> Option<Wakeup> {
        let len = params.key_times.len();
        if len == 0 {
            return None;
        }
        self.perform_calls += 1;

        let mut current_repeat = self.perform_calls as f64 / len as f64;
        if params.auto_reverse {
            current_repeat /= 2.0;
        }
        if !params
            .repeat
            .limit()
            .is_none_or(|limit| current_repeat < limit)
        {
            self.charged = false;
            return None;
        }

        let index = discrete_frame_index(self.perform_calls, len, params.auto_reverse).min(len - 1);
        let repeat = discrete_repeat_count(self.perform_calls, len, params.auto_reverse) as f64;
        let next_time =
            params.min_duration * (repeat + params.accelerated_time(params.key_times[index]));
        self.charged = true;

        Some(Wakeup {
            elapsed: self.wakeup_clock.elapsed_time(),
            next_time,
        })
    }

    pub(crate) fn disarm(&mut self) {
        self.charged = false;
    }

    pub(crate) fn is_charged(&self) -> bool {
        self.charged
    }
}

#[cfg(test)]
#[path = "../../tests/unit/activity/discrete.rs"]
mod tests;
