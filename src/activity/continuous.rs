use crate::clock::{ElapsedTime, SharedClock};
use crate::lerp::KeyStopLerp;

use super::{ActivityParams, Frame};

pub(crate) struct ContinuousTiming {
    clock: ElapsedTime,
    perform_calls: u64,
    lerp: Option<KeyStopLerp>,
}

impl ContinuousTiming {
    pub(crate) fn new(master: &SharedClock, key_stops: Option<Vec<f64>>) -> Self {
        Self {
            clock: ElapsedTime::with_parent(master.clone()),
            perform_calls: 0,
            lerp: key_stops.map(KeyStopLerp::new),
        }
    }

    pub(crate) fn activate(&mut self) {
        self.perform_calls = 0;
        if let Some(lerp) = &mut self.lerp {
            lerp.reset();
        }
    }

    pub(crate) fn start(&mut self) {
        self.clock.reset();
    }

    pub(crate) fn time_lag(&self, params: &ActivityParams) -> f64 {
        let elapsed_fraction = self.clock.elapsed_time() / params.min_duration;
        let required_fraction = self.perform_calls as f64 / params.min_frame_count;
        if elapsed_fraction < required_fraction {
            0.0
        } else {
            (elapsed_fraction - required_fraction) * params.min_duration
        }
    }

    /// Compute this tick's frame. The flag is set once the repeat budget is spent.
    pub(crate) fn step(&mut self, params: &ActivityParams) -> (Frame, bool) {
        let limit = params.repeat.limit();
        let mut t = self.clock.elapsed_time() / params.min_duration;
        let mut ending = false;
        if let Some(limit) = limit {
            let effective = if params.auto_reverse {
                2.0 * limit
            } else {
                limit
            };
            if effective <= t {
                ending = true;
                t = effective;
            }
        }

        let mut repeats = t.floor();
        let mut simple_time = t - repeats;
        if params.auto_reverse {
            if (repeats as u64) % 2 == 1 {
                simple_time = 1.0 - simple_time;
            }
            repeats = (repeats / 2.0).floor();
        } else if limit.is_some_and(|limit| repeats >= limit) {
            simple_time = 1.0;
            repeats -= 1.0;
        }

        self.perform_calls += 1;
        let alpha = params.accelerated_time(simple_time);
        let repeat = repeats.max(0.0) as u32;
        let frame = match &mut self.lerp {
            Some(lerp) => {
                let pos = lerp.lerp(alpha);
                Frame::KeyTime {
                    index: pos.index,
                    fraction: pos.fraction,
                    repeat,
                }
            }
            None => Frame::Continuous { t: alpha, repeat },
        };
        (frame, ending)
    }
}
