use crate::foundation::check::check;

/// Distance used in place of a zero-length key stop segment.
const MIN_SEGMENT_LENGTH: f64 = 0.001;

/// Position inside a key stop vector: segment index plus fraction in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LerpPosition {
    pub index: usize,
    pub fraction: f64,
}

/// Maps a global alpha onto segments of a key stop vector.
///
/// The segment cursor only moves forward for increasing alpha; a smaller alpha
/// rescans from the first segment. Call [`KeyStopLerp::reset`] before reuse.
#[derive(Clone, Debug)]
pub struct KeyStopLerp {
    key_stops: Vec<f64>,
    last_index: usize,
    segment_length: f64,
}

impl KeyStopLerp {
    pub fn new(key_stops: Vec<f64>) -> Self {
        let key_stops = if check(
            key_stops.len() > 1,
            "key stop vector needs at least two entries",
        ) {
            key_stops
        } else {
            vec![0.0, 1.0]
        };
        check(
            Self::is_ascending(&key_stops),
            "key stop vector is not sorted in ascending order",
        );

        let mut lerp = Self {
            key_stops,
            last_index: 0,
            segment_length: 0.0,
        };
        lerp.reset();
        lerp
    }

    pub fn is_ascending(key_stops: &[f64]) -> bool {
        key_stops.windows(2).all(|w| w[0] <= w[1])
    }

    pub fn key_stops(&self) -> &[f64] {
        &self.key_stops
    }

    pub fn reset(&mut self) {
        self.last_index = 0;
        self.segment_length = self.key_stops[1] - self.key_stops[0];
    }

    pub fn lerp(&mut self, alpha: f64) -> LerpPosition {
        let last_segment = self.key_stops.len() - 2;

        if self.last_index > 0 && alpha < self.key_stops[self.last_index] {
            self.reset();
        }

        while self.last_index < last_segment && alpha > self.key_stops[self.last_index + 1] {
            self.last_index += 1;
            self.segment_length =
                self.key_stops[self.last_index + 1] - self.key_stops[self.last_index];
        }

        let length = if self.segment_length > 0.0 {
            self.segment_length
        } else {
            MIN_SEGMENT_LENGTH
        };
        let raw = (alpha - self.key_stops[self.last_index]) / length;

        LerpPosition {
            index: self.last_index,
            fraction: raw.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/lerp.rs"]
mod tests;
