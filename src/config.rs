use serde::{Deserialize, Serialize};

use crate::foundation::error::{SlideplayError, SlideplayResult};

/// Playback tuning. Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideShowConfig {
    /// Lower bound on frames per second for nodes and transitions.
    pub minimum_frames_per_second: f64,
    /// Caps the update rate; the minimum timeout is its inverse.
    pub maximum_frame_count: f64,
    /// Longest wait between updates while only timer events are pending.
    pub maximum_timeout: f64,
    /// Step rate used when simulating playback.
    pub preferred_frames_per_second: f64,
    pub slide_transitions: bool,
    /// Honor per-slide `nextSlideDuration`.
    pub auto_advance: bool,
}

impl Default for SlideShowConfig {
    fn default() -> Self {
        Self {
            minimum_frames_per_second: 10.0,
            maximum_frame_count: 60.0,
            maximum_timeout: 4.0,
            preferred_frames_per_second: 50.0,
            slide_transitions: true,
            auto_advance: true,
        }
    }
}

impl SlideShowConfig {
    pub fn from_json(text: &str) -> SlideplayResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn minimum_timeout(&self) -> f64 {
        1.0 / self.maximum_frame_count
    }

    pub fn validate(&self) -> SlideplayResult<()> {
        let rates = [
            ("minimum_frames_per_second", self.minimum_frames_per_second),
            ("maximum_frame_count", self.maximum_frame_count),
            ("maximum_timeout", self.maximum_timeout),
            ("preferred_frames_per_second", self.preferred_frames_per_second),
        ];
        for (name, value) in rates {
            if !(value.is_finite() && value > 0.0) {
                return Err(SlideplayError::validation(format!(
                    "{name} must be > 0, got {value}"
                )));
            }
        }
        if self.maximum_timeout < self.minimum_timeout() {
            return Err(SlideplayError::validation(
                "maximum_timeout must not be below 1 / maximum_frame_count",
            ));
        }
        Ok(())
    }
}
