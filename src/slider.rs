//! The beat-rate slider.

use std::time::Duration;

use crate::config::EngineConfig;

/// Integer slider over an inclusive range. Input outside the range is clamped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BeatSlider {
    value: i32,
    min: i32,
    max: i32,
    default: i32,
}

impl BeatSlider {
    pub fn new(min: i32, max: i32, default: i32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let default = default.clamp(min, max);
        Self {
            value: default,
            min,
            max,
            default,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.beat_min, config.beat_max, config.default_beat_offset)
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn range(&self) -> (i32, i32) {
        (self.min, self.max)
    }

    /// Move the slider, returning where it landed
    pub fn set(&mut self, value: i32) -> i32 {
        self.value = value.clamp(self.min, self.max);
        self.value
    }

    pub fn reset(&mut self) {
        self.value = self.default;
    }

    /// Period of the pulse animation: faster beats pulse faster.
    ///
    /// The top of the range pulses once a second, each step down adds one.
    pub fn pulse_period(&self) -> Duration {
        // Widened: the range may span all of i32
        Duration::from_secs((i64::from(self.max) + 1 - i64::from(self.value)) as u64)
    }
}

impl Default for BeatSlider {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}
