//! Engine configuration schema and loader
//!
//! Stored as YAML. Every key is optional; missing keys take the defaults
//! below.
//!
//! ```yaml
//! nominal_gain: 0.05
//! ramp_time_constant_ms: 15.0
//! default_beat_offset: 5
//! beat_min: 1
//! beat_max: 10
//! render_lead_blocks: 8
//! max_voice_secs: ~
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Master gain while unmuted, in [0, 1]
    pub nominal_gain: f32,
    /// Time constant of the exponential retune glide
    pub ramp_time_constant_ms: f32,
    /// Beat offset in Hz the slider starts (and resets) at
    pub default_beat_offset: i32,
    pub beat_min: i32,
    pub beat_max: i32,
    /// Blocks rendered ahead of the device
    pub render_lead_blocks: usize,
    /// Voices finish on their own after this many seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_voice_secs: Option<f32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            nominal_gain: 0.05,
            ramp_time_constant_ms: 15.0,
            default_beat_offset: 5,
            beat_min: 1,
            beat_max: 10,
            render_lead_blocks: 8,
            max_voice_secs: None,
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str::<Self>(yaml)?.normalized())
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// The retune glide time constant. Values that are not a usable
    /// duration (infinite, overflowing) give the default.
    pub fn ramp_time_constant(&self) -> Duration {
        Duration::try_from_secs_f32(self.ramp_time_constant_ms.max(0.0) / 1000.0)
            .unwrap_or_else(|_| Self::default().ramp_time_constant())
    }

    /// Pull out-of-range values back into something usable
    fn normalized(mut self) -> Self {
        let defaults = Self::default();
        if !self.nominal_gain.is_finite() {
            self.nominal_gain = defaults.nominal_gain;
        }
        if !self.ramp_time_constant_ms.is_finite() || self.ramp_time_constant_ms < 0.0 {
            self.ramp_time_constant_ms = defaults.ramp_time_constant_ms;
        }
        self.nominal_gain = self.nominal_gain.clamp(0.0, 1.0);
        if self.beat_min > self.beat_max {
            std::mem::swap(&mut self.beat_min, &mut self.beat_max);
        }
        self.default_beat_offset = self.default_beat_offset.clamp(self.beat_min, self.beat_max);
        self.render_lead_blocks = self.render_lead_blocks.max(1);
        self
    }
}

/// Load configuration from a YAML file
///
/// A missing file gives the defaults. An unreadable or invalid file logs a
/// warning and gives the defaults.
pub fn load_config(path: &Path) -> EngineConfig {
    if !path.exists() {
        info!(?path, "no config file, using defaults");
        return EngineConfig::default();
    }

    let loaded = std::fs::read_to_string(path)
        .map_err(EngineError::from)
        .and_then(|contents| EngineConfig::from_yaml_str(&contents));

    match loaded {
        Ok(config) => {
            info!(?path, "loaded config");
            config
        }
        Err(e) => {
            warn!(?path, "failed to load config: {}", e);
            EngineConfig::default()
        }
    }
}
