//! CPAL device discovery and sink creation.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait};

use crate::error::{EngineError, Result};
use crate::nodes::{CpalSink, SinkMonitor};

/// A discovered audio output device.
///
/// Once you have a device, use [`create_sink`](Self::create_sink) to create
/// a [`CpalSink`] node for audio output.
pub struct CpalDevice {
    device: cpal::Device,
    config: cpal::SupportedStreamConfig,

    name: String,
    sample_rate: u32,
    channels: u16,
}

impl CpalDevice {
    /// Get the system's default output device.
    pub fn default_output() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| EngineError::unavailable("no default output device"))?;
        let config = device
            .default_output_config()
            .map_err(|e| EngineError::unavailable(e.to_string()))?;
        let name = device.name().unwrap_or_else(|_| "Unknown".into());

        Ok(Self {
            sample_rate: config.sample_rate().0,
            channels: config.channels(),
            name,
            device,
            config,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Create a sink node that outputs audio to this device.
    ///
    /// The stream is started right away and plays silence until the graph
    /// feeds it.
    pub fn create_sink(&self, monitor: SinkMonitor, suspended: Arc<AtomicBool>) -> Result<CpalSink> {
        CpalSink::new(&self.device, &self.config, monitor, suspended)
    }
}
