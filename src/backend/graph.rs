//! The real device: voices as nodes in the block-processing graph.
//!
//! Every voice is a `Sine -> StereoPanner` chain feeding one master [`Gain`]
//! bus, which feeds the output sink:
//!
//! ```text
//! Sine(432) -> Panner(-1) --+
//! Sine(437) -> Panner(+1) --+--> Gain(master) --> sink
//! ...                     --+
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rtrb::{Consumer, RingBuffer};
use tracing::warn;

use super::{AudioBackend, DeviceState, Pan, Voice};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::node::BLOCK_LEN;
use crate::nodes::{Gain, Param, RampTarget, RtrbSink, Sine, SineMessage, SinkMonitor, StereoPanner};
use crate::renderer::{Handle, Renderer};

/// Set while a [`GraphBackend`] holds the default output device.
#[cfg_attr(not(feature = "cpal_sink"), allow(dead_code))]
static OUTPUT_CLAIMED: AtomicBool = AtomicBool::new(false);

/// One oscillator and its panner, both owned by the graph.
pub struct GraphVoice {
    sine: Handle<SineMessage>,
    panner: Handle<()>,
    ramp: RampTarget,
    frequency: f32,
    pan: Pan,
    finished: Arc<AtomicBool>,
}

impl GraphVoice {
    /// Whether the oscillator already finished on its own
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }
}

impl Voice for GraphVoice {
    fn frequency(&self) -> f32 {
        self.frequency
    }

    fn pan(&self) -> Pan {
        self.pan
    }

    fn ramp_frequency(&mut self, target: f32, time_constant: Duration) -> Result<()> {
        if self.is_finished() {
            return Err(EngineError::VoiceFinalized);
        }
        // Overwrites any glide the graph hasn't picked up yet
        self.ramp.set(target, time_constant.as_secs_f32());
        self.frequency = target;
        Ok(())
    }
}

/// [`AudioBackend`] on top of the node graph.
///
/// The graph is rendered on the caller's thread: call [`pump`](Self::pump)
/// from the host loop (device output) or [`render`](Self::render) (offline).
/// The device thread only ever pops finished samples from a ring buffer.
pub struct GraphBackend {
    renderer: Renderer,
    master: Handle<()>,
    master_gain: Param,
    suspended: Arc<AtomicBool>,
    monitor: Option<SinkMonitor>,
    lead_blocks: usize,
    max_voice_secs: Option<f32>,
    voices: usize,
}

impl GraphBackend {
    fn with_renderer(
        mut renderer: Renderer,
        suspended: Arc<AtomicBool>,
        monitor: Option<SinkMonitor>,
    ) -> Result<Self> {
        let gain = Gain::new(1.0);
        let master_gain = gain.control();
        let master = renderer.add(gain);
        renderer.output(&master)?;

        Ok(Self {
            renderer,
            master,
            master_gain,
            suspended,
            monitor,
            lead_blocks: EngineConfig::default().render_lead_blocks,
            max_voice_secs: None,
            voices: 0,
        })
    }

    /// Open the system's default output device.
    ///
    /// Only one backend per process may hold the device; a second call fails
    /// with [`EngineError::DeviceBusy`]. The device is never released.
    #[cfg(feature = "cpal_sink")]
    pub fn default_output(config: &EngineConfig) -> Result<Self> {
        if OUTPUT_CLAIMED.swap(true, Ordering::AcqRel) {
            return Err(EngineError::DeviceBusy);
        }

        let opened = Self::open_default(config);
        if opened.is_err() {
            OUTPUT_CLAIMED.store(false, Ordering::Release);
        }
        opened
    }

    #[cfg(feature = "cpal_sink")]
    fn open_default(config: &EngineConfig) -> Result<Self> {
        let device = crate::device::CpalDevice::default_output()?;
        let monitor = SinkMonitor::new();
        let suspended = Arc::new(AtomicBool::new(false));
        let sink = device.create_sink(monitor.clone(), suspended.clone())?;

        tracing::debug!(
            device = device.name(),
            sample_rate = device.sample_rate(),
            channels = device.channels(),
            "opened output device"
        );

        let renderer = Renderer::new(device.sample_rate())
            .with_channels(device.channels() as usize)
            .with_output(sink);
        Ok(Self::with_renderer(renderer, suspended, Some(monitor))?.with_config(config))
    }

    /// A stereo backend that renders into a ring buffer instead of a device.
    ///
    /// `capacity` is in interleaved samples. Blocks that don't fit are dropped.
    pub fn offline(sample_rate: u32, capacity: usize) -> Result<(Self, Consumer<f32>)> {
        let (producer, consumer) = RingBuffer::new(capacity);
        let renderer = Renderer::new(sample_rate)
            .with_channels(2)
            .with_output(RtrbSink::stereo(producer));
        let backend = Self::with_renderer(renderer, Arc::new(AtomicBool::new(false)), None)?;
        Ok((backend, consumer))
    }

    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.lead_blocks = config.render_lead_blocks.max(1);
        self.max_voice_secs = config.max_voice_secs;
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.renderer.sample_rate()
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn monitor(&self) -> Option<&SinkMonitor> {
        self.monitor.as_ref()
    }

    /// Keep the device fed. Renders just enough blocks to stay
    /// `render_lead_blocks` ahead of what the device has consumed.
    ///
    /// Does nothing while suspended or without a device.
    pub fn pump(&mut self) -> usize {
        if self.is_suspended() {
            return 0;
        }
        let consumed = match &self.monitor {
            Some(monitor) => monitor.samples_consumed() as u64,
            None => return 0,
        };
        let lead = (self.lead_blocks * BLOCK_LEN * self.renderer.channels()) as u64;
        self.renderer.render_until(consumed + lead)
    }

    /// Render a fixed number of blocks. Does nothing while suspended.
    pub fn render(&mut self, blocks: usize) -> usize {
        if self.is_suspended() {
            return 0;
        }
        for _ in 0..blocks {
            self.renderer.process();
        }
        blocks
    }

    fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::Relaxed)
    }

    fn wire(&mut self, sine: &Handle<SineMessage>, panner: &Handle<()>) -> Result<()> {
        self.renderer.connect(sine, panner)?;
        self.renderer.connect(panner, &self.master)
    }
}

impl AudioBackend for GraphBackend {
    type Voice = GraphVoice;

    fn state(&self) -> DeviceState {
        if self.is_suspended() {
            DeviceState::Suspended
        } else {
            DeviceState::Running
        }
    }

    fn resume(&mut self) -> Result<()> {
        self.suspended.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn suspend(&mut self) -> Result<()> {
        self.suspended.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn set_master_gain(&mut self, gain: f32) {
        self.master_gain.set(gain.clamp(0.0, 1.0));
    }

    fn master_gain(&self) -> f32 {
        self.master_gain.get()
    }

    fn spawn_voice(&mut self, frequency: f32, pan: Pan) -> Result<GraphVoice> {
        let mut sine = Sine::new(frequency).with_amplitude(1.0);
        if let Some(secs) = self.max_voice_secs {
            sine = sine.with_max_duration(secs);
        }
        let finished = sine.finished_flag();
        let ramp = sine.ramp_target();

        let sine = self.renderer.add(sine);
        let panner = self.renderer.add(StereoPanner::new(pan.position()));

        if let Err(e) = self.wire(&sine, &panner) {
            let _ = self.renderer.remove(&sine);
            let _ = self.renderer.remove(&panner);
            return Err(e);
        }

        self.voices += 1;
        Ok(GraphVoice {
            sine,
            panner,
            ramp,
            frequency,
            pan,
            finished,
        })
    }

    fn release_voice(&mut self, mut voice: GraphVoice) -> Result<()> {
        let already_finished = voice.is_finished();

        // Halt, then disconnect
        if voice.sine.send(SineMessage::Stop).is_err() {
            warn!("stop queue full, removing voice anyway");
        }
        let removed_sine = self.renderer.remove(&voice.sine);
        let removed_panner = self.renderer.remove(&voice.panner);
        self.voices = self.voices.saturating_sub(1);
        removed_sine.and(removed_panner)?;

        if already_finished {
            return Err(EngineError::VoiceFinalized);
        }
        Ok(())
    }

    fn live_voices(&self) -> usize {
        self.voices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voices_add_and_remove_graph_nodes() {
        let (mut backend, _out) = GraphBackend::offline(48_000, 1 << 12).unwrap();
        // sink + master
        assert_eq!(backend.renderer().node_count(), 2);

        let voice = backend.spawn_voice(432.0, Pan::Left).unwrap();
        assert_eq!(backend.renderer().node_count(), 4);
        assert_eq!(backend.live_voices(), 1);

        backend.release_voice(voice).unwrap();
        assert_eq!(backend.renderer().node_count(), 2);
        assert_eq!(backend.live_voices(), 0);
    }

    #[test]
    fn finished_voice_releases_with_finalized_error() {
        let config = EngineConfig {
            max_voice_secs: Some(0.001),
            ..EngineConfig::default()
        };
        let (backend, _out) = GraphBackend::offline(48_000, 1 << 12).unwrap();
        let mut backend = backend.with_config(&config);

        let voice = backend.spawn_voice(432.0, Pan::Right).unwrap();
        backend.render(4);
        assert!(voice.is_finished());
        assert!(matches!(
            backend.release_voice(voice),
            Err(EngineError::VoiceFinalized)
        ));
        assert_eq!(backend.renderer().node_count(), 2);
    }

    #[test]
    fn suspended_backend_renders_nothing() {
        let (mut backend, _out) = GraphBackend::offline(48_000, 1 << 12).unwrap();
        backend.suspend().unwrap();
        assert_eq!(backend.state(), DeviceState::Suspended);
        assert_eq!(backend.render(3), 0);

        backend.resume().unwrap();
        assert_eq!(backend.state(), DeviceState::Running);
        assert_eq!(backend.render(3), 3);
    }

    #[test]
    fn offline_pump_is_a_no_op() {
        let (mut backend, _out) = GraphBackend::offline(48_000, 1 << 12).unwrap();
        assert_eq!(backend.pump(), 0);
    }

    #[test]
    fn master_gain_is_clamped() {
        let (mut backend, _out) = GraphBackend::offline(48_000, 1 << 12).unwrap();
        backend.set_master_gain(3.0);
        assert_eq!(backend.master_gain(), 1.0);
    }

    #[test]
    fn burst_of_gain_updates_keeps_the_last() {
        let (mut backend, mut out) = GraphBackend::offline(48_000, 1 << 12).unwrap();
        let _voice = backend.spawn_voice(480.0, Pan::Left).unwrap();
        // Far more updates than a message queue holds, none rendered in between
        for i in 0..256 {
            backend.set_master_gain(if i % 2 == 0 { 0.5 } else { 0.0 });
        }
        assert_eq!(backend.master_gain(), 0.0);
        backend.set_master_gain(0.5);

        backend.render(1);
        let peak = std::iter::from_fn(|| out.pop().ok()).fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak > 0.4 && peak <= 0.5, "peak {}", peak);
    }

    #[test]
    fn burst_of_ramps_is_never_rejected() {
        let (mut backend, _out) = GraphBackend::offline(48_000, 1 << 12).unwrap();
        let mut voice = backend.spawn_voice(480.0, Pan::Right).unwrap();
        for i in 0..256 {
            let target = if i % 2 == 0 { 483.0 } else { 489.0 };
            voice.ramp_frequency(target, Duration::from_millis(15)).unwrap();
        }
        voice.ramp_frequency(488.0, Duration::from_millis(15)).unwrap();
        assert_eq!(voice.frequency(), 488.0);
        backend.render(4);
        backend.release_voice(voice).unwrap();
    }
}
