//! What a front end drives: open an entry, move the slider, close, mute.

use tracing::debug;

use crate::backend::AudioBackend;
use crate::catalog::CatalogEntry;
use crate::config::EngineConfig;
use crate::context::{AudioDeviceContext, Readiness};
use crate::error::Result;
use crate::mute::{MuteControl, MuteIcon};
use crate::session::ToneSession;
use crate::slider::BeatSlider;

/// Device context, tone session, mute control and beat slider wired together.
///
/// ```no_run
/// # #[cfg(feature = "cpal_sink")] {
/// use binaura::{BinauralEngine, EngineConfig, CATALOG};
///
/// let mut engine = BinauralEngine::with_default_output(EngineConfig::default());
/// engine.open_entry(&CATALOG[0]);
/// engine.slide(8);
/// engine.close();
/// # }
/// ```
pub struct BinauralEngine<B: AudioBackend> {
    context: AudioDeviceContext<B>,
    session: ToneSession<B::Voice>,
    mute: MuteControl,
    slider: BeatSlider,
    config: EngineConfig,
}

impl<B: AudioBackend> BinauralEngine<B> {
    /// The device is not opened until the first [`open`](Self::open).
    pub fn new<F>(config: EngineConfig, opener: F) -> Self
    where
        F: FnMut() -> Result<B> + 'static,
    {
        Self {
            context: AudioDeviceContext::new(opener),
            session: ToneSession::new(config.default_beat_offset, config.ramp_time_constant()),
            mute: MuteControl::new(config.nominal_gain),
            slider: BeatSlider::from_config(&config),
            config,
        }
    }

    /// Start a session on `frequencies` at the slider's current beat offset.
    pub fn open(&mut self, frequencies: &[f32]) {
        match self.context.ensure_ready() {
            Readiness::Opened => self.mute.apply(&mut self.context),
            Readiness::Ready => {}
            Readiness::Unavailable => self.mute.disable(),
        }
        self.session
            .start(&mut self.context, frequencies, self.slider.value());
    }

    pub fn open_entry(&mut self, entry: &CatalogEntry) {
        debug!(entry = entry.name, label = entry.frequency, "opening entry");
        self.open(&entry.frequencies());
    }

    /// Move the slider and retune the live session. Returns the value the
    /// slider landed on.
    pub fn slide(&mut self, value: i32) -> i32 {
        let value = self.slider.set(value);
        self.session.retune(value);
        value
    }

    /// Stop the session and put the slider back to its default.
    pub fn close(&mut self) {
        self.session.stop(&mut self.context);
        self.slider.reset();
    }

    /// Returns the new mute state
    pub fn toggle_mute(&mut self) -> bool {
        self.mute.toggle(&mut self.context)
    }

    pub fn is_muted(&self) -> bool {
        self.mute.is_muted()
    }

    /// False once the device failed to open
    pub fn mute_enabled(&self) -> bool {
        self.mute.is_enabled()
    }

    pub fn mute_icon(&self) -> MuteIcon {
        self.mute.icon()
    }

    pub fn session(&self) -> &ToneSession<B::Voice> {
        &self.session
    }

    pub fn context(&self) -> &AudioDeviceContext<B> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut AudioDeviceContext<B> {
        &mut self.context
    }

    pub fn slider(&self) -> &BeatSlider {
        &self.slider
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(feature = "cpal_sink")]
impl BinauralEngine<crate::backend::GraphBackend> {
    /// An engine on the system's default output device.
    ///
    /// Opening happens lazily; if it fails the engine stays usable with
    /// sessions and mute disabled.
    pub fn with_default_output(config: EngineConfig) -> Self {
        let device_config = config.clone();
        Self::new(config, move || {
            crate::backend::GraphBackend::default_output(&device_config)
        })
    }

    /// Keep the device fed; call this regularly from the host loop.
    pub fn pump(&mut self) -> usize {
        self.context
            .backend_mut()
            .map_or(0, |backend| backend.pump())
    }
}
