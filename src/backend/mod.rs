//! The capability set session logic needs from an audio device.
//!
//! [`GraphBackend`] implements it on the real node graph. Session, mute and
//! context logic only ever see these traits, so they run just as well against
//! a fake device.

use std::time::Duration;

use crate::error::Result;

mod graph;
#[cfg(test)]
pub(crate) mod fake;

pub use graph::{GraphBackend, GraphVoice};

/// Power state of the output device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceState {
    Running,
    Suspended,
}

/// Where a voice sits in the stereo field. Only the hard extremes exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pan {
    Left,
    Right,
}

impl Pan {
    /// Panner position in [-1, 1]
    pub fn position(self) -> f32 {
        match self {
            Pan::Left => -1.0,
            Pan::Right => 1.0,
        }
    }
}

/// A running sine voice panned to one ear.
pub trait Voice {
    /// The last frequency requested for this voice, in Hz
    fn frequency(&self) -> f32;

    fn pan(&self) -> Pan;

    /// Glide toward `target` Hz with an exponential approach.
    ///
    /// Never restarts the oscillator.
    fn ramp_frequency(&mut self, target: f32, time_constant: Duration) -> Result<()>;
}

/// An output device with a single master volume node.
pub trait AudioBackend {
    type Voice: Voice;

    fn state(&self) -> DeviceState;

    fn resume(&mut self) -> Result<()>;

    fn suspend(&mut self) -> Result<()>;

    /// Set the master gain immediately, no ramp
    fn set_master_gain(&mut self, gain: f32);

    fn master_gain(&self) -> f32;

    /// Start a sine voice at `frequency`, panned by `pan`, routed through the
    /// master volume node.
    fn spawn_voice(&mut self, frequency: f32, pan: Pan) -> Result<Self::Voice>;

    /// Halt and disconnect a voice.
    ///
    /// The voice is gone afterwards either way. [`EngineError::VoiceFinalized`]
    /// reports that the device had already finished it on its own.
    ///
    /// [`EngineError::VoiceFinalized`]: crate::EngineError::VoiceFinalized
    fn release_voice(&mut self, voice: Self::Voice) -> Result<()>;

    /// Voices currently connected to the master node
    fn live_voices(&self) -> usize;
}
