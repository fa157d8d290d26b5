//! Built-in audio nodes.
//!
//! ## Sources ([`source`])
//!
//! - [`Sine`] - sine oscillator with exponential frequency ramps
//!
//! ## Effects ([`effect`])
//!
//! - [`StereoPanner`] - equal-power mono to stereo placement
//! - [`Gain`] - summing bus with volume control
//!
//! ## Sinks ([`sink`])
//!
//! - [`CpalSink`] - output to the system audio device (requires `cpal_sink`)
//! - [`RtrbSink`] - write interleaved samples to a ring buffer
//!
//! Continuous parameters (a glide target, the master gain) live in
//! latest-value [`Param`] cells read at block start. One-off commands use
//! the node's message queue ([`SineMessage::Stop`]); sinks use `()`.

pub mod source;
pub mod effect;
pub mod sink;
mod param;

pub use param::{Param, RampTarget};
pub use source::{Sine, SineMessage};
pub use effect::{Gain, StereoPanner};
pub use sink::{RtrbSink, SinkMonitor};

#[cfg(feature = "cpal_sink")]
pub use sink::CpalSink;
