//! Binaural beat sessions on a block-based audio graph.
//!
//! For every base frequency a session plays two sine voices: the base tone
//! hard left and the base tone plus a beat offset hard right. Moving the
//! beat slider glides the right voices to their new pitch; closing the
//! session tears every voice down. A single master gain node sits between
//! the voices and the device and doubles as the mute switch.
//!
//! # Layers
//!
//! - [`BinauralEngine`] - the facade a front end drives
//! - [`ToneSession`], [`MuteControl`], [`AudioDeviceContext`] - session logic,
//!   written against the [`AudioBackend`] capability set
//! - [`GraphBackend`] - the real backend: a [`Renderer`] over a `dasp_graph`
//!   graph of [`nodes`], fed to the device through a lock-free ring buffer
//!
//! # Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "cpal_sink")] {
//! use binaura::{BinauralEngine, EngineConfig, CATALOG};
//!
//! let mut engine = BinauralEngine::with_default_output(EngineConfig::default());
//! engine.open_entry(&CATALOG[0]);
//!
//! loop {
//!     engine.pump();
//!     std::thread::sleep(std::time::Duration::from_micros(500));
//! }
//! # }
//! ```
//!
//! Without the `cpal_sink` feature the graph renders offline into a ring
//! buffer with [`GraphBackend::offline`].

mod error;
mod config;
mod node;
mod graph;
mod renderer;
#[cfg(feature = "cpal_sink")]
mod device;

pub mod nodes;
pub mod backend;
pub mod catalog;
mod context;
mod session;
mod mute;
mod slider;
mod engine;

pub use error::{EngineError, Result};
pub use config::{load_config, EngineConfig};
pub use node::{AudioNode, NodeId, ProcessContext, BLOCK_LEN};
pub use renderer::{Handle, Renderer};
#[cfg(feature = "cpal_sink")]
pub use device::CpalDevice;

pub use backend::{AudioBackend, DeviceState, GraphBackend, GraphVoice, Pan, Voice};
pub use catalog::{parse_frequencies, CatalogEntry, CATALOG};
pub use context::{AudioDeviceContext, Readiness};
pub use session::{TonePair, ToneSession};
pub use mute::{MuteControl, MuteIcon};
pub use slider::BeatSlider;
pub use engine::BinauralEngine;
