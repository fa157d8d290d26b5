//! Error type shared by the graph, the backends and the engine.

use crate::node::NodeId;

/// Result alias carrying [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

/// Everything that can go wrong below the engine facade.
///
/// None of these are fatal: the engine degrades to "no audio" and logs
/// instead of propagating them to the presentation layer.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The output device could not be constructed (unsupported, denied, ...)
    #[error("audio output unavailable: {0}")]
    DeviceUnavailable(String),
    /// The default output device is already claimed by this process
    #[error("audio output already claimed by this process")]
    DeviceBusy,
    /// The voice was already finalized by the device before we acted on it
    #[error("voice already finalized")]
    VoiceFinalized,
    #[error("node {0:?} is not part of the graph")]
    UnknownNode(NodeId),
    #[error("no output sink configured")]
    NoOutput,
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn unavailable<T: Into<String>>(reason: T) -> Self {
        Self::DeviceUnavailable(reason.into())
    }
}
