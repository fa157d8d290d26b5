//! Lazily opened, never closed, output device.

use tracing::{debug, warn};

use crate::backend::{AudioBackend, DeviceState};
use crate::error::Result;

/// Outcome of [`AudioDeviceContext::ensure_ready`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    /// The device was constructed by this very call
    Opened,
    /// The device already existed
    Ready,
    /// Construction failed, now or earlier. Permanent.
    Unavailable,
}

enum DeviceSlot<B> {
    Unopened,
    Open(B),
    Unavailable,
}

type Opener<B> = Box<dyn FnMut() -> Result<B>>;

/// Holds the process's one output device and its master volume node.
///
/// The device is built on the first [`ensure_ready`](Self::ensure_ready) by
/// the opener passed at construction. If that fails the context is
/// unavailable for good and every later call is a no-op. There is no
/// teardown.
pub struct AudioDeviceContext<B: AudioBackend> {
    slot: DeviceSlot<B>,
    opener: Opener<B>,
}

impl<B: AudioBackend> AudioDeviceContext<B> {
    pub fn new<F>(opener: F) -> Self
    where
        F: FnMut() -> Result<B> + 'static,
    {
        Self {
            slot: DeviceSlot::Unopened,
            opener: Box::new(opener),
        }
    }

    /// Open the device on first use; later, resume it if suspended.
    pub fn ensure_ready(&mut self) -> Readiness {
        if let DeviceSlot::Unopened = self.slot {
            let (slot, readiness) = match (self.opener)() {
                Ok(backend) => {
                    debug!("audio output opened");
                    (DeviceSlot::Open(backend), Readiness::Opened)
                }
                Err(e) => {
                    warn!("audio output unavailable, sessions disabled: {}", e);
                    (DeviceSlot::Unavailable, Readiness::Unavailable)
                }
            };
            self.slot = slot;
            return readiness;
        }

        match &mut self.slot {
            DeviceSlot::Open(backend) => {
                resume_if_suspended(backend);
                Readiness::Ready
            }
            _ => Readiness::Unavailable,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.slot, DeviceSlot::Open(_))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self.slot, DeviceSlot::Unavailable)
    }

    pub fn backend(&self) -> Option<&B> {
        match &self.slot {
            DeviceSlot::Open(backend) => Some(backend),
            _ => None,
        }
    }

    pub fn backend_mut(&mut self) -> Option<&mut B> {
        match &mut self.slot {
            DeviceSlot::Open(backend) => Some(backend),
            _ => None,
        }
    }

    /// Resume the device if it exists and is suspended
    pub fn resume_if_suspended(&mut self) {
        if let Some(backend) = self.backend_mut() {
            resume_if_suspended(backend);
        }
    }

    /// Set the master volume immediately, clamped to [0, 1].
    ///
    /// No-op when no device exists.
    pub fn set_volume(&mut self, level: f32) {
        if let Some(backend) = self.backend_mut() {
            backend.set_master_gain(level.clamp(0.0, 1.0));
        }
    }

    /// Current master volume, if a device exists
    pub fn volume(&self) -> Option<f32> {
        self.backend().map(|backend| backend.master_gain())
    }
}

fn resume_if_suspended<B: AudioBackend>(backend: &mut B) {
    if backend.state() == DeviceState::Suspended {
        if let Err(e) = backend.resume() {
            warn!("failed to resume audio output: {}", e);
        }
    }
}
