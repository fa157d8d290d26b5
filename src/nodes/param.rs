//! Latest-value parameter cells shared between the control side and a node.
//!
//! A message queue keeps every update and can fill up; for a parameter only
//! the newest value matters. A [`Param`] holds that one value, overwritten by
//! every [`set`](Param::set) and picked up by the node at its next block.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// An `f32` readable from the audio side, writable from the control side.
#[derive(Clone, Debug)]
pub struct Param {
    bits: Arc<AtomicU32>,
}

impl Param {
    pub fn new(value: f32) -> Self {
        Self {
            bits: Arc::new(AtomicU32::new(value.to_bits())),
        }
    }

    #[inline]
    pub fn set(&self, value: f32) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

/// Pending frequency glide: target plus time constant, newest request wins.
#[derive(Clone, Debug)]
pub struct RampTarget {
    target: Param,
    time_constant: Param,
    pending: Arc<AtomicBool>,
}

impl RampTarget {
    pub fn new() -> Self {
        Self {
            target: Param::new(0.0),
            time_constant: Param::new(0.0),
            pending: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request a glide toward `target` Hz, replacing any request not yet seen
    pub fn set(&self, target: f32, time_constant: f32) {
        self.target.set(target);
        self.time_constant.set(time_constant);
        self.pending.store(true, Ordering::Release);
    }

    /// The request posted since the last call, if any
    pub fn take(&self) -> Option<(f32, f32)> {
        if self.pending.swap(false, Ordering::Acquire) {
            Some((self.target.get(), self.time_constant.get()))
        } else {
            None
        }
    }
}

impl Default for RampTarget {
    fn default() -> Self {
        Self::new()
    }
}
