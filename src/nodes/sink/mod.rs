//! Audio sink nodes (consumers with no audio outputs)

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[cfg(feature = "cpal_sink")]
mod cpal_sink;
mod rtrb_sink;

#[cfg(feature = "cpal_sink")]
pub use cpal_sink::CpalSink;
pub use rtrb_sink::RtrbSink;

/// Counters a device sink shares with the control thread.
///
/// Cloning is cheap; every clone observes the same device.
#[derive(Clone, Debug, Default)]
pub struct SinkMonitor {
    samples_consumed: Arc<AtomicUsize>,
    had_underrun: Arc<AtomicBool>,
}

impl SinkMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interleaved samples the device has pulled so far
    #[inline]
    pub fn samples_consumed(&self) -> usize {
        self.samples_consumed.load(Ordering::Relaxed)
    }

    /// Check and clear the underrun flag
    pub fn check_underrun(&self) -> bool {
        self.had_underrun.swap(false, Ordering::Relaxed)
    }

    #[cfg_attr(not(feature = "cpal_sink"), allow(dead_code))]
    pub(crate) fn record(&self, consumed: usize, underrun: bool) {
        if underrun {
            self.had_underrun.store(true, Ordering::Relaxed);
        }
        self.samples_consumed.fetch_add(consumed, Ordering::Relaxed);
    }
}
