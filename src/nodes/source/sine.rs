//! Sine wave oscillator

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dasp_graph::{Buffer, Input};
use crate::node::{AudioNode, ProcessContext};
use crate::nodes::param::RampTarget;

/// Distance from the ramp target, in Hz, below which the glide snaps onto it.
///
/// f32 cannot resolve the last steps of an exponential approach: near 440 Hz
/// the per-sample step drops under half an ulp about 0.01 Hz short.
#[inline]
fn snap_tolerance(target: f32) -> f32 {
    target.abs() * 1e-6 + 1e-3
}

/// Messages to control a Sine oscillator
#[derive(Clone, Copy, Debug)]
pub enum SineMessage {
    /// Halt for good. The oscillator outputs silence from here on.
    Stop,
}

/// A sine wave oscillator (mono source)
///
/// Frequency glides are requested through the [`RampTarget`] from
/// [`ramp_target`](Sine::ramp_target); only the latest request is kept, so a
/// burst of retunes can never be lost to a full queue.
///
/// Once stopped, either by [`SineMessage::Stop`] or by running past its
/// maximum duration, the oscillator is finished and never sounds again. The
/// shared flag from [`finished_flag`](Sine::finished_flag) lets the control
/// thread see that without talking to the audio thread.
pub struct Sine {
    frequency: f32,
    target: f32,
    time_constant: f32,
    ramp: RampTarget,
    phase: f32,
    amplitude: f32,
    max_duration: Option<f32>,
    remaining: Option<u64>,
    finished: Arc<AtomicBool>,
}

impl Sine {
    pub fn new(frequency: f32) -> Self {
        let frequency = frequency.max(0.0);
        Self {
            frequency,
            target: frequency,
            time_constant: 0.0,
            ramp: RampTarget::new(),
            phase: 0.0,
            amplitude: 0.25, // -12dB, safe default
            max_duration: None,
            remaining: None,
            finished: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude.clamp(0.0, 1.0);
        self
    }

    /// Finish on its own after `secs` seconds of output
    pub fn with_max_duration(mut self, secs: f32) -> Self {
        self.max_duration = Some(secs.max(0.0));
        self
    }

    #[inline]
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Shared view of the finished state
    pub fn finished_flag(&self) -> Arc<AtomicBool> {
        self.finished.clone()
    }

    /// Control side of the frequency glide; picked up at the next block
    pub fn ramp_target(&self) -> RampTarget {
        self.ramp.clone()
    }

    fn finish(&mut self) {
        self.finished.store(true, Ordering::Release);
    }
}

impl AudioNode for Sine {
    type Message = SineMessage;

    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = SineMessage>,
        _inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for msg in messages {
            match msg {
                SineMessage::Stop => self.finish(),
            }
        }

        if let Some((target, time_constant)) = self.ramp.take() {
            self.target = target.max(0.0);
            self.time_constant = time_constant.max(0.0);
        }

        // Convert the duration on first run, the sample rate is unknown before
        if let (Some(secs), None) = (self.max_duration, self.remaining) {
            self.remaining = Some((secs * ctx.sample_rate as f32) as u64);
        }

        let (first, rest) = match outputs.split_first_mut() {
            Some(split) => split,
            None => return,
        };

        if self.is_finished() {
            first.iter_mut().for_each(|s| *s = 0.0);
        } else {
            let sample_rate = ctx.sample_rate as f32;
            let coeff = if self.time_constant > 0.0 {
                (-1.0 / (self.time_constant * sample_rate)).exp()
            } else {
                0.0
            };
            let tolerance = snap_tolerance(self.target);

            for out in first.iter_mut() {
                if let Some(remaining) = self.remaining.as_mut() {
                    if *remaining == 0 {
                        *out = 0.0;
                        continue;
                    }
                    *remaining -= 1;
                }

                if self.frequency != self.target {
                    let next = self.target + coeff * (self.frequency - self.target);
                    self.frequency = if next == self.frequency || (next - self.target).abs() < tolerance {
                        self.target
                    } else {
                        next
                    };
                }

                *out = (self.phase * core::f32::consts::TAU).sin() * self.amplitude;

                self.phase += self.frequency / sample_rate;
                // Branchless phase wrap (phase is always positive)
                self.phase -= (self.phase >= 1.0) as u32 as f32;
            }

            if self.remaining == Some(0) {
                self.finish();
            }
        }

        for buffer in rest.iter_mut() {
            buffer.copy_from_slice(first);
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 0 }

    #[inline]
    fn num_outputs(&self) -> usize { 1 }
}
