//! Gain/volume control effect

use dasp_graph::{Buffer, Input};
use crate::node::{AudioNode, ProcessContext};
use crate::nodes::param::Param;

/// A stereo summing bus with a volume control
///
/// Every connected input is summed and then scaled. Mono inputs are copied
/// to both output channels. The gain lives in a shared [`Param`]: a new value
/// from [`control`](Gain::control) applies to the whole next block, and
/// only the newest value written before that block matters.
pub struct Gain {
    gain: Param,
}

impl Gain {
    pub fn new(gain: f32) -> Self {
        Self {
            gain: Param::new(gain),
        }
    }

    /// Control side of the gain value
    pub fn control(&self) -> Param {
        self.gain.clone()
    }

    #[inline]
    pub fn gain(&self) -> f32 {
        self.gain.get()
    }
}

impl AudioNode for Gain {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        _messages: impl Iterator<Item = ()>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for buffer in outputs.iter_mut() {
            buffer.iter_mut().for_each(|s| *s = 0.0);
        }

        // Sum every input onto the outputs
        for input in inputs {
            let in_buffers = input.buffers();
            if in_buffers.is_empty() {
                continue;
            }
            for (ch, out_buffer) in outputs.iter_mut().enumerate() {
                let in_buffer = &in_buffers[ch.min(in_buffers.len() - 1)];
                for (out_sample, in_sample) in out_buffer.iter_mut().zip(in_buffer.iter()) {
                    *out_sample += *in_sample;
                }
            }
        }

        let gain = self.gain.get();
        for out_buffer in outputs.iter_mut() {
            out_buffer.iter_mut().for_each(|s| *s *= gain);
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { usize::MAX }

    #[inline]
    fn num_outputs(&self) -> usize { 2 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::BLOCK_LEN;

    const CTX: ProcessContext = ProcessContext {
        sample_rate: 48_000,
        buffer_size: BLOCK_LEN,
    };

    #[test]
    fn no_inputs_is_silence() {
        let mut gain = Gain::new(1.0);
        let mut out = [Buffer::default(), Buffer::default()];
        out[0].iter_mut().for_each(|s| *s = 0.5);
        gain.process(&CTX, core::iter::empty(), &[], &mut out);
        assert!(out.iter().all(|b| b.iter().all(|&s| s == 0.0)));
    }

    #[test]
    fn control_writes_reach_the_node() {
        let gain = Gain::new(1.0);
        let control = gain.control();
        for i in 0..200 {
            control.set(if i % 2 == 0 { 0.0 } else { 0.05 });
        }
        control.set(0.0);
        assert_eq!(gain.gain(), 0.0);
    }
}
