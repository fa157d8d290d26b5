//! Ring buffer sink for offline rendering and analysis

use dasp_graph::{Buffer, Input};
use rtrb::Producer;

use crate::node::{AudioNode, ProcessContext};

/// A sink that pushes interleaved audio into an rtrb ring buffer
///
/// Blocks that don't fit are dropped whole, never split.
pub struct RtrbSink {
    producer: Producer<f32>,
    channels: usize,
}

impl RtrbSink {
    pub fn new(producer: Producer<f32>, channels: usize) -> Self {
        Self {
            producer,
            channels: channels.max(1),
        }
    }

    pub fn stereo(producer: Producer<f32>) -> Self {
        Self::new(producer, 2)
    }
}

impl AudioNode for RtrbSink {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        _messages: impl Iterator<Item = ()>,
        inputs: &[Input],
        _outputs: &mut [Buffer],
    ) {
        let buffers = match inputs.first() {
            Some(input) if !input.buffers().is_empty() => input.buffers(),
            _ => return,
        };

        let buffer_len = buffers[0].len();
        let samples_needed = buffer_len * self.channels;

        if self.producer.slots() < samples_needed {
            return;
        }

        let mut chunk = match self.producer.write_chunk_uninit(samples_needed) {
            Ok(chunk) => chunk,
            Err(_) => return,
        };
        let (first, second) = chunk.as_mut_slices();
        let slots = first.iter_mut().chain(second.iter_mut());
        for (n, slot) in slots.enumerate() {
            let (frame, ch) = (n / self.channels, n % self.channels);
            let src_ch = ch.min(buffers.len() - 1);
            slot.write(buffers[src_ch][frame]);
        }
        // Safety: every slot of the chunk was written above
        unsafe { chunk.commit_all() };
    }

    #[inline]
    fn num_inputs(&self) -> usize { 1 }

    #[inline]
    fn num_outputs(&self) -> usize { 0 }
}
