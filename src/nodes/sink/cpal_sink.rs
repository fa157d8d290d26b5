//! CPAL audio output sink

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample, SupportedStreamConfig};
use dasp_graph::{Buffer, Input};
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, error};

use super::SinkMonitor;
use crate::error::{EngineError, Result};
use crate::node::{AudioNode, ProcessContext};

/// A sink that outputs audio to a CPAL device
///
/// The CPAL stream lives on its own thread; this node feeds samples into a
/// ring buffer that the stream consumes. While the shared `suspended` flag is
/// set the stream plays silence and leaves the buffer untouched.
pub struct CpalSink {
    buffer: Producer<f32>,
    channels: usize,
}

impl CpalSink {
    /// Build and start a stream on `device`.
    ///
    /// Blocks until the stream thread reports whether the stream could be
    /// built and started.
    pub fn new(
        device: &cpal::Device,
        config: &SupportedStreamConfig,
        monitor: SinkMonitor,
        suspended: Arc<AtomicBool>,
    ) -> Result<Self> {
        let channels = config.channels() as usize;
        let sample_format = config.sample_format();
        let stream_config = config.config();
        let sample_rate = stream_config.sample_rate.0;

        // Ring buffer sized for ~100ms of audio to handle scheduling jitter
        let buffer_samples = ((sample_rate as f32 * 0.1) as usize) * channels;
        let buffer_size = buffer_samples.next_power_of_two().max(8192);
        let (producer, consumer) = RingBuffer::<f32>::new(buffer_size);

        let (status_tx, status_rx) = mpsc::sync_channel::<core::result::Result<(), String>>(1);

        // cpal::Stream is !Send, so it's built and kept on its own thread
        let device = device.clone();
        thread::Builder::new()
            .name("binaura-output".into())
            .spawn(move || {
                let started = build_stream(&device, sample_format, &stream_config, consumer, monitor, suspended)
                    .map_err(|e| e.to_string())
                    .and_then(|stream| stream.play().map(|_| stream).map_err(|e| e.to_string()));

                match started {
                    Ok(_stream) => {
                        let _ = status_tx.send(Ok(()));
                        // The stream lives as long as this thread
                        loop {
                            thread::park();
                        }
                    }
                    Err(reason) => {
                        let _ = status_tx.send(Err(reason));
                    }
                }
            })?;

        match status_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(reason)) => return Err(EngineError::DeviceUnavailable(reason)),
            Err(_) => return Err(EngineError::unavailable("output thread exited")),
        }

        debug!(sample_rate, channels, buffer_size, "output stream started");

        Ok(Self {
            buffer: producer,
            channels,
        })
    }
}

fn build_stream(
    device: &cpal::Device,
    sample_format: SampleFormat,
    stream_config: &cpal::StreamConfig,
    consumer: Consumer<f32>,
    monitor: SinkMonitor,
    suspended: Arc<AtomicBool>,
) -> core::result::Result<cpal::Stream, cpal::BuildStreamError> {
    match sample_format {
        SampleFormat::F32 => build_typed::<f32>(device, stream_config, consumer, monitor, suspended),
        SampleFormat::I16 => build_typed::<i16>(device, stream_config, consumer, monitor, suspended),
        SampleFormat::U16 => build_typed::<u16>(device, stream_config, consumer, monitor, suspended),
        _ => Err(cpal::BuildStreamError::StreamConfigNotSupported),
    }
}

fn build_typed<T>(
    device: &cpal::Device,
    stream_config: &cpal::StreamConfig,
    mut consumer: Consumer<f32>,
    monitor: SinkMonitor,
    suspended: Arc<AtomicBool>,
) -> core::result::Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32>,
{
    device.build_output_stream(
        stream_config,
        move |data: &mut [T], _| {
            if suspended.load(Ordering::Relaxed) {
                data.iter_mut().for_each(|s| *s = T::EQUILIBRIUM);
                return;
            }
            let mut underrun = false;
            for sample in data.iter_mut() {
                let s = consumer.pop().unwrap_or_else(|_| {
                    underrun = true;
                    0.0
                });
                *sample = T::from_sample(s.clamp(-1.0, 1.0));
            }
            monitor.record(data.len(), underrun);
        },
        |err| error!("output stream error: {}", err),
        None,
    )
}

impl AudioNode for CpalSink {
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

        // Generating faster than the device consumes; skip the block whole
        if self.buffer.slots() < samples_needed {
            return;
        }

        for i in 0..buffer_len {
            for ch in 0..self.channels {
                // Mono sources are duplicated, extra device channels repeat the last one
                let src_ch = ch.min(buffers.len() - 1);
                let _ = self.buffer.push(buffers[src_ch][i]);
            }
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 1 }

    #[inline]
    fn num_outputs(&self) -> usize { 0 }
}
