//! Block renderer - the main graph plus its output sink

use core::marker::PhantomData;

use crate::error::{EngineError, Result};
use crate::graph::AudioGraph;
use crate::node::{AudioNode, NodeId, BLOCK_LEN};

/// A handle for sending messages to a node in the audio graph.
///
/// Handles are returned by [`Renderer::add`] and provide two capabilities:
/// 1. **Connections** - pass handles to [`Renderer::connect`] or [`Renderer::output`]
/// 2. **Messages** - send parameter updates via [`Handle::send`]
///
/// Messages are buffered in a lock-free ring buffer and processed at the start
/// of the next audio block.
pub struct Handle<M: Send + 'static> {
    pub(crate) node_id: NodeId,
    pub(crate) sender: rtrb::Producer<M>,
    pub(crate) _marker: PhantomData<M>,
}

impl<M: Send + 'static> Handle<M> {
    /// Send a message to the node.
    ///
    /// Returns `Err(msg)` with the rejected message if the queue is full.
    pub fn send(&mut self, msg: M) -> core::result::Result<(), M> {
        self.sender.push(msg).map_err(|rtrb::PushError::Full(m)| m)
    }

    pub fn id(&self) -> NodeId {
        self.node_id
    }
}

/// Owns the output graph and drives it one block at a time.
///
/// The renderer never runs on the device thread. Whoever owns it calls
/// [`process`](Self::process) often enough to keep the sink fed; the sink
/// hands samples to the device through a ring buffer.
pub struct Renderer {
    graph: AudioGraph,
    channels: usize,
    sink_node: Option<NodeId>,
    blocks_processed: u64,
}

impl Renderer {
    /// Create a renderer with an explicit sample rate and no output sink.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            graph: AudioGraph::new(sample_rate),
            channels: 2,
            sink_node: None,
            blocks_processed: 0,
        }
    }

    /// Set the number of interleaved output channels (builder pattern).
    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels.max(1);
        self
    }

    /// Install the output sink (builder pattern).
    pub fn with_output<S: AudioNode<Message = ()>>(mut self, sink: S) -> Self {
        let handle = self.graph.add(sink);
        self.sink_node = Some(handle.id());
        // The id was handed out by this very graph.
        let _ = self.graph.set_terminal(handle.id());
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.graph.sample_rate()
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Blocks rendered since creation.
    pub fn blocks_processed(&self) -> u64 {
        self.blocks_processed
    }

    /// Interleaved samples rendered since creation.
    pub fn samples_rendered(&self) -> u64 {
        self.blocks_processed * (BLOCK_LEN * self.channels) as u64
    }

    /// Live nodes in the graph, the sink included.
    pub fn node_count(&self) -> usize {
        self.graph.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.graph.contains(id)
    }

    /// Add a node to the graph, returning its [`Handle`].
    pub fn add<N: AudioNode>(&mut self, node: N) -> Handle<N::Message> {
        let handle = self.graph.add(node);

        Handle {
            node_id: handle.id(),
            sender: handle.sender,
            _marker: PhantomData,
        }
    }

    /// Connect two nodes together. Audio flows from `from` to `to`.
    pub fn connect<M1, M2>(&mut self, from: &Handle<M1>, to: &Handle<M2>) -> Result<()>
    where
        M1: Send + 'static,
        M2: Send + 'static,
    {
        self.graph.connect(from.node_id, to.node_id)
    }

    /// Connect a node directly to the output sink.
    pub fn output<M: Send + 'static>(&mut self, handle: &Handle<M>) -> Result<()> {
        let sink_id = self.sink_node.ok_or(EngineError::NoOutput)?;
        self.graph.connect(handle.node_id, sink_id)
    }

    /// Remove a node and all of its connections.
    ///
    /// Pending messages for the node are dropped along with it.
    pub fn remove<M: Send + 'static>(&mut self, handle: &Handle<M>) -> Result<()> {
        if Some(handle.node_id) == self.sink_node {
            self.sink_node = None;
        }
        self.graph.remove(handle.node_id)
    }

    /// Process one block of audio (64 frames).
    pub fn process(&mut self) {
        self.graph.process();
        self.blocks_processed += 1;
    }

    /// Render until at least `target` interleaved samples have been produced.
    ///
    /// Returns the number of blocks rendered.
    pub fn render_until(&mut self, target: u64) -> usize {
        let mut blocks = 0;
        while self.samples_rendered() < target {
            self.process();
            blocks += 1;
        }
        blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{Gain, RtrbSink, Sine};
    use rtrb::RingBuffer;

    #[test]
    fn output_without_sink_is_an_error() {
        let mut renderer = Renderer::new(48_000);
        let sine = renderer.add(Sine::new(440.0));
        assert!(matches!(renderer.output(&sine), Err(EngineError::NoOutput)));
    }

    #[test]
    fn removed_nodes_stop_contributing() {
        let (producer, mut consumer) = RingBuffer::new(1 << 14);
        let mut renderer = Renderer::new(48_000).with_output(RtrbSink::stereo(producer));
        let bus = renderer.add(Gain::new(1.0));
        renderer.output(&bus).unwrap();

        let sine = renderer.add(Sine::new(440.0).with_amplitude(1.0));
        renderer.connect(&sine, &bus).unwrap();
        renderer.process();
        let loud: f32 = (0..BLOCK_LEN * 2)
            .map(|_| consumer.pop().unwrap().abs())
            .sum();
        assert!(loud > 1.0);

        renderer.remove(&sine).unwrap();
        assert!(!renderer.contains(sine.id()));
        renderer.process();
        assert!((0..BLOCK_LEN * 2).all(|_| consumer.pop().unwrap() == 0.0));
    }

    #[test]
    fn removing_twice_reports_unknown_node() {
        let mut renderer = Renderer::new(48_000);
        let sine = renderer.add(Sine::new(440.0));
        renderer.remove(&sine).unwrap();
        assert!(matches!(
            renderer.remove(&sine),
            Err(EngineError::UnknownNode(_))
        ));
    }

    #[test]
    fn render_until_counts_interleaved_samples() {
        let (producer, _consumer) = RingBuffer::new(1 << 14);
        let mut renderer = Renderer::new(48_000).with_output(RtrbSink::stereo(producer));
        let blocks = renderer.render_until((BLOCK_LEN * 2 * 3) as u64 + 1);
        assert_eq!(blocks, 4);
        assert_eq!(renderer.blocks_processed(), 4);
    }
}
