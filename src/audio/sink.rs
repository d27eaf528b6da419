//! Audio backend capabilities
//!
//! The playback controller only talks to these traits, so the state machine
//! can be driven by cpal in production and by a fake in tests.

use super::DecodedBuffer;
use crate::Result;

/// Called once when a node has played its whole buffer
pub type CompletionCallback = Box<dyn FnOnce() + Send + 'static>;

/// Running state of an output sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    Running,
    Suspended,
}

/// Factory for the process-wide output sink
pub trait AudioBackend {
    type Sink: OutputSink;

    /// Open the output sink at a fixed sample rate
    ///
    /// # Errors
    ///
    /// Returns `Error::SinkUnavailable` if no output can be opened
    fn open(&self, sample_rate: u32) -> Result<Self::Sink>;
}

/// Output device shared by every playback node
pub trait OutputSink {
    type Node: PlaybackNode;

    /// Bind a buffer to a new, not yet started node
    ///
    /// # Errors
    ///
    /// Returns error if the sink cannot accept a new node
    fn create_node(&mut self, buffer: DecodedBuffer) -> Result<Self::Node>;

    fn state(&self) -> SinkState;

    /// Suspend all output
    ///
    /// # Errors
    ///
    /// Returns `Error::SinkUnavailable` if the device refuses
    fn suspend(&mut self) -> Result<()>;

    /// Resume all output
    ///
    /// # Errors
    ///
    /// Returns `Error::SinkUnavailable` if the device refuses
    fn resume(&mut self) -> Result<()>;
}

/// One buffer playing through the sink
pub trait PlaybackNode {
    /// Register the handler fired on natural completion
    fn on_completion(&mut self, callback: CompletionCallback);

    /// Begin output
    ///
    /// # Errors
    ///
    /// Returns error if the node was already started
    fn start(&mut self) -> Result<()>;

    /// Halt output and disconnect from the sink
    ///
    /// # Errors
    ///
    /// Returns `Error::Node` if the node already finished or was never started
    fn stop(&mut self) -> Result<()>;
}
