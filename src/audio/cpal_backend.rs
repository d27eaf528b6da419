//! Speaker output through cpal
//!
//! One output stream is opened per process and kept for its lifetime. Nodes
//! hand their samples to the stream through a shared slot; suspending the
//! sink pauses the stream itself.

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, SupportedStreamConfigRange};

use super::DecodedBuffer;
use super::sink::{AudioBackend, CompletionCallback, OutputSink, PlaybackNode, SinkState};
use crate::{Error, Result};

/// Samples currently routed to the speakers
struct Voice {
    node: u64,
    samples: Arc<[f32]>,
    position: usize,
    on_complete: Option<CompletionCallback>,
}

impl Voice {
    fn next_sample(&mut self) -> f32 {
        let sample = self.samples.get(self.position).copied().unwrap_or(0.0);
        if self.position < self.samples.len() {
            self.position += 1;
        }
        sample
    }

    fn is_exhausted(&self) -> bool {
        self.position >= self.samples.len()
    }
}

type Slot = Arc<Mutex<Option<Voice>>>;

/// Opens the default output device
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalBackend;

impl AudioBackend for CpalBackend {
    type Sink = CpalSink;

    fn open(&self, sample_rate: u32) -> Result<CpalSink> {
        CpalSink::open(sample_rate)
    }
}

/// The process-wide output stream
pub struct CpalSink {
    stream: Stream,
    slot: Slot,
    state: SinkState,
    next_node: u64,
}

impl CpalSink {
    fn open(sample_rate: u32) -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| Error::SinkUnavailable("no output device available".to_string()))?;

        // Mono first, stereo fallback
        let supported_config = find_config(&device, 1, sample_rate)
            .or_else(|| find_config(&device, 2, sample_rate))
            .ok_or_else(|| {
                Error::SinkUnavailable(format!("no output config supports {sample_rate} Hz"))
            })?;

        let config = supported_config
            .with_sample_rate(SampleRate(sample_rate))
            .config();
        let channels = usize::from(config.channels);

        let slot: Slot = Arc::new(Mutex::new(None));
        let render_slot = Arc::clone(&slot);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    render(&render_slot, data, channels);
                },
                |err| {
                    tracing::error!(error = %err, "audio output stream error");
                },
                None,
            )
            .map_err(|e| Error::SinkUnavailable(e.to_string()))?;

        stream
            .play()
            .map_err(|e| Error::SinkUnavailable(e.to_string()))?;

        tracing::debug!(
            device = %device.name().unwrap_or_default(),
            sample_rate,
            channels,
            "audio output initialized"
        );

        Ok(Self {
            stream,
            slot,
            state: SinkState::Running,
            next_node: 1,
        })
    }
}

impl OutputSink for CpalSink {
    type Node = CpalNode;

    fn create_node(&mut self, buffer: DecodedBuffer) -> Result<CpalNode> {
        let id = self.next_node;
        self.next_node += 1;

        Ok(CpalNode {
            id,
            slot: Arc::clone(&self.slot),
            pending: Some(Voice {
                node: id,
                samples: Arc::clone(buffer.samples()),
                position: 0,
                on_complete: None,
            }),
            started: false,
        })
    }

    fn state(&self) -> SinkState {
        self.state
    }

    fn suspend(&mut self) -> Result<()> {
        self.stream
            .pause()
            .map_err(|e| Error::SinkUnavailable(e.to_string()))?;
        self.state = SinkState::Suspended;
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        self.stream
            .play()
            .map_err(|e| Error::SinkUnavailable(e.to_string()))?;
        self.state = SinkState::Running;
        Ok(())
    }
}

/// A buffer bound to the output stream
pub struct CpalNode {
    id: u64,
    slot: Slot,
    pending: Option<Voice>,
    started: bool,
}

impl CpalNode {
    /// Pull this node's voice out of the slot, if it is still there
    fn release(&self) -> Result<bool> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| Error::Node("output slot poisoned".to_string()))?;

        if slot.as_ref().is_some_and(|v| v.node == self.id) {
            // Dropped without firing: a stopped node never reports completion
            slot.take();
            return Ok(true);
        }
        Ok(false)
    }
}

impl PlaybackNode for CpalNode {
    fn on_completion(&mut self, callback: CompletionCallback) {
        if let Some(voice) = self.pending.as_mut() {
            voice.on_complete = Some(callback);
        }
    }

    fn start(&mut self) -> Result<()> {
        let voice = self
            .pending
            .take()
            .ok_or_else(|| Error::Node(format!("node {} already started", self.id)))?;

        let mut slot = self
            .slot
            .lock()
            .map_err(|_| Error::Node("output slot poisoned".to_string()))?;
        *slot = Some(voice);
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if !self.started {
            self.pending = None;
            return Err(Error::Node(format!("node {} was never started", self.id)));
        }

        if self.release()? {
            Ok(())
        } else {
            Err(Error::Node(format!("node {} already finished", self.id)))
        }
    }
}

impl Drop for CpalNode {
    fn drop(&mut self) {
        if self.started {
            let _ = self.release();
        }
    }
}

fn find_config(
    device: &Device,
    channels: u16,
    sample_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    device.supported_output_configs().ok()?.find(|c| {
        c.channels() == channels
            && c.min_sample_rate() <= SampleRate(sample_rate)
            && c.max_sample_rate() >= SampleRate(sample_rate)
    })
}

/// Audio-thread callback: copy the active voice into `data`, fire completion
/// once the voice runs dry
fn render(slot: &Slot, data: &mut [f32], channels: usize) {
    let finished = {
        let Ok(mut guard) = slot.lock() else {
            data.fill(0.0);
            return;
        };

        for frame in data.chunks_mut(channels.max(1)) {
            let sample = guard.as_mut().map_or(0.0, Voice::next_sample);
            frame.fill(sample);
        }

        if guard.as_ref().is_some_and(Voice::is_exhausted) {
            guard.take()
        } else {
            None
        }
    };

    // Outside the lock: the callback may re-enter the control thread
    if let Some(callback) = finished.and_then(|mut voice| voice.on_complete.take()) {
        callback();
    }
}
