//! Shared test utilities
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use katha::api::ApiState;
use katha::audio::{
    AudioBackend, CompletionCallback, DecodedBuffer, OutputSink, PlaybackHandle, PlaybackNode,
    PlaybackStatus, SinkState,
};
use katha::narration::{Analyzer, StoryAnalysis, Synthesizer};
use katha::{Catalog, Error, FolkStory, Language, Result};

/// What the fake audio device has been asked to do
#[derive(Default)]
pub struct DeviceLog {
    pub opens: usize,
    pub resumes: usize,
    /// Sample count of each started node, in start order
    pub started: Vec<usize>,
    pub stopped: usize,
    callbacks: Vec<Option<CompletionCallback>>,
    fail_open: bool,
}

/// In-memory audio backend
#[derive(Clone, Default)]
pub struct FakeBackend(Arc<Mutex<DeviceLog>>);

impl FakeBackend {
    /// A backend with no usable output device
    #[must_use]
    pub fn unavailable() -> Self {
        let backend = Self::default();
        backend.0.lock().unwrap().fail_open = true;
        backend
    }

    pub fn opens(&self) -> usize {
        self.0.lock().unwrap().opens
    }

    pub fn resumes(&self) -> usize {
        self.0.lock().unwrap().resumes
    }

    pub fn started(&self) -> Vec<usize> {
        self.0.lock().unwrap().started.clone()
    }

    pub fn stopped(&self) -> usize {
        self.0.lock().unwrap().stopped
    }

    /// Play node `index` to its end, as the audio thread would
    pub fn complete(&self, index: usize) -> bool {
        let callback = self
            .0
            .lock()
            .unwrap()
            .callbacks
            .get_mut(index)
            .and_then(Option::take);
        callback.map(|cb| cb()).is_some()
    }
}

pub struct FakeSink {
    log: Arc<Mutex<DeviceLog>>,
    state: SinkState,
}

pub struct FakeNode {
    index: usize,
    samples: usize,
    stopped: bool,
    log: Arc<Mutex<DeviceLog>>,
}

impl AudioBackend for FakeBackend {
    type Sink = FakeSink;

    fn open(&self, _sample_rate: u32) -> Result<FakeSink> {
        let mut log = self.0.lock().unwrap();
        if log.fail_open {
            return Err(Error::SinkUnavailable("no output device".to_string()));
        }
        log.opens += 1;
        Ok(FakeSink {
            log: Arc::clone(&self.0),
            state: SinkState::Running,
        })
    }
}

impl OutputSink for FakeSink {
    type Node = FakeNode;

    fn create_node(&mut self, buffer: DecodedBuffer) -> Result<FakeNode> {
        let mut log = self.log.lock().unwrap();
        log.callbacks.push(None);
        Ok(FakeNode {
            index: log.callbacks.len() - 1,
            samples: buffer.len(),
            stopped: false,
            log: Arc::clone(&self.log),
        })
    }

    fn state(&self) -> SinkState {
        self.state
    }

    fn suspend(&mut self) -> Result<()> {
        self.state = SinkState::Suspended;
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        self.log.lock().unwrap().resumes += 1;
        self.state = SinkState::Running;
        Ok(())
    }
}

impl PlaybackNode for FakeNode {
    fn on_completion(&mut self, callback: CompletionCallback) {
        self.log.lock().unwrap().callbacks[self.index] = Some(callback);
    }

    fn start(&mut self) -> Result<()> {
        self.log.lock().unwrap().started.push(self.samples);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.stopped {
            return Err(Error::Node("already stopped".to_string()));
        }
        self.stopped = true;
        self.log.lock().unwrap().stopped += 1;
        Ok(())
    }
}

/// Base64 PCM payload of `samples` silent samples
#[must_use]
pub fn silent_payload(samples: usize) -> String {
    katha::audio::encode(&vec![0.0; samples])
}

/// Wait until the handle reports `want`
pub async fn wait_for_status(handle: &PlaybackHandle, want: PlaybackStatus) {
    let mut rx = handle.watch_status();
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|s| *s == want))
        .await
        .expect("timed out waiting for status")
        .expect("playback thread stopped");
}

/// Analyzer and synthesizer with canned answers
pub struct FakeNarrator {
    /// Returned by `synthesize`; empty simulates a silent response
    pub audio: String,
}

#[async_trait]
impl Analyzer for FakeNarrator {
    async fn analyze(&self, story: &FolkStory) -> Result<StoryAnalysis> {
        Ok(StoryAnalysis {
            full_narration: format!("Long ago, {}.", story.summary),
            emotion: "Wonder".to_string(),
            intensity: 7,
            cultural_nuances: story.themes.clone(),
            historical_context: story.era.clone(),
            significance: format!("A {} story", story.region),
            audio_uri: None,
        })
    }
}

#[async_trait]
impl Synthesizer for FakeNarrator {
    async fn synthesize(&self, _text: &str, _language: Language) -> Result<String> {
        Ok(self.audio.clone())
    }
}

/// Narration services that always fail upstream
pub struct BrokenNarrator;

#[async_trait]
impl Analyzer for BrokenNarrator {
    async fn analyze(&self, _story: &FolkStory) -> Result<StoryAnalysis> {
        Err(Error::Analysis("upstream returned 500".to_string()))
    }
}

#[async_trait]
impl Synthesizer for BrokenNarrator {
    async fn synthesize(&self, _text: &str, _language: Language) -> Result<String> {
        Err(Error::Synthesis("upstream returned 500".to_string()))
    }
}

/// API state over the builtin catalog and a fake audio device
pub fn test_state<N>(backend: FakeBackend, narrator: Option<Arc<N>>) -> Arc<ApiState>
where
    N: Analyzer + Synthesizer + 'static,
{
    let playback = PlaybackHandle::spawn(backend).expect("failed to spawn playback thread");
    Arc::new(ApiState {
        catalog: Arc::new(Catalog::builtin().expect("builtin catalog")),
        analyzer: narrator.clone().map(|n| n as Arc<dyn Analyzer>),
        synthesizer: narrator.map(|n| n as Arc<dyn Synthesizer>),
        playback,
        language: Language::English,
    })
}
