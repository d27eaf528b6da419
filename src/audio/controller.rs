//! Playback session management
//!
//! Owns the output sink and at most one live playback session. Every control
//! operation runs on the caller's thread; completion callbacks coming from the
//! audio thread are routed back through a `FinishRouter` and applied with
//! [`PlaybackController::finish`].

use std::fmt;
use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use super::decoder::{self, PCM_SAMPLE_RATE};
use super::sink::{AudioBackend, OutputSink, PlaybackNode, SinkState};
use super::status::{PlaybackStatus, StatusProjector};
use crate::{Error, Result};

/// Capacity of the notice broadcast channel
const NOTICE_CAPACITY: usize = 16;

/// Identity token of one playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Delivers a natural-completion event back to the control thread
pub type FinishRouter = Arc<dyn Fn(SessionId) + Send + Sync>;

/// User-facing playback notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackNotice {
    /// Playback could not start or continue
    Failed { reason: String },
}

struct Session<N> {
    id: SessionId,
    node: N,
}

type NodeOf<B> = <<B as AudioBackend>::Sink as OutputSink>::Node;

/// Drives the idle / playing / paused state machine over an audio backend
pub struct PlaybackController<B: AudioBackend> {
    backend: B,
    sample_rate: u32,
    sink: Option<B::Sink>,
    active: Option<Session<NodeOf<B>>>,
    next_session: u64,
    status: StatusProjector,
    notices: broadcast::Sender<PlaybackNotice>,
    router: FinishRouter,
}

impl<B: AudioBackend> PlaybackController<B> {
    /// Create a controller; the sink is opened on first play
    pub fn new(backend: B, router: FinishRouter) -> Self {
        let (notices, _rx) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            backend,
            sample_rate: PCM_SAMPLE_RATE,
            sink: None,
            active: None,
            next_session: 1,
            status: StatusProjector::new(),
            notices,
            router,
        }
    }

    /// Current status
    #[must_use]
    pub fn status(&self) -> PlaybackStatus {
        self.status.current()
    }

    /// Observe status changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PlaybackStatus> {
        self.status.subscribe()
    }

    /// Receive playback failure notices
    #[must_use]
    pub fn notices(&self) -> broadcast::Receiver<PlaybackNotice> {
        self.notices.subscribe()
    }

    /// Sender side of the notice channel, for relaying handles
    #[must_use]
    pub fn notice_sender(&self) -> broadcast::Sender<PlaybackNotice> {
        self.notices.clone()
    }

    /// Identity of the live session, if any
    #[must_use]
    pub fn active_session(&self) -> Option<SessionId> {
        self.active.as_ref().map(|s| s.id)
    }

    /// Whether the output sink has been opened
    #[must_use]
    pub const fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Stop whatever is playing, then play `payload`
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedPayload` or `Error::SinkUnavailable`; status is
    /// Idle afterwards and a notice has been broadcast
    pub fn play(&mut self, payload: &str) -> Result<SessionId> {
        self.stop();

        match self.start(payload) {
            Ok(id) => Ok(id),
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Suspend when playing, resume when paused, nothing when idle
    ///
    /// # Errors
    ///
    /// Returns `Error::SinkUnavailable` if the sink refuses; the session is
    /// torn down and status is Idle afterwards
    pub fn pause_or_resume(&mut self) -> Result<()> {
        if self.active.is_none() {
            return Ok(());
        }
        let Some(sink) = self.sink.as_mut() else {
            return Ok(());
        };

        let outcome = match sink.state() {
            SinkState::Running => sink.suspend().map(|()| PlaybackStatus::Paused),
            SinkState::Suspended => sink.resume().map(|()| PlaybackStatus::Playing),
        };

        match outcome {
            Ok(status) => {
                self.status.set(status);
                Ok(())
            }
            Err(e) => {
                self.stop();
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Halt and release the live session; no-op when idle
    pub fn stop(&mut self) {
        if let Some(mut session) = self.active.take() {
            if let Err(e) = session.node.stop() {
                tracing::trace!(session = %session.id, error = %e, "playback node already stopped");
            }
            tracing::debug!(session = %session.id, "playback session stopped");
        }
        self.status.set(PlaybackStatus::Idle);
    }

    /// Apply a natural completion; returns false for stale sessions
    pub fn finish(&mut self, id: SessionId) -> bool {
        if self.active_session() != Some(id) {
            tracing::trace!(session = %id, "ignoring completion of replaced session");
            return false;
        }

        self.active = None;
        self.status.set(PlaybackStatus::Idle);
        tracing::debug!(session = %id, "playback finished");
        true
    }

    fn start(&mut self, payload: &str) -> Result<SessionId> {
        let buffer = decoder::decode(payload)?;

        let sink = match self.sink.take() {
            Some(sink) => sink,
            None => {
                let sink = self.backend.open(self.sample_rate)?;
                tracing::info!(sample_rate = self.sample_rate, "audio output opened");
                sink
            }
        };
        let sink = self.sink.insert(sink);

        if sink.state() == SinkState::Suspended {
            sink.resume()?;
        }

        let id = SessionId(self.next_session);
        self.next_session += 1;

        let samples = buffer.len();
        let duration_ms = buffer.duration_ms();
        let mut node = sink.create_node(buffer)?;

        let router = Arc::clone(&self.router);
        node.on_completion(Box::new(move || (*router)(id)));
        node.start()?;

        self.active = Some(Session { id, node });
        self.status.set(PlaybackStatus::Playing);

        tracing::debug!(session = %id, samples, duration_ms, "playback session started");

        Ok(id)
    }

    fn fail(&self, error: &Error) {
        tracing::error!(error = %error, "audio playback failed");
        self.status.set(PlaybackStatus::Idle);
        // No subscribers is fine
        let _ = self.notices.send(PlaybackNotice::Failed {
            reason: error.to_string(),
        });
    }
}
