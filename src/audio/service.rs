//! Playback control thread
//!
//! The controller and its output sink live on one dedicated thread. Callers
//! talk to it through a cloneable [`PlaybackHandle`]; completion callbacks
//! from the audio thread come back as commands on the same queue, so every
//! transition is applied in order.

use std::sync::Arc;
use std::thread;

use tokio::sync::{broadcast, mpsc, oneshot, watch};

use super::controller::{FinishRouter, PlaybackController, PlaybackNotice, SessionId};
use super::sink::AudioBackend;
use super::status::PlaybackStatus;
use crate::{Error, Result};

enum Command {
    Play {
        payload: String,
        reply: oneshot::Sender<Result<SessionId>>,
    },
    PauseOrResume {
        reply: oneshot::Sender<Result<PlaybackStatus>>,
    },
    Stop {
        reply: oneshot::Sender<()>,
    },
    Finished(SessionId),
}

/// Handle to the playback control thread
#[derive(Clone)]
pub struct PlaybackHandle {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<PlaybackStatus>,
    notices: broadcast::Sender<PlaybackNotice>,
}

impl PlaybackHandle {
    /// Start the control thread for `backend`
    ///
    /// The thread exits once every handle has been dropped.
    ///
    /// # Errors
    ///
    /// Returns error if the thread cannot be spawned
    pub fn spawn<B>(backend: B) -> Result<Self>
    where
        B: AudioBackend + Send + 'static,
    {
        let (commands, mut rx) = mpsc::unbounded_channel::<Command>();
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();

        // Weak, so dropping the last handle still closes the queue
        let finished = commands.downgrade();
        let router: FinishRouter = Arc::new(move |id: SessionId| {
            if let Some(tx) = finished.upgrade() {
                let _ = tx.send(Command::Finished(id));
            }
        });

        thread::Builder::new()
            .name("katha-playback".to_string())
            .spawn(move || {
                let mut controller = PlaybackController::new(backend, router);
                let _ = ready_tx.send((controller.subscribe(), controller.notice_sender()));

                while let Some(command) = rx.blocking_recv() {
                    match command {
                        Command::Play { payload, reply } => {
                            let _ = reply.send(controller.play(&payload));
                        }
                        Command::PauseOrResume { reply } => {
                            let result = controller.pause_or_resume().map(|()| controller.status());
                            let _ = reply.send(result);
                        }
                        Command::Stop { reply } => {
                            controller.stop();
                            let _ = reply.send(());
                        }
                        Command::Finished(id) => {
                            controller.finish(id);
                        }
                    }
                }

                controller.stop();
                tracing::debug!("playback control thread exiting");
            })?;

        let (status, notices) = ready_rx.recv().map_err(|_| Error::ControllerClosed)?;

        Ok(Self {
            commands,
            status,
            notices,
        })
    }

    /// Stop current playback and play `payload`
    ///
    /// # Errors
    ///
    /// Returns the playback failure; status is Idle in that case
    pub async fn play(&self, payload: impl Into<String>) -> Result<SessionId> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Play {
            payload: payload.into(),
            reply,
        })?;
        rx.await.map_err(|_| Error::ControllerClosed)?
    }

    /// Toggle between playing and paused; returns the resulting status
    ///
    /// # Errors
    ///
    /// Returns `Error::SinkUnavailable` if the sink refuses to suspend or resume
    pub async fn pause_or_resume(&self) -> Result<PlaybackStatus> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::PauseOrResume { reply })?;
        rx.await.map_err(|_| Error::ControllerClosed)?
    }

    /// Stop playback
    ///
    /// # Errors
    ///
    /// Returns `Error::ControllerClosed` if the control thread is gone
    pub async fn stop(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Stop { reply })?;
        rx.await.map_err(|_| Error::ControllerClosed)
    }

    /// Latest status
    #[must_use]
    pub fn status(&self) -> PlaybackStatus {
        *self.status.borrow()
    }

    /// Observe status changes
    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<PlaybackStatus> {
        self.status.clone()
    }

    /// Receive playback failure notices
    #[must_use]
    pub fn notices(&self) -> broadcast::Receiver<PlaybackNotice> {
        self.notices.subscribe()
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| Error::ControllerClosed)
    }
}
