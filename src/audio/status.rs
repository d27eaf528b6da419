//! Playback status read model

use std::fmt;

use serde::Serialize;
use tokio::sync::watch;

/// Simplified playback state shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    /// No session alive
    #[default]
    Idle,
    /// A session is alive and the sink is running
    Playing,
    /// A session is alive and the sink is suspended
    Paused,
}

impl PlaybackStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::Paused => "paused",
        }
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publishes the controller's status to any number of observers
///
/// Only the controller writes. Readers hold a `watch::Receiver` and always see
/// the latest value.
#[derive(Debug)]
pub struct StatusProjector {
    tx: watch::Sender<PlaybackStatus>,
}

impl StatusProjector {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(PlaybackStatus::Idle);
        Self { tx }
    }

    /// Current status
    #[must_use]
    pub fn current(&self) -> PlaybackStatus {
        *self.tx.borrow()
    }

    /// Observe status changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PlaybackStatus> {
        self.tx.subscribe()
    }

    /// Record a transition; observers are only woken on an actual change
    pub(crate) fn set(&self, status: PlaybackStatus) {
        self.tx.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            tracing::debug!(from = %current, to = %status, "playback status changed");
            *current = status;
            true
        });
    }
}

impl Default for StatusProjector {
    fn default() -> Self {
        Self::new()
    }
}
