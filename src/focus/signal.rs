//! Signals delivered to the timer loop from outside its thread.

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use serde::{Deserialize, Serialize};

/// A named event that changes what the timer loop does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// Pause when running, resume when paused
    PauseToggle,
    /// Log a distraction
    Distract,
    /// Abort the session
    Quit,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PauseToggle => write!(f, "pause_toggle"),
            Self::Distract => write!(f, "distract"),
            Self::Quit => write!(f, "quit"),
        }
    }
}

/// Non-blocking supply of signals, drained once per loop iteration.
pub trait SignalSource {
    /// Return every signal queued since the last call, oldest first.
    fn poll_signals(&mut self) -> Vec<SignalKind>;

    /// True once the producer side is gone and no more signals can arrive.
    fn is_disconnected(&self) -> bool {
        false
    }
}

/// Producer half handed to listener threads.
pub type SignalSender = Sender<SignalKind>;

/// Consumer half backed by an mpsc channel.
#[derive(Debug)]
pub struct ChannelSignalSource {
    rx: Receiver<SignalKind>,
    disconnected: bool,
}

impl ChannelSignalSource {
    /// Create a connected sender/source pair.
    #[must_use]
    pub fn channel() -> (SignalSender, Self) {
        let (tx, rx) = mpsc::channel();
        (
            tx,
            Self {
                rx,
                disconnected: false,
            },
        )
    }
}

impl SignalSource for ChannelSignalSource {
    fn poll_signals(&mut self) -> Vec<SignalKind> {
        let mut signals = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(signal) => signals.push(signal),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.disconnected = true;
                    break;
                }
            }
        }
        signals
    }

    fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}
