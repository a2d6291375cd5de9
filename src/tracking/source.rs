//! Frame sources: anything that can deliver hand-tracking results.

use crate::tracking::types::TrackingResult;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Errors raised while acquiring or running a frame source.
#[derive(Debug)]
pub enum TrackingError {
    AlreadyRunning,
    /// The camera, tracker, or recording could not be opened.
    Unavailable(String),
    /// Startup was attempted the configured number of times and never succeeded.
    GaveUp { attempts: u32, last_error: String },
}

impl std::fmt::Display for TrackingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackingError::AlreadyRunning => write!(f, "Frame source is already running"),
            TrackingError::Unavailable(e) => write!(f, "Frame source unavailable: {e}"),
            TrackingError::GaveUp {
                attempts,
                last_error,
            } => write!(
                f,
                "Frame source failed to start after {attempts} attempts: {last_error}"
            ),
        }
    }
}

impl std::error::Error for TrackingError {}

/// A supplier of per-frame hand-tracking results.
///
/// Sources own whatever device or file handle backs them. `stop` must
/// release it and must be safe to call more than once.
pub trait FrameSource {
    /// Acquire the underlying resource and begin producing frames.
    fn start(&mut self) -> Result<(), TrackingError>;

    /// Release the underlying resource.
    fn stop(&mut self);

    fn is_running(&self) -> bool;

    /// Channel on which results arrive. Disconnects once the source is exhausted.
    fn receiver(&self) -> &Receiver<TrackingResult>;
}

/// A receiver that is already disconnected, used while a source is stopped.
pub(crate) fn disconnected_receiver() -> Receiver<TrackingResult> {
    let (_sender, receiver) = bounded(1);
    receiver
}

/// A source fed by the embedding application through a channel.
///
/// This is the integration point for a live tracker: the tracker callback
/// pushes each result into the returned sender.
pub struct ChannelSource {
    receiver: Receiver<TrackingResult>,
    running: Arc<AtomicBool>,
}

impl ChannelSource {
    /// Create a new channel-backed source and the sender that feeds it.
    pub fn new(capacity: usize) -> (Self, Sender<TrackingResult>) {
        let (sender, receiver) = bounded(capacity);
        (
            Self {
                receiver,
                running: Arc::new(AtomicBool::new(false)),
            },
            sender,
        )
    }
}

impl FrameSource for ChannelSource {
    fn start(&mut self) -> Result<(), TrackingError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(TrackingError::AlreadyRunning);
        }
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn receiver(&self) -> &Receiver<TrackingResult> {
        &self.receiver
    }
}
