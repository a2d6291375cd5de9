//! Replay of recorded hand-tracking results.
//!
//! A recording is a JSON-lines file with one [`TrackingResult`] per line.
//! Frames are emitted from a worker thread at a fixed period so the rest of
//! the pipeline sees the same cadence as a live camera.

use crate::tracking::source::{disconnected_receiver, FrameSource, TrackingError};
use crate::tracking::types::TrackingResult;
use crossbeam_channel::{bounded, Receiver};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Frame source that plays back a JSON-lines recording.
pub struct ReplaySource {
    path: PathBuf,
    frame_period: Duration,
    receiver: Receiver<TrackingResult>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ReplaySource {
    pub fn new(path: impl Into<PathBuf>, frame_period: Duration) -> Self {
        Self {
            path: path.into(),
            frame_period,
            receiver: disconnected_receiver(),
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl FrameSource for ReplaySource {
    fn start(&mut self) -> Result<(), TrackingError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(TrackingError::AlreadyRunning);
        }
        // Reap a worker that finished on its own.
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }

        let file = File::open(&self.path).map_err(|e| {
            TrackingError::Unavailable(format!("{}: {e}", self.path.display()))
        })?;

        let (sender, receiver) = bounded(10_000);
        self.receiver = receiver;
        self.running.store(true, Ordering::SeqCst);

        let running = self.running.clone();
        let period = self.frame_period;
        self.worker = Some(thread::spawn(move || {
            for (index, line) in BufReader::new(file).lines().enumerate() {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::warn!("Recording read failed at line {}: {}", index + 1, e);
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<TrackingResult>(&line) {
                    Ok(result) => {
                        if sender.send(result).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Skipping unreadable frame at line {}: {}", index + 1, e);
                        continue;
                    }
                }
                thread::sleep(period);
            }
            running.store(false, Ordering::SeqCst);
        }));

        tracing::debug!("Replaying tracking frames from {}", self.path.display());
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        // Dropping the live receiver unblocks a worker stuck on a full channel.
        self.receiver = disconnected_receiver();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn receiver(&self) -> &Receiver<TrackingResult> {
        &self.receiver
    }
}

impl Drop for ReplaySource {
    fn drop(&mut self) {
        self.stop();
    }
}
