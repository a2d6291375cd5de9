//! Async driver for the recognition pipeline.
//!
//! One task runs a cooperative loop: a periodic tick drains frames from the
//! frame source into the pipeline, and classifier calls run as spawned tasks
//! whose results come back over a channel. The per-frame step never waits
//! on the network.
//!
//! The runtime owns the frame source for its whole life. [`RecognitionRuntime::teardown`]
//! is the single release path; it runs on drop and is safe to call twice.

use crate::classifier::Classifier;
use crate::config::{Config, StartupConfig};
use crate::pipeline::{
    InferenceCompletion, InferenceRequest, LetterConsumer, Prediction, RecognitionPipeline,
};
use crate::stats::{RecognitionStats, SharedStats};
use crate::tracking::{start_with_retry, FrameSource, TrackingError, TrackingResult};
use crossbeam_channel::TryRecvError;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

/// Lifecycle of a runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    /// Created, source not yet acquired
    Idle,
    /// Supervised startup in progress
    Starting,
    /// Source acquired, frames flowing
    Ready,
    /// Startup gave up; call `start` again to retry
    Failed,
    /// Resources released; the runtime cannot be restarted
    TornDown,
}

/// Runtime errors.
#[derive(Debug)]
pub enum RuntimeError {
    Tracking(TrackingError),
    TornDown,
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::Tracking(e) => write!(f, "Tracking error: {e}"),
            RuntimeError::TornDown => write!(f, "Runtime has been torn down"),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<TrackingError> for RuntimeError {
    fn from(e: TrackingError) -> Self {
        RuntimeError::Tracking(e)
    }
}

/// Drives a [`RecognitionPipeline`] from a frame source and a classifier.
pub struct RecognitionRuntime<S: FrameSource, C: Classifier + 'static> {
    pipeline: RecognitionPipeline,
    source: S,
    classifier: Arc<C>,
    completions_tx: mpsc::UnboundedSender<InferenceCompletion>,
    completions_rx: mpsc::UnboundedReceiver<InferenceCompletion>,
    frame_period: Duration,
    startup: StartupConfig,
    state: RuntimeState,
}

impl<S: FrameSource, C: Classifier + 'static> RecognitionRuntime<S, C> {
    pub fn new(config: &Config, source: S, classifier: Arc<C>) -> Self {
        Self::with_stats(config, source, classifier, Arc::new(RecognitionStats::new()))
    }

    pub fn with_stats(config: &Config, source: S, classifier: Arc<C>, stats: SharedStats) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            pipeline: RecognitionPipeline::with_stats(&config.recognition, stats),
            source,
            classifier,
            completions_tx,
            completions_rx,
            frame_period: config.frame_period.max(Duration::from_millis(1)),
            startup: config.startup.clone(),
            state: RuntimeState::Idle,
        }
    }

    /// Acquire the frame source with bounded retries.
    pub async fn start(&mut self) -> Result<(), RuntimeError> {
        match self.state {
            RuntimeState::TornDown => return Err(RuntimeError::TornDown),
            RuntimeState::Ready => return Ok(()),
            _ => {}
        }

        self.state = RuntimeState::Starting;
        match start_with_retry(&mut self.source, &self.startup).await {
            Ok(_) => {
                self.state = RuntimeState::Ready;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Recognition not loaded: {}", e);
                self.state = RuntimeState::Failed;
                Err(e.into())
            }
        }
    }

    /// Run until `shutdown` resolves or the frame source is exhausted.
    ///
    /// Starts the source first if needed. Resolving `shutdown` during
    /// startup cancels any pending retry. Always tears down before
    /// returning successfully.
    pub async fn run<L, F>(&mut self, consumer: &mut L, shutdown: F) -> Result<(), RuntimeError>
    where
        L: LetterConsumer,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        if self.state != RuntimeState::Ready {
            let started = tokio::select! {
                _ = &mut shutdown => None,
                result = self.start() => Some(result),
            };
            match started {
                None => {
                    self.teardown();
                    return Ok(());
                }
                Some(result) => result?,
            }
        }

        let mut ticker = tokio::time::interval(self.frame_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut exhausted = false;

        loop {
            self.sync_consumer(consumer);

            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    exhausted = self.drain_frames();
                }
                Some(completion) = self.completions_rx.recv() => {
                    self.apply_completion(completion, consumer);
                }
            }

            if exhausted && !self.pipeline.in_flight() {
                tracing::info!("Frame source exhausted");
                break;
            }
        }

        self.teardown();
        Ok(())
    }

    /// Release the frame source and invalidate in-flight requests.
    pub fn teardown(&mut self) {
        if self.state == RuntimeState::TornDown {
            return;
        }
        self.source.stop();
        self.pipeline.reset();
        self.state = RuntimeState::TornDown;
        tracing::info!("Recognition runtime torn down");
    }

    pub fn state(&self) -> RuntimeState {
        self.state
    }

    /// Whether the frame source has been acquired.
    pub fn is_loaded(&self) -> bool {
        self.state == RuntimeState::Ready
    }

    pub fn prediction(&self) -> Option<Prediction> {
        self.pipeline.prediction()
    }

    pub fn hold_progress(&self) -> f32 {
        self.pipeline.hold_progress()
    }

    pub fn pipeline(&self) -> &RecognitionPipeline {
        &self.pipeline
    }

    pub fn stats(&self) -> &SharedStats {
        self.pipeline.stats()
    }

    fn sync_consumer<L: LetterConsumer>(&mut self, consumer: &L) {
        self.pipeline.set_enabled(consumer.enabled());
        self.pipeline.set_target_letter(consumer.target_letter());
    }

    /// Feed every queued frame to the pipeline. Returns true once the source is exhausted.
    fn drain_frames(&mut self) -> bool {
        loop {
            match self.source.receiver().try_recv() {
                Ok(frame) => self.handle_frame(&frame),
                Err(TryRecvError::Empty) => return false,
                Err(TryRecvError::Disconnected) => return true,
            }
        }
    }

    fn handle_frame(&mut self, frame: &TrackingResult) {
        if let Some(request) = self.pipeline.on_frame(frame, Instant::now()) {
            self.dispatch(request);
        }
    }

    fn dispatch(&self, request: InferenceRequest) {
        let classifier = self.classifier.clone();
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let outcome = classifier.predict(&request.landmarks).await;
            // The runtime may be gone; its result no longer matters then.
            let _ = completions.send(InferenceCompletion::new(request.session, outcome));
        });
    }

    fn apply_completion<L: LetterConsumer>(&mut self, completion: InferenceCompletion, consumer: &mut L) {
        if let Some(letter) = self.pipeline.on_completion(completion, Instant::now()) {
            consumer.on_letter_confirmed(letter);
        }
    }
}

impl<S: FrameSource, C: Classifier + 'static> Drop for RecognitionRuntime<S, C> {
    fn drop(&mut self) {
        self.teardown();
    }
}
