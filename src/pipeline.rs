//! The recognition pipeline.
//!
//! [`RecognitionPipeline`] is a synchronous reducer. It never performs I/O:
//! per camera frame it may hand back an [`InferenceRequest`] for the caller
//! to send, and each classifier answer comes back as an
//! [`InferenceCompletion`] carrying the session token it was sent under.
//!
//! ```text
//! TrackingResult ─▶ extract_frame ─▶ SlidingWindow ─▶ InferenceRequest
//!                                                          │ (async)
//! LetterConsumer ◀─ HoldStateMachine ◀─ Smoother ◀─ InferenceCompletion
//! ```
//!
//! Every time hand presence drops to zero the session token advances, so
//! answers to requests sent before the loss are discarded on arrival.

use crate::classifier::{validate_probabilities, ClassifierError};
use crate::config::RecognitionConfig;
use crate::core::{
    argmax, extract_frame, HoldConfig, HoldPhase, HoldStateMachine, LandmarkFrame, Letter,
    ProbabilitySmoother, SlidingWindow,
};
use crate::stats::{RecognitionStats, SharedStats};
use crate::tracking::TrackingResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The pipeline's current best guess.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Letter,
    pub score: f32,
}

/// A classifier call the caller should make.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    /// Session token current when the request was issued
    pub session: u64,
    /// Exactly one full window of frames, oldest first
    pub landmarks: Vec<LandmarkFrame>,
}

/// The outcome of a classifier call, fed back into the pipeline.
#[derive(Debug)]
pub struct InferenceCompletion {
    pub session: u64,
    pub outcome: Result<Vec<f32>, ClassifierError>,
}

impl InferenceCompletion {
    pub fn new(session: u64, outcome: Result<Vec<f32>, ClassifierError>) -> Self {
        Self { session, outcome }
    }
}

/// Receiver of confirmed letters: the game session.
///
/// The runtime polls `enabled` and `target_letter` each tick, so a game can
/// pause confirmations (for example during a reaction animation) or announce
/// a new target without holding a reference to the pipeline.
pub trait LetterConsumer {
    fn on_letter_confirmed(&mut self, letter: Letter);

    fn enabled(&self) -> bool {
        true
    }

    fn target_letter(&self) -> Option<Letter> {
        None
    }
}

impl<F: FnMut(Letter)> LetterConsumer for F {
    fn on_letter_confirmed(&mut self, letter: Letter) {
        self(letter)
    }
}

/// Gesture recognition state for one game session.
pub struct RecognitionPipeline {
    window: SlidingWindow,
    smoother: ProbabilitySmoother,
    hold: HoldStateMachine,
    min_request_interval: Duration,
    session: u64,
    hands_present: bool,
    in_flight: bool,
    last_request_at: Option<Instant>,
    enabled: bool,
    prediction: Option<Prediction>,
    target: Option<Letter>,
    stats: SharedStats,
}

impl RecognitionPipeline {
    pub fn new(config: &RecognitionConfig) -> Self {
        Self::with_stats(config, Arc::new(RecognitionStats::new()))
    }

    pub fn with_stats(config: &RecognitionConfig, stats: SharedStats) -> Self {
        Self {
            window: SlidingWindow::new(),
            smoother: ProbabilitySmoother::new(config.smoothing_factor),
            hold: HoldStateMachine::new(HoldConfig::from(config)),
            min_request_interval: config.min_request_interval,
            session: 0,
            hands_present: false,
            in_flight: false,
            last_request_at: None,
            enabled: true,
            prediction: None,
            target: None,
            stats,
        }
    }

    /// Process one camera frame.
    ///
    /// Never blocks. Returns a request when the window is full, hands are
    /// present, nothing is in flight, and the minimum request interval has
    /// passed since the previous request.
    pub fn on_frame(&mut self, result: &TrackingResult, now: Instant) -> Option<InferenceRequest> {
        let has_hands = result.has_hands();
        self.stats.record_frame(has_hands);

        // The window keeps sliding on hand loss; only derived state resets.
        self.window.push(extract_frame(result));

        if !has_hands {
            if self.hands_present {
                self.session += 1;
                tracing::debug!("Hands lost, session advanced to {}", self.session);
            }
            self.hands_present = false;
            self.clear_recognition();
            return None;
        }
        self.hands_present = true;

        if !self.window.is_full() || self.in_flight {
            return None;
        }
        if let Some(last) = self.last_request_at {
            if now.saturating_duration_since(last) < self.min_request_interval {
                return None;
            }
        }

        self.in_flight = true;
        self.last_request_at = Some(now);
        self.stats.record_request();
        tracing::trace!("Dispatching inference for session {}", self.session);

        Some(InferenceRequest {
            session: self.session,
            landmarks: self.window.snapshot(),
        })
    }

    /// Apply a classifier outcome. Returns a letter if this update confirmed one.
    ///
    /// Outcomes from an older session are dropped without touching state.
    /// Failures are logged and skipped.
    pub fn on_completion(&mut self, completion: InferenceCompletion, now: Instant) -> Option<Letter> {
        // Only one request is ever outstanding, whatever its session.
        self.in_flight = false;

        if completion.session != self.session {
            self.stats.record_stale_response();
            tracing::debug!(
                "Dropping stale classifier response (session {} != {})",
                completion.session,
                self.session
            );
            return None;
        }

        let probabilities = match completion.outcome.and_then(validate_probabilities) {
            Ok(probabilities) => probabilities,
            Err(e) => {
                self.stats.record_classifier_failure();
                tracing::warn!("Skipping classifier cycle: {}", e);
                return None;
            }
        };
        self.stats.record_response_applied();

        let smoothed = self.smoother.update(&probabilities);
        let (index, score) = argmax(smoothed)?;
        let label = Letter::from_index(index)?;
        self.prediction = Some(Prediction { label, score });

        // Hold progress is frozen while the game has confirmations paused.
        if !self.enabled {
            return None;
        }

        let confirmed = self.hold.observe(label, score, now)?;
        self.stats.record_letter_confirmed();
        tracing::info!("Letter confirmed: {} (score {:.2})", confirmed, score);
        Some(confirmed)
    }

    /// Gate confirmations on or off.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Announce the game's current target letter.
    ///
    /// A change of target clears the confirmation lock and hold progress so
    /// the new target can be confirmed straight away.
    pub fn set_target_letter(&mut self, target: Option<Letter>) {
        if target.is_some() && target != self.target {
            self.hold.clear();
        }
        self.target = target;
    }

    /// Drop all recognition state and invalidate in-flight requests.
    pub fn reset(&mut self) {
        self.session += 1;
        self.hands_present = false;
        self.window.clear();
        self.clear_recognition();
    }

    /// Current prediction for display.
    pub fn prediction(&self) -> Option<Prediction> {
        self.prediction
    }

    /// Hold progress (0–100) for display.
    pub fn hold_progress(&self) -> f32 {
        self.hold.progress()
    }

    pub fn hold_phase(&self, now: Instant) -> HoldPhase {
        self.hold.phase(now)
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn buffered_frames(&self) -> usize {
        self.window.len()
    }

    pub fn stats(&self) -> &SharedStats {
        &self.stats
    }

    fn clear_recognition(&mut self) {
        self.prediction = None;
        self.smoother.reset();
        self.hold.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LETTER_COUNT;
    use crate::tracking::{DetectedHand, Handedness, Keypoint, HAND_LANDMARK_COUNT};

    fn hands() -> TrackingResult {
        TrackingResult::with_hands(vec![DetectedHand::new(
            Handedness::Right,
            vec![Keypoint::new(0.4, 0.5, 0.1); HAND_LANDMARK_COUNT],
        )])
    }

    fn peaked(index: usize, score: f32) -> Vec<f32> {
        let rest = (1.0 - score) / (LETTER_COUNT as f32 - 1.0);
        let mut probabilities = vec![rest; LETTER_COUNT];
        probabilities[index] = score;
        probabilities
    }

    fn letter(c: char) -> Letter {
        Letter::from_char(c).unwrap()
    }

    /// Push frames until the window is full; returns the first request.
    fn fill(pipeline: &mut RecognitionPipeline, now: Instant) -> InferenceRequest {
        for _ in 0..59 {
            assert!(pipeline.on_frame(&hands(), now).is_none());
        }
        pipeline
            .on_frame(&hands(), now)
            .expect("request once the window is full")
    }

    #[test]
    fn test_no_request_until_window_full() {
        let mut pipeline = RecognitionPipeline::new(&RecognitionConfig::default());
        let request = fill(&mut pipeline, Instant::now());
        assert_eq!(request.landmarks.len(), 60);
        assert_eq!(request.session, 0);
        assert!(pipeline.in_flight());
    }

    #[test]
    fn test_one_request_in_flight_and_min_interval() {
        let mut pipeline = RecognitionPipeline::new(&RecognitionConfig::default());
        let start = Instant::now();
        let request = fill(&mut pipeline, start);

        // In flight: no new request even long after.
        assert!(pipeline
            .on_frame(&hands(), start + Duration::from_secs(5))
            .is_none());

        pipeline.on_completion(
            InferenceCompletion::new(request.session, Ok(peaked(0, 0.9))),
            start + Duration::from_millis(50),
        );
        assert!(!pipeline.in_flight());

        // Idle but inside the minimum interval.
        assert!(pipeline
            .on_frame(&hands(), start + Duration::from_millis(100))
            .is_none());
        assert!(pipeline
            .on_frame(&hands(), start + Duration::from_millis(175))
            .is_some());
    }

    #[test]
    fn test_no_request_without_hands() {
        let mut pipeline = RecognitionPipeline::new(&RecognitionConfig::default());
        let now = Instant::now();
        for _ in 0..100 {
            assert!(pipeline.on_frame(&TrackingResult::empty(), now).is_none());
        }
        assert_eq!(pipeline.buffered_frames(), 60);
        assert_eq!(pipeline.session(), 0);
    }

    #[test]
    fn test_hand_loss_resets_prediction_and_hold() {
        let mut pipeline = RecognitionPipeline::new(&RecognitionConfig::default());
        let mut now = Instant::now();
        let mut request = fill(&mut pipeline, now);

        for _ in 0..5 {
            pipeline.on_completion(InferenceCompletion::new(request.session, Ok(peaked(1, 0.9))), now);
            now += Duration::from_millis(200);
            request = pipeline.on_frame(&hands(), now).unwrap();
        }
        assert_eq!(pipeline.prediction().unwrap().label, letter('B'));
        assert!(pipeline.hold_progress() > 50.0);

        pipeline.on_frame(&TrackingResult::empty(), now);
        assert_eq!(pipeline.prediction(), None);
        assert_eq!(pipeline.hold_progress(), 0.0);
        assert_eq!(pipeline.session(), 1);
        // The raw window is not cleared.
        assert_eq!(pipeline.buffered_frames(), 60);
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut pipeline = RecognitionPipeline::new(&RecognitionConfig::default());
        let now = Instant::now();
        let request = fill(&mut pipeline, now);

        pipeline.on_frame(&TrackingResult::empty(), now);
        pipeline.on_frame(&hands(), now);
        assert!(pipeline.in_flight());

        let confirmed = pipeline.on_completion(
            InferenceCompletion::new(request.session, Ok(peaked(0, 1.0))),
            now,
        );
        assert_eq!(confirmed, None);
        assert_eq!(pipeline.prediction(), None);
        assert_eq!(pipeline.hold_progress(), 0.0);
        assert!(!pipeline.in_flight());
        assert_eq!(pipeline.stats().snapshot().stale_responses, 1);
    }

    #[test]
    fn test_failures_are_skipped() {
        let mut pipeline = RecognitionPipeline::new(&RecognitionConfig::default());
        let now = Instant::now();
        let request = fill(&mut pipeline, now);

        let confirmed = pipeline.on_completion(
            InferenceCompletion::new(
                request.session,
                Err(ClassifierError::Network("connection refused".to_string())),
            ),
            now,
        );
        assert_eq!(confirmed, None);
        assert!(!pipeline.in_flight());

        let request = pipeline
            .on_frame(&hands(), now + Duration::from_millis(200))
            .unwrap();
        pipeline.on_completion(InferenceCompletion::new(request.session, Ok(vec![0.5; 3])), now);
        assert_eq!(pipeline.prediction(), None);
        assert_eq!(pipeline.stats().snapshot().classifier_failures, 2);
    }

    #[test]
    fn test_disabled_pipeline_predicts_but_never_confirms() {
        let mut pipeline = RecognitionPipeline::new(&RecognitionConfig::default());
        pipeline.set_enabled(false);
        let mut now = Instant::now();
        let mut request = fill(&mut pipeline, now);

        for _ in 0..20 {
            let confirmed = pipeline.on_completion(
                InferenceCompletion::new(request.session, Ok(peaked(0, 0.95))),
                now,
            );
            assert_eq!(confirmed, None);
            now += Duration::from_millis(200);
            request = pipeline.on_frame(&hands(), now).unwrap();
        }
        assert_eq!(pipeline.prediction().unwrap().label, letter('A'));
        assert_eq!(pipeline.hold_progress(), 0.0);

        pipeline.set_enabled(true);
        let mut confirmations = 0;
        for _ in 0..8 {
            if pipeline
                .on_completion(InferenceCompletion::new(request.session, Ok(peaked(0, 0.95))), now)
                .is_some()
            {
                confirmations += 1;
            }
            now += Duration::from_millis(200);
            request = pipeline.on_frame(&hands(), now).unwrap();
        }
        assert_eq!(confirmations, 1);
    }

    #[test]
    fn test_target_change_clears_lock() {
        let mut pipeline = RecognitionPipeline::new(&RecognitionConfig::default());
        pipeline.set_target_letter(Some(letter('A')));
        let mut now = Instant::now();
        let mut request = fill(&mut pipeline, now);
        let mut confirmed = Vec::new();

        for _ in 0..8 {
            confirmed.extend(pipeline.on_completion(
                InferenceCompletion::new(request.session, Ok(peaked(0, 0.95))),
                now,
            ));
            now += Duration::from_millis(180);
            request = pipeline.on_frame(&hands(), now).unwrap();
        }
        assert_eq!(confirmed, vec![letter('A')]);
        assert!(matches!(pipeline.hold_phase(now), HoldPhase::Cooldown(_)));

        // Same target again: lock stays.
        pipeline.set_target_letter(Some(letter('A')));
        assert!(matches!(pipeline.hold_phase(now), HoldPhase::Cooldown(_)));

        // New word whose target is also A: lock is cleared.
        pipeline.set_target_letter(Some(letter('B')));
        pipeline.set_target_letter(Some(letter('A')));
        assert_eq!(pipeline.hold_phase(now), HoldPhase::Idle);
    }

    #[test]
    fn test_reset_invalidates_in_flight_request() {
        let mut pipeline = RecognitionPipeline::new(&RecognitionConfig::default());
        let now = Instant::now();
        let request = fill(&mut pipeline, now);

        pipeline.reset();
        assert_eq!(pipeline.buffered_frames(), 0);
        assert_eq!(pipeline.session(), request.session + 1);
        pipeline.on_completion(InferenceCompletion::new(request.session, Ok(peaked(0, 1.0))), now);
        assert_eq!(pipeline.prediction(), None);
    }
}
