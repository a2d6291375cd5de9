//! End-to-end tests for the recognition pipeline and runtime

use isl_sign_agent::classifier::{Classifier, PredictFuture};
use isl_sign_agent::core::{LandmarkFrame, Letter, LETTER_COUNT, SEQUENCE_LENGTH};
use isl_sign_agent::pipeline::{InferenceCompletion, RecognitionPipeline};
use isl_sign_agent::tracking::{DetectedHand, Handedness, Keypoint, HAND_LANDMARK_COUNT};
use isl_sign_agent::{Config, RecognitionConfig, RecognitionRuntime, ReplaySource, TrackingResult};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn hands() -> TrackingResult {
    TrackingResult::with_hands(vec![
        DetectedHand::new(
            Handedness::Left,
            vec![Keypoint::new(0.4, 0.5, 0.0); HAND_LANDMARK_COUNT],
        ),
        DetectedHand::new(
            Handedness::Right,
            vec![Keypoint::new(0.6, 0.5, 0.0); HAND_LANDMARK_COUNT],
        ),
    ])
}

fn peaked(index: usize, score: f32) -> Vec<f32> {
    let mut probabilities = vec![(1.0 - score) / (LETTER_COUNT as f32 - 1.0); LETTER_COUNT];
    probabilities[index] = score;
    probabilities
}

/// Feed `responses` identical classifier answers spaced at the minimum
/// request interval and return the steps at which a letter was confirmed.
fn run_steady_sign(config: &RecognitionConfig, responses: u32) -> Vec<(u32, Letter)> {
    let mut pipeline = RecognitionPipeline::new(config);
    let start = Instant::now();

    for _ in 0..SEQUENCE_LENGTH - 1 {
        assert!(pipeline.on_frame(&hands(), start).is_none());
    }

    let mut confirmations = Vec::new();
    for step in 0..responses {
        let now = start + config.min_request_interval * step;
        let request = pipeline
            .on_frame(&hands(), now)
            .expect("full window should trigger a request");
        assert_eq!(request.landmarks.len(), SEQUENCE_LENGTH);

        let completion = InferenceCompletion::new(request.session, Ok(peaked(0, 0.9)));
        if let Some(letter) = pipeline.on_completion(completion, now) {
            assert_eq!(pipeline.hold_progress(), 0.0);
            confirmations.push((step, letter));
        }
    }
    confirmations
}

#[test]
fn test_steady_sign_confirms_once_per_cooldown() {
    let config = RecognitionConfig::default();
    let confirmations = run_steady_sign(&config, 60);
    let a = Letter::from_char('A').unwrap();

    // First confirmation on the 8th qualifying update, then one more each
    // time the 2 s lock has run out and a fresh hold has built up.
    let steps: Vec<u32> = confirmations.iter().map(|(step, _)| *step).collect();
    assert_eq!(steps, vec![7, 19, 31, 43, 55]);
    assert!(confirmations.iter().all(|(_, letter)| *letter == a));

    for pair in steps.windows(2) {
        let gap = config.min_request_interval * (pair[1] - pair[0]);
        assert!(gap >= config.cooldown);
    }
}

#[test]
fn test_steady_sign_within_cooldown_fires_exactly_once() {
    let config = RecognitionConfig {
        cooldown: Duration::from_secs(60),
        ..RecognitionConfig::default()
    };
    let confirmations = run_steady_sign(&config, 60);
    assert_eq!(confirmations, vec![(7, Letter::from_char('A').unwrap())]);
}

#[test]
fn test_hand_loss_discards_answer_in_flight() {
    let config = RecognitionConfig::default();
    let mut pipeline = RecognitionPipeline::new(&config);
    let start = Instant::now();

    for _ in 0..SEQUENCE_LENGTH - 1 {
        pipeline.on_frame(&hands(), start);
    }
    let request = pipeline.on_frame(&hands(), start).unwrap();

    // Hands drop out while the classifier is still working.
    assert!(pipeline.on_frame(&TrackingResult::empty(), start).is_none());

    let completion = InferenceCompletion::new(request.session, Ok(peaked(3, 0.99)));
    assert!(pipeline.on_completion(completion, start).is_none());
    assert!(pipeline.prediction().is_none());
    assert_eq!(pipeline.stats().snapshot().stale_responses, 1);
}

struct SteadyClassifier;

impl Classifier for SteadyClassifier {
    fn predict<'a>(&'a self, landmarks: &'a [LandmarkFrame]) -> PredictFuture<'a> {
        let frames = landmarks.len();
        Box::pin(async move {
            assert_eq!(frames, SEQUENCE_LENGTH);
            Ok(peaked(1, 0.95))
        })
    }
}

#[tokio::test]
async fn test_replayed_recording_confirms_letter() {
    let path = std::env::temp_dir().join(format!("isl-replay-{}.jsonl", uuid::Uuid::new_v4()));
    let line = serde_json::to_string(&hands()).unwrap();
    let recording: Vec<&str> = std::iter::repeat(line.as_str()).take(600).collect();
    std::fs::write(&path, recording.join("\n")).unwrap();

    let mut config = Config::default();
    config.frame_period = Duration::from_millis(1);
    config.recognition.min_request_interval = Duration::ZERO;
    config.recognition.hold_frames = 3;
    config.recognition.cooldown = Duration::from_secs(60);

    let source = ReplaySource::new(&path, config.frame_period);
    let mut runtime = RecognitionRuntime::new(&config, source, Arc::new(SteadyClassifier));

    let mut confirmed = Vec::new();
    let mut on_letter = |letter: Letter| confirmed.push(letter);
    runtime
        .run(&mut on_letter, std::future::pending::<()>())
        .await
        .unwrap();

    assert_eq!(confirmed, vec![Letter::from_char('B').unwrap()]);
    let snapshot = runtime.stats().snapshot();
    assert_eq!(snapshot.frames_processed, 600);
    assert_eq!(snapshot.frames_with_hands, 600);
    assert_eq!(snapshot.classifier_failures, 0);

    let _ = std::fs::remove_file(path);
}
