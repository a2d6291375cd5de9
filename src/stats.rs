//! Recognition session statistics.
//!
//! Counters describing what the pipeline did during a session. They are
//! shared between the pipeline and whoever displays them, so they are
//! atomics behind an `Arc`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Live counters for one recognition session.
#[derive(Debug)]
pub struct RecognitionStats {
    run_id: String,
    frames_processed: AtomicU64,
    frames_with_hands: AtomicU64,
    requests_sent: AtomicU64,
    responses_applied: AtomicU64,
    stale_responses: AtomicU64,
    classifier_failures: AtomicU64,
    letters_confirmed: AtomicU64,
    session_start: DateTime<Utc>,
    persist_path: Option<PathBuf>,
}

impl RecognitionStats {
    pub fn new() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            frames_processed: AtomicU64::new(0),
            frames_with_hands: AtomicU64::new(0),
            requests_sent: AtomicU64::new(0),
            responses_applied: AtomicU64::new(0),
            stale_responses: AtomicU64::new(0),
            classifier_failures: AtomicU64::new(0),
            letters_confirmed: AtomicU64::new(0),
            session_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Stats that are written to `path` on [`RecognitionStats::save`].
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut stats = Self::new();
        stats.persist_path = Some(path);
        stats
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn record_frame(&self, has_hands: bool) {
        self.frames_processed.fetch_add(1, Ordering::Relaxed);
        if has_hands {
            self.frames_with_hands.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_request(&self) {
        self.requests_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_response_applied(&self) {
        self.responses_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale_response(&self) {
        self.stale_responses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_classifier_failure(&self) {
        self.classifier_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_letter_confirmed(&self) {
        self.letters_confirmed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            run_id: self.run_id.clone(),
            frames_processed: self.frames_processed.load(Ordering::Relaxed),
            frames_with_hands: self.frames_with_hands.load(Ordering::Relaxed),
            requests_sent: self.requests_sent.load(Ordering::Relaxed),
            responses_applied: self.responses_applied.load(Ordering::Relaxed),
            stale_responses: self.stale_responses.load(Ordering::Relaxed),
            classifier_failures: self.classifier_failures.load(Ordering::Relaxed),
            letters_confirmed: self.letters_confirmed.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.snapshot();
        format!(
            "Session Statistics:\n\
             - Frames processed: {}\n\
             - Frames with hands: {}\n\
             - Classifier requests: {}\n\
             - Responses applied: {}\n\
             - Stale responses dropped: {}\n\
             - Classifier failures: {}\n\
             - Letters confirmed: {}\n\
             - Session duration: {} seconds",
            stats.frames_processed,
            stats.frames_with_hands,
            stats.requests_sent,
            stats.responses_applied,
            stats.stale_responses,
            stats.classifier_failures,
            stats.letters_confirmed,
            stats.session_duration_secs
        )
    }

    /// Save stats to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let json =
                serde_json::to_string_pretty(&self.snapshot()).map_err(std::io::Error::other)?;

            std::fs::write(path, json)?;
        }
        Ok(())
    }
}

impl Default for RecognitionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub run_id: String,
    pub frames_processed: u64,
    pub frames_with_hands: u64,
    pub requests_sent: u64,
    pub responses_applied: u64,
    pub stale_responses: u64,
    pub classifier_failures: u64,
    pub letters_confirmed: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Thread-safe shared stats.
pub type SharedStats = Arc<RecognitionStats>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting() {
        let stats = RecognitionStats::new();

        stats.record_frame(true);
        stats.record_frame(false);
        stats.record_request();
        stats.record_stale_response();
        stats.record_letter_confirmed();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.frames_processed, 2);
        assert_eq!(snapshot.frames_with_hands, 1);
        assert_eq!(snapshot.requests_sent, 1);
        assert_eq!(snapshot.stale_responses, 1);
        assert_eq!(snapshot.letters_confirmed, 1);
        assert_eq!(snapshot.classifier_failures, 0);
    }

    #[test]
    fn test_summary_format() {
        let summary = RecognitionStats::new().summary();
        assert!(summary.contains("Frames processed"));
        assert!(summary.contains("Letters confirmed"));
    }

    #[test]
    fn test_save_writes_snapshot() {
        let path = std::env::temp_dir()
            .join(format!("isl-stats-{}", uuid::Uuid::new_v4()))
            .join("stats.json");
        let stats = RecognitionStats::with_persistence(path.clone());
        stats.record_request();
        stats.save().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: StatsSnapshot = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.requests_sent, 1);
        assert_eq!(parsed.run_id, stats.run_id());
        let _ = std::fs::remove_file(path);
    }
}
