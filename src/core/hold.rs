//! Hold-to-confirm state machine.
//!
//! Sustained high confidence for the current top label builds up a hold
//! counter. Reaching the hold threshold confirms the letter once, after
//! which that letter is locked out for a cooldown period.
//!
//! Growth is +1 per qualifying update and decay is −0.5 per non-qualifying
//! update, so a brief dip slows progress without cancelling it. The counter
//! is capped a little above the threshold so that draining it never takes
//! long.

use crate::config::RecognitionConfig;
use crate::core::letters::Letter;
use std::time::{Duration, Instant};

/// Extra headroom above the hold threshold.
const HOLD_SLACK: f32 = 2.0;

/// Thresholds for the hold state machine.
#[derive(Debug, Clone)]
pub struct HoldConfig {
    pub confidence_threshold: f32,
    pub hold_frames: u32,
    pub cooldown: Duration,
}

impl Default for HoldConfig {
    fn default() -> Self {
        Self::from(&RecognitionConfig::default())
    }
}

impl From<&RecognitionConfig> for HoldConfig {
    fn from(config: &RecognitionConfig) -> Self {
        Self {
            confidence_threshold: config.confidence_threshold,
            hold_frames: config.hold_frames.max(1),
            cooldown: config.cooldown,
        }
    }
}

/// Coarse state of the machine, for display and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldPhase {
    /// No hold progress and no locked letter.
    Idle,
    /// Hold progress is building (or draining).
    Accumulating,
    /// A letter was confirmed recently and cannot confirm again yet.
    Cooldown(Letter),
}

#[derive(Debug, Clone, Copy)]
struct ConfirmationLock {
    letter: Letter,
    since: Instant,
}

/// Converts a stream of (label, score) observations into confirmations.
#[derive(Debug, Clone)]
pub struct HoldStateMachine {
    config: HoldConfig,
    counter: f32,
    lock: Option<ConfirmationLock>,
}

impl HoldStateMachine {
    pub fn new(config: HoldConfig) -> Self {
        Self {
            config,
            counter: 0.0,
            lock: None,
        }
    }

    /// Feed one smoothed observation. Returns the letter if it was confirmed.
    pub fn observe(&mut self, label: Letter, score: f32, now: Instant) -> Option<Letter> {
        self.expire_lock(now);

        if score > self.config.confidence_threshold {
            self.counter += 1.0;
        } else {
            self.counter = (self.counter - 0.5).max(0.0);
        }
        self.counter = self.counter.min(self.max_counter());

        if self.counter < self.threshold() {
            return None;
        }
        if self.lock.map(|lock| lock.letter) == Some(label) {
            return None;
        }

        self.lock = Some(ConfirmationLock { letter: label, since: now });
        self.counter = 0.0;
        Some(label)
    }

    /// Hold progress as a percentage in 0–100.
    pub fn progress(&self) -> f32 {
        (100.0 * self.counter / self.threshold()).min(100.0)
    }

    pub fn counter(&self) -> f32 {
        self.counter
    }

    /// Highest value the counter can reach.
    pub fn max_counter(&self) -> f32 {
        self.threshold() + HOLD_SLACK
    }

    /// The letter currently locked against re-confirmation, if any.
    pub fn locked_letter(&self, now: Instant) -> Option<Letter> {
        self.lock
            .filter(|lock| now.saturating_duration_since(lock.since) < self.config.cooldown)
            .map(|lock| lock.letter)
    }

    pub fn phase(&self, now: Instant) -> HoldPhase {
        if let Some(letter) = self.locked_letter(now) {
            HoldPhase::Cooldown(letter)
        } else if self.counter > 0.0 {
            HoldPhase::Accumulating
        } else {
            HoldPhase::Idle
        }
    }

    /// Drop hold progress. The confirmation lock keeps running its cooldown.
    pub fn reset(&mut self) {
        self.counter = 0.0;
    }

    /// Drop hold progress and the confirmation lock.
    pub fn clear(&mut self) {
        self.counter = 0.0;
        self.lock = None;
    }

    fn threshold(&self) -> f32 {
        self.config.hold_frames as f32
    }

    fn expire_lock(&mut self, now: Instant) {
        if self.locked_letter(now).is_none() {
            self.lock = None;
        }
    }
}

impl Default for HoldStateMachine {
    fn default() -> Self {
        Self::new(HoldConfig::default())
    }
}
