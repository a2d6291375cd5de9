//! Hand-tracking result types.
//!
//! These mirror what an external hand tracker reports per camera frame:
//! zero or more hands, each with 21 normalized keypoints and a handedness
//! label.

use serde::{Deserialize, Serialize};

/// Number of keypoints per hand in the standard hand topology.
pub const HAND_LANDMARK_COUNT: usize = 21;

/// A single normalized 3-D keypoint as reported by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Handedness label exactly as the tracker reports it.
///
/// The camera feed is mirrored for display, so this label is the opposite
/// of the signer's actual hand. Use [`Handedness::corrected`] before
/// placing the hand into a feature frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
    #[serde(alias = "left", alias = "LEFT")]
    Left,
    #[serde(alias = "right", alias = "RIGHT")]
    Right,
}

impl Handedness {
    /// The signer's actual hand for this tracker label.
    pub fn corrected(self) -> HandSide {
        match self {
            Handedness::Left => HandSide::Right,
            Handedness::Right => HandSide::Left,
        }
    }
}

/// Logical hand side after label correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandSide {
    Left,
    Right,
}

impl HandSide {
    /// First feature column owned by this side.
    pub fn column_offset(self) -> usize {
        match self {
            HandSide::Left => 0,
            HandSide::Right => 3,
        }
    }
}

/// One detected hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedHand {
    pub handedness: Handedness,
    pub landmarks: Vec<Keypoint>,
}

impl DetectedHand {
    pub fn new(handedness: Handedness, landmarks: Vec<Keypoint>) -> Self {
        Self {
            handedness,
            landmarks,
        }
    }
}

/// Everything the tracker reported for one camera frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackingResult {
    #[serde(default)]
    pub hands: Vec<DetectedHand>,
}

impl TrackingResult {
    /// A frame in which no hand was detected.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_hands(hands: Vec<DetectedHand>) -> Self {
        Self { hands }
    }

    pub fn has_hands(&self) -> bool {
        !self.hands.is_empty()
    }
}
