//! Core recognition algorithms.
//!
//! This module contains:
//! - Landmark feature extraction from hand-tracking results
//! - The sliding window of frames fed to the classifier
//! - Exponential smoothing of classifier probabilities
//! - The hold-to-confirm state machine

pub mod features;
pub mod hold;
pub mod letters;
pub mod smoothing;
pub mod windowing;

// Re-export commonly used types
pub use features::{extract_frame, LandmarkFrame, EMPTY_FRAME, FRAME_COLS, FRAME_ROWS};
pub use hold::{HoldConfig, HoldPhase, HoldStateMachine};
pub use letters::{parse_letters, Letter, ALPHABET, LETTER_COUNT};
pub use smoothing::{argmax, ProbabilitySmoother};
pub use windowing::{SlidingWindow, SEQUENCE_LENGTH};
