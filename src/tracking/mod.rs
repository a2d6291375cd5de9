//! Hand-tracking input for the recognition pipeline.
//!
//! Hand tracking itself is done by an external engine. This module defines
//! the results it hands over, the sources that deliver them, and the
//! supervised startup used to acquire a source.

pub mod replay;
pub mod source;
pub mod supervisor;
pub mod types;

// Re-export commonly used types
pub use replay::ReplaySource;
pub use source::{ChannelSource, FrameSource, TrackingError};
pub use supervisor::start_with_retry;
pub use types::{
    DetectedHand, HandSide, Handedness, Keypoint, TrackingResult, HAND_LANDMARK_COUNT,
};
