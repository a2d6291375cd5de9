//! Landmark feature extraction.
//!
//! Converts one hand-tracking result into a fixed 21×6 feature frame:
//! columns 0–2 hold the signer's left hand, columns 3–5 the right hand.
//! The tracker's handedness label is inverted and x is un-mirrored, since
//! the camera feed is mirrored for display.

use crate::tracking::types::{TrackingResult, HAND_LANDMARK_COUNT};

/// Rows per frame (one per hand keypoint).
pub const FRAME_ROWS: usize = HAND_LANDMARK_COUNT;

/// Columns per frame (x, y, z for each of two hands).
pub const FRAME_COLS: usize = 6;

/// One frame of classifier input.
pub type LandmarkFrame = [[f32; FRAME_COLS]; FRAME_ROWS];

/// A frame with no hands in it.
pub const EMPTY_FRAME: LandmarkFrame = [[0.0; FRAME_COLS]; FRAME_ROWS];

/// Build a feature frame from a tracking result.
///
/// Zero, one, or two hands are all valid. A side with no hand stays zero.
/// If two hands resolve to the same side, the later one wins.
pub fn extract_frame(result: &TrackingResult) -> LandmarkFrame {
    let mut frame = EMPTY_FRAME;

    for hand in &result.hands {
        let offset = hand.handedness.corrected().column_offset();

        for (row, keypoint) in hand.landmarks.iter().take(FRAME_ROWS).enumerate() {
            frame[row][offset] = sanitize(1.0 - keypoint.x);
            frame[row][offset + 1] = sanitize(keypoint.y);
            frame[row][offset + 2] = sanitize(keypoint.z);
        }
    }

    frame
}

/// Clamp into [0, 1]; non-finite values become 0.
fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Whether every cell of the frame is zero.
pub fn is_empty_frame(frame: &LandmarkFrame) -> bool {
    frame.iter().flatten().all(|v| *v == 0.0)
}
