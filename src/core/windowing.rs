//! Sliding window of landmark frames.
//!
//! Frames are collected into a fixed-length FIFO. Once full, each push
//! evicts the oldest frame. A full window is the gate for inference.

use crate::core::features::LandmarkFrame;
use std::collections::VecDeque;

/// Frames per classifier input sequence.
pub const SEQUENCE_LENGTH: usize = 60;

/// Fixed-capacity FIFO of landmark frames.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    frames: VecDeque<LandmarkFrame>,
    capacity: usize,
}

impl SlidingWindow {
    /// Create a window holding the standard classifier sequence length.
    pub fn new() -> Self {
        Self::with_capacity(SEQUENCE_LENGTH)
    }

    /// Create a window with a custom capacity (at least 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a frame, dropping the oldest if the window is full.
    pub fn push(&mut self, frame: LandmarkFrame) {
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    /// Whether the window holds exactly `capacity` frames.
    pub fn is_full(&self) -> bool {
        self.frames.len() == self.capacity
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Frames from oldest to newest.
    pub fn frames(&self) -> impl Iterator<Item = &LandmarkFrame> {
        self.frames.iter()
    }

    /// Copy of the current sequence in arrival order.
    pub fn snapshot(&self) -> Vec<LandmarkFrame> {
        self.frames.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl Default for SlidingWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::features::EMPTY_FRAME;

    fn marked(value: f32) -> LandmarkFrame {
        let mut frame = EMPTY_FRAME;
        frame[0][0] = value;
        frame
    }

    #[test]
    fn test_fills_to_capacity() {
        let mut window = SlidingWindow::new();
        for i in 0..59 {
            window.push(marked(i as f32));
        }
        assert_eq!(window.len(), 59);
        assert!(!window.is_full());

        window.push(marked(59.0));
        assert!(window.is_full());
    }

    #[test]
    fn test_keeps_most_recent_frames_in_order() {
        let mut window = SlidingWindow::new();
        for i in 0..150 {
            window.push(marked(i as f32));
            assert!(window.len() <= SEQUENCE_LENGTH);
        }

        assert_eq!(window.len(), SEQUENCE_LENGTH);
        let values: Vec<f32> = window.frames().map(|f| f[0][0]).collect();
        let expected: Vec<f32> = (90..150).map(|i| i as f32).collect();
        assert_eq!(values, expected);
        assert_eq!(window.snapshot().len(), SEQUENCE_LENGTH);
    }

    #[test]
    fn test_clear() {
        let mut window = SlidingWindow::with_capacity(3);
        window.push(EMPTY_FRAME);
        window.push(EMPTY_FRAME);
        window.clear();
        assert!(window.is_empty());
        assert_eq!(window.capacity(), 3);
    }
}
