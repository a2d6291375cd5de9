//! Letter games driven by confirmed letters.
//!
//! Each game is a [`LetterConsumer`](crate::pipeline::LetterConsumer): it
//! receives letters from the recognition pipeline, tells the pipeline
//! which letter it expects next, and disables input while it has nothing
//! to ask for.

pub mod fishing;
pub mod train;

pub use fishing::{fish_letters, FishingSession, DEFAULT_FISH_COUNT, FISH_POINTS};
pub use train::{
    generate_sequence, is_valid_letter, validate_input, GameLevel, TrainRound, TrainSession,
    DEFAULT_SEQUENCE_LENGTH,
};

use crate::core::Letter;
use serde::{Deserialize, Serialize};

/// One confirmed letter as judged by a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub letter: Letter,
    pub expected: Letter,
    pub correct: bool,
}

impl Attempt {
    pub fn new(letter: Letter, expected: Letter) -> Self {
        Self {
            letter,
            expected,
            correct: letter == expected,
        }
    }
}
