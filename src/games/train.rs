//! Alphabet train: fill in the missing letter of a short run.
//!
//! A round shows a few consecutive letters with one of them blanked out.
//! Level 1 walks the alphabet in order from round to round; level 2 picks
//! a random starting point each time.

use crate::core::{Letter, LETTER_COUNT};
use crate::games::Attempt;
use crate::pipeline::LetterConsumer;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Letters per round unless the caller asks otherwise.
pub const DEFAULT_SEQUENCE_LENGTH: usize = 3;

/// Difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameLevel {
    /// Consecutive rounds continue through the alphabet
    Sequential,
    /// Each round starts at a random letter
    Random,
}

impl GameLevel {
    /// Level from its numeric form (1 or 2).
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(GameLevel::Sequential),
            2 => Some(GameLevel::Random),
            _ => None,
        }
    }
}

/// One train round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainRound {
    pub full_sequence: Vec<Letter>,
    pub missing_index: usize,
    pub answer: Letter,
    pub is_complete: bool,
    pub level: GameLevel,
}

impl TrainRound {
    /// The sequence as shown to the player, with `_` in the gap.
    pub fn display(&self) -> String {
        self.full_sequence
            .iter()
            .enumerate()
            .map(|(i, letter)| {
                if i == self.missing_index && !self.is_complete {
                    '_'
                } else {
                    letter.as_char()
                }
            })
            .collect()
    }
}

/// `len` consecutive letters starting at a random letter, never wrapping past Z.
pub fn generate_sequence<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<Letter> {
    let len = len.clamp(1, LETTER_COUNT);
    let start = rng.gen_range(0..=LETTER_COUNT - len);
    (start..start + len).filter_map(Letter::from_index).collect()
}

/// Case-insensitive comparison of a typed key against the answer.
pub fn validate_input(key: &str, answer: Letter) -> bool {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Letter::from_char(c) == Some(answer),
        _ => false,
    }
}

/// Whether `key` is exactly one alphabet letter.
pub fn is_valid_letter(key: &str) -> bool {
    let mut chars = key.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_alphabetic())
}

fn deal_round<R: Rng + ?Sized>(
    rng: &mut R,
    sequential_index: &mut usize,
    len: usize,
    level: GameLevel,
) -> TrainRound {
    let full_sequence: Vec<Letter> = match level {
        GameLevel::Sequential => {
            let sequence = (0..len)
                .filter_map(|i| Letter::from_index((*sequential_index + i) % LETTER_COUNT))
                .collect();
            *sequential_index = (*sequential_index + len) % LETTER_COUNT;
            sequence
        }
        GameLevel::Random => generate_sequence(len, rng),
    };
    let missing_index = rng.gen_range(0..full_sequence.len());
    let answer = full_sequence[missing_index];
    TrainRound {
        full_sequence,
        missing_index,
        answer,
        is_complete: false,
        level,
    }
}

/// A train game in progress.
pub struct TrainSession<R: Rng> {
    rng: R,
    sequence_length: usize,
    level: GameLevel,
    sequential_index: usize,
    round: TrainRound,
    auto_advance: bool,
    rounds_completed: u32,
    attempts: Vec<Attempt>,
}

impl<R: Rng> TrainSession<R> {
    /// Start a session with its first round already dealt.
    pub fn new(mut rng: R, sequence_length: usize, level: GameLevel) -> Self {
        let sequence_length = sequence_length.clamp(1, LETTER_COUNT);
        let mut sequential_index = 0;
        let round = deal_round(&mut rng, &mut sequential_index, sequence_length, level);
        Self {
            rng,
            sequence_length,
            level,
            sequential_index,
            round,
            auto_advance: false,
            rounds_completed: 0,
            attempts: Vec::new(),
        }
    }

    /// Deal the next round automatically once one is solved.
    pub fn with_auto_advance(mut self, auto_advance: bool) -> Self {
        self.auto_advance = auto_advance;
        self
    }

    /// Replace the current round.
    pub fn new_round(&mut self, len: usize, level: GameLevel) -> &TrainRound {
        let len = len.clamp(1, LETTER_COUNT);
        self.round = deal_round(&mut self.rng, &mut self.sequential_index, len, level);
        self.level = level;
        self.sequence_length = len;
        tracing::debug!("Train round: {}", self.round.display());
        &self.round
    }

    /// Change level and deal a fresh round at that level.
    pub fn set_level(&mut self, level: GameLevel) {
        self.new_round(self.sequence_length, level);
    }

    /// Restart level 1 from the beginning of the alphabet.
    pub fn reset_sequential_index(&mut self) {
        self.sequential_index = 0;
    }

    /// Handle a typed key. Returns `None` for keys that are not letters or
    /// when the round is already solved.
    pub fn handle_key(&mut self, key: &str) -> Option<bool> {
        if !is_valid_letter(key) || self.round.is_complete {
            return None;
        }
        let letter = key.chars().next().and_then(Letter::from_char)?;
        Some(self.submit(letter))
    }

    pub fn round(&self) -> &TrainRound {
        &self.round
    }

    pub fn level(&self) -> GameLevel {
        self.level
    }

    pub fn rounds_completed(&self) -> u32 {
        self.rounds_completed
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    fn submit(&mut self, letter: Letter) -> bool {
        let attempt = Attempt::new(letter, self.round.answer);
        self.attempts.push(attempt);

        if attempt.correct {
            self.round.is_complete = true;
            self.rounds_completed += 1;
            tracing::info!("Train round solved with {}", letter);
            if self.auto_advance {
                self.new_round(self.sequence_length, self.level);
            }
        } else {
            tracing::info!("Train: {} is not the missing letter", letter);
        }
        attempt.correct
    }
}

impl<R: Rng> LetterConsumer for TrainSession<R> {
    fn on_letter_confirmed(&mut self, letter: Letter) {
        if !self.round.is_complete {
            self.submit(letter);
        }
    }

    fn enabled(&self) -> bool {
        !self.round.is_complete
    }

    fn target_letter(&self) -> Option<Letter> {
        (!self.round.is_complete).then_some(self.round.answer)
    }
}
