//! Fishing: sign the first letter of each word to catch its fish.
//!
//! The caller supplies the target letters. Each target is shown among a
//! handful of fish letters; signing the target scores and moves on, while
//! signing one of the other fish counts as a miss.

use crate::core::{Letter, LETTER_COUNT};
use crate::games::Attempt;
use crate::pipeline::LetterConsumer;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

/// Fish on screen per target.
pub const DEFAULT_FISH_COUNT: usize = 7;

/// Points for a catch.
pub const FISH_POINTS: u32 = 10;

/// `count` distinct letters including `target`, in random order.
pub fn fish_letters<R: Rng + ?Sized>(target: Letter, count: usize, rng: &mut R) -> Vec<Letter> {
    let count = count.clamp(1, LETTER_COUNT);
    let mut letters = vec![target];
    while letters.len() < count {
        if let Some(candidate) = Letter::from_index(rng.gen_range(0..LETTER_COUNT)) {
            if !letters.contains(&candidate) {
                letters.push(candidate);
            }
        }
    }
    letters.shuffle(rng);
    letters
}

/// A fishing game in progress.
pub struct FishingSession<R: Rng> {
    rng: R,
    targets: VecDeque<Letter>,
    fish: Vec<Letter>,
    fish_count: usize,
    score: u32,
    caught: Vec<Letter>,
    attempts: Vec<Attempt>,
}

impl<R: Rng> FishingSession<R> {
    pub fn new(rng: R, targets: impl IntoIterator<Item = Letter>) -> Self {
        Self::with_fish_count(rng, targets, DEFAULT_FISH_COUNT)
    }

    pub fn with_fish_count(
        rng: R,
        targets: impl IntoIterator<Item = Letter>,
        fish_count: usize,
    ) -> Self {
        let mut session = Self {
            rng,
            targets: targets.into_iter().collect(),
            fish: Vec::new(),
            fish_count,
            score: 0,
            caught: Vec::new(),
            attempts: Vec::new(),
        };
        session.stock_fish();
        session
    }

    /// Letter currently being fished for.
    pub fn current_target(&self) -> Option<Letter> {
        self.targets.front().copied()
    }

    /// Letters on the fish for the current target.
    pub fn fish(&self) -> &[Letter] {
        &self.fish
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn caught(&self) -> &[Letter] {
        &self.caught
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    pub fn misses(&self) -> usize {
        self.attempts.iter().filter(|a| !a.correct).count()
    }

    pub fn is_finished(&self) -> bool {
        self.targets.is_empty()
    }

    fn stock_fish(&mut self) {
        self.fish = match self.current_target() {
            Some(target) => fish_letters(target, self.fish_count, &mut self.rng),
            None => Vec::new(),
        };
    }
}

impl<R: Rng> LetterConsumer for FishingSession<R> {
    fn on_letter_confirmed(&mut self, letter: Letter) {
        let Some(target) = self.current_target() else {
            return;
        };

        if letter == target {
            self.attempts.push(Attempt::new(letter, target));
            self.score += FISH_POINTS;
            self.caught.push(letter);
            self.targets.pop_front();
            self.stock_fish();
            tracing::info!("Caught {} (score {})", letter, self.score);
        } else if self.fish.contains(&letter) {
            self.attempts.push(Attempt::new(letter, target));
            tracing::info!("Missed: signed {} while fishing for {}", letter, target);
        } else {
            tracing::debug!("Ignoring {}: no such fish", letter);
        }
    }

    fn enabled(&self) -> bool {
        !self.is_finished()
    }

    fn target_letter(&self) -> Option<Letter> {
        self.current_target()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parse_letters;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn letter(c: char) -> Letter {
        Letter::from_char(c).unwrap()
    }

    #[test]
    fn test_fish_letters_include_target_once() {
        let mut rng = StdRng::seed_from_u64(42);
        for index in 0..LETTER_COUNT {
            let target = Letter::from_index(index).unwrap();
            let letters = fish_letters(target, 7, &mut rng);
            assert_eq!(letters.len(), 7);
            assert_eq!(letters.iter().filter(|l| **l == target).count(), 1);

            let mut deduped = letters.clone();
            deduped.sort();
            deduped.dedup();
            assert_eq!(deduped.len(), 7);
        }
    }

    #[test]
    fn test_fish_count_is_bounded() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(fish_letters(letter('A'), 40, &mut rng).len(), LETTER_COUNT);
        assert_eq!(fish_letters(letter('A'), 0, &mut rng), vec![letter('A')]);
    }

    #[test]
    fn test_catching_advances_targets() {
        let mut session = FishingSession::new(StdRng::seed_from_u64(3), parse_letters("CAT"));
        assert_eq!(session.current_target(), Some(letter('C')));
        assert!(session.fish().contains(&letter('C')));

        session.on_letter_confirmed(letter('C'));
        assert_eq!(session.score(), 10);
        assert_eq!(session.current_target(), Some(letter('A')));
        assert!(session.fish().contains(&letter('A')));

        session.on_letter_confirmed(letter('A'));
        session.on_letter_confirmed(letter('T'));
        assert_eq!(session.score(), 30);
        assert!(session.is_finished());
        assert!(!session.enabled());
        assert_eq!(session.target_letter(), None);
        assert_eq!(session.caught(), parse_letters("CAT").as_slice());
        assert!(session.fish().is_empty());
    }

    #[test]
    fn test_wrong_fish_is_a_miss() {
        let mut session = FishingSession::new(StdRng::seed_from_u64(11), parse_letters("D"));
        let wrong_fish = session
            .fish()
            .iter()
            .copied()
            .find(|l| *l != letter('D'))
            .unwrap();
        let absent = (0..LETTER_COUNT)
            .filter_map(Letter::from_index)
            .find(|l| !session.fish().contains(l))
            .unwrap();

        session.on_letter_confirmed(wrong_fish);
        assert_eq!(session.misses(), 1);
        assert_eq!(session.score(), 0);
        assert_eq!(session.current_target(), Some(letter('D')));

        session.on_letter_confirmed(absent);
        assert_eq!(session.misses(), 1);
        assert_eq!(session.attempts().len(), 1);
    }

    #[test]
    fn test_empty_targets_disable_input() {
        let mut session = FishingSession::new(StdRng::seed_from_u64(0), Vec::new());
        assert!(!session.enabled());
        session.on_letter_confirmed(letter('A'));
        assert_eq!(session.score(), 0);
        assert!(session.attempts().is_empty());
    }
}
