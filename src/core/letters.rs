//! The 26-letter label space shared by the classifier and the games.

use serde::{Deserialize, Serialize};

/// Number of classifier output classes (A–Z).
pub const LETTER_COUNT: usize = 26;

/// Labels in classifier output order.
pub const ALPHABET: [char; LETTER_COUNT] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// An uppercase alphabet letter, stored as its classifier index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct Letter(u8);

impl Letter {
    /// Letter for a classifier output index.
    pub fn from_index(index: usize) -> Option<Self> {
        (index < LETTER_COUNT).then(|| Letter(index as u8))
    }

    /// Letter for an ASCII character, ignoring case.
    pub fn from_char(c: char) -> Option<Self> {
        let upper = c.to_ascii_uppercase();
        upper
            .is_ascii_uppercase()
            .then(|| Letter(upper as u8 - b'A'))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn as_char(self) -> char {
        ALPHABET[self.index()]
    }

    /// The letter `offset` places later, wrapping after Z.
    pub fn wrapping_add(self, offset: usize) -> Self {
        Letter(((self.index() + offset) % LETTER_COUNT) as u8)
    }
}

impl std::fmt::Display for Letter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl TryFrom<char> for Letter {
    type Error = String;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Letter::from_char(c).ok_or_else(|| format!("not an alphabet letter: {c:?}"))
    }
}

impl From<Letter> for char {
    fn from(letter: Letter) -> Self {
        letter.as_char()
    }
}

/// Parse a string such as `"CAT"` into letters, skipping anything else.
pub fn parse_letters(s: &str) -> Vec<Letter> {
    s.chars().filter_map(Letter::from_char).collect()
}
