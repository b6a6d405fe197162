//! Playing cards and the deck they're drawn from.

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
    // Reserved for cards an observer isn't allowed to see.
    Hidden,
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Clubs => "♣",
            Self::Diamonds => "♦",
            Self::Hearts => "♥",
            Self::Spades => "♠",
            Self::Hidden => "?",
        };
        write!(f, "{repr}")
    }
}

/// Card values run 2..=14 with the ace always high (14).
pub type Value = u8;

/// A single playing card. The reserved pair `value = 0, suit = Hidden`
/// is the face-down placeholder sent to observers who may not see a
/// hole card.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card {
    pub value: Value,
    pub suit: Suit,
}

impl Card {
    #[must_use]
    pub const fn new(value: Value, suit: Suit) -> Self {
        Self { value, suit }
    }

    /// The opaque placeholder shown in place of a concealed hole card.
    #[must_use]
    pub const fn face_down() -> Self {
        Self {
            value: 0,
            suit: Suit::Hidden,
        }
    }

    #[must_use]
    pub const fn is_face_down(&self) -> bool {
        matches!(self.suit, Suit::Hidden)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_face_down() {
            return write!(f, "  ??");
        }
        let value = match self.value {
            14 => "A",
            13 => "K",
            12 => "Q",
            11 => "J",
            v => &v.to_string(),
        };
        let repr = format!("{value}{}", self.suit);
        write!(f, "{repr:>4}")
    }
}

/// An ordered 52-card deck, reshuffled at the start of every hand and
/// consumed front-to-back as cards are dealt.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    next: usize,
    rng: StdRng,
}

impl Deck {
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// A deck with a fixed shuffle sequence, for reproducible tests.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let mut cards = Vec::with_capacity(52);
        for value in 2..=14 {
            for suit in [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades] {
                cards.push(Card::new(value, suit));
            }
        }
        Self {
            cards,
            next: 0,
            rng,
        }
    }

    /// Uniformly reshuffle all 52 cards and rewind to the top.
    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut self.rng);
        self.next = 0;
    }

    /// Take the next card off the top of the deck.
    pub fn draw(&mut self) -> Card {
        let card = self.cards[self.next];
        self.next += 1;
        card
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.next
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}
