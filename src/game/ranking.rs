//! Pure hand evaluation over explicit card sequences.
//!
//! Standard poker ranking, high card through straight flush. The ace
//! plays high everywhere except the wheel (A-2-3-4-5).

use serde::{Deserialize, Serialize};

use super::cards::{Card, Value};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum HandRank {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl HandRank {
    /// English name used in win messages.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Self::HighCard => "high card",
            Self::OnePair => "a pair",
            Self::TwoPair => "two pair",
            Self::ThreeOfAKind => "three of a kind",
            Self::Straight => "a straight",
            Self::Flush => "a flush",
            Self::FullHouse => "a full house",
            Self::FourOfAKind => "four of a kind",
            Self::StraightFlush => "a straight flush",
        }
    }
}

/// The strength of a best-five hand: its rank plus tiebreak values in
/// comparison order. The derived ordering compares rank first, then
/// tiebreaks lexicographically; hands of equal rank always carry the
/// same number of tiebreak values, so the comparison is total.
#[derive(Clone, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct HandStrength {
    pub rank: HandRank,
    pub values: Vec<Value>,
}

/// Evaluate the best 5-card hand from 5..=7 cards (2 hole + up to 5
/// board cards).
#[must_use]
pub fn evaluate(cards: &[Card]) -> HandStrength {
    let n = cards.len();
    debug_assert!((5..=7).contains(&n), "evaluate expects 5 to 7 cards");
    let mut best: Option<HandStrength> = None;
    for a in 0..n - 4 {
        for b in a + 1..n - 3 {
            for c in b + 1..n - 2 {
                for d in c + 1..n - 1 {
                    for e in d + 1..n {
                        let five = [cards[a], cards[b], cards[c], cards[d], cards[e]];
                        let strength = evaluate_five(&five);
                        if best.as_ref().is_none_or(|current| strength > *current) {
                            best = Some(strength);
                        }
                    }
                }
            }
        }
    }
    best.expect("at least five cards are required")
}

/// Indices of every hand tied for strongest. Empty input gives an
/// empty result.
#[must_use]
pub fn best_indices(strengths: &[HandStrength]) -> Vec<usize> {
    let Some(best) = strengths.iter().max() else {
        return Vec::new();
    };
    strengths
        .iter()
        .enumerate()
        .filter(|(_, s)| *s == best)
        .map(|(i, _)| i)
        .collect()
}

fn evaluate_five(cards: &[Card; 5]) -> HandStrength {
    let mut by_value = [0u8; 15];
    for card in cards {
        by_value[card.value as usize] += 1;
    }

    // Groups sorted by count, then value, both descending. The group
    // pattern (e.g. [3, 2]) picks the category and the group values are
    // already in tiebreak order.
    let mut groups: Vec<(u8, Value)> = (2..=14u8)
        .filter(|&v| by_value[v as usize] > 0)
        .map(|v| (by_value[v as usize], v))
        .collect();
    groups.sort_unstable_by(|a, b| b.cmp(a));
    let pattern: Vec<u8> = groups.iter().map(|(count, _)| *count).collect();

    let is_flush = cards.iter().all(|c| c.suit == cards[0].suit);
    let straight_high = straight_high(&by_value);

    if is_flush && let Some(high) = straight_high {
        return HandStrength {
            rank: HandRank::StraightFlush,
            values: vec![high],
        };
    }
    if pattern == [4, 1] {
        return HandStrength {
            rank: HandRank::FourOfAKind,
            values: vec![groups[0].1, groups[1].1],
        };
    }
    if pattern == [3, 2] {
        return HandStrength {
            rank: HandRank::FullHouse,
            values: vec![groups[0].1, groups[1].1],
        };
    }
    if is_flush {
        return HandStrength {
            rank: HandRank::Flush,
            values: descending_values(cards),
        };
    }
    if let Some(high) = straight_high {
        return HandStrength {
            rank: HandRank::Straight,
            values: vec![high],
        };
    }
    let rank = match pattern.as_slice() {
        [3, 1, 1] => HandRank::ThreeOfAKind,
        [2, 2, 1] => HandRank::TwoPair,
        [2, 1, 1, 1] => HandRank::OnePair,
        _ => HandRank::HighCard,
    };
    HandStrength {
        rank,
        values: groups.into_iter().map(|(_, v)| v).collect(),
    }
}

/// Highest card of a straight within the given value counts, if any.
/// The ace counts low for the wheel.
fn straight_high(by_value: &[u8; 15]) -> Option<Value> {
    let present = |v: usize| by_value[v] > 0 || (v == 1 && by_value[14] > 0);
    (5..=14usize)
        .rev()
        .find(|&high| (high - 4..=high).all(present))
        .map(|high| high as Value)
}

fn descending_values(cards: &[Card; 5]) -> Vec<Value> {
    let mut values: Vec<Value> = cards.iter().map(|c| c.value).collect();
    values.sort_unstable_by(|a, b| b.cmp(a));
    values
}
