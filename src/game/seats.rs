//! Seats and the identifiers attached to them.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::cards::Card;
use super::constants::MAX_NAME_LENGTH;

/// Whole-chip arithmetic; the engine never deals in fractions.
pub type Chips = u32;

/// Identity supplied by the external auth collaborator.
pub type PlayerId = uuid::Uuid;

/// Tables are identified by a registry-assigned id.
pub type TableId = u64;

/// Seat positions are 1-based and unique within a table.
pub type SeatNumber = usize;

/// A player's display name, sanitized for table chat and win messages.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PlayerName(String);

impl PlayerName {
    #[must_use]
    pub fn new(s: &str) -> Self {
        let mut name: String = s
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect();
        name.truncate(MAX_NAME_LENGTH);
        Self(name)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for PlayerName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<&str> for PlayerName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The last decision a seat made on the current street. `None` on a
/// seat that hasn't acted since the street began.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SeatAction {
    Fold,
    Check,
    Call,
    Raise,
}

impl fmt::Display for SeatAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Fold => "folds",
            Self::Check => "checks",
            Self::Call => "calls",
            Self::Raise => "raises",
        };
        write!(f, "{repr}")
    }
}

/// A table slot bound to one player. Exists only while occupied;
/// removal frees the slot for a new sit-down.
#[derive(Clone, Debug)]
pub struct Seat {
    pub number: SeatNumber,
    pub player_id: PlayerId,
    pub name: PlayerName,
    pub stack: Chips,
    /// Chips committed on the current street, not yet swept into the pot.
    pub bet: Chips,
    pub hand: Vec<Card>,
    pub turn: bool,
    pub last_action: Option<SeatAction>,
    pub sitting_out: bool,
    /// Hand revealed to all observers (showdown).
    pub showing: bool,
}

impl Seat {
    #[must_use]
    pub fn new(number: SeatNumber, player_id: PlayerId, name: PlayerName, stack: Chips) -> Self {
        Self {
            number,
            player_id,
            name,
            stack,
            bet: 0,
            hand: Vec::with_capacity(2),
            turn: false,
            last_action: None,
            sitting_out: false,
            showing: false,
        }
    }

    #[must_use]
    pub fn has_folded(&self) -> bool {
        matches!(self.last_action, Some(SeatAction::Fold))
    }

    /// Still contesting the pot: dealt in and not folded.
    #[must_use]
    pub fn in_hand(&self) -> bool {
        !self.hand.is_empty() && !self.has_folded()
    }

    #[must_use]
    pub fn is_all_in(&self) -> bool {
        self.in_hand() && self.stack == 0
    }

    /// Able to make a decision: contesting the pot with chips behind.
    #[must_use]
    pub fn can_act(&self) -> bool {
        self.in_hand() && self.stack > 0 && !self.sitting_out
    }

    /// Whether the street is still waiting on this seat: it can act and
    /// either hasn't acted yet or hasn't matched the call amount.
    #[must_use]
    pub fn owes_action(&self, call_amount: Chips) -> bool {
        self.can_act() && (self.last_action.is_none() || self.bet < call_amount)
    }

    pub fn reset_for_hand(&mut self) {
        self.bet = 0;
        self.hand.clear();
        self.turn = false;
        self.last_action = None;
        self.showing = false;
    }

    /// Clear street-scoped state, keeping folds sticky for the hand.
    pub fn clear_street(&mut self) {
        self.turn = false;
        if !self.has_folded() {
            self.last_action = None;
        }
    }
}
