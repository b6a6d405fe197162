//! Pure, synchronous poker arithmetic: cards, hand ranking, betting
//! legality, and pot settlement. Nothing in here is aware of timers,
//! tasks, or connections; the `table` module drives these pieces.

pub mod betting;
pub mod cards;
pub mod constants;
pub mod dealer;
pub mod pots;
pub mod ranking;
pub mod seats;

pub use betting::{ActionError, BetOutcome, BettingRound};
pub use cards::{Card, Deck, Suit, Value};
pub use dealer::Dealer;
pub use pots::{Payout, PotManager, PotTier};
pub use ranking::{HandRank, HandStrength};
pub use seats::{Chips, PlayerId, PlayerName, Seat, SeatAction, SeatNumber, TableId};
