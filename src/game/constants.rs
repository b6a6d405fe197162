//! Engine-wide constants.

use super::seats::Chips;

/// Hard cap on seats per table.
pub const MAX_SEATS: usize = 10;

/// Community cards dealt over a full hand.
pub const BOARD_SIZE: usize = 5;

/// Hole cards dealt to each seat.
pub const HOLE_CARDS: usize = 2;

/// Seconds a seat gets to act before a fold is forced.
pub const DEFAULT_ACTION_SECS: u64 = 15;

/// Seconds between the end of one hand and the start of the next.
pub const NEXT_HAND_DELAY_SECS: u64 = 3;

/// Minimum buy-in, expressed in big blinds.
pub const MIN_BUY_IN_BIG_BLINDS: Chips = 10;

/// Display names longer than this are truncated.
pub const MAX_NAME_LENGTH: usize = 16;
