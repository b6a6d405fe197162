//! Messages exchanged with a table actor.

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use super::state::TableError;
use crate::broadcast::TableSnapshot;
use crate::game::seats::{Chips, PlayerId, PlayerName, SeatNumber, TableId};

/// The authenticated identity attached to every inbound command. Who
/// the player actually is was established by the external auth layer;
/// the engine takes it on faith.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerIdentity {
    pub id: PlayerId,
    pub name: PlayerName,
}

impl PlayerIdentity {
    #[must_use]
    pub fn new(id: PlayerId, name: &str) -> Self {
        Self {
            id,
            name: PlayerName::new(name),
        }
    }
}

/// Everything a player can ask a table to do.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum TableCommand {
    /// Subscribe to the table's broadcasts.
    Join,
    /// Unsubscribe; clears the player's seat if they hold one.
    Leave,
    /// Take an open seat. `amount` may be omitted on quick tables.
    SitDown {
        seat: SeatNumber,
        amount: Option<Chips>,
    },
    /// Vacate the seat, folding first if the hand is live.
    StandUp,
    /// Refill a busted seat.
    Rebuy { seat: SeatNumber, amount: Chips },
    Fold,
    Check,
    Call,
    /// Raise the street total to `to` chips.
    Raise { to: Chips },
    /// Start the table's very first hand.
    StartHand,
    Pause,
    Resume,
}

/// What an accepted command tells its sender. Broadcasts carry the
/// state change; this is just the direct acknowledgement.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CommandOutcome {
    Acknowledged,
    /// Seat vacated; these chips go back to the player's external
    /// balance.
    StoodUp { returned: Chips },
    /// Unsubscribed; set when a seat was also cleared.
    Left { returned: Option<Chips> },
}

/// Inbox messages for a table actor.
#[derive(Debug)]
pub enum TableMessage {
    Command {
        player: PlayerIdentity,
        command: TableCommand,
        response: oneshot::Sender<Result<CommandOutcome, TableError>>,
    },
    /// Read-only: the table as `player` is allowed to see it.
    Snapshot {
        player: PlayerId,
        response: oneshot::Sender<TableSnapshot>,
    },
    /// Read-only: lobby row for this table.
    Summary {
        response: oneshot::Sender<TableSummary>,
    },
    Close,
}

/// Lobby listing row.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TableSummary {
    pub id: TableId,
    pub name: String,
    pub seats_taken: usize,
    pub max_players: usize,
    pub min_bet: Chips,
    pub limit: Chips,
    pub quick: bool,
    pub phase: String,
}
