//! The outbound push boundary.
//!
//! The engine's only dependency on the delivery layer is
//! [`BroadcastGateway::push`]: after every accepted mutation the table
//! actor pushes a per-observer snapshot to each subscriber. Snapshots
//! are personalized so that a seat's hole cards are visible only to
//! their owner, unless the seat is showing at showdown.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use tokio::sync::mpsc;

use crate::game::cards::Card;
use crate::game::seats::{Chips, PlayerId, PlayerName, SeatAction, SeatNumber, TableId};
use crate::table::state::Phase;

/// One seat as an observer sees it. `cards` holds face-down
/// placeholders when the observer may not see the hole cards.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SeatSnapshot {
    pub seat_number: SeatNumber,
    pub name: PlayerName,
    pub stack: Chips,
    pub bet: Chips,
    pub cards: Vec<Card>,
    pub turn: bool,
    pub last_action: Option<SeatAction>,
    pub sitting_out: bool,
}

/// The complete post-mutation state of a table, as one observer is
/// allowed to see it.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TableSnapshot {
    pub id: TableId,
    pub name: String,
    pub phase: Phase,
    pub is_paused: bool,
    pub button: SeatNumber,
    pub max_players: usize,
    pub min_bet: Chips,
    pub limit: Chips,
    pub board: Vec<Card>,
    pub pot: Chips,
    pub call_amount: Chips,
    pub min_raise: Chips,
    pub seats: Vec<SeatSnapshot>,
    pub win_messages: Vec<String>,
}

/// Events the engine emits toward connected clients.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum TableEvent {
    /// Sent to a connection when its subscription is accepted.
    Joined { snapshot: TableSnapshot },
    /// Sent to a connection when it unsubscribes.
    Left { table_id: TableId },
    /// Broadcast to every subscriber after each accepted mutation.
    Updated {
        snapshot: TableSnapshot,
        message: Option<String>,
    },
}

/// Push contract between the engine and the delivery layer. Delivery
/// must not block the table: implementations drop rather than wait.
pub trait BroadcastGateway: Send + Sync + 'static {
    fn push(&self, player: PlayerId, event: TableEvent);
}

/// Channel-backed gateway for servers and tests: one bounded mpsc
/// receiver per connection. Slow receivers lose updates; closed
/// receivers are evicted on the next push.
#[derive(Debug, Default)]
pub struct ChannelGateway {
    senders: RwLock<HashMap<PlayerId, mpsc::Sender<TableEvent>>>,
}

impl ChannelGateway {
    const BUFFER: usize = 64;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection and get its event stream. A second
    /// subscribe for the same player replaces the first stream.
    pub fn subscribe(&self, player: PlayerId) -> mpsc::Receiver<TableEvent> {
        let (sender, receiver) = mpsc::channel(Self::BUFFER);
        if let Ok(mut senders) = self.senders.write() {
            senders.insert(player, sender);
        }
        receiver
    }

    pub fn unsubscribe(&self, player: PlayerId) {
        if let Ok(mut senders) = self.senders.write() {
            senders.remove(&player);
        }
    }
}

impl BroadcastGateway for ChannelGateway {
    fn push(&self, player: PlayerId, event: TableEvent) {
        let mut disconnected = false;
        if let Ok(senders) = self.senders.read()
            && let Some(sender) = senders.get(&player)
        {
            match sender.try_send(event) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!("subscriber {player} is lagging, dropping an update");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    disconnected = true;
                }
            }
        }
        if disconnected {
            log::debug!("subscriber {player} disconnected, removing");
            self.unsubscribe(player);
        }
    }
}
