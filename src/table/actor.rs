//! One tokio task per table.
//!
//! The actor is the unit of mutual exclusion: inbox commands and clock
//! expiries interleave only at its `select!` loop, so every mutation,
//! including the timer's forced fold, runs alone against the table.
//! An expiry that races a player's action loses, because applying the
//! action re-arms or disarms the clock before the loop polls again.

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Duration, Instant};

use super::clock::{Deadline, TurnClock};
use super::config::TableConfig;
use super::messages::{CommandOutcome, PlayerIdentity, TableCommand, TableMessage, TableSummary};
use super::state::{Table, TableError};
use crate::broadcast::{BroadcastGateway, TableEvent, TableSnapshot};
use crate::game::constants::NEXT_HAND_DELAY_SECS;
use crate::game::seats::{PlayerId, TableId};

/// Cloneable handle for sending messages to a running table actor.
#[derive(Clone)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
    table_id: TableId,
}

impl TableHandle {
    #[must_use]
    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    /// Send a command and wait for the table's verdict.
    pub async fn command(
        &self,
        player: PlayerIdentity,
        command: TableCommand,
    ) -> Result<CommandOutcome, TableError> {
        let (response, receiver) = oneshot::channel();
        self.sender
            .send(TableMessage::Command {
                player,
                command,
                response,
            })
            .await
            .map_err(|_| TableError::TableClosed)?;
        receiver.await.map_err(|_| TableError::TableClosed)?
    }

    /// The table as `player` is allowed to see it.
    pub async fn snapshot(&self, player: PlayerId) -> Result<TableSnapshot, TableError> {
        let (response, receiver) = oneshot::channel();
        self.sender
            .send(TableMessage::Snapshot { player, response })
            .await
            .map_err(|_| TableError::TableClosed)?;
        receiver.await.map_err(|_| TableError::TableClosed)
    }

    pub async fn summary(&self) -> Result<TableSummary, TableError> {
        let (response, receiver) = oneshot::channel();
        self.sender
            .send(TableMessage::Summary { response })
            .await
            .map_err(|_| TableError::TableClosed)?;
        receiver.await.map_err(|_| TableError::TableClosed)
    }

    pub async fn close(&self) {
        let _ = self.sender.send(TableMessage::Close).await;
    }
}

/// Actor owning a single table and its deadline clock.
pub struct TableActor {
    table: Table,
    inbox: mpsc::Receiver<TableMessage>,
    gateway: Arc<dyn BroadcastGateway>,
    clock: TurnClock,
    subscribers: HashSet<PlayerId>,
    is_closed: bool,
}

impl TableActor {
    const INBOX_CAPACITY: usize = 64;

    #[must_use]
    pub fn new(
        id: TableId,
        config: TableConfig,
        gateway: Arc<dyn BroadcastGateway>,
    ) -> (Self, TableHandle) {
        Self::with_table(Table::new(id, config), gateway)
    }

    /// An actor over a table with a reproducible deck, for tests.
    #[must_use]
    pub fn seeded(
        id: TableId,
        config: TableConfig,
        seed: u64,
        gateway: Arc<dyn BroadcastGateway>,
    ) -> (Self, TableHandle) {
        Self::with_table(Table::seeded(id, config, seed), gateway)
    }

    fn with_table(table: Table, gateway: Arc<dyn BroadcastGateway>) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(Self::INBOX_CAPACITY);
        let handle = TableHandle {
            sender,
            table_id: table.id(),
        };
        let actor = Self {
            table,
            inbox,
            gateway,
            clock: TurnClock::new(),
            subscribers: HashSet::new(),
            is_closed: false,
        };
        (actor, handle)
    }

    /// Run until closed or until every handle is dropped.
    pub async fn run(mut self) {
        log::info!(
            "table {} '{}' starting",
            self.table.id(),
            self.table.config().name
        );
        loop {
            let deadline = self.clock.expires_at();
            // Biased: an expired deadline is handled before any queued
            // command, so the interleaving is deterministic. A command
            // that was applied earlier already disarmed the clock.
            tokio::select! {
                biased;
                () = sleep_until_deadline(deadline), if deadline.is_some() => {
                    self.handle_deadline();
                }
                maybe_message = self.inbox.recv() => match maybe_message {
                    Some(message) => {
                        self.handle_message(message);
                        if self.is_closed {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }
        log::info!(
            "table {} '{}' closed",
            self.table.id(),
            self.table.config().name
        );
    }

    fn handle_message(&mut self, message: TableMessage) {
        match message {
            TableMessage::Command {
                player,
                command,
                response,
            } => {
                let result = self.handle_command(&player, command);
                let _ = response.send(result);
            }
            TableMessage::Snapshot { player, response } => {
                let _ = response.send(self.table.snapshot_for(Some(player)));
            }
            TableMessage::Summary { response } => {
                let _ = response.send(self.table.summary());
            }
            TableMessage::Close => {
                self.is_closed = true;
            }
        }
    }

    fn handle_command(
        &mut self,
        player: &PlayerIdentity,
        command: TableCommand,
    ) -> Result<CommandOutcome, TableError> {
        let joining = matches!(command, TableCommand::Join);
        let leaving = matches!(command, TableCommand::Leave);

        match self.table.apply(player, command) {
            Ok(outcome) => {
                if joining {
                    self.subscribers.insert(player.id);
                    self.gateway.push(
                        player.id,
                        TableEvent::Joined {
                            snapshot: self.table.snapshot_for(Some(player.id)),
                        },
                    );
                }
                if leaving {
                    self.subscribers.remove(&player.id);
                    self.gateway.push(
                        player.id,
                        TableEvent::Left {
                            table_id: self.table.id(),
                        },
                    );
                }
                // Re-sync the deadline inside the same mutation step,
                // then let everyone see the new state.
                self.rearm_clock();
                self.broadcast();
                Ok(outcome)
            }
            Err(error) => {
                // Rejected actions are dropped: no state change, no
                // broadcast.
                log::debug!(
                    "table {}: rejected command from {}: {error}",
                    self.table.id(),
                    player.name
                );
                Err(error)
            }
        }
    }

    /// Bring the clock in line with the post-mutation table: the seat
    /// on turn keeps (or gets) an action window, an idle table between
    /// hands gets the next-hand delay, a paused table keeps its unspent
    /// window frozen.
    fn rearm_clock(&mut self) {
        if self.table.is_paused() {
            self.clock.pause();
            return;
        }
        self.clock.resume();
        match self.table.seat_on_turn() {
            Some(seat) => {
                if self.clock.pending() != Some(Deadline::Action(seat)) {
                    self.clock
                        .arm(Deadline::Action(seat), self.table.config().action_window());
                }
            }
            None => {
                if self.table.ready_for_next_hand() {
                    if self.clock.pending() != Some(Deadline::NextHand) {
                        self.clock.arm(
                            Deadline::NextHand,
                            Duration::from_secs(NEXT_HAND_DELAY_SECS),
                        );
                    }
                } else {
                    self.clock.disarm();
                }
            }
        }
    }

    fn handle_deadline(&mut self) {
        match self.clock.fire() {
            Some(Deadline::Action(seat)) => {
                // Synthesize a fold through the same validation path as
                // a real action; no special cases.
                let Some(identity) = self.table.identity_at(seat) else {
                    self.rearm_clock();
                    return;
                };
                log::info!(
                    "table {}: seat {seat} ({}) ran out of time, folding",
                    self.table.id(),
                    identity.name
                );
                match self.table.apply(&identity, TableCommand::Fold) {
                    Ok(_) => {
                        self.rearm_clock();
                        self.broadcast();
                    }
                    Err(error) => {
                        log::debug!(
                            "table {}: timed-out fold rejected: {error}",
                            self.table.id()
                        );
                        self.rearm_clock();
                    }
                }
            }
            Some(Deadline::NextHand) => {
                if self.table.ready_for_next_hand() {
                    self.table.begin_hand();
                    self.rearm_clock();
                    self.broadcast();
                } else {
                    self.rearm_clock();
                }
            }
            // The deadline was disarmed by an action that got in first.
            None => {}
        }
    }

    /// Push the post-mutation snapshot to every subscriber, each seeing
    /// only the cards they're entitled to.
    fn broadcast(&mut self) {
        let messages = self.table.drain_events();
        let message = if messages.is_empty() {
            None
        } else {
            Some(messages.join("; "))
        };
        for &player in &self.subscribers {
            self.gateway.push(
                player,
                TableEvent::Updated {
                    snapshot: self.table.snapshot_for(Some(player)),
                    message: message.clone(),
                },
            );
        }
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
