//! The per-table state machine.
//!
//! `Table` is the sole mutator of table state. Every inbound command
//! lands here after the actor has serialized it; validation, betting
//! arithmetic, street advancement, and settlement all happen inside a
//! single `apply` call, so no observer can ever see a partial update.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use super::config::TableConfig;
use super::messages::{CommandOutcome, PlayerIdentity, TableCommand, TableSummary};
use crate::broadcast::{SeatSnapshot, TableSnapshot};
use crate::game::betting::{ActionError, BetOutcome, BettingRound};
use crate::game::cards::Card;
use crate::game::constants::{BOARD_SIZE, HOLE_CARDS};
use crate::game::dealer::Dealer;
use crate::game::pots::PotManager;
use crate::game::seats::{Chips, PlayerId, Seat, SeatNumber, TableId};

/// Betting streets plus the bookkeeping states around them. `Showdown`
/// is transient: settlement runs inside the same mutation and leaves
/// the table in `HandOver`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Phase {
    WaitingForPlayers,
    WaitingForStart,
    PreFlop,
    Flop,
    Turn,
    River,
    Showdown,
    HandOver,
}

impl Phase {
    fn is_betting(self) -> bool {
        matches!(self, Self::PreFlop | Self::Flop | Self::Turn | Self::River)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::WaitingForPlayers => "waiting for players",
            Self::WaitingForStart => "waiting for start",
            Self::PreFlop => "pre-flop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::Showdown => "showdown",
            Self::HandOver => "hand over",
        };
        write!(f, "{repr}")
    }
}

/// Why a command was refused. Refusals leave the table untouched and
/// produce no broadcast.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TableError {
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error("not your turn")]
    OutOfTurn,
    #[error("that action is not allowed right now")]
    WrongPhase,
    #[error("the table is paused")]
    TablePaused,
    #[error("not seated at this table")]
    NotSeated,
    #[error("already seated at this table")]
    AlreadySeated,
    #[error("seat {0} does not exist")]
    NoSuchSeat(SeatNumber),
    #[error("seat {0} is already taken")]
    SeatTaken(SeatNumber),
    #[error("buy-in must be between ${min} and ${max}")]
    InvalidBuyIn { min: Chips, max: Chips },
    #[error("this table requires a buy-in amount")]
    BuyInRequired,
    #[error("rebuy is only available to busted seats")]
    RebuyNotAvailable,
    #[error("need at least 2 players with chips")]
    NotEnoughPlayers,
    #[error("unknown table {0}")]
    UnknownTable(TableId),
    #[error("the table is closed")]
    TableClosed,
    #[error("invalid table configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug)]
pub struct Table {
    id: TableId,
    config: TableConfig,
    seats: BTreeMap<SeatNumber, Seat>,
    board: Vec<Card>,
    dealer: Dealer,
    betting: BettingRound,
    pots: PotManager,
    button: SeatNumber,
    phase: Phase,
    is_paused: bool,
    is_first_hand: bool,
    win_messages: Vec<String>,
    /// Human-readable messages produced by the current mutation,
    /// drained by the actor for the broadcast.
    events: Vec<String>,
}

impl Table {
    #[must_use]
    pub fn new(id: TableId, config: TableConfig) -> Self {
        Self::with_dealer(id, config, Dealer::new())
    }

    /// A table whose deck shuffles are reproducible, for tests.
    #[must_use]
    pub fn seeded(id: TableId, config: TableConfig, seed: u64) -> Self {
        Self::with_dealer(id, config, Dealer::seeded(seed))
    }

    fn with_dealer(id: TableId, config: TableConfig, dealer: Dealer) -> Self {
        let betting = BettingRound::new(config.big_blind());
        Self {
            id,
            config,
            seats: BTreeMap::new(),
            board: Vec::with_capacity(BOARD_SIZE),
            dealer,
            betting,
            pots: PotManager::new(),
            button: 1,
            phase: Phase::WaitingForPlayers,
            is_paused: false,
            is_first_hand: true,
            win_messages: Vec::new(),
            events: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    #[must_use]
    pub fn id(&self) -> TableId {
        self.id
    }

    #[must_use]
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    #[must_use]
    pub fn win_messages(&self) -> &[String] {
        &self.win_messages
    }

    /// The seat currently on turn, if any. At most one seat holds the
    /// turn at any instant.
    #[must_use]
    pub fn seat_on_turn(&self) -> Option<SeatNumber> {
        self.seats.values().find(|s| s.turn).map(|s| s.number)
    }

    #[must_use]
    pub fn seat_of(&self, player: PlayerId) -> Option<SeatNumber> {
        self.seats
            .values()
            .find(|s| s.player_id == player)
            .map(|s| s.number)
    }

    /// The identity occupying a seat; used by the actor to synthesize
    /// a timer fold through the normal validation path.
    #[must_use]
    pub fn identity_at(&self, number: SeatNumber) -> Option<PlayerIdentity> {
        self.seats.get(&number).map(|s| PlayerIdentity {
            id: s.player_id,
            name: s.name.clone(),
        })
    }

    /// Whether the next hand should start on its own: not the very
    /// first hand, between hands, unpaused, and two seats with chips.
    #[must_use]
    pub fn ready_for_next_hand(&self) -> bool {
        !self.is_first_hand
            && !self.is_paused
            && matches!(self.phase, Phase::HandOver | Phase::WaitingForPlayers)
            && self.eligible_count() >= 2
    }

    /// Chips currently on the table. Constant across every mutation
    /// except buy-ins, rebuys, and stand-ups.
    #[must_use]
    pub fn total_chips(&self) -> Chips {
        let seated: Chips = self.seats.values().map(|s| s.stack + s.bet).sum();
        seated + self.pots.total()
    }

    /// The table as `viewer` is allowed to see it: other seats' hole
    /// cards become face-down placeholders unless the seat is showing.
    #[must_use]
    pub fn snapshot_for(&self, viewer: Option<PlayerId>) -> TableSnapshot {
        let seats = self
            .seats
            .values()
            .map(|seat| {
                let cards = if seat.hand.is_empty() {
                    Vec::new()
                } else if seat.showing || viewer == Some(seat.player_id) {
                    seat.hand.clone()
                } else {
                    vec![Card::face_down(); HOLE_CARDS]
                };
                SeatSnapshot {
                    seat_number: seat.number,
                    name: seat.name.clone(),
                    stack: seat.stack,
                    bet: seat.bet,
                    cards,
                    turn: seat.turn,
                    last_action: seat.last_action,
                    sitting_out: seat.sitting_out,
                }
            })
            .collect();
        TableSnapshot {
            id: self.id,
            name: self.config.name.clone(),
            phase: self.phase,
            is_paused: self.is_paused,
            button: self.button,
            max_players: self.config.max_players,
            min_bet: self.config.min_bet,
            limit: self.config.limit,
            board: self.board.clone(),
            pot: self.pots.total(),
            call_amount: self.betting.call_amount(),
            min_raise: self.betting.min_raise(),
            seats,
            win_messages: self.win_messages.clone(),
        }
    }

    #[must_use]
    pub fn summary(&self) -> TableSummary {
        TableSummary {
            id: self.id,
            name: self.config.name.clone(),
            seats_taken: self.seats.len(),
            max_players: self.config.max_players,
            min_bet: self.config.min_bet,
            limit: self.config.limit,
            quick: self.config.quick_buy_in.is_some(),
            phase: self.phase.to_string(),
        }
    }

    /// Take the messages produced by the latest mutation.
    pub fn drain_events(&mut self) -> Vec<String> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // The single mutation entry point
    // ------------------------------------------------------------------

    pub fn apply(
        &mut self,
        player: &PlayerIdentity,
        command: TableCommand,
    ) -> Result<CommandOutcome, TableError> {
        match command {
            TableCommand::Join => {
                self.push_event(format!("{} joined the table", player.name));
                Ok(CommandOutcome::Acknowledged)
            }
            TableCommand::Leave => {
                let returned = if self.seat_of(player.id).is_some() {
                    Some(self.stand_up(player.id)?)
                } else {
                    self.push_event(format!("{} left the table", player.name));
                    None
                };
                Ok(CommandOutcome::Left { returned })
            }
            TableCommand::SitDown { seat, amount } => self.sit_down(player, seat, amount),
            TableCommand::StandUp => self
                .stand_up(player.id)
                .map(|returned| CommandOutcome::StoodUp { returned }),
            TableCommand::Rebuy { seat, amount } => self.rebuy(player.id, seat, amount),
            TableCommand::StartHand => self.start_hand(player.id),
            TableCommand::Pause => self.pause(player.id),
            TableCommand::Resume => self.resume(player.id),
            TableCommand::Fold | TableCommand::Check | TableCommand::Call
            | TableCommand::Raise { .. } => {
                self.betting_action(player.id, &command)?;
                Ok(CommandOutcome::Acknowledged)
            }
        }
    }

    /// Start the next hand. Public because the actor drives the
    /// inter-hand delay; a no-op unless two seats can play.
    pub fn begin_hand(&mut self) {
        let eligible: Vec<SeatNumber> = self
            .seats
            .values()
            .filter(|s| !s.sitting_out && s.stack > 0)
            .map(|s| s.number)
            .collect();
        if eligible.len() < 2 {
            self.phase = Phase::WaitingForPlayers;
            return;
        }

        self.win_messages.clear();
        self.board.clear();
        self.pots.reset();
        self.betting = BettingRound::new(self.config.big_blind());
        for seat in self.seats.values_mut() {
            seat.reset_for_hand();
        }

        if self.is_first_hand {
            self.button = eligible[0];
        } else if !eligible.contains(&self.button) {
            // The rotated button can land on a vacated or busted seat.
            if let Some(button) =
                self.next_seat_where(self.button, |s| !s.sitting_out && s.stack > 0)
            {
                self.button = button;
            }
        }
        self.is_first_hand = false;

        self.dealer.start_hand(
            self.seats
                .values_mut()
                .filter(|s| !s.sitting_out && s.stack > 0),
        );
        self.phase = Phase::PreFlop;

        let small_blind_seat = self
            .next_seat_where(self.button, Seat::in_hand)
            .expect("two seats were dealt in");
        let big_blind_seat = self
            .next_seat_where(small_blind_seat, Seat::in_hand)
            .expect("two seats were dealt in");
        let small = self.config.min_bet;
        let big = self.config.big_blind();
        if let Some(seat) = self.seats.get_mut(&small_blind_seat) {
            self.betting.post_blind(seat, small);
        }
        if let Some(seat) = self.seats.get_mut(&big_blind_seat) {
            self.betting.post_blind(seat, big);
        }
        let small_name = self.seats[&small_blind_seat].name.to_string();
        let big_name = self.seats[&big_blind_seat].name.to_string();
        self.push_event(format!(
            "new hand: {small_name} posts ${small}, {big_name} posts ${big}"
        ));

        match self.next_seat_owing_after(big_blind_seat) {
            Some(first) => self.set_turn(first),
            // Blinds put everyone all-in; run the board out.
            None => self.advance_street(),
        }
    }

    // ------------------------------------------------------------------
    // Seat lifecycle
    // ------------------------------------------------------------------

    fn sit_down(
        &mut self,
        player: &PlayerIdentity,
        number: SeatNumber,
        amount: Option<Chips>,
    ) -> Result<CommandOutcome, TableError> {
        if number < 1 || number > self.config.max_players {
            return Err(TableError::NoSuchSeat(number));
        }
        if self.seats.contains_key(&number) {
            return Err(TableError::SeatTaken(number));
        }
        if self.seat_of(player.id).is_some() {
            return Err(TableError::AlreadySeated);
        }
        let amount = match amount {
            Some(amount) => amount,
            None => self.config.quick_buy_in.ok_or(TableError::BuyInRequired)?,
        };
        let (min, max) = (self.config.min_buy_in(), self.config.max_buy_in());
        if amount < min || amount > max {
            return Err(TableError::InvalidBuyIn { min, max });
        }

        let seat = Seat::new(number, player.id, player.name.clone(), amount);
        self.seats.insert(number, seat);
        self.push_event(format!(
            "{} sat down at seat {number} with ${amount}",
            player.name
        ));

        if self.phase == Phase::WaitingForPlayers && self.is_first_hand && self.eligible_count() >= 2
        {
            self.phase = Phase::WaitingForStart;
            self.push_event("enough players; waiting for someone to start".to_string());
        }
        Ok(CommandOutcome::Acknowledged)
    }

    fn rebuy(
        &mut self,
        player: PlayerId,
        number: SeatNumber,
        amount: Chips,
    ) -> Result<CommandOutcome, TableError> {
        let Some(seat) = self.seats.get(&number) else {
            return Err(TableError::NoSuchSeat(number));
        };
        if seat.player_id != player {
            return Err(TableError::NotSeated);
        }
        if seat.stack != 0 || !seat.sitting_out {
            return Err(TableError::RebuyNotAvailable);
        }
        let (min, max) = (self.config.min_buy_in(), self.config.max_buy_in());
        if amount < min || amount > max {
            return Err(TableError::InvalidBuyIn { min, max });
        }
        let seat = self
            .seats
            .get_mut(&number)
            .expect("seat existed a moment ago");
        seat.stack += amount;
        seat.sitting_out = false;
        let name = seat.name.to_string();
        self.push_event(format!("{name} rebought for ${amount}"));
        Ok(CommandOutcome::Acknowledged)
    }

    /// Vacate the player's seat, folding first if the hand is live.
    /// Returns the chips that go back to the player's external balance.
    fn stand_up(&mut self, player: PlayerId) -> Result<Chips, TableError> {
        let number = self.seat_of(player).ok_or(TableError::NotSeated)?;
        if self.phase.is_betting() && self.seats[&number].in_hand() {
            self.fold_out(number);
        }
        let mut seat = self
            .seats
            .remove(&number)
            .expect("seat existed a moment ago");
        // Chips already committed to the street stay in the pot.
        if seat.bet > 0 {
            self.pots.collect(number, seat.bet);
            seat.bet = 0;
        }
        let returned = seat.stack;
        self.push_event(format!("{} left seat {number}", seat.name));
        if self.phase == Phase::WaitingForStart && self.eligible_count() < 2 {
            self.phase = Phase::WaitingForPlayers;
        }
        Ok(returned)
    }

    fn start_hand(&mut self, player: PlayerId) -> Result<CommandOutcome, TableError> {
        self.seat_of(player).ok_or(TableError::NotSeated)?;
        if self.is_paused {
            return Err(TableError::TablePaused);
        }
        if self.phase != Phase::WaitingForStart {
            return Err(TableError::WrongPhase);
        }
        if self.eligible_count() < 2 {
            return Err(TableError::NotEnoughPlayers);
        }
        self.begin_hand();
        Ok(CommandOutcome::Acknowledged)
    }

    fn pause(&mut self, player: PlayerId) -> Result<CommandOutcome, TableError> {
        let number = self.seat_of(player).ok_or(TableError::NotSeated)?;
        if !self.is_paused {
            self.is_paused = true;
            let name = self.seats[&number].name.to_string();
            self.push_event(format!("{name} paused the game"));
        }
        Ok(CommandOutcome::Acknowledged)
    }

    fn resume(&mut self, player: PlayerId) -> Result<CommandOutcome, TableError> {
        let number = self.seat_of(player).ok_or(TableError::NotSeated)?;
        if self.is_paused {
            self.is_paused = false;
            let name = self.seats[&number].name.to_string();
            self.push_event(format!("{name} resumed the game"));
        }
        Ok(CommandOutcome::Acknowledged)
    }

    // ------------------------------------------------------------------
    // Betting
    // ------------------------------------------------------------------

    fn betting_action(
        &mut self,
        player: PlayerId,
        command: &TableCommand,
    ) -> Result<(), TableError> {
        let number = self.seat_of(player).ok_or(TableError::NotSeated)?;
        if self.is_paused {
            return Err(TableError::TablePaused);
        }
        if !self.phase.is_betting() {
            return Err(TableError::WrongPhase);
        }
        if !self.seats[&number].turn {
            return Err(TableError::OutOfTurn);
        }

        let seat = self
            .seats
            .get_mut(&number)
            .expect("seat existed a moment ago");
        let name = seat.name.to_string();
        let outcome = match command {
            TableCommand::Fold => Ok(self.betting.fold(seat)),
            TableCommand::Check => self.betting.check(seat),
            TableCommand::Call => self.betting.call(seat),
            TableCommand::Raise { to } => self.betting.raise(seat, *to),
            _ => return Err(TableError::WrongPhase),
        }?;

        match outcome {
            BetOutcome::Folded => self.push_event(format!("{name} folds")),
            BetOutcome::Checked => self.push_event(format!("{name} checks")),
            BetOutcome::Called { paid, all_in } => {
                if all_in {
                    self.push_event(format!("{name} calls ${paid} and is all in"));
                } else {
                    self.push_event(format!("{name} calls ${paid}"));
                }
            }
            BetOutcome::Raised { to, all_in, reopened } => {
                if all_in {
                    self.push_event(format!("{name} raises to ${to} and is all in"));
                } else {
                    self.push_event(format!("{name} raises to ${to}"));
                }
                if reopened {
                    self.reopen_action(number);
                }
            }
        }

        self.resolve_after_action(number);
        Ok(())
    }

    /// A full raise voids every other contender's prior check or call
    /// for this street.
    fn reopen_action(&mut self, raiser: SeatNumber) {
        for seat in self.seats.values_mut() {
            if seat.number != raiser && seat.in_hand() {
                seat.last_action = None;
            }
        }
    }

    /// Fold a seat outside the normal turn flow (stand-up, timeouts on
    /// departed players). Advances the hand exactly as a turn fold
    /// would when the seat held the turn.
    fn fold_out(&mut self, number: SeatNumber) {
        let Some(seat) = self.seats.get_mut(&number) else {
            return;
        };
        if !seat.in_hand() {
            return;
        }
        let had_turn = seat.turn;
        let name = seat.name.to_string();
        self.betting.fold(seat);
        self.push_event(format!("{name} folds"));
        if had_turn {
            self.resolve_after_action(number);
        } else if self.contenders().len() <= 1 {
            self.award_uncontested();
        }
    }

    /// After any legal action: hand the turn to the next seat still
    /// owing a decision, or close the street when nobody does.
    fn resolve_after_action(&mut self, actor: SeatNumber) {
        self.clear_turn();
        if self.contenders().len() <= 1 {
            self.award_uncontested();
            return;
        }
        match self.next_seat_owing_after(actor) {
            Some(next) => self.set_turn(next),
            None => self.advance_street(),
        }
    }

    /// Sweep the street, reveal the next board cards, and hand the
    /// first turn to the seat left of the button. When nobody can bet
    /// (all-ins), streets run out back-to-back until showdown.
    fn advance_street(&mut self) {
        self.sweep_bets();
        loop {
            match self.phase {
                Phase::PreFlop => {
                    self.deal(3);
                    self.phase = Phase::Flop;
                    self.push_event("flop dealt".to_string());
                }
                Phase::Flop => {
                    self.deal(1);
                    self.phase = Phase::Turn;
                    self.push_event("turn dealt".to_string());
                }
                Phase::Turn => {
                    self.deal(1);
                    self.phase = Phase::River;
                    self.push_event("river dealt".to_string());
                }
                Phase::River => {
                    self.phase = Phase::Showdown;
                    self.settle();
                    return;
                }
                _ => return,
            }
            let bettors = self.seats.values().filter(|s| s.can_act()).count();
            if bettors >= 2 {
                if let Some(first) = self.next_seat_owing_after(self.button) {
                    self.set_turn(first);
                }
                return;
            }
        }
    }

    fn deal(&mut self, count: usize) {
        self.dealer.reveal(&mut self.board, count);
    }

    /// Move every seat's street bet into the pot and reset the price.
    fn sweep_bets(&mut self) {
        for seat in self.seats.values_mut() {
            self.pots.collect(seat.number, seat.bet);
            seat.bet = 0;
            seat.clear_street();
        }
        self.betting.begin_street();
    }

    /// Everyone else folded: the last contender takes the pot without
    /// a showdown, and unneeded board cards stay in the deck.
    fn award_uncontested(&mut self) {
        self.sweep_bets();
        let Some(winner) = self.contenders().into_iter().next() else {
            self.finish_hand();
            return;
        };
        let amount = self.pots.total();
        let name = self.seats[&winner].name.to_string();
        if let Some(seat) = self.seats.get_mut(&winner) {
            seat.stack += amount;
        }
        let message = Dealer::win_message(&name, amount, None);
        self.win_messages.push(message.clone());
        self.push_event(message);
        self.finish_hand();
    }

    /// Showdown: rank the remaining hands, pay out every pot tier, and
    /// close the hand.
    fn settle(&mut self) {
        let contenders: Vec<(SeatNumber, Vec<Card>)> = self
            .seats
            .values()
            .filter(|s| s.in_hand())
            .map(|s| (s.number, s.hand.clone()))
            .collect();
        for (number, _) in &contenders {
            if let Some(seat) = self.seats.get_mut(number) {
                seat.showing = true;
            }
        }
        let rankings = self.dealer.rank_hands(&self.board, contenders);
        let order = self.clockwise_from_left_of_button();
        let payouts = self.pots.settle(&rankings, &order);
        let mut messages = Vec::with_capacity(payouts.len());
        for payout in &payouts {
            if let Some(seat) = self.seats.get_mut(&payout.seat) {
                seat.stack += payout.amount;
                messages.push(Dealer::win_message(
                    seat.name.as_str(),
                    payout.amount,
                    Some(&payout.strength),
                ));
            }
        }
        for message in messages {
            self.win_messages.push(message.clone());
            self.push_event(message);
        }
        self.finish_hand();
    }

    fn finish_hand(&mut self) {
        self.phase = Phase::HandOver;
        self.pots.reset();
        self.clear_turn();
        if let Some(next_button) = self.next_seat_where(self.button, |_| true) {
            self.button = next_button;
        }
        let mut busted = Vec::new();
        for seat in self.seats.values_mut() {
            if seat.stack == 0 && !seat.sitting_out {
                seat.sitting_out = true;
                busted.push(seat.name.to_string());
            }
        }
        for name in busted {
            self.push_event(format!("{name} is out of chips and sitting out"));
        }
    }

    // ------------------------------------------------------------------
    // Seat arithmetic
    // ------------------------------------------------------------------

    fn eligible_count(&self) -> usize {
        self.seats
            .values()
            .filter(|s| !s.sitting_out && s.stack > 0)
            .count()
    }

    fn contenders(&self) -> Vec<SeatNumber> {
        self.seats
            .values()
            .filter(|s| s.in_hand())
            .map(|s| s.number)
            .collect()
    }

    fn next_seat_owing_after(&self, after: SeatNumber) -> Option<SeatNumber> {
        let call = self.betting.call_amount();
        self.next_seat_where(after, |seat| seat.owes_action(call))
    }

    /// First occupied seat clockwise from (and excluding) `after` that
    /// satisfies the predicate, wrapping around and ending on `after`
    /// itself.
    fn next_seat_where(&self, after: SeatNumber, pred: impl Fn(&Seat) -> bool) -> Option<SeatNumber> {
        let keys: Vec<SeatNumber> = self.seats.keys().copied().collect();
        keys.iter()
            .copied()
            .filter(|&k| k > after)
            .chain(keys.iter().copied().filter(|&k| k <= after))
            .find(|k| pred(&self.seats[k]))
    }

    fn clockwise_from_left_of_button(&self) -> Vec<SeatNumber> {
        let keys: Vec<SeatNumber> = self.seats.keys().copied().collect();
        keys.iter()
            .copied()
            .filter(|&k| k > self.button)
            .chain(keys.iter().copied().filter(|&k| k <= self.button))
            .collect()
    }

    fn set_turn(&mut self, number: SeatNumber) {
        self.clear_turn();
        if let Some(seat) = self.seats.get_mut(&number) {
            seat.turn = true;
        }
    }

    fn clear_turn(&mut self) {
        for seat in self.seats.values_mut() {
            seat.turn = false;
        }
    }

    fn push_event(&mut self, message: String) {
        log::debug!("table {}: {message}", self.id);
        self.events.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::seats::PlayerName;

    fn config() -> TableConfig {
        TableConfig {
            name: "test".to_string(),
            max_players: 6,
            min_bet: 1,
            limit: 200,
            quick_buy_in: None,
            action_secs: 15,
        }
    }

    fn identity(name: &str) -> PlayerIdentity {
        PlayerIdentity {
            id: PlayerId::new_v4(),
            name: PlayerName::new(name),
        }
    }

    fn table_with_two_players() -> (Table, PlayerIdentity, PlayerIdentity) {
        let mut table = Table::seeded(1, config(), 42);
        let alice = identity("alice");
        let bob = identity("bob");
        table
            .apply(&alice, TableCommand::SitDown { seat: 1, amount: Some(100) })
            .unwrap();
        table
            .apply(&bob, TableCommand::SitDown { seat: 2, amount: Some(100) })
            .unwrap();
        (table, alice, bob)
    }

    fn turn_holder(table: &Table) -> PlayerIdentity {
        let seat = table.seat_on_turn().expect("someone should be on turn");
        table.identity_at(seat).expect("turn seat is occupied")
    }

    fn assert_single_turn(table: &Table) {
        let turns = table
            .snapshot_for(None)
            .seats
            .iter()
            .filter(|s| s.turn)
            .count();
        assert!(turns <= 1, "at most one seat may hold the turn");
    }

    #[test]
    fn buy_in_bounds_are_enforced() {
        let mut table = Table::seeded(1, config(), 7);
        let player = identity("alice");
        let refused = table.apply(&player, TableCommand::SitDown { seat: 1, amount: Some(19) });
        assert_eq!(refused, Err(TableError::InvalidBuyIn { min: 20, max: 200 }));
        let refused = table.apply(&player, TableCommand::SitDown { seat: 1, amount: Some(201) });
        assert_eq!(refused, Err(TableError::InvalidBuyIn { min: 20, max: 200 }));
        assert!(
            table
                .apply(&player, TableCommand::SitDown { seat: 1, amount: Some(20) })
                .is_ok()
        );
        let other = identity("bob");
        assert!(
            table
                .apply(&other, TableCommand::SitDown { seat: 2, amount: Some(200) })
                .is_ok()
        );
    }

    #[test]
    fn seats_are_exclusive() {
        let (mut table, alice, _) = table_with_two_players();
        let carol = identity("carol");
        assert_eq!(
            table.apply(&carol, TableCommand::SitDown { seat: 1, amount: Some(100) }),
            Err(TableError::SeatTaken(1))
        );
        assert_eq!(
            table.apply(&carol, TableCommand::SitDown { seat: 9, amount: Some(100) }),
            Err(TableError::NoSuchSeat(9))
        );
        assert_eq!(
            table.apply(&alice, TableCommand::SitDown { seat: 3, amount: Some(100) }),
            Err(TableError::AlreadySeated)
        );
    }

    #[test]
    fn quick_tables_fill_in_the_buy_in() {
        let mut table = Table::seeded(
            1,
            TableConfig {
                quick_buy_in: Some(40),
                ..config()
            },
            7,
        );
        let player = identity("alice");
        table
            .apply(&player, TableCommand::SitDown { seat: 1, amount: None })
            .unwrap();
        assert_eq!(table.total_chips(), 40);

        let mut plain = Table::seeded(2, config(), 7);
        assert_eq!(
            plain.apply(&player, TableCommand::SitDown { seat: 1, amount: None }),
            Err(TableError::BuyInRequired)
        );
    }

    #[test]
    fn first_hand_waits_for_an_explicit_start() {
        let (mut table, alice, bob) = table_with_two_players();
        assert_eq!(table.phase(), Phase::WaitingForStart);
        assert_eq!(
            table.apply(&bob, TableCommand::Check),
            Err(TableError::WrongPhase)
        );

        table.apply(&alice, TableCommand::StartHand).unwrap();
        assert_eq!(table.phase(), Phase::PreFlop);
        // Blinds are up and someone is on turn.
        assert_eq!(table.total_chips(), 200);
        assert!(table.seat_on_turn().is_some());
        assert_single_turn(&table);
    }

    #[test]
    fn outsiders_cannot_start_the_hand() {
        let (mut table, _, _) = table_with_two_players();
        let outsider = identity("mallory");
        assert_eq!(
            table.apply(&outsider, TableCommand::StartHand),
            Err(TableError::NotSeated)
        );
    }

    #[test]
    fn acting_out_of_turn_is_refused() {
        let (mut table, alice, bob) = table_with_two_players();
        table.apply(&alice, TableCommand::StartHand).unwrap();
        let on_turn = turn_holder(&table);
        let off_turn = if on_turn.id == alice.id { &bob } else { &alice };
        assert_eq!(
            table.apply(off_turn, TableCommand::Fold),
            Err(TableError::OutOfTurn)
        );
    }

    #[test]
    fn fold_collapses_the_hand_without_a_board() {
        let (mut table, alice, _) = table_with_two_players();
        table.apply(&alice, TableCommand::StartHand).unwrap();
        let folder = turn_holder(&table);
        table.apply(&folder, TableCommand::Fold).unwrap();

        assert_eq!(table.phase(), Phase::HandOver);
        assert!(table.snapshot_for(None).board.is_empty());
        assert_eq!(table.win_messages().len(), 1);
        assert_eq!(table.total_chips(), 200);
        // The folder paid the small blind, the winner nets it.
        let snapshot = table.snapshot_for(None);
        let mut stacks: Vec<Chips> = snapshot.seats.iter().map(|s| s.stack).collect();
        stacks.sort_unstable();
        assert_eq!(stacks, vec![99, 101]);
    }

    #[test]
    fn checked_down_hand_reaches_showdown_and_pays_once() {
        let (mut table, alice, _) = table_with_two_players();
        table.apply(&alice, TableCommand::StartHand).unwrap();

        // Pre-flop: the small blind completes, the big blind checks.
        table.apply(&turn_holder(&table), TableCommand::Call).unwrap();
        assert_single_turn(&table);
        table.apply(&turn_holder(&table), TableCommand::Check).unwrap();

        // Three more streets of check-check.
        for expected in [Phase::Flop, Phase::Turn, Phase::River] {
            assert_eq!(table.phase(), expected);
            table.apply(&turn_holder(&table), TableCommand::Check).unwrap();
            assert_single_turn(&table);
            table.apply(&turn_holder(&table), TableCommand::Check).unwrap();
        }

        assert_eq!(table.phase(), Phase::HandOver);
        assert_eq!(table.snapshot_for(None).board.len(), 5);
        assert!(!table.win_messages().is_empty());
        assert_eq!(table.total_chips(), 200);

        // Both put in the $2 big blind, so stacks moved by the pot or
        // split back even.
        let snapshot = table.snapshot_for(None);
        let mut stacks: Vec<Chips> = snapshot.seats.iter().map(|s| s.stack).collect();
        stacks.sort_unstable();
        assert!(stacks == vec![98, 102] || stacks == vec![100, 100]);
        if stacks == vec![98, 102] {
            assert_eq!(table.win_messages().len(), 1);
        }
    }

    #[test]
    fn raises_move_the_turn_back_around() {
        let (mut table, alice, _) = table_with_two_players();
        table.apply(&alice, TableCommand::StartHand).unwrap();

        let raiser = turn_holder(&table);
        table
            .apply(&raiser, TableCommand::Raise { to: 6 })
            .unwrap();
        let responder = turn_holder(&table);
        assert_ne!(responder.id, raiser.id);
        table.apply(&responder, TableCommand::Call).unwrap();
        assert_eq!(table.phase(), Phase::Flop);
        assert_eq!(table.total_chips(), 200);
        assert_eq!(table.snapshot_for(None).pot, 12);
    }

    #[test]
    fn paused_table_refuses_actions() {
        let (mut table, alice, _) = table_with_two_players();
        table.apply(&alice, TableCommand::StartHand).unwrap();
        let actor = turn_holder(&table);
        table.apply(&alice, TableCommand::Pause).unwrap();
        assert_eq!(
            table.apply(&actor, TableCommand::Fold),
            Err(TableError::TablePaused)
        );
        table.apply(&alice, TableCommand::Resume).unwrap();
        assert!(table.apply(&actor, TableCommand::Fold).is_ok());
    }

    #[test]
    fn standing_up_mid_hand_folds_first() {
        let (mut table, alice, _bob) = table_with_two_players();
        table.apply(&alice, TableCommand::StartHand).unwrap();
        let leaver = turn_holder(&table);
        let outcome = table.apply(&leaver, TableCommand::StandUp).unwrap();

        // The hand collapsed to the other player.
        assert_eq!(table.phase(), Phase::HandOver);
        assert_eq!(table.win_messages().len(), 1);
        let CommandOutcome::StoodUp { returned } = outcome else {
            panic!("expected StoodUp, got {outcome:?}");
        };
        // The leaver posted a blind they never got back.
        assert!(returned < 100);
        let remaining = table.snapshot_for(None).seats.len();
        assert_eq!(remaining, 1);
        // Conservation: chips on the table plus the returned chips.
        assert_eq!(table.total_chips() + returned, 200);
    }

    #[test]
    fn rebuy_is_for_busted_seats_only() {
        let (mut table, alice, _) = table_with_two_players();
        assert_eq!(
            table.apply(&alice, TableCommand::Rebuy { seat: 1, amount: 100 }),
            Err(TableError::RebuyNotAvailable)
        );

        // Put alice in the busted state directly.
        if let Some(seat) = table.seats.get_mut(&1) {
            seat.stack = 0;
            seat.sitting_out = true;
        }
        assert_eq!(
            table.apply(&alice, TableCommand::Rebuy { seat: 1, amount: 19 }),
            Err(TableError::InvalidBuyIn { min: 20, max: 200 })
        );
        table
            .apply(&alice, TableCommand::Rebuy { seat: 1, amount: 100 })
            .unwrap();
        let snapshot = table.snapshot_for(None);
        let seat = snapshot.seats.iter().find(|s| s.seat_number == 1).unwrap();
        assert_eq!(seat.stack, 100);
        assert!(!seat.sitting_out);
    }

    #[test]
    fn partial_call_goes_all_in_instead_of_failing() {
        let mut table = Table::seeded(1, config(), 11);
        let alice = identity("alice");
        let bob = identity("bob");
        table
            .apply(&alice, TableCommand::SitDown { seat: 1, amount: Some(200) })
            .unwrap();
        table
            .apply(&bob, TableCommand::SitDown { seat: 2, amount: Some(20) })
            .unwrap();
        table.apply(&alice, TableCommand::StartHand).unwrap();

        // Whoever acts first shoves more than the short stack holds.
        let shover = turn_holder(&table);
        table
            .apply(&shover, TableCommand::Raise { to: 50 })
            .unwrap();
        let caller = turn_holder(&table);
        table.apply(&caller, TableCommand::Call).unwrap();

        // The short stack is all-in; the board runs out to a showdown.
        assert_eq!(table.phase(), Phase::HandOver);
        assert_eq!(table.snapshot_for(None).board.len(), 5);
        assert_eq!(table.total_chips(), 220);
        assert!(!table.win_messages().is_empty());
    }

    #[test]
    fn hole_cards_are_masked_for_other_observers() {
        let (mut table, alice, bob) = table_with_two_players();
        table.apply(&alice, TableCommand::StartHand).unwrap();

        let alice_view = table.snapshot_for(Some(alice.id));
        let own = alice_view.seats.iter().find(|s| s.name == alice.name).unwrap();
        assert!(own.cards.iter().all(|c| !c.is_face_down()));
        let theirs = alice_view.seats.iter().find(|s| s.name == bob.name).unwrap();
        assert_eq!(theirs.cards.len(), 2);
        assert!(theirs.cards.iter().all(Card::is_face_down));

        let spectator_view = table.snapshot_for(None);
        for seat in &spectator_view.seats {
            assert!(seat.cards.iter().all(Card::is_face_down));
        }
    }

    #[test]
    fn showdown_reveals_contender_hands() {
        let (mut table, alice, _) = table_with_two_players();
        table.apply(&alice, TableCommand::StartHand).unwrap();
        table.apply(&turn_holder(&table), TableCommand::Call).unwrap();
        table.apply(&turn_holder(&table), TableCommand::Check).unwrap();
        for _ in 0..3 {
            table.apply(&turn_holder(&table), TableCommand::Check).unwrap();
            table.apply(&turn_holder(&table), TableCommand::Check).unwrap();
        }
        assert_eq!(table.phase(), Phase::HandOver);
        let spectator_view = table.snapshot_for(None);
        for seat in &spectator_view.seats {
            assert_eq!(seat.cards.len(), 2);
            assert!(seat.cards.iter().all(|c| !c.is_face_down()));
        }
    }

    #[test]
    fn next_hand_is_ready_only_between_hands() {
        let (mut table, alice, _) = table_with_two_players();
        assert!(!table.ready_for_next_hand(), "first hand needs a start");
        table.apply(&alice, TableCommand::StartHand).unwrap();
        assert!(!table.ready_for_next_hand(), "hand in progress");
        table.apply(&turn_holder(&table), TableCommand::Fold).unwrap();
        assert!(table.ready_for_next_hand());
        table.begin_hand();
        assert_eq!(table.phase(), Phase::PreFlop);
        assert!(table.win_messages().is_empty(), "cleared for the new hand");
    }
}
