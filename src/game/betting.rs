//! Legality and bookkeeping for a single street of betting.

use thiserror::Error;

use super::seats::{Chips, Seat, SeatAction};

/// Why a betting action was refused. The table state is untouched when
/// one of these comes back.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ActionError {
    #[error("${0} to call, check not available")]
    CheckNotAvailable(Chips),
    #[error("nothing to call, check instead")]
    NothingToCall,
    #[error("raise to ${attempted} is below the minimum of ${minimum}")]
    RaiseTooSmall { attempted: Chips, minimum: Chips },
    #[error("the short all-in did not reopen the action")]
    RaiseNotReopened,
}

/// What a legal action did to the seat, reported back to the table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BetOutcome {
    Folded,
    Checked,
    Called { paid: Chips, all_in: bool },
    Raised { to: Chips, all_in: bool, reopened: bool },
}

/// Tracks the current street's highest bet and minimum legal raise, and
/// validates and applies fold/check/call/raise against them. The seat
/// passed in is mutated only on success.
#[derive(Debug)]
pub struct BettingRound {
    big_blind: Chips,
    call_amount: Chips,
    min_raise: Chips,
    /// Whether the latest aggressive action was a full raise. A short
    /// all-in leaves this false, so seats that already acted may call
    /// but not re-raise.
    raise_open: bool,
}

impl BettingRound {
    #[must_use]
    pub fn new(big_blind: Chips) -> Self {
        Self {
            big_blind,
            call_amount: 0,
            min_raise: big_blind,
            raise_open: true,
        }
    }

    /// Highest current-street bet any contesting seat must match.
    #[must_use]
    pub fn call_amount(&self) -> Chips {
        self.call_amount
    }

    /// Smallest legal increment above the call amount.
    #[must_use]
    pub fn min_raise(&self) -> Chips {
        self.min_raise
    }

    /// Reset for a fresh street; seat bets are swept separately.
    pub fn begin_street(&mut self) {
        self.call_amount = 0;
        self.min_raise = self.big_blind;
        self.raise_open = true;
    }

    /// Post a forced blind, capped at the seat's stack. Blind posters
    /// still owe a decision when the action returns to them.
    pub fn post_blind(&mut self, seat: &mut Seat, blind: Chips) {
        let paid = blind.min(seat.stack);
        seat.stack -= paid;
        seat.bet += paid;
        self.call_amount = self.call_amount.max(seat.bet);
    }

    pub fn fold(&mut self, seat: &mut Seat) -> BetOutcome {
        seat.last_action = Some(SeatAction::Fold);
        BetOutcome::Folded
    }

    /// Legal only when the seat has already matched the call amount
    /// (typically a zero call, or the big blind's option).
    pub fn check(&mut self, seat: &mut Seat) -> Result<BetOutcome, ActionError> {
        if seat.bet < self.call_amount {
            return Err(ActionError::CheckNotAvailable(self.call_amount - seat.bet));
        }
        seat.last_action = Some(SeatAction::Check);
        Ok(BetOutcome::Checked)
    }

    /// Match the call amount, capped at the seat's stack; a partial
    /// call leaves the seat all-in rather than failing.
    pub fn call(&mut self, seat: &mut Seat) -> Result<BetOutcome, ActionError> {
        let owed = self.call_amount.saturating_sub(seat.bet);
        if owed == 0 {
            return Err(ActionError::NothingToCall);
        }
        let paid = owed.min(seat.stack);
        seat.stack -= paid;
        seat.bet += paid;
        seat.last_action = Some(SeatAction::Call);
        Ok(BetOutcome::Called {
            paid,
            all_in: seat.stack == 0,
        })
    }

    /// Raise the seat's street total to `to` chips. Anything the stack
    /// can't cover degrades to an all-in; an all-in below the minimum
    /// raise is allowed but does not reopen the action.
    pub fn raise(&mut self, seat: &mut Seat, to: Chips) -> Result<BetOutcome, ActionError> {
        if seat.last_action.is_some() && !seat.has_folded() && !self.raise_open {
            return Err(ActionError::RaiseNotReopened);
        }
        let target = to.min(seat.bet + seat.stack);
        let all_in = target == seat.bet + seat.stack;
        let minimum = self.call_amount + self.min_raise;
        if target <= self.call_amount {
            // Not even a raise; a covered-stack all-in becomes a call.
            if all_in && target > seat.bet {
                let paid = target - seat.bet;
                seat.stack = 0;
                seat.bet = target;
                seat.last_action = Some(SeatAction::Call);
                return Ok(BetOutcome::Called { paid, all_in: true });
            }
            return Err(ActionError::RaiseTooSmall {
                attempted: target,
                minimum,
            });
        }
        if target < minimum && !all_in {
            return Err(ActionError::RaiseTooSmall {
                attempted: target,
                minimum,
            });
        }
        let reopened = target >= minimum;
        let paid = target - seat.bet;
        seat.stack -= paid;
        seat.bet = target;
        seat.last_action = Some(SeatAction::Raise);
        if reopened {
            self.min_raise = (target - self.call_amount).max(self.big_blind);
        }
        self.call_amount = target;
        self.raise_open = reopened;
        Ok(BetOutcome::Raised {
            to: target,
            all_in,
            reopened,
        })
    }
}
