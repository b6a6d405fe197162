//! The table's single scheduled deadline.
//!
//! At most one deadline is live per table: either the action window of
//! the seat on turn, or the short delay before the next hand starts.
//! Pausing disarms the deadline while preserving the unspent window;
//! resuming re-arms for exactly the remainder, never a fresh window.

use tokio::time::{Duration, Instant};

use crate::game::seats::SeatNumber;

/// What the pending deadline will do when it fires.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Deadline {
    /// Force a fold for the seat on turn.
    Action(SeatNumber),
    /// Start the next hand.
    NextHand,
}

#[derive(Debug, Default)]
enum ClockState {
    #[default]
    Idle,
    Armed {
        deadline: Deadline,
        expires_at: Instant,
    },
    Paused {
        deadline: Deadline,
        remaining: Duration,
    },
}

#[derive(Debug, Default)]
pub struct TurnClock {
    state: ClockState,
}

impl TurnClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a deadline, replacing whatever was pending.
    pub fn arm(&mut self, deadline: Deadline, window: Duration) {
        self.state = ClockState::Armed {
            deadline,
            expires_at: Instant::now() + window,
        };
    }

    pub fn disarm(&mut self) {
        self.state = ClockState::Idle;
    }

    /// The armed deadline, if any. Paused deadlines are not pending.
    #[must_use]
    pub fn pending(&self) -> Option<Deadline> {
        match self.state {
            ClockState::Armed { deadline, .. } => Some(deadline),
            _ => None,
        }
    }

    /// When the pending deadline expires; the actor's select loop
    /// sleeps until this.
    #[must_use]
    pub fn expires_at(&self) -> Option<Instant> {
        match self.state {
            ClockState::Armed { expires_at, .. } => Some(expires_at),
            _ => None,
        }
    }

    /// Disarm without forfeiting the unspent window.
    pub fn pause(&mut self) {
        if let ClockState::Armed {
            deadline,
            expires_at,
        } = self.state
        {
            self.state = ClockState::Paused {
                deadline,
                remaining: expires_at.saturating_duration_since(Instant::now()),
            };
        }
    }

    /// Re-arm a paused deadline for the remaining window only.
    pub fn resume(&mut self) {
        if let ClockState::Paused {
            deadline,
            remaining,
        } = self.state
        {
            self.state = ClockState::Armed {
                deadline,
                expires_at: Instant::now() + remaining,
            };
        }
    }

    /// Consume the deadline if it has expired. Returns `None` when the
    /// clock was already disarmed, which is how a racing action wins.
    pub fn fire(&mut self) -> Option<Deadline> {
        match self.state {
            ClockState::Armed {
                deadline,
                expires_at,
            } if Instant::now() >= expires_at => {
                self.state = ClockState::Idle;
                Some(deadline)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn fires_only_after_the_window() {
        let mut clock = TurnClock::new();
        clock.arm(Deadline::Action(3), Duration::from_secs(15));
        assert_eq!(clock.fire(), None);
        advance(Duration::from_secs(14)).await;
        assert_eq!(clock.fire(), None);
        advance(Duration::from_secs(1)).await;
        assert_eq!(clock.fire(), Some(Deadline::Action(3)));
        assert_eq!(clock.pending(), None, "firing disarms");
    }

    #[tokio::test(start_paused = true)]
    async fn disarmed_clock_never_fires() {
        let mut clock = TurnClock::new();
        clock.arm(Deadline::Action(1), Duration::from_secs(15));
        clock.disarm();
        advance(Duration::from_secs(60)).await;
        assert_eq!(clock.fire(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_preserves_the_remaining_window() {
        let mut clock = TurnClock::new();
        clock.arm(Deadline::Action(2), Duration::from_secs(15));
        advance(Duration::from_secs(10)).await;
        clock.pause();
        assert_eq!(clock.pending(), None);

        // Wall-clock time during the pause is not counted.
        advance(Duration::from_secs(300)).await;
        assert_eq!(clock.fire(), None);

        clock.resume();
        advance(Duration::from_secs(4)).await;
        assert_eq!(clock.fire(), None, "5 seconds were left, not a fresh 15");
        advance(Duration::from_secs(1)).await;
        assert_eq!(clock.fire(), Some(Deadline::Action(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_replaces_the_pending_deadline() {
        let mut clock = TurnClock::new();
        clock.arm(Deadline::Action(1), Duration::from_secs(15));
        advance(Duration::from_secs(14)).await;
        clock.arm(Deadline::Action(2), Duration::from_secs(15));
        advance(Duration::from_secs(1)).await;
        assert_eq!(clock.fire(), None, "seat 1's window no longer applies");
        advance(Duration::from_secs(14)).await;
        assert_eq!(clock.fire(), Some(Deadline::Action(2)));
    }
}
