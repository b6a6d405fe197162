//! Table configuration.

use serde::{Deserialize, Serialize};
use tokio::time::Duration;

use crate::game::constants::{DEFAULT_ACTION_SECS, MAX_SEATS, MIN_BUY_IN_BIG_BLINDS};
use crate::game::seats::Chips;

/// Static parameters of a table, fixed at registration.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableConfig {
    /// Display name shown in the lobby.
    pub name: String,

    /// Seats at the table (2..=10).
    pub max_players: usize,

    /// Small blind unit; the big blind is twice this.
    pub min_bet: Chips,

    /// Maximum buy-in, which also caps any single bet.
    pub limit: Chips,

    /// Fixed buy-in for quick-game tables. When set, a sit-down may
    /// omit the amount and gets this stack.
    pub quick_buy_in: Option<Chips>,

    /// Seconds a seat may take per decision before a fold is forced.
    pub action_secs: u64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "Main table".to_string(),
            max_players: 6,
            min_bet: 10,
            limit: 2_000,
            quick_buy_in: None,
            action_secs: DEFAULT_ACTION_SECS,
        }
    }
}

impl TableConfig {
    #[must_use]
    pub fn big_blind(&self) -> Chips {
        self.min_bet * 2
    }

    /// Smallest legal buy-in: ten big blinds.
    #[must_use]
    pub fn min_buy_in(&self) -> Chips {
        self.big_blind() * MIN_BUY_IN_BIG_BLINDS
    }

    /// Largest legal buy-in.
    #[must_use]
    pub fn max_buy_in(&self) -> Chips {
        self.limit
    }

    #[must_use]
    pub fn action_window(&self) -> Duration {
        Duration::from_secs(self.action_secs)
    }

    /// Validate before a table is registered.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_bet == 0 {
            return Err("minimum bet must be positive".to_string());
        }
        if self.max_players < 2 || self.max_players > MAX_SEATS {
            return Err(format!("max players must be between 2 and {MAX_SEATS}"));
        }
        if self.limit < self.min_buy_in() {
            return Err(format!(
                "limit ({}) must cover the minimum buy-in ({})",
                self.limit,
                self.min_buy_in()
            ));
        }
        if let Some(quick) = self.quick_buy_in
            && (quick < self.min_buy_in() || quick > self.limit)
        {
            return Err(format!(
                "quick buy-in ({quick}) must lie within the buy-in bounds"
            ));
        }
        if self.action_secs == 0 {
            return Err("action window must be positive".to_string());
        }
        Ok(())
    }
}
