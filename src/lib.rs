//! # Cardroom
//!
//! A real-time multiplayer Texas hold'em table engine. The crate owns
//! the authoritative state of every table: the per-table state
//! machine, betting-round arithmetic, turn-timer discipline, seat and
//! buy-in lifecycle, and pot settlement. Rendering, authentication,
//! and persistence are external collaborators; they talk to the engine
//! through table commands in and snapshot broadcasts out.
//!
//! ## Architecture
//!
//! - [`game`]: pure poker arithmetic: cards, hand ranking, betting
//!   legality, pot tiers. Synchronous and side-effect free.
//! - [`table`]: one tokio actor per table serializing every mutation,
//!   a cancellable/pausable turn clock, and the registry that routes
//!   inbound commands.
//! - [`broadcast`]: the narrow push contract toward connected clients,
//!   with per-observer snapshots that hide other players' hole cards.
//!
//! ## Example
//!
//! ```
//! use cardroom::game::seats::PlayerId;
//! use cardroom::table::{PlayerIdentity, Table, TableCommand, TableConfig};
//!
//! let mut table = Table::new(1, TableConfig::default());
//! let alice = PlayerIdentity::new(PlayerId::new_v4(), "alice");
//! table
//!     .apply(&alice, TableCommand::SitDown { seat: 1, amount: Some(500) })
//!     .unwrap();
//! ```

/// Outbound push boundary and snapshot types.
pub mod broadcast;

/// Pure poker arithmetic: cards, ranking, betting, pots.
pub mod game;

/// Per-table actors, the turn clock, and the registry.
pub mod table;

pub use broadcast::{BroadcastGateway, ChannelGateway, TableEvent, TableSnapshot};
pub use game::{
    Card, Chips, Deck, HandRank, PlayerId, PlayerName, SeatAction, SeatNumber, Suit, TableId,
};
pub use table::{
    CommandOutcome, Phase, PlayerIdentity, Table, TableCommand, TableConfig, TableError,
    TableHandle, TableRegistry,
};
