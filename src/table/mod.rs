//! Per-table actors and the registry that owns them.
//!
//! Each table runs in its own tokio task with an mpsc inbox; the actor
//! serializes every mutation (player commands, timer expiries, pause
//! and resume) against the [`state::Table`] it owns, so per-table
//! linearizability is enforced by construction rather than convention.
//! The [`registry::TableRegistry`] creates tables, routes inbound
//! commands to the right actor, and lists tables for the lobby.

pub mod actor;
pub mod clock;
pub mod config;
pub mod messages;
pub mod registry;
pub mod state;

pub use actor::{TableActor, TableHandle};
pub use clock::{Deadline, TurnClock};
pub use config::TableConfig;
pub use messages::{CommandOutcome, PlayerIdentity, TableCommand, TableMessage, TableSummary};
pub use registry::TableRegistry;
pub use state::{Phase, Table, TableError};
