//! The registry owning every live table.
//!
//! Tables run independently; the registry holds their handles and
//! routes inbound commands by table id. Definitions are registered up
//! front and actors are spawned lazily on first use.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::actor::{TableActor, TableHandle};
use super::config::TableConfig;
use super::messages::{CommandOutcome, PlayerIdentity, TableCommand, TableSummary};
use super::state::{Phase, TableError};
use crate::broadcast::BroadcastGateway;
use crate::game::seats::TableId;

pub struct TableRegistry {
    gateway: Arc<dyn BroadcastGateway>,
    definitions: RwLock<HashMap<TableId, TableConfig>>,
    tables: RwLock<HashMap<TableId, TableHandle>>,
    next_id: RwLock<TableId>,
}

impl TableRegistry {
    #[must_use]
    pub fn new(gateway: Arc<dyn BroadcastGateway>) -> Self {
        Self {
            gateway,
            definitions: RwLock::new(HashMap::new()),
            tables: RwLock::new(HashMap::new()),
            next_id: RwLock::new(1),
        }
    }

    /// Register a table definition. The actor is spawned on the first
    /// command routed to it.
    pub async fn register(&self, config: TableConfig) -> Result<TableId, TableError> {
        config.validate().map_err(TableError::InvalidConfig)?;
        let mut next_id = self.next_id.write().await;
        let table_id = *next_id;
        *next_id += 1;
        drop(next_id);
        let mut definitions = self.definitions.write().await;
        definitions.insert(table_id, config);
        log::info!("registered table {table_id}");
        Ok(table_id)
    }

    /// Route a player's command to its table. Unknown ids fail with
    /// `TableError::UnknownTable`; all game rules live in the table.
    pub async fn route(
        &self,
        table_id: TableId,
        player: PlayerIdentity,
        command: TableCommand,
    ) -> Result<CommandOutcome, TableError> {
        let handle = self.ensure_table(table_id).await?;
        handle.command(player, command).await
    }

    /// Handle for a live table, spawning it if only the definition
    /// exists so far.
    pub async fn ensure_table(&self, table_id: TableId) -> Result<TableHandle, TableError> {
        {
            let tables = self.tables.read().await;
            if let Some(handle) = tables.get(&table_id) {
                return Ok(handle.clone());
            }
        }
        let config = {
            let definitions = self.definitions.read().await;
            definitions
                .get(&table_id)
                .cloned()
                .ok_or(TableError::UnknownTable(table_id))?
        };
        let mut tables = self.tables.write().await;
        // Another caller may have spawned it while we waited.
        if let Some(handle) = tables.get(&table_id) {
            return Ok(handle.clone());
        }
        let (actor, handle) = TableActor::new(table_id, config, self.gateway.clone());
        tokio::spawn(actor.run());
        tables.insert(table_id, handle.clone());
        log::info!("spawned table {table_id}");
        Ok(handle)
    }

    /// Lobby rows for every registered table, live or not.
    pub async fn list_tables(&self) -> Vec<TableSummary> {
        let definitions: Vec<(TableId, TableConfig)> = {
            let definitions = self.definitions.read().await;
            let mut rows: Vec<_> = definitions
                .iter()
                .map(|(id, config)| (*id, config.clone()))
                .collect();
            rows.sort_by_key(|(id, _)| *id);
            rows
        };
        let tables = self.tables.read().await;
        let mut summaries = Vec::with_capacity(definitions.len());
        for (id, config) in definitions {
            let live = match tables.get(&id) {
                Some(handle) => handle.summary().await.ok(),
                None => None,
            };
            summaries.push(live.unwrap_or_else(|| TableSummary {
                id,
                name: config.name.clone(),
                seats_taken: 0,
                max_players: config.max_players,
                min_bet: config.min_bet,
                limit: config.limit,
                quick: config.quick_buy_in.is_some(),
                phase: Phase::WaitingForPlayers.to_string(),
            }));
        }
        summaries
    }

    /// Stop a table's actor and drop its definition.
    pub async fn close_table(&self, table_id: TableId) -> Result<(), TableError> {
        let removed = {
            let mut definitions = self.definitions.write().await;
            definitions.remove(&table_id)
        };
        if removed.is_none() {
            return Err(TableError::UnknownTable(table_id));
        }
        let handle = {
            let mut tables = self.tables.write().await;
            tables.remove(&table_id)
        };
        if let Some(handle) = handle {
            handle.close().await;
        }
        log::info!("closed table {table_id}");
        Ok(())
    }

    /// Number of tables with a running actor.
    pub async fn live_table_count(&self) -> usize {
        self.tables.read().await.len()
    }
}
