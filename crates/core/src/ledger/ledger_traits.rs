use async_trait::async_trait;

use super::ledger_model::RecalculationSummary;
use crate::errors::Result;
use crate::pilgrims::Pilgrim;

/// Storage operations needed to rebuild pilgrim balances.
#[async_trait]
pub trait LedgerRepositoryTrait: Send + Sync {
    /// Identifiers of every pilgrim, in a stable order.
    fn list_pilgrim_ids(&self) -> Result<Vec<String>>;

    /// Recomputes one pilgrim from its income history and persists the result.
    ///
    /// Reading the history and writing the balance happen in one store
    /// transaction.
    async fn reconcile_pilgrim(&self, pilgrim_id: String) -> Result<Pilgrim>;
}

/// Ledger repair operations.
#[async_trait]
pub trait LedgerServiceTrait: Send + Sync {
    async fn recalculate_pilgrim(&self, pilgrim_id: &str) -> Result<Pilgrim>;

    /// Recomputes every pilgrim, continuing past individual failures.
    async fn recalculate_all(&self) -> Result<RecalculationSummary>;
}
