use async_trait::async_trait;
use log::{debug, info, warn};
use std::sync::Arc;

use super::ledger_model::RecalculationSummary;
use super::ledger_traits::{LedgerRepositoryTrait, LedgerServiceTrait};
use crate::errors::Result;
use crate::pilgrims::Pilgrim;

/// Rebuilds pilgrim balances from their transaction history.
pub struct LedgerService {
    repository: Arc<dyn LedgerRepositoryTrait>,
}

impl LedgerService {
    pub fn new(repository: Arc<dyn LedgerRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl LedgerServiceTrait for LedgerService {
    async fn recalculate_pilgrim(&self, pilgrim_id: &str) -> Result<Pilgrim> {
        debug!("Recalculating balance of pilgrim {}", pilgrim_id);
        self.repository
            .reconcile_pilgrim(pilgrim_id.to_string())
            .await
    }

    async fn recalculate_all(&self) -> Result<RecalculationSummary> {
        let ids = self.repository.list_pilgrim_ids()?;
        info!("Recalculating balances for {} pilgrims", ids.len());

        let mut summary = RecalculationSummary::default();
        for id in ids {
            match self.repository.reconcile_pilgrim(id.clone()).await {
                Ok(_) => summary.updated_count += 1,
                Err(e) => {
                    warn!("Failed to recalculate pilgrim {}: {}", id, e);
                    summary.errors.push(format!("Pilgrim {}: {}", id, e));
                }
            }
        }

        info!(
            "Balance recalculation finished: {} updated, {} failed",
            summary.updated_count,
            summary.errors.len()
        );
        Ok(summary)
    }
}
