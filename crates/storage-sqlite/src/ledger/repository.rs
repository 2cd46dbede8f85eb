use amanah_core::errors::Result;
use amanah_core::ledger::{reconcile, LedgerRepositoryTrait};
use amanah_core::pilgrims::Pilgrim;
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;

use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::pilgrims::{load_pilgrim, save_pilgrim};
use crate::schema::pilgrims;
use crate::transactions::income_lines;

/// Rebuilds pilgrim balances from their income history.
pub struct LedgerRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl LedgerRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        LedgerRepository { pool, writer }
    }
}

#[async_trait]
impl LedgerRepositoryTrait for LedgerRepository {
    fn list_pilgrim_ids(&self) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(pilgrims::table
            .select(pilgrims::id)
            .order(pilgrims::created_at.asc())
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?)
    }

    async fn reconcile_pilgrim(&self, pilgrim_id: String) -> Result<Pilgrim> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Pilgrim> {
                let mut pilgrim = load_pilgrim(conn, &pilgrim_id)?;
                let lines = income_lines(conn, &pilgrim_id)?;
                let snapshot = reconcile(pilgrim.total_amount, &lines);
                debug!(
                    "Reconciled pilgrim {}: paid {} remaining {}",
                    pilgrim_id, snapshot.paid_amount, snapshot.remaining_amount
                );
                pilgrim.apply_snapshot(&snapshot);
                save_pilgrim(conn, pilgrim)
            })
            .await
    }
}
