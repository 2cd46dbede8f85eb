//! Pilgrim repository and service traits.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::pilgrims_model::{
    BulkPilgrimUpdate, NewPilgrim, Pilgrim, PilgrimChange, PilgrimCreated, PilgrimCreation,
    PilgrimFilter, PilgrimStats, PilgrimUpdate, StatusCount,
};
use crate::errors::Result;
use crate::users::Actor;
use crate::utils::{Page, PageRequest};

/// Persistence of pilgrims.
///
/// Writes keep package seat counters in step within the same store
/// transaction: reserving a seat is an in-place increment, releasing one
/// never drops the counter below zero.
#[async_trait]
pub trait PilgrimRepositoryTrait: Send + Sync {
    /// Newest first.
    fn list(&self, filter: &PilgrimFilter, page: PageRequest) -> Result<Page<Pilgrim>>;

    fn list_all(&self) -> Result<Vec<Pilgrim>>;

    fn get_by_id(&self, pilgrim_id: &str) -> Result<Pilgrim>;

    /// Another pilgrim holding `nik`, ignoring `exclude_id`.
    fn find_by_nik(&self, nik: &str, exclude_id: Option<&str>) -> Result<Option<Pilgrim>>;

    fn count_by_package(&self, package_id: &str) -> Result<i64>;

    /// Inserts the pilgrim, reserves a seat and posts the initial payment.
    async fn create(&self, creation: PilgrimCreation) -> Result<PilgrimCreated>;

    /// Applies the update to the current row and moves the seat when the
    /// package changes.
    async fn update(
        &self,
        pilgrim_id: String,
        update: PilgrimUpdate,
        now: NaiveDateTime,
    ) -> Result<PilgrimChange>;

    /// Applies every update or none.
    async fn bulk_update(
        &self,
        updates: Vec<BulkPilgrimUpdate>,
        now: NaiveDateTime,
    ) -> Result<Vec<PilgrimChange>>;

    /// Removes the pilgrim and releases their seat. Returns the removed row.
    async fn delete(&self, pilgrim_id: String) -> Result<Pilgrim>;
}

#[async_trait]
pub trait PilgrimServiceTrait: Send + Sync {
    fn list_pilgrims(&self, filter: &PilgrimFilter, page: PageRequest) -> Result<Page<Pilgrim>>;

    fn get_pilgrim(&self, pilgrim_id: &str) -> Result<Pilgrim>;

    fn count_by_status(&self) -> Result<Vec<StatusCount>>;

    /// Sum still owed by pilgrims that are neither paid up nor cancelled.
    fn total_receivables(&self) -> Result<Decimal>;

    /// Pilgrims who still owe money, largest balance first.
    fn outstanding(&self, page: PageRequest) -> Result<Page<Pilgrim>>;

    /// Pilgrims that are not cancelled.
    fn active_count(&self) -> Result<i64>;

    fn stats(&self) -> Result<PilgrimStats>;

    async fn create_pilgrim(&self, actor: &Actor, new_pilgrim: NewPilgrim)
        -> Result<PilgrimCreated>;

    async fn update_pilgrim(
        &self,
        actor: &Actor,
        pilgrim_id: &str,
        update: PilgrimUpdate,
    ) -> Result<Pilgrim>;

    async fn bulk_update_pilgrims(
        &self,
        actor: &Actor,
        updates: Vec<BulkPilgrimUpdate>,
    ) -> Result<Vec<Pilgrim>>;

    async fn delete_pilgrim(&self, actor: &Actor, pilgrim_id: &str) -> Result<()>;
}
