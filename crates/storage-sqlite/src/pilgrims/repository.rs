use amanah_core::errors::Result;
use amanah_core::packages::SeatMove;
use amanah_core::pilgrims::{
    BulkPilgrimUpdate, Pilgrim, PilgrimChange, PilgrimCreated, PilgrimCreation, PilgrimFilter,
    PilgrimRepositoryTrait, PilgrimUpdate,
};
use amanah_core::utils::{Page, PageRequest};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::Sqlite;
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;

use super::model::PilgrimDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{not_found_as, StorageError};
use crate::packages::move_seat;
use crate::schema::{invoices, pilgrims, transactions};
use crate::transactions::post_income;
use crate::utils::like_pattern;

pub struct PilgrimRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl PilgrimRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        PilgrimRepository { pool, writer }
    }
}

fn filtered(filter: &PilgrimFilter) -> pilgrims::BoxedQuery<'static, Sqlite> {
    let mut query = pilgrims::table.into_boxed();
    if let Some(package_id) = filter.package_id.clone() {
        query = query.filter(pilgrims::package_id.eq(package_id));
    }
    if let Some(status) = filter.payment_status {
        query = query.filter(pilgrims::payment_status.eq(status.as_str()));
    }
    if let Some(cancelled) = filter.is_cancelled {
        query = query.filter(pilgrims::is_cancelled.eq(cancelled));
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search);
        query = query.filter(
            pilgrims::name
                .like(pattern.clone())
                .or(pilgrims::nik.like(pattern.clone()))
                .or(pilgrims::phone.like(pattern)),
        );
    }
    query
}

pub(crate) fn load_pilgrim(conn: &mut SqliteConnection, pilgrim_id: &str) -> Result<Pilgrim> {
    pilgrims::table
        .find(pilgrim_id)
        .select(PilgrimDB::as_select())
        .first::<PilgrimDB>(conn)
        .map(Pilgrim::from)
        .map_err(not_found_as("Pilgrim", pilgrim_id))
}

/// Writes every column of `pilgrim` over the stored row.
pub(crate) fn save_pilgrim(conn: &mut SqliteConnection, pilgrim: Pilgrim) -> Result<Pilgrim> {
    let row: PilgrimDB = pilgrim.into();
    let stored = diesel::update(pilgrims::table.find(row.id.clone()))
        .set(&row)
        .returning(PilgrimDB::as_returning())
        .get_result(conn)
        .map_err(not_found_as("Pilgrim", &row.id))?;
    Ok(Pilgrim::from(stored))
}

fn update_one(
    conn: &mut SqliteConnection,
    pilgrim_id: &str,
    update: &PilgrimUpdate,
    now: NaiveDateTime,
) -> Result<PilgrimChange> {
    let before = load_pilgrim(conn, pilgrim_id)?;
    let next = update.apply_to(&before, now)?;
    let seats = SeatMove::between(before.package_id.as_deref(), next.package_id.as_deref());
    let reserved_package = move_seat(conn, &seats)?;
    let after = save_pilgrim(conn, next)?;
    Ok(PilgrimChange {
        before,
        after,
        reserved_package,
    })
}

#[async_trait]
impl PilgrimRepositoryTrait for PilgrimRepository {
    fn list(&self, filter: &PilgrimFilter, page: PageRequest) -> Result<Page<Pilgrim>> {
        let mut conn = get_connection(&self.pool)?;
        let total = filtered(filter)
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        let rows = filtered(filter)
            .order((pilgrims::created_at.desc(), pilgrims::id.asc()))
            .limit(page.limit())
            .offset(page.offset())
            .select(PilgrimDB::as_select())
            .load::<PilgrimDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(Page::new(
            rows.into_iter().map(Pilgrim::from).collect(),
            page,
            total,
        ))
    }

    fn list_all(&self) -> Result<Vec<Pilgrim>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = pilgrims::table
            .order(pilgrims::created_at.desc())
            .select(PilgrimDB::as_select())
            .load::<PilgrimDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Pilgrim::from).collect())
    }

    fn get_by_id(&self, pilgrim_id: &str) -> Result<Pilgrim> {
        let mut conn = get_connection(&self.pool)?;
        load_pilgrim(&mut conn, pilgrim_id)
    }

    fn find_by_nik(&self, nik: &str, exclude_id: Option<&str>) -> Result<Option<Pilgrim>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = pilgrims::table.filter(pilgrims::nik.eq(nik)).into_boxed();
        if let Some(exclude_id) = exclude_id {
            query = query.filter(pilgrims::id.ne(exclude_id));
        }
        let row = query
            .select(PilgrimDB::as_select())
            .first::<PilgrimDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Pilgrim::from))
    }

    fn count_by_package(&self, package_id: &str) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        Ok(pilgrims::table
            .filter(pilgrims::package_id.eq(package_id))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?)
    }

    async fn create(&self, creation: PilgrimCreation) -> Result<PilgrimCreated> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PilgrimCreated> {
                let PilgrimCreation {
                    pilgrim,
                    initial_payment,
                } = creation;
                let package =
                    move_seat(conn, &SeatMove::between(None, pilgrim.package_id.as_deref()))?;

                let row: PilgrimDB = pilgrim.into();
                let pilgrim_id = row.id.clone();
                diesel::insert_into(pilgrims::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let initial_payment = initial_payment
                    .map(|posting| post_income(conn, posting))
                    .transpose()?;
                debug!("Registered pilgrim {}", pilgrim_id);

                Ok(PilgrimCreated {
                    pilgrim: load_pilgrim(conn, &pilgrim_id)?,
                    package,
                    initial_payment,
                })
            })
            .await
    }

    async fn update(
        &self,
        pilgrim_id: String,
        update: PilgrimUpdate,
        now: NaiveDateTime,
    ) -> Result<PilgrimChange> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PilgrimChange> {
                update_one(conn, &pilgrim_id, &update, now)
            })
            .await
    }

    async fn bulk_update(
        &self,
        updates: Vec<BulkPilgrimUpdate>,
        now: NaiveDateTime,
    ) -> Result<Vec<PilgrimChange>> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Vec<PilgrimChange>> {
                updates
                    .iter()
                    .map(|item| update_one(conn, &item.id, &item.data, now))
                    .collect()
            })
            .await
    }

    async fn delete(&self, pilgrim_id: String) -> Result<Pilgrim> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Pilgrim> {
                let removed = load_pilgrim(conn, &pilgrim_id)?;
                move_seat(conn, &SeatMove::between(removed.package_id.as_deref(), None))?;

                // Payment history stays, without the link.
                diesel::update(transactions::table.filter(transactions::pilgrim_id.eq(&pilgrim_id)))
                    .set(transactions::pilgrim_id.eq(None::<String>))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                diesel::delete(invoices::table.filter(invoices::pilgrim_id.eq(&pilgrim_id)))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                diesel::delete(pilgrims::table.find(&pilgrim_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                debug!("Deleted pilgrim {}", pilgrim_id);
                Ok(removed)
            })
            .await
    }
}
