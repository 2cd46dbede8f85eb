use amanah_core::deletion::DeletionPolicy;
use amanah_core::errors::{Error, Result};
use amanah_core::utils::{Page, PageRequest};
use amanah_core::vendors::{
    DebtFilter, DebtStatus, Vendor, VendorDebt, VendorDebtDetail, VendorDebtRepositoryTrait,
    VendorFilter, VendorRepositoryTrait,
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::Sqlite;
use diesel::SqliteConnection;
use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use super::model::{VendorDB, VendorDebtDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{not_found_as, StorageError};
use crate::schema::{packages, vendor_debts, vendors};
use crate::utils::{chunk_for_sqlite, like_pattern};

pub struct VendorRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl VendorRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        VendorRepository { pool, writer }
    }
}

fn filtered_vendors(filter: &VendorFilter) -> vendors::BoxedQuery<'static, Sqlite> {
    let mut query = vendors::table.into_boxed();
    if !filter.include_inactive.unwrap_or(false) {
        query = query.filter(vendors::is_active.eq(true));
    }
    if let Some(kind) = filter.vendor_type.clone().filter(|t| !t.is_empty()) {
        query = query.filter(vendors::vendor_type.eq(kind));
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search);
        query = query.filter(
            vendors::name
                .like(pattern.clone())
                .or(vendors::contact_person.like(pattern)),
        );
    }
    query
}

fn load_vendor(conn: &mut SqliteConnection, vendor_id: &str) -> Result<Vendor> {
    vendors::table
        .find(vendor_id)
        .select(VendorDB::as_select())
        .first::<VendorDB>(conn)
        .map(Vendor::from)
        .map_err(not_found_as("Vendor", vendor_id))
}

#[async_trait]
impl VendorRepositoryTrait for VendorRepository {
    fn list(&self, filter: &VendorFilter, page: PageRequest) -> Result<Page<Vendor>> {
        let mut conn = get_connection(&self.pool)?;
        let total = filtered_vendors(filter)
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        let rows = filtered_vendors(filter)
            .order(vendors::name.asc())
            .limit(page.limit())
            .offset(page.offset())
            .select(VendorDB::as_select())
            .load::<VendorDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(Page::new(
            rows.into_iter().map(Vendor::from).collect(),
            page,
            total,
        ))
    }

    fn get_by_id(&self, vendor_id: &str) -> Result<Vendor> {
        let mut conn = get_connection(&self.pool)?;
        load_vendor(&mut conn, vendor_id)
    }

    async fn create(&self, vendor: Vendor) -> Result<Vendor> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Vendor> {
                let row: VendorDB = vendor.into();
                let stored = diesel::insert_into(vendors::table)
                    .values(&row)
                    .returning(VendorDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Vendor::from(stored))
            })
            .await
    }

    async fn update(&self, vendor: Vendor) -> Result<Vendor> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Vendor> {
                let row: VendorDB = vendor.into();
                let stored = diesel::update(vendors::table.find(row.id.clone()))
                    .set(&row)
                    .returning(VendorDB::as_returning())
                    .get_result(conn)
                    .map_err(not_found_as("Vendor", &row.id))?;
                Ok(Vendor::from(stored))
            })
            .await
    }

    async fn remove(
        &self,
        vendor_id: String,
        policy: DeletionPolicy,
        now: NaiveDateTime,
    ) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let affected = match policy {
                    DeletionPolicy::SoftFlag => diesel::update(vendors::table.find(&vendor_id))
                        .set((vendors::is_active.eq(false), vendors::updated_at.eq(now)))
                        .execute(conn),
                    DeletionPolicy::Hard => {
                        diesel::delete(vendors::table.find(&vendor_id)).execute(conn)
                    }
                }
                .map_err(StorageError::from)?;
                debug!("Removed vendor {} ({:?}, {} row)", vendor_id, policy, affected);
                Ok(())
            })
            .await
    }
}

pub struct VendorDebtRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl VendorDebtRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        VendorDebtRepository { pool, writer }
    }
}

fn filtered_debts(filter: &DebtFilter) -> vendor_debts::BoxedQuery<'static, Sqlite> {
    let mut query = vendor_debts::table.into_boxed();
    if let Some(vendor_id) = filter.vendor_id.clone() {
        query = query.filter(vendor_debts::vendor_id.eq(vendor_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(vendor_debts::status.eq(status.as_str()));
    }
    query
}

/// Attaches vendor and package names to a batch of debts.
fn with_names(conn: &mut SqliteConnection, rows: Vec<VendorDebtDB>) -> Result<Vec<VendorDebtDetail>> {
    let mut vendor_ids: Vec<String> = rows.iter().map(|d| d.vendor_id.clone()).collect();
    vendor_ids.sort();
    vendor_ids.dedup();
    let mut package_ids: Vec<String> = rows.iter().filter_map(|d| d.package_id.clone()).collect();
    package_ids.sort();
    package_ids.dedup();

    let mut vendor_names: HashMap<String, String> = HashMap::new();
    for chunk in chunk_for_sqlite(&vendor_ids) {
        let found = vendors::table
            .filter(vendors::id.eq_any(chunk))
            .select((vendors::id, vendors::name))
            .load::<(String, String)>(conn)
            .map_err(StorageError::from)?;
        vendor_names.extend(found);
    }
    let mut package_names: HashMap<String, String> = HashMap::new();
    for chunk in chunk_for_sqlite(&package_ids) {
        let found = packages::table
            .filter(packages::id.eq_any(chunk))
            .select((packages::id, packages::name))
            .load::<(String, String)>(conn)
            .map_err(StorageError::from)?;
        package_names.extend(found);
    }

    Ok(rows
        .into_iter()
        .map(VendorDebt::from)
        .map(|debt| VendorDebtDetail {
            vendor_name: vendor_names.get(&debt.vendor_id).cloned(),
            package_name: debt
                .package_id
                .as_ref()
                .and_then(|id| package_names.get(id).cloned()),
            debt,
        })
        .collect())
}

fn load_debt(conn: &mut SqliteConnection, debt_id: &str) -> Result<VendorDebt> {
    vendor_debts::table
        .find(debt_id)
        .select(VendorDebtDB::as_select())
        .first::<VendorDebtDB>(conn)
        .map(VendorDebt::from)
        .map_err(not_found_as("Vendor debt", debt_id))
}

fn save_debt(conn: &mut SqliteConnection, debt: VendorDebt) -> Result<VendorDebt> {
    let row: VendorDebtDB = debt.into();
    let stored = diesel::update(vendor_debts::table.find(row.id.clone()))
        .set(&row)
        .returning(VendorDebtDB::as_returning())
        .get_result(conn)
        .map_err(not_found_as("Vendor debt", &row.id))?;
    Ok(VendorDebt::from(stored))
}

#[async_trait]
impl VendorDebtRepositoryTrait for VendorDebtRepository {
    fn list(&self, filter: &DebtFilter, page: PageRequest) -> Result<Page<VendorDebtDetail>> {
        let mut conn = get_connection(&self.pool)?;
        let total = filtered_debts(filter)
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        let rows = filtered_debts(filter)
            .order(vendor_debts::created_at.desc())
            .limit(page.limit())
            .offset(page.offset())
            .select(VendorDebtDB::as_select())
            .load::<VendorDebtDB>(&mut conn)
            .map_err(StorageError::from)?;
        let details = with_names(&mut conn, rows)?;
        Ok(Page::new(details, page, total))
    }

    fn get_by_id(&self, debt_id: &str) -> Result<VendorDebt> {
        let mut conn = get_connection(&self.pool)?;
        load_debt(&mut conn, debt_id)
    }

    fn get_detail(&self, debt_id: &str) -> Result<VendorDebtDetail> {
        let mut conn = get_connection(&self.pool)?;
        let row = vendor_debts::table
            .find(debt_id)
            .select(VendorDebtDB::as_select())
            .first::<VendorDebtDB>(&mut conn)
            .map_err(not_found_as("Vendor debt", debt_id))?;
        with_names(&mut conn, vec![row])?
            .pop()
            .ok_or_else(|| Error::not_found("Vendor debt", debt_id))
    }

    fn list_outstanding(&self) -> Result<Vec<VendorDebtDetail>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = vendor_debts::table
            .filter(vendor_debts::status.ne(DebtStatus::Paid.as_str()))
            .order((
                vendor_debts::due_date.is_null(),
                vendor_debts::due_date.asc(),
                vendor_debts::created_at.asc(),
            ))
            .select(VendorDebtDB::as_select())
            .load::<VendorDebtDB>(&mut conn)
            .map_err(StorageError::from)?;
        with_names(&mut conn, rows)
    }

    async fn create(&self, debt: VendorDebt) -> Result<VendorDebt> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<VendorDebt> {
                load_vendor(conn, &debt.vendor_id)?;
                let row: VendorDebtDB = debt.into();
                let stored = diesel::insert_into(vendor_debts::table)
                    .values(&row)
                    .returning(VendorDebtDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(VendorDebt::from(stored))
            })
            .await
    }

    async fn update(&self, debt: VendorDebt) -> Result<VendorDebt> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<VendorDebt> {
                save_debt(conn, debt)
            })
            .await
    }

    async fn add_payment(
        &self,
        debt_id: String,
        amount: Decimal,
        now: NaiveDateTime,
    ) -> Result<(VendorDebt, VendorDebt)> {
        self.writer
            .exec(
                move |conn: &mut SqliteConnection| -> Result<(VendorDebt, VendorDebt)> {
                    let before = load_debt(conn, &debt_id)?;
                    let after = save_debt(conn, before.with_payment(amount, now)?)?;
                    Ok((before, after))
                },
            )
            .await
    }

    async fn delete(&self, debt_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(vendor_debts::table.find(&debt_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }
}
