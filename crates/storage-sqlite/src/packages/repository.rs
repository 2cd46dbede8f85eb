use amanah_core::errors::{Error, Result};
use amanah_core::packages::{
    Package, PackageFilter, PackageRepositoryTrait, PackageStatus, SeatMove,
};
use amanah_core::utils::{Page, PageRequest};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::Sqlite;
use diesel::SqliteConnection;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::model::PackageDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{not_found_as, StorageError};
use crate::schema::{packages, pilgrims};
use crate::utils::{decimal_text, like_pattern, parse_decimal};

pub struct PackageRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl PackageRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        PackageRepository { pool, writer }
    }
}

fn filtered(filter: &PackageFilter) -> packages::BoxedQuery<'static, Sqlite> {
    let mut query = packages::table.into_boxed();
    if let Some(status) = filter.status {
        query = query.filter(packages::status.eq(status.as_str()));
    }
    if let Some(package_type) = filter.package_type {
        query = query.filter(packages::package_type.eq(package_type.as_str()));
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search);
        query = query.filter(
            packages::name
                .like(pattern.clone())
                .or(packages::code.like(pattern)),
        );
    }
    query
}

pub(crate) fn load_package(conn: &mut SqliteConnection, package_id: &str) -> Result<Package> {
    packages::table
        .find(package_id)
        .select(PackageDB::as_select())
        .first::<PackageDB>(conn)
        .map(Package::from)
        .map_err(not_found_as("Package", package_id))
}

/// Applies a seat move inside the caller's transaction and returns the
/// package that gained a seat.
///
/// The increment happens in place. The decrement only touches rows above
/// zero, so the counter never goes negative.
pub(crate) fn move_seat(conn: &mut SqliteConnection, seats: &SeatMove) -> Result<Option<Package>> {
    if let Some(release) = &seats.release {
        diesel::update(
            packages::table
                .filter(packages::id.eq(release))
                .filter(packages::booked_seats.gt(0)),
        )
        .set(packages::booked_seats.eq(packages::booked_seats - 1))
        .execute(conn)
        .map_err(StorageError::from)?;
    }
    match &seats.reserve {
        Some(reserve) => {
            let updated = diesel::update(packages::table.find(reserve))
                .set(packages::booked_seats.eq(packages::booked_seats + 1))
                .execute(conn)
                .map_err(StorageError::from)?;
            if updated == 0 {
                return Err(Error::not_found("Package", reserve));
            }
            load_package(conn, reserve).map(Some)
        }
        None => Ok(None),
    }
}

/// Adds `delta` to a package's actual cost, floored at zero. A missing
/// package is skipped.
pub(crate) fn add_package_cost(
    conn: &mut SqliteConnection,
    package_id: &str,
    delta: Decimal,
) -> Result<()> {
    let current = packages::table
        .find(package_id)
        .select(packages::actual_cost)
        .first::<String>(conn)
        .optional()
        .map_err(StorageError::from)?;
    if let Some(current) = current {
        let next = (parse_decimal(&current, "actual_cost") + delta).max(Decimal::ZERO);
        diesel::update(packages::table.find(package_id))
            .set(packages::actual_cost.eq(decimal_text(next)))
            .execute(conn)
            .map_err(StorageError::from)?;
    }
    Ok(())
}

#[async_trait]
impl PackageRepositoryTrait for PackageRepository {
    fn list(&self, filter: &PackageFilter, page: PageRequest) -> Result<Page<Package>> {
        let mut conn = get_connection(&self.pool)?;
        let total = filtered(filter)
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        let rows = filtered(filter)
            .order((packages::created_at.desc(), packages::id.asc()))
            .limit(page.limit())
            .offset(page.offset())
            .select(PackageDB::as_select())
            .load::<PackageDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(Page::new(
            rows.into_iter().map(Package::from).collect(),
            page,
            total,
        ))
    }

    fn list_all(&self) -> Result<Vec<Package>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = packages::table
            .order(packages::created_at.desc())
            .select(PackageDB::as_select())
            .load::<PackageDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Package::from).collect())
    }

    fn get_by_id(&self, package_id: &str) -> Result<Package> {
        let mut conn = get_connection(&self.pool)?;
        load_package(&mut conn, package_id)
    }

    fn get_by_code(&self, code: &str) -> Result<Option<Package>> {
        let mut conn = get_connection(&self.pool)?;
        let row = packages::table
            .filter(packages::code.eq(code))
            .select(PackageDB::as_select())
            .first::<PackageDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Package::from))
    }

    fn count_by_status(&self, status: PackageStatus) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        Ok(packages::table
            .filter(packages::status.eq(status.as_str()))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?)
    }

    async fn create(&self, package: Package) -> Result<Package> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Package> {
                let row: PackageDB = package.into();
                let stored = diesel::insert_into(packages::table)
                    .values(&row)
                    .returning(PackageDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Package::from(stored))
            })
            .await
    }

    async fn update(&self, package: Package) -> Result<Package> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Package> {
                let stored = load_package(conn, &package.id)?;
                // Counters are owned by seat moves and expense postings.
                let row: PackageDB = Package {
                    booked_seats: stored.booked_seats,
                    actual_cost: stored.actual_cost,
                    created_at: stored.created_at,
                    created_by_id: stored.created_by_id,
                    ..package
                }
                .into();
                diesel::update(packages::table.find(&row.id))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                load_package(conn, &row.id)
            })
            .await
    }

    async fn delete(&self, package_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let assigned = pilgrims::table
                    .filter(pilgrims::package_id.eq(&package_id))
                    .count()
                    .get_result::<i64>(conn)
                    .map_err(StorageError::from)?;
                if assigned > 0 {
                    return Err(Error::ConstraintViolation(format!(
                        "package still has {} pilgrim(s)",
                        assigned
                    )));
                }
                let removed = diesel::delete(packages::table.find(&package_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                debug!("Deleted package {}", package_id);
                Ok(removed)
            })
            .await
    }

    async fn set_status(
        &self,
        package_id: String,
        status: PackageStatus,
        now: NaiveDateTime,
    ) -> Result<Package> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Package> {
                let updated = diesel::update(packages::table.find(&package_id))
                    .set((
                        packages::status.eq(status.as_str()),
                        packages::updated_at.eq(now),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if updated == 0 {
                    return Err(Error::not_found("Package", &package_id));
                }
                load_package(conn, &package_id)
            })
            .await
    }
}
