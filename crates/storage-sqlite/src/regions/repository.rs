use amanah_core::errors::Result;
use amanah_core::regions::{Region, RegionRepositoryTrait};
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;

use crate::db::get_connection;
use crate::errors::StorageError;
use crate::schema::{districts, provinces, regencies, villages};

/// Read-only Indonesian administrative regions.
pub struct RegionRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl RegionRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        RegionRepository { pool }
    }
}

fn child_regions(rows: Vec<(String, String, String)>) -> Vec<Region> {
    rows.into_iter()
        .map(|(id, parent_id, name)| Region {
            id,
            parent_id: Some(parent_id),
            name,
        })
        .collect()
}

impl RegionRepositoryTrait for RegionRepository {
    fn provinces(&self) -> Result<Vec<Region>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = provinces::table
            .order(provinces::name.asc())
            .select((provinces::id, provinces::name))
            .load::<(String, String)>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| Region {
                id,
                parent_id: None,
                name,
            })
            .collect())
    }

    fn regencies(&self, province_id: &str) -> Result<Vec<Region>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = regencies::table
            .filter(regencies::province_id.eq(province_id))
            .order(regencies::name.asc())
            .select((regencies::id, regencies::province_id, regencies::name))
            .load::<(String, String, String)>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(child_regions(rows))
    }

    fn districts(&self, regency_id: &str) -> Result<Vec<Region>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = districts::table
            .filter(districts::regency_id.eq(regency_id))
            .order(districts::name.asc())
            .select((districts::id, districts::regency_id, districts::name))
            .load::<(String, String, String)>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(child_regions(rows))
    }

    fn villages(&self, district_id: &str) -> Result<Vec<Region>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = villages::table
            .filter(villages::district_id.eq(district_id))
            .order(villages::name.asc())
            .select((villages::id, villages::district_id, villages::name))
            .load::<(String, String, String)>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(child_regions(rows))
    }
}
