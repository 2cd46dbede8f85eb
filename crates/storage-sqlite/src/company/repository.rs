use amanah_core::company::{CompanyRepositoryTrait, CompanySettings};
use amanah_core::errors::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;

use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::company_settings;

/// The company profile is a single row.
#[derive(Queryable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = company_settings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct CompanySettingsDB {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<CompanySettingsDB> for CompanySettings {
    fn from(db: CompanySettingsDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            address: db.address,
            city: db.city,
            phone: db.phone,
            email: db.email,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<CompanySettings> for CompanySettingsDB {
    fn from(domain: CompanySettings) -> Self {
        Self {
            id: domain.id,
            name: domain.name,
            address: domain.address,
            city: domain.city,
            phone: domain.phone,
            email: domain.email,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}

pub struct CompanyRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl CompanyRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        CompanyRepository { pool, writer }
    }
}

#[async_trait]
impl CompanyRepositoryTrait for CompanyRepository {
    fn get(&self) -> Result<Option<CompanySettings>> {
        let mut conn = get_connection(&self.pool)?;
        let row = company_settings::table
            .order(company_settings::created_at.asc())
            .select(CompanySettingsDB::as_select())
            .first::<CompanySettingsDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(CompanySettings::from))
    }

    async fn save(&self, settings: CompanySettings) -> Result<CompanySettings> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<CompanySettings> {
                let row: CompanySettingsDB = settings.into();
                let stored = diesel::insert_into(company_settings::table)
                    .values(&row)
                    .on_conflict(company_settings::id)
                    .do_update()
                    .set(&row)
                    .returning(CompanySettingsDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(CompanySettings::from(stored))
            })
            .await
    }
}
