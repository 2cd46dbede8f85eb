use amanah_core::deletion::DeletionPolicy;
use amanah_core::errors::Result;
use amanah_core::users::{NewUser, User, UserCredentials, UserRepositoryTrait, UserUpdate};
use amanah_core::utils::time_utils::now_utc;
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use super::model::UserDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{not_found_as, StorageError};
use crate::schema::users;

pub struct UserRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl UserRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        UserRepository { pool, writer }
    }
}

fn load_user(conn: &mut SqliteConnection, user_id: &str) -> Result<UserDB> {
    users::table
        .find(user_id)
        .select(UserDB::as_select())
        .first::<UserDB>(conn)
        .map_err(not_found_as("User", user_id))
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    fn list(&self) -> Result<Vec<User>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = users::table
            .order(users::name.asc())
            .select(UserDB::as_select())
            .load::<UserDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    fn get_by_id(&self, user_id: &str) -> Result<User> {
        let mut conn = get_connection(&self.pool)?;
        load_user(&mut conn, user_id).map(User::from)
    }

    fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>> {
        let mut conn = get_connection(&self.pool)?;
        let row = users::table
            .filter(users::email.eq(email.trim().to_lowercase()))
            .select(UserDB::as_select())
            .first::<UserDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(UserCredentials::from))
    }

    fn count(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        Ok(users::table
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?)
    }

    fn list_active_ids(&self) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(users::table
            .filter(users::is_active.eq(true))
            .select(users::id)
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?)
    }

    async fn create(&self, new_user: NewUser) -> Result<User> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<User> {
                let now = now_utc();
                let row = UserDB {
                    id: Uuid::new_v4().to_string(),
                    email: new_user.normalized_email(),
                    name: new_user.name.trim().to_string(),
                    password_hash: new_user.password_hash,
                    role: new_user.role.as_str().to_string(),
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                };
                let stored = diesel::insert_into(users::table)
                    .values(&row)
                    .returning(UserDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                debug!("Created user {}", stored.email);
                Ok(User::from(stored))
            })
            .await
    }

    async fn update(&self, user_id: String, update: UserUpdate) -> Result<User> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<User> {
                let current = load_user(conn, &user_id)?;
                let name = update
                    .name
                    .map(|n| n.trim().to_string())
                    .unwrap_or(current.name);
                let role = update
                    .role
                    .map(|r| r.as_str().to_string())
                    .unwrap_or(current.role);
                let is_active = update.is_active.unwrap_or(current.is_active);
                let stored = diesel::update(users::table.find(&user_id))
                    .set((
                        users::name.eq(name),
                        users::role.eq(role),
                        users::is_active.eq(is_active),
                        users::updated_at.eq(now_utc()),
                    ))
                    .returning(UserDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(User::from(stored))
            })
            .await
    }

    async fn set_password(&self, user_id: String, password_hash: String) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                load_user(conn, &user_id)?;
                diesel::update(users::table.find(&user_id))
                    .set((
                        users::password_hash.eq(password_hash),
                        users::updated_at.eq(now_utc()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn remove(&self, user_id: String, policy: DeletionPolicy) -> Result<User> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<User> {
                let current = User::from(load_user(conn, &user_id)?);
                match policy {
                    DeletionPolicy::SoftFlag => {
                        let stored = diesel::update(users::table.find(&user_id))
                            .set((users::is_active.eq(false), users::updated_at.eq(now_utc())))
                            .returning(UserDB::as_returning())
                            .get_result(conn)
                            .map_err(StorageError::from)?;
                        Ok(User::from(stored))
                    }
                    DeletionPolicy::Hard => {
                        diesel::delete(users::table.find(&user_id))
                            .execute(conn)
                            .map_err(StorageError::from)?;
                        Ok(current)
                    }
                }
            })
            .await
    }
}
