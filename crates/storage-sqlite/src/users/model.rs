//! Database model for users.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::utils::parse_text;
use amanah_core::users::{Role, User, UserCredentials};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserDB {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<UserDB> for User {
    fn from(db: UserDB) -> Self {
        Self {
            role: parse_text(&db.role, Role::User, "role"),
            id: db.id,
            email: db.email,
            name: db.name,
            is_active: db.is_active,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<UserDB> for UserCredentials {
    fn from(mut db: UserDB) -> Self {
        let password_hash = std::mem::take(&mut db.password_hash);
        Self {
            user: User::from(db),
            password_hash,
        }
    }
}
