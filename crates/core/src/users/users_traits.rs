use async_trait::async_trait;

use super::users_model::{Actor, NewUser, User, UserCredentials, UserUpdate};
use crate::deletion::DeletionPolicy;
use crate::errors::Result;

/// Persistence of user accounts.
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    fn list(&self) -> Result<Vec<User>>;

    fn get_by_id(&self, user_id: &str) -> Result<User>;

    /// Looks up a user and password hash by (lowercased) email.
    fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>>;

    fn count(&self) -> Result<i64>;

    /// Ids of every active user, the audience of broadcasts.
    fn list_active_ids(&self) -> Result<Vec<String>>;

    async fn create(&self, new_user: NewUser) -> Result<User>;

    async fn update(&self, user_id: String, update: UserUpdate) -> Result<User>;

    async fn set_password(&self, user_id: String, password_hash: String) -> Result<()>;

    /// Removes the user as `policy` says and returns the last known row:
    /// `SoftFlag` clears `is_active`, `Hard` deletes it.
    async fn remove(&self, user_id: String, policy: DeletionPolicy) -> Result<User>;
}

/// User management operations.
#[async_trait]
pub trait UserServiceTrait: Send + Sync {
    fn list_users(&self) -> Result<Vec<User>>;

    fn get_user(&self, user_id: &str) -> Result<User>;

    fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>>;

    async fn create_user(&self, actor: &Actor, new_user: NewUser) -> Result<User>;

    async fn update_user(&self, actor: &Actor, user_id: &str, update: UserUpdate) -> Result<User>;

    async fn change_password(&self, actor: &Actor, user_id: &str, password_hash: String)
        -> Result<()>;

    async fn deactivate_user(&self, actor: &Actor, user_id: &str) -> Result<User>;

    /// Creates the first owner when no user exists yet. Returns `None` when
    /// users are already present.
    async fn bootstrap_owner(
        &self,
        email: &str,
        name: &str,
        password_hash: String,
    ) -> Result<Option<User>>;
}
