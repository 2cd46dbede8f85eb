use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use super::users_model::{Actor, NewUser, Role, User, UserCredentials, UserUpdate};
use super::users_traits::{UserRepositoryTrait, UserServiceTrait};
use crate::audit::{AuditAction, AuditServiceTrait, NewAuditEntry};
use crate::deletion::USER_DELETION;
use crate::errors::{Error, Result, ValidationError};

const ENTITY: &str = "user";

pub struct UserService {
    repository: Arc<dyn UserRepositoryTrait>,
    audit: Arc<dyn AuditServiceTrait>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepositoryTrait>, audit: Arc<dyn AuditServiceTrait>) -> Self {
        Self { repository, audit }
    }

    fn ensure_email_free(&self, email: &str) -> Result<()> {
        if self.repository.find_credentials(email)?.is_some() {
            return Err(Error::ConstraintViolation(format!(
                "Email \"{}\" sudah digunakan",
                email
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl UserServiceTrait for UserService {
    fn list_users(&self) -> Result<Vec<User>> {
        self.repository.list()
    }

    fn get_user(&self, user_id: &str) -> Result<User> {
        self.repository.get_by_id(user_id)
    }

    fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>> {
        self.repository
            .find_credentials(&email.trim().to_lowercase())
    }

    async fn create_user(&self, actor: &Actor, new_user: NewUser) -> Result<User> {
        new_user.validate()?;
        let email = new_user.normalized_email();
        self.ensure_email_free(&email)?;

        let created = self
            .repository
            .create(NewUser {
                email,
                name: new_user.name.trim().to_string(),
                ..new_user
            })
            .await?;
        self.audit
            .log(
                NewAuditEntry::new(actor, AuditAction::Create, ENTITY)
                    .entity_id(&created.id)
                    .entity_name(&created.email)
                    .new_values(&created),
            )
            .await;
        Ok(created)
    }

    async fn update_user(&self, actor: &Actor, user_id: &str, update: UserUpdate) -> Result<User> {
        if actor.user_id == user_id && update.is_active == Some(false) {
            return Err(Error::Forbidden("you cannot deactivate your own account".to_string()));
        }
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(ValidationError::MissingField("name".to_string()).into());
            }
        }
        let existing = self.repository.get_by_id(user_id)?;
        let updated = self
            .repository
            .update(user_id.to_string(), update)
            .await?;
        self.audit
            .log(
                NewAuditEntry::new(actor, AuditAction::Update, ENTITY)
                    .entity_id(&updated.id)
                    .entity_name(&updated.email)
                    .old_values(&existing)
                    .new_values(&updated),
            )
            .await;
        Ok(updated)
    }

    async fn change_password(
        &self,
        actor: &Actor,
        user_id: &str,
        password_hash: String,
    ) -> Result<()> {
        if actor.user_id != user_id && actor.role != Role::Owner {
            return Err(Error::Forbidden(
                "only the owner can change another user's password".to_string(),
            ));
        }
        let user = self.repository.get_by_id(user_id)?;
        self.repository
            .set_password(user_id.to_string(), password_hash)
            .await?;
        self.audit
            .log(
                NewAuditEntry::new(actor, AuditAction::Update, ENTITY)
                    .entity_id(&user.id)
                    .entity_name(format!("Password: {}", user.email)),
            )
            .await;
        Ok(())
    }

    async fn deactivate_user(&self, actor: &Actor, user_id: &str) -> Result<User> {
        if actor.user_id == user_id {
            return Err(Error::Forbidden("you cannot deactivate your own account".to_string()));
        }
        let existing = self.repository.get_by_id(user_id)?;
        let removed = self
            .repository
            .remove(user_id.to_string(), USER_DELETION)
            .await?;
        self.audit
            .log(
                NewAuditEntry::new(actor, AuditAction::Delete, ENTITY)
                    .entity_id(&existing.id)
                    .entity_name(&existing.email)
                    .old_values(&existing)
                    .new_values(&removed),
            )
            .await;
        Ok(removed)
    }

    async fn bootstrap_owner(
        &self,
        email: &str,
        name: &str,
        password_hash: String,
    ) -> Result<Option<User>> {
        if self.repository.count()? > 0 {
            return Ok(None);
        }
        let new_user = NewUser {
            email: email.to_string(),
            name: name.to_string(),
            role: Role::Owner,
            password_hash,
        };
        new_user.validate()?;
        let created = self
            .repository
            .create(NewUser {
                email: new_user.normalized_email(),
                ..new_user
            })
            .await?;
        info!("Created initial owner account {}", created.email);
        self.audit
            .log(
                NewAuditEntry::new(&Actor::system(), AuditAction::Create, ENTITY)
                    .entity_id(&created.id)
                    .entity_name(&created.email),
            )
            .await;
        Ok(Some(created))
    }
}
