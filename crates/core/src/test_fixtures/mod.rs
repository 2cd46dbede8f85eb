//! Shared fakes for service unit tests.

mod memory_store;
mod memory_vendors;

pub use memory_store::MemoryStore;
pub use memory_vendors::MemoryVendors;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};

use crate::audit::{AuditAction, AuditFilter, AuditLog, AuditServiceTrait, NewAuditEntry};
use crate::deletion::DeletionPolicy;
use crate::errors::{Error, Result};
use crate::notifications::{
    NewBroadcast, NewNotification, Notification, NotificationFilter, NotificationList,
    NotificationServiceTrait,
};
use crate::packages::{Package, PackageStatus, PackageType};
use crate::users::{Actor, NewUser, Role, User, UserCredentials, UserRepositoryTrait, UserUpdate};
use crate::utils::{Page, PageRequest};

pub fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

pub fn actor(role: Role) -> Actor {
    Actor {
        user_id: format!("{}-1", role),
        email: format!("{}@amanah.test", role),
        name: format!("Test {}", role),
        role,
    }
}

pub fn package(id: &str, price: Decimal, total_seats: i32, booked_seats: i32) -> Package {
    Package {
        id: id.to_string(),
        code: format!("PKG-{}", id.to_uppercase()),
        name: format!("Umroh {}", id),
        package_type: PackageType::Umroh,
        description: None,
        price_per_person: price,
        total_seats,
        booked_seats,
        departure_date: None,
        return_date: None,
        status: PackageStatus::Open,
        estimated_cost: None,
        actual_cost: Decimal::ZERO,
        hotel_makkah: None,
        hotel_madinah: None,
        airline: None,
        created_at: at(2025, 1, 1),
        updated_at: at(2025, 1, 1),
        created_by_id: None,
    }
}

#[derive(Default)]
pub struct RecordingAudit {
    entries: Arc<Mutex<Vec<NewAuditEntry>>>,
}

impl RecordingAudit {
    pub fn entries(&self) -> Vec<NewAuditEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn actions(&self) -> Vec<(AuditAction, String)> {
        self.entries()
            .into_iter()
            .map(|e| (e.action, e.entity))
            .collect()
    }
}

#[async_trait]
impl AuditServiceTrait for RecordingAudit {
    async fn log(&self, entry: NewAuditEntry) {
        self.entries.lock().unwrap().push(entry);
    }

    fn list(&self, _filter: &AuditFilter, _page: PageRequest) -> Result<Page<AuditLog>> {
        unimplemented!()
    }

    fn history(&self, _entity: &str, _entity_id: &str) -> Result<Vec<AuditLog>> {
        unimplemented!()
    }
}

/// Records broadcasts. With `failing` set every broadcast errors, which
/// callers must tolerate.
#[derive(Default)]
pub struct RecordingNotifications {
    broadcasts: Arc<Mutex<Vec<NewBroadcast>>>,
    pub failing: bool,
}

impl RecordingNotifications {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn broadcasts(&self) -> Vec<NewBroadcast> {
        self.broadcasts.lock().unwrap().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.broadcasts().into_iter().map(|b| b.title).collect()
    }
}

#[async_trait]
impl NotificationServiceTrait for RecordingNotifications {
    fn list_for_user(
        &self,
        _user_id: &str,
        _filter: &NotificationFilter,
        _page: PageRequest,
    ) -> Result<NotificationList> {
        unimplemented!()
    }

    async fn create(&self, _notification: NewNotification) -> Result<Notification> {
        unimplemented!()
    }

    async fn mark_read(&self, _user_id: &str, _notification_id: &str) -> Result<Notification> {
        unimplemented!()
    }

    async fn mark_all_read(&self, _user_id: &str) -> Result<usize> {
        unimplemented!()
    }

    async fn delete(&self, _user_id: &str, _notification_id: &str) -> Result<()> {
        unimplemented!()
    }

    async fn broadcast(&self, broadcast: NewBroadcast) -> Result<Vec<Notification>> {
        if self.failing {
            return Err(Error::Unexpected("notification store offline".to_string()));
        }
        self.broadcasts.lock().unwrap().push(broadcast);
        Ok(Vec::new())
    }
}

/// User accounts held in memory; ids are `u1`, `u2`, ... in insertion order.
#[derive(Default)]
pub struct MemoryUsers {
    users: Mutex<Vec<UserCredentials>>,
}

impl MemoryUsers {
    pub fn with(users: &[(&str, Role, bool)]) -> Self {
        let store = Self::default();
        for (name, role, active) in users {
            let mut guard = store.users.lock().unwrap();
            let id = format!("u{}", guard.len() + 1);
            guard.push(UserCredentials {
                user: User {
                    id,
                    email: format!("{}@amanah.test", name.to_lowercase()),
                    name: name.to_string(),
                    role: *role,
                    is_active: *active,
                    created_at: at(2025, 1, 1),
                    updated_at: at(2025, 1, 1),
                },
                password_hash: "hash".to_string(),
            });
        }
        store
    }

    pub fn password_hash(&self, user_id: &str) -> String {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.user.id == user_id)
            .map(|c| c.password_hash.clone())
            .unwrap()
    }

    fn with_user<T>(&self, user_id: &str, f: impl FnOnce(&mut UserCredentials) -> T) -> Result<T> {
        let mut users = self.users.lock().unwrap();
        users
            .iter_mut()
            .find(|c| c.user.id == user_id)
            .map(f)
            .ok_or_else(|| Error::not_found("User", user_id))
    }
}

#[async_trait]
impl UserRepositoryTrait for MemoryUsers {
    fn list(&self) -> Result<Vec<User>> {
        Ok(self.users.lock().unwrap().iter().map(|c| c.user.clone()).collect())
    }

    fn get_by_id(&self, user_id: &str) -> Result<User> {
        self.with_user(user_id, |c| c.user.clone())
    }

    fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.user.email == email)
            .cloned())
    }

    fn count(&self) -> Result<i64> {
        Ok(self.users.lock().unwrap().len() as i64)
    }

    fn list_active_ids(&self) -> Result<Vec<String>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.user.is_active)
            .map(|c| c.user.id.clone())
            .collect())
    }

    async fn create(&self, new_user: NewUser) -> Result<User> {
        let mut users = self.users.lock().unwrap();
        let user = User {
            id: format!("u{}", users.len() + 1),
            email: new_user.email,
            name: new_user.name,
            role: new_user.role,
            is_active: true,
            created_at: at(2025, 1, 1),
            updated_at: at(2025, 1, 1),
        };
        users.push(UserCredentials {
            user: user.clone(),
            password_hash: new_user.password_hash,
        });
        Ok(user)
    }

    async fn update(&self, user_id: String, update: UserUpdate) -> Result<User> {
        self.with_user(&user_id, |c| {
            if let Some(name) = update.name {
                c.user.name = name;
            }
            if let Some(role) = update.role {
                c.user.role = role;
            }
            if let Some(active) = update.is_active {
                c.user.is_active = active;
            }
            c.user.clone()
        })
    }

    async fn set_password(&self, user_id: String, password_hash: String) -> Result<()> {
        self.with_user(&user_id, |c| c.password_hash = password_hash)
    }

    async fn remove(&self, user_id: String, policy: DeletionPolicy) -> Result<User> {
        let user = self.with_user(&user_id, |c| {
            c.user.is_active = false;
            c.user.clone()
        })?;
        if policy == DeletionPolicy::Hard {
            self.users.lock().unwrap().retain(|c| c.user.id != user_id);
        }
        Ok(user)
    }
}
