//! In-memory repositories for testing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use vieux_carre_auth::db::{BagRepository, RepositoryError, UserRepository};
use vieux_carre_auth::models::{Bag, NewUser, UserRecord};
use vieux_carre_core::{BagId, Email, UserId, UserRole};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// In-memory user repository.
#[derive(Default, Clone)]
pub struct MockUserRepository {
    users: Arc<Mutex<HashMap<UserId, UserRecord>>>,
    name_updates: Arc<Mutex<Vec<(UserId, String)>>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user directly.
    pub fn insert_user(
        &self,
        name: &str,
        email: Email,
        password_hash: Option<String>,
        role: UserRole,
    ) -> UserRecord {
        let now = Utc::now();
        let user = UserRecord {
            id: UserId::generate(),
            name: name.to_string(),
            email,
            password_hash,
            role,
            image: None,
            created_at: now,
            updated_at: now,
        };
        lock(&self.users).insert(user.id, user.clone());
        user
    }

    pub fn get(&self, id: UserId) -> Option<UserRecord> {
        lock(&self.users).get(&id).cloned()
    }

    pub fn remove(&self, id: UserId) {
        lock(&self.users).remove(&id);
    }

    pub fn set_role(&self, id: UserId, role: UserRole) {
        if let Some(user) = lock(&self.users).get_mut(&id) {
            user.role = role;
        }
    }

    pub fn count(&self) -> usize {
        lock(&self.users).len()
    }

    /// Every `update_name` call, in order.
    pub fn name_updates(&self) -> Vec<(UserId, String)> {
        lock(&self.name_updates).clone()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_email(&self, email: &Email) -> Result<Option<UserRecord>, RepositoryError> {
        Ok(lock(&self.users)
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, RepositoryError> {
        Ok(self.get(id))
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, RepositoryError> {
        let mut users = lock(&self.users);
        if users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict("email".to_string()));
        }
        let now = Utc::now();
        let record = UserRecord {
            id: UserId::generate(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            image: user.image,
            created_at: now,
            updated_at: now,
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_name(&self, id: UserId, name: &str) -> Result<(), RepositoryError> {
        let mut users = lock(&self.users);
        let user = users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        user.name = name.to_string();
        user.updated_at = Utc::now();
        lock(&self.name_updates).push((id, name.to_string()));
        Ok(())
    }
}

/// In-memory bag repository.
#[derive(Default, Clone)]
pub struct MockBagRepository {
    bags: Arc<Mutex<HashMap<BagId, Bag>>>,
}

impl MockBagRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a bag directly.
    pub fn insert_bag(&self, owner: Option<UserId>) -> Bag {
        let now = Utc::now();
        let bag = Bag {
            id: BagId::generate(),
            user_id: owner,
            created_at: now,
            updated_at: now,
        };
        lock(&self.bags).insert(bag.id, bag.clone());
        bag
    }

    pub fn get(&self, id: BagId) -> Option<Bag> {
        lock(&self.bags).get(&id).cloned()
    }

    /// Bags owned by `user_id`.
    pub fn bags_for_user(&self, user_id: UserId) -> Vec<Bag> {
        lock(&self.bags)
            .values()
            .filter(|b| b.user_id == Some(user_id))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl BagRepository for MockBagRepository {
    async fn find_by_id(&self, id: BagId) -> Result<Option<Bag>, RepositoryError> {
        Ok(self.get(id))
    }

    async fn claim(&self, id: BagId, user_id: UserId) -> Result<bool, RepositoryError> {
        let mut bags = lock(&self.bags);
        if !bags.get(&id).is_some_and(Bag::is_guest) {
            return Ok(false);
        }
        bags.retain(|bag_id, bag| *bag_id == id || bag.user_id != Some(user_id));
        if let Some(bag) = bags.get_mut(&id) {
            bag.user_id = Some(user_id);
            bag.updated_at = Utc::now();
        }
        Ok(true)
    }
}
