use std::sync::Mutex;

use async_trait::async_trait;

use crate::db::models::{Entity, User};
use crate::db::repository::{Repository, UserRepository};
use crate::error::AppError;

/// Process-local repository. Used by tests and by `--in-memory` runs.
pub struct InMemoryRepository<T> {
    records: Mutex<Vec<T>>,
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn with_records(records: Vec<T>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<T>>, AppError> {
        self.records
            .lock()
            .map_err(|_| AppError::Database("in-memory store poisoned".into()))
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    async fn insert(&self, entity: T) -> Result<T, AppError> {
        let mut records = self.lock()?;
        if records.iter().any(|r| r.id() == entity.id()) {
            return Err(AppError::Database(format!(
                "duplicate key '{}' in {}",
                entity.id(),
                T::COLLECTION
            )));
        }
        records.push(entity.clone());
        Ok(entity)
    }

    async fn find_all(&self) -> Result<Vec<T>, AppError> {
        Ok(self.lock()?.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<T>, AppError> {
        Ok(self.lock()?.iter().find(|r| r.id() == id).cloned())
    }

    async fn replace(&self, entity: &T) -> Result<bool, AppError> {
        let mut records = self.lock()?;
        match records.iter_mut().find(|r| r.id() == entity.id()) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let mut records = self.lock()?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        Ok(records.len() < before)
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository<User> {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.lock()?.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: User) -> Result<User, AppError> {
        if self.find_by_email(&user.email).await?.is_some() {
            return Err(AppError::Conflict(
                "User already exists with the same email".into(),
            ));
        }
        self.insert(user).await
    }
}
