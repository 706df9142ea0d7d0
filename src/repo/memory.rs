use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::sleep;

use crate::domain::{NewUser, StoreError, User, UserStore};

/// In-memory user store with injectable read latency.
///
/// The slow-read path sleeps `latency_class * latency_unit` before touching
/// the map, mimicking a backend that takes a caller-specified time per query.
/// The sleep happens outside the lock so one slow read never blocks siblings.
pub struct MemoryStore {
    users: RwLock<HashMap<u64, User>>,
    next_id: AtomicU64,
    latency_unit: Duration,
}

impl MemoryStore {
    pub fn new(latency_unit: Duration) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            latency_unit,
        }
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let user = User {
            id,
            name: user.name,
            email: user.email,
            created_at: Utc::now(),
        };
        self.users.write().await.insert(id, user.clone());
        Ok(user)
    }

    async fn find(&self, id: u64) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn update(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        match users.get_mut(&user.id) {
            Some(existing) => {
                existing.name = user.name;
                existing.email = user.email;
                Ok(existing.clone())
            }
            None => Err(StoreError::NotFound(user.id)),
        }
    }

    async fn delete(&self, id: u64) -> Result<(), StoreError> {
        match self.users.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn find_one_slowly(&self, latency_class: u32, id: u64) -> Result<User, StoreError> {
        sleep(self.latency_unit * latency_class).await;
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }
}
