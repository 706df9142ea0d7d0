use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage-level errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user {0} not found")]
    NotFound(u64),
    #[error("backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A user as submitted for creation; the store assigns id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

/// Storage collaborator for users.
///
/// Implementations must be safe for unbounded concurrent invocation; the
/// harness fans out thousands of calls without serializing access.
/// `find_one_slowly` takes an artificial latency class (a delay multiplier)
/// as a first-class input, standing in for a deliberately slow backend query.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;
    async fn find(&self, id: u64) -> Result<Option<User>, StoreError>;
    async fn update(&self, user: User) -> Result<User, StoreError>;
    async fn delete(&self, id: u64) -> Result<(), StoreError>;
    async fn find_all(&self) -> Result<Vec<User>, StoreError>;
    async fn find_one_slowly(&self, latency_class: u32, id: u64) -> Result<User, StoreError>;
}
