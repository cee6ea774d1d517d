//! Repositories for the credential store and the per-user content logs
//!
//! Each store is a trait so handlers can run against PostgreSQL in
//! production and against [`memory::MemoryStore`] in development and tests.

use async_trait::async_trait;
use common::error::StoreResult;
use uuid::Uuid;

use crate::models::{ChatEntry, Document, NewChatEntry, NewDocument, NewUser, User};

pub mod content;
pub mod memory;
pub mod user;

pub use content::{ChatRepository, DocumentRepository};
pub use memory::MemoryStore;
pub use user::UserRepository;

/// Credential store
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user, hashing the password; fails with `DuplicateUsername` on conflict
    async fn create(&self, new_user: &NewUser) -> StoreResult<User>;

    /// Find a user by username
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// List users in creation order
    async fn list(&self, skip: i64, limit: i64) -> StoreResult<Vec<User>>;

    /// Count all users
    async fn count(&self) -> StoreResult<i64>;
}

/// Append-only chat log, scoped per user
#[async_trait]
pub trait ChatLogStore: Send + Sync {
    /// Append an exchange to the user's log
    async fn append(&self, entry: &NewChatEntry) -> StoreResult<ChatEntry>;

    /// Most recent entries for a user, newest first
    async fn list_for_user(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<ChatEntry>>;
}

/// Append-only document records, scoped per user
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Record an uploaded document
    async fn create(&self, document: &NewDocument) -> StoreResult<Document>;

    /// Documents uploaded by a user, newest first
    async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Document>>;
}
