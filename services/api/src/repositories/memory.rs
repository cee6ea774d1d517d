//! In-memory implementation of the stores for development and testing
//!
//! All state lives behind one mutex, so the username uniqueness check and
//! the insert happen atomically. Data is lost when the process exits.

use async_trait::async_trait;
use chrono::Utc;
use common::error::{StoreError, StoreResult};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{ChatLogStore, DocumentStore, UserStore};
use crate::{
    models::{ChatEntry, Document, NewChatEntry, NewDocument, NewUser, User},
    password::hash_password,
};

#[derive(Default)]
struct State {
    users: Vec<User>,
    chats: Vec<ChatEntry>,
    documents: Vec<Document>,
}

/// In-memory store implementing every repository trait
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Creates a new empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, new_user: &NewUser) -> StoreResult<User> {
        debug!(username = %new_user.username, "Creating user in memory");

        let password_hash = hash_password(&new_user.password)?;

        let mut state = self.state();
        if state.users.iter().any(|u| u.username == new_user.username) {
            warn!(username = %new_user.username, "Username already registered");
            return Err(StoreError::DuplicateUsername(new_user.username.clone()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username.clone(),
            password_hash,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .state()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.state().users.iter().find(|u| u.id == id).cloned())
    }

    async fn list(&self, skip: i64, limit: i64) -> StoreResult<Vec<User>> {
        Ok(self
            .state()
            .users
            .iter()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> StoreResult<i64> {
        Ok(self.state().users.len() as i64)
    }
}

#[async_trait]
impl ChatLogStore for MemoryStore {
    async fn append(&self, entry: &NewChatEntry) -> StoreResult<ChatEntry> {
        let chat = ChatEntry {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            content: entry.content.clone(),
            response: entry.response.clone(),
            created_at: Utc::now(),
        };
        self.state().chats.push(chat.clone());

        Ok(chat)
    }

    async fn list_for_user(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<ChatEntry>> {
        Ok(self
            .state()
            .chats
            .iter()
            .rev()
            .filter(|c| c.user_id == user_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, document: &NewDocument) -> StoreResult<Document> {
        let document = Document {
            id: Uuid::new_v4(),
            user_id: document.user_id,
            filename: document.filename.clone(),
            stored_path: document.stored_path.clone(),
            content: document.content.clone(),
            file_type: document.file_type.clone(),
            file_size: document.file_size,
            summary: document.summary.clone(),
            created_at: Utc::now(),
        };
        self.state().documents.push(document.clone());

        Ok(document)
    }

    async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Document>> {
        Ok(self
            .state()
            .documents
            .iter()
            .rev()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::verify_password;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn create_hashes_password_and_finds_user() {
        let store = MemoryStore::new();

        let user = UserStore::create(&store, &new_user("alice")).await.unwrap();
        assert_ne!(user.password_hash, "secret");
        assert!(verify_password("secret", &user.password_hash));
        assert!(user.is_active);

        let found = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(store.find_by_id(user.id).await.unwrap().is_some());
        assert!(store.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_leaves_no_partial_state() {
        let store = MemoryStore::new();
        UserStore::create(&store, &new_user("alice")).await.unwrap();

        let err = UserStore::create(&store, &new_user("alice")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUsername(name) if name == "alice"));
        assert_eq!(UserStore::count(&store).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn list_pages_in_creation_order() {
        let store = MemoryStore::new();
        for name in ["alice", "bob", "carol"] {
            UserStore::create(&store, &new_user(name)).await.unwrap();
        }

        let names: Vec<String> = store
            .list(1, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["bob", "carol"]);
        assert_eq!(store.list(0, 2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn chat_log_is_scoped_per_user_newest_first() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        for (user_id, content) in [(alice, "first"), (bob, "other"), (alice, "second")] {
            store
                .append(&NewChatEntry {
                    user_id,
                    content: content.to_string(),
                    response: Some("ok".to_string()),
                })
                .await
                .unwrap();
        }

        let history = ChatLogStore::list_for_user(&store, alice, 10).await.unwrap();
        let contents: Vec<&str> = history.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["second", "first"]);

        let limited = ChatLogStore::list_for_user(&store, alice, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn documents_are_scoped_per_user() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();

        DocumentStore::create(
            &store,
            &NewDocument {
                user_id: alice,
                filename: "notes.txt".to_string(),
                stored_path: "uploads/notes.txt".to_string(),
                content: "hello".to_string(),
                file_type: "txt".to_string(),
                file_size: 5,
                summary: Some("greeting".to_string()),
            },
        )
        .await
        .unwrap();

        let documents = DocumentStore::list_for_user(&store, alice).await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].summary.as_deref(), Some("greeting"));
        assert!(
            DocumentStore::list_for_user(&store, Uuid::new_v4())
                .await
                .unwrap()
                .is_empty()
        );
    }
}
