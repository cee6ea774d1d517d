//! Application state shared across handlers

use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    config::AppConfig,
    jwt::JwtService,
    providers::{ChatProvider, ImageClassifier},
    repositories::{
        ChatLogStore, ChatRepository, DocumentRepository, DocumentStore, MemoryStore,
        UserRepository, UserStore,
    },
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt_service: JwtService,
    pub user_store: Arc<dyn UserStore>,
    pub chat_log: Arc<dyn ChatLogStore>,
    pub documents: Arc<dyn DocumentStore>,
    pub chat_provider: Option<Arc<dyn ChatProvider>>,
    pub classifier: Option<Arc<dyn ImageClassifier>>,
    /// Present when running on PostgreSQL, used by the status endpoint
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// State backed by PostgreSQL repositories
    pub fn postgres(config: AppConfig, jwt_service: JwtService, pool: PgPool) -> Self {
        Self {
            config: Arc::new(config),
            jwt_service,
            user_store: Arc::new(UserRepository::new(pool.clone())),
            chat_log: Arc::new(ChatRepository::new(pool.clone())),
            documents: Arc::new(DocumentRepository::new(pool.clone())),
            chat_provider: None,
            classifier: None,
            db_pool: Some(pool),
        }
    }

    /// State backed by a single in-memory store
    pub fn in_memory(config: AppConfig, jwt_service: JwtService) -> Self {
        let store = Arc::new(MemoryStore::new());

        Self {
            config: Arc::new(config),
            jwt_service,
            user_store: store.clone(),
            chat_log: store.clone(),
            documents: store,
            chat_provider: None,
            classifier: None,
            db_pool: None,
        }
    }

    /// Enable the chat and summarization endpoints
    pub fn with_chat_provider(mut self, provider: Arc<dyn ChatProvider>) -> Self {
        self.chat_provider = Some(provider);
        self
    }

    /// Enable the prediction endpoint
    pub fn with_classifier(mut self, classifier: Arc<dyn ImageClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }
}
