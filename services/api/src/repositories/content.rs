//! PostgreSQL repositories for chat history and uploaded documents

use async_trait::async_trait;
use common::error::{DatabaseError, StoreResult};
use sqlx::PgPool;
use uuid::Uuid;

use super::{ChatLogStore, DocumentStore};
use crate::models::{ChatEntry, Document, NewChatEntry, NewDocument};

/// Chat history repository
#[derive(Clone)]
pub struct ChatRepository {
    pool: PgPool,
}

impl ChatRepository {
    /// Create a new chat history repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatLogStore for ChatRepository {
    async fn append(&self, entry: &NewChatEntry) -> StoreResult<ChatEntry> {
        let chat = sqlx::query_as::<_, ChatEntry>(
            r#"
            INSERT INTO chat_history (id, user_id, content, response)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, content, response, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.user_id)
        .bind(&entry.content)
        .bind(&entry.response)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(chat)
    }

    async fn list_for_user(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<ChatEntry>> {
        let entries = sqlx::query_as::<_, ChatEntry>(
            r#"
            SELECT id, user_id, content, response, created_at
            FROM chat_history
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(entries)
    }
}

/// Document repository
#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    /// Create a new document repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for DocumentRepository {
    async fn create(&self, document: &NewDocument) -> StoreResult<Document> {
        let document = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents
                (id, user_id, filename, stored_path, content, file_type, file_size, summary)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, filename, stored_path, content, file_type, file_size,
                      summary, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(document.user_id)
        .bind(&document.filename)
        .bind(&document.stored_path)
        .bind(&document.content)
        .bind(&document.file_type)
        .bind(document.file_size)
        .bind(&document.summary)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(document)
    }

    async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Document>> {
        let documents = sqlx::query_as::<_, Document>(
            r#"
            SELECT id, user_id, filename, stored_path, content, file_type, file_size,
                   summary, created_at
            FROM documents
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(documents)
    }
}
