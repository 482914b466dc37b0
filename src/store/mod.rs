//! Conversation persistence.
//!
//! A turn is recorded in two steps: [`ConversationStore::record_turn`]
//! upserts the sender and appends their message, then
//! [`ConversationStore::record_response`] appends the reply linked to that
//! message. Each step commits on its own; nothing spans the pair.
//!
//! Two implementations share these semantics:
//!
//! * [`PgConversationStore`] for PostgreSQL.
//! * [`InMemoryStore`] when no database is configured, and in tests.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgConversationStore;

use crate::error::StoreError;
use async_trait::async_trait;
use serde::Serialize;

/// Identity and profile fields of a message sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Handle of a recorded user message, used to attach the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MessageHandle(pub i64);

/// A stored user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct StoredUser {
    pub id: i64,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// A stored user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct StoredMessage {
    pub id: i64,
    pub user_id: i64,
    pub message_text: String,
}

/// A stored bot response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct StoredResponse {
    pub id: i64,
    pub user_message_id: i64,
    pub response_text: String,
}

/// Records conversation turns.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Upsert the sender by `telegram_id` and append `message_text`.
    async fn record_turn(
        &self,
        profile: &UserProfile,
        message_text: &str,
    ) -> Result<MessageHandle, StoreError>;

    /// Append the reply to the message behind `handle`.
    async fn record_response(
        &self,
        handle: MessageHandle,
        response_text: &str,
    ) -> Result<(), StoreError>;
}
