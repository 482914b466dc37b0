//! In-process conversation store.

use super::{
    ConversationStore, MessageHandle, StoredMessage, StoredResponse, StoredUser, UserProfile,
};
use crate::error::StoreError;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Default)]
struct Tables {
    users: Vec<StoredUser>,
    messages: Vec<StoredMessage>,
    responses: Vec<StoredResponse>,
}

/// Conversation store held in memory.
///
/// Ids are assigned sequentially from 1 per table, like `BIGSERIAL`.
/// Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn users(&self) -> Vec<StoredUser> {
        self.tables.lock().await.users.clone()
    }

    pub async fn messages(&self) -> Vec<StoredMessage> {
        self.tables.lock().await.messages.clone()
    }

    pub async fn responses(&self) -> Vec<StoredResponse> {
        self.tables.lock().await.responses.clone()
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn record_turn(
        &self,
        profile: &UserProfile,
        message_text: &str,
    ) -> Result<MessageHandle, StoreError> {
        let mut tables = self.tables.lock().await;

        let user_id = match tables
            .users
            .iter_mut()
            .find(|u| u.telegram_id == profile.telegram_id)
        {
            Some(user) => {
                user.username = profile.username.clone();
                user.first_name = profile.first_name.clone();
                user.last_name = profile.last_name.clone();
                user.id
            }
            None => {
                let id = tables.users.len() as i64 + 1;
                tables.users.push(StoredUser {
                    id,
                    telegram_id: profile.telegram_id,
                    username: profile.username.clone(),
                    first_name: profile.first_name.clone(),
                    last_name: profile.last_name.clone(),
                });
                id
            }
        };

        let message_id = tables.messages.len() as i64 + 1;
        tables.messages.push(StoredMessage {
            id: message_id,
            user_id,
            message_text: message_text.to_string(),
        });

        debug!("Recorded message {} in memory", message_id);
        Ok(MessageHandle(message_id))
    }

    async fn record_response(
        &self,
        handle: MessageHandle,
        response_text: &str,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;

        if !tables.messages.iter().any(|m| m.id == handle.0) {
            return Err(StoreError::UnknownMessage(handle.0));
        }

        let id = tables.responses.len() as i64 + 1;
        tables.responses.push(StoredResponse {
            id,
            user_message_id: handle.0,
            response_text: response_text.to_string(),
        });
        Ok(())
    }
}
