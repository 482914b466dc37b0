//! PostgreSQL conversation store.

use super::{
    ConversationStore, MessageHandle, StoredMessage, StoredResponse, StoredUser, UserProfile,
};
use crate::config::DatabaseConfig;
use crate::error::StoreError;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info};

/// Conversation store backed by a PostgreSQL pool.
///
/// Every operation checks a connection out of the pool, runs in its own
/// transaction and commits before returning.
#[derive(Debug, Clone)]
pub struct PgConversationStore {
    pool: PgPool,
}

impl PgConversationStore {
    /// Connect using resolved database settings.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(config.connect_options())
            .await?;

        info!(
            "Connected to database {}@{}:{}/{} (pool size: {})",
            config.user, config.host, config.port, config.name, config.max_connections
        );

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Look up a user by their Telegram identity.
    pub async fn user(&self, telegram_id: i64) -> Result<Option<StoredUser>, StoreError> {
        let user = sqlx::query_as::<_, StoredUser>(
            r#"
            SELECT id, telegram_id, username, first_name, last_name
            FROM users
            WHERE telegram_id = $1
            "#,
        )
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Messages sent by a user, oldest first.
    pub async fn messages(&self, telegram_id: i64) -> Result<Vec<StoredMessage>, StoreError> {
        let messages = sqlx::query_as::<_, StoredMessage>(
            r#"
            SELECT m.id, m.user_id, m.message_text
            FROM user_messages m
            JOIN users u ON u.id = m.user_id
            WHERE u.telegram_id = $1
            ORDER BY m.id
            "#,
        )
        .bind(telegram_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    /// Replies attached to one user message.
    pub async fn responses(&self, handle: MessageHandle) -> Result<Vec<StoredResponse>, StoreError> {
        let responses = sqlx::query_as::<_, StoredResponse>(
            r#"
            SELECT id, user_message_id, response_text
            FROM bot_responses
            WHERE user_message_id = $1
            ORDER BY id
            "#,
        )
        .bind(handle.0)
        .fetch_all(&self.pool)
        .await?;

        Ok(responses)
    }
}

#[async_trait]
impl ConversationStore for PgConversationStore {
    async fn record_turn(
        &self,
        profile: &UserProfile,
        message_text: &str,
    ) -> Result<MessageHandle, StoreError> {
        let mut tx = self.pool.begin().await?;

        let user_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (telegram_id, username, first_name, last_name)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (telegram_id) DO UPDATE SET
                username = EXCLUDED.username,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name
            RETURNING id
            "#,
        )
        .bind(profile.telegram_id)
        .bind(&profile.username)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .fetch_one(&mut *tx)
        .await?;

        let message_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO user_messages (user_id, message_text)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(message_text)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(
            "Recorded message {} for telegram user {}",
            message_id, profile.telegram_id
        );
        Ok(MessageHandle(message_id))
    }

    async fn record_response(
        &self,
        handle: MessageHandle,
        response_text: &str,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO bot_responses (user_message_id, response_text)
            VALUES ($1, $2)
            "#,
        )
        .bind(handle.0)
        .bind(response_text)
        .execute(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                StoreError::UnknownMessage(handle.0)
            }
            _ => StoreError::Sqlx(e),
        })?;

        tx.commit().await?;

        debug!("Recorded response for message {}", handle.0);
        Ok(())
    }
}
