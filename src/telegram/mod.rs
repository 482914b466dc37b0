//! Chat transport: the Telegram Bot API.
//!
//! The bot talks to the transport only through [`ChatTransport`], so the
//! handler can be driven by an in-memory fake in tests.

pub mod client;
pub mod inbound;
pub mod types;

pub use client::TelegramClient;
pub use inbound::{BotCommand, DocumentUpload, Inbound, Incoming, PhotoUpload};

use crate::error::DocBriefError;
use async_trait::async_trait;
use types::Update;

/// What the bot needs from a chat service.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Wait for updates after `offset`.
    async fn poll(&self, offset: Option<i64>) -> Result<Vec<Update>, DocBriefError>;

    /// Send plain text. Long texts may be delivered as several messages.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), DocBriefError>;

    /// Send text with a one-row reply keyboard.
    async fn send_menu(&self, chat_id: i64, text: &str, buttons: &[&str])
        -> Result<(), DocBriefError>;

    /// Download the file behind `file_id`.
    async fn download(&self, file_id: &str) -> Result<Vec<u8>, DocBriefError>;
}
