//! Telegram Bot API HTTP client.

use crate::config::BotConfig;
use crate::error::DocBriefError;
use crate::telegram::types::{
    ApiResponse, File, GetFile, GetUpdates, Message, ReplyKeyboardMarkup, SendMessage, Update,
};
use crate::telegram::ChatTransport;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Longest text a single `sendMessage` accepts.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Slack on top of the long-poll timeout before the HTTP call gives up.
const HTTP_TIMEOUT_SLACK: Duration = Duration::from_secs(15);

/// Client for the Telegram Bot API.
///
/// The bot token is part of every URL, so request errors are stripped of
/// their URL before they leave this module.
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    api_base: String,
    token: String,
    poll_timeout_secs: u64,
}

impl TelegramClient {
    pub fn new(
        api_base: impl Into<String>,
        token: impl Into<String>,
        poll_timeout_secs: u64,
    ) -> Result<Self, DocBriefError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(poll_timeout_secs) + HTTP_TIMEOUT_SLACK)
            .build()
            .map_err(|e| DocBriefError::Http(e.without_url()))?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
            poll_timeout_secs,
        })
    }

    pub fn from_config(config: &BotConfig) -> Result<Self, DocBriefError> {
        Self::new(
            config.telegram_api_base.clone(),
            config.telegram_token.clone(),
            config.poll_timeout_secs,
        )
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.api_base, self.token, file_path)
    }

    async fn call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: &P,
    ) -> Result<R, DocBriefError> {
        debug!("Bot API call: {}", method);

        // The Bot API answers errors with a JSON envelope too, whatever the
        // HTTP status, so the body is always decoded.
        let response: ApiResponse<R> = self
            .http
            .post(self.method_url(method))
            .json(params)
            .send()
            .await
            .map_err(|e| DocBriefError::Http(e.without_url()))?
            .json()
            .await
            .map_err(|e| DocBriefError::Http(e.without_url()))?;

        match (response.ok, response.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(DocBriefError::TelegramApi {
                method: method.to_string(),
                description: response.description.unwrap_or_else(|| match response.error_code {
                    Some(code) => format!("error code {}", code),
                    None => "no result".to_string(),
                }),
            }),
        }
    }

    /// Long-poll for messages after `offset`.
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, DocBriefError> {
        let params = GetUpdates {
            offset,
            timeout: self.poll_timeout_secs,
            allowed_updates: vec!["message"],
        };
        self.call("getUpdates", &params).await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<ReplyKeyboardMarkup>,
    ) -> Result<Message, DocBriefError> {
        let params = SendMessage {
            chat_id,
            text,
            reply_markup,
        };
        self.call("sendMessage", &params).await
    }

    pub async fn get_file(&self, file_id: &str) -> Result<File, DocBriefError> {
        self.call("getFile", &GetFile { file_id }).await
    }

    /// Fetch the bytes behind a `file_path` returned by [`Self::get_file`].
    pub async fn download_file(&self, file_path: &str) -> Result<Vec<u8>, DocBriefError> {
        let response = self
            .http
            .get(self.file_url(file_path))
            .send()
            .await
            .map_err(|e| DocBriefError::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocBriefError::TelegramApi {
                method: "download".to_string(),
                description: format!("HTTP {}", status),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DocBriefError::Http(e.without_url()))?;
        debug!("Downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn poll(&self, offset: Option<i64>) -> Result<Vec<Update>, DocBriefError> {
        self.get_updates(offset).await
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), DocBriefError> {
        for chunk in split_message(text, MAX_MESSAGE_CHARS) {
            self.send_message(chat_id, chunk, None).await?;
        }
        Ok(())
    }

    async fn send_menu(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[&str],
    ) -> Result<(), DocBriefError> {
        self.send_message(chat_id, text, Some(ReplyKeyboardMarkup::single_row(buttons)))
            .await?;
        Ok(())
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, DocBriefError> {
        let file = self.get_file(file_id).await?;
        let path = file.file_path.ok_or_else(|| DocBriefError::TelegramApi {
            method: "getFile".to_string(),
            description: format!("file {} has no download path", file_id),
        })?;
        self.download_file(&path).await
    }
}

/// Split `text` into chunks of at most `max_chars` characters, preferring
/// to break after a newline.
pub fn split_message(text: &str, max_chars: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.chars().count() > max_chars {
        let hard = rest
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let cut = match rest[..hard].rfind('\n') {
            Some(nl) if nl > 0 => nl + 1,
            _ => hard,
        };
        chunks.push(&rest[..cut]);
        rest = &rest[cut..];
    }

    chunks.push(rest);
    chunks
}
