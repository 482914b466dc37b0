//! In-memory fakes for driving the bot without network or native libraries.

use crate::error::{DocBriefError, LlmError, StoreError};
use crate::pipeline::extract::TextExtractor;
use crate::pipeline::llm::Assistant;
use crate::pipeline::ocr::OcrEngine;
use crate::store::{ConversationStore, MessageHandle, UserProfile};
use crate::telegram::types::{Chat, Message, PhotoSize, Update, User};
use crate::telegram::ChatTransport;
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text { chat_id: i64, text: String },
    Menu {
        chat_id: i64,
        text: String,
        buttons: Vec<String>,
    },
}

impl Sent {
    pub fn text(&self) -> &str {
        match self {
            Sent::Text { text, .. } | Sent::Menu { text, .. } => text,
        }
    }
}

#[derive(Default)]
pub struct FakeTransport {
    pub sent: Mutex<Vec<Sent>>,
    pub files: Mutex<HashMap<String, Vec<u8>>>,
    pub downloads: Mutex<Vec<String>>,
    pub polls: Mutex<VecDeque<Result<Vec<Update>, DocBriefError>>>,
    pub offsets: Mutex<Vec<Option<i64>>>,
    pub drained: Notify,
}

impl FakeTransport {
    pub fn with_file(self, file_id: &str, bytes: Vec<u8>) -> Self {
        self.files.lock().unwrap().insert(file_id.to_string(), bytes);
        self
    }

    pub fn with_poll(self, batch: Result<Vec<Update>, DocBriefError>) -> Self {
        self.polls.lock().unwrap().push_back(batch);
        self
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.text().to_string())
            .collect()
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn poll(&self, offset: Option<i64>) -> Result<Vec<Update>, DocBriefError> {
        self.offsets.lock().unwrap().push(offset);
        let next = self.polls.lock().unwrap().pop_front();
        match next {
            Some(batch) => batch,
            None => {
                self.drained.notify_one();
                std::future::pending().await
            }
        }
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), DocBriefError> {
        self.sent.lock().unwrap().push(Sent::Text {
            chat_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_menu(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[&str],
    ) -> Result<(), DocBriefError> {
        self.sent.lock().unwrap().push(Sent::Menu {
            chat_id,
            text: text.to_string(),
            buttons: buttons.iter().map(|b| b.to_string()).collect(),
        });
        Ok(())
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, DocBriefError> {
        self.downloads.lock().unwrap().push(file_id.to_string());
        self.files
            .lock()
            .unwrap()
            .get(file_id)
            .cloned()
            .ok_or_else(|| DocBriefError::TelegramApi {
                method: "getFile".into(),
                description: "Bad Request: invalid file_id".into(),
            })
    }
}

/// Assistant with canned answers that records every prompt.
pub struct ScriptedAssistant {
    pub reply: Result<String, LlmError>,
    pub calls: Mutex<Vec<(&'static str, String)>>,
}

impl ScriptedAssistant {
    pub fn answering(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: LlmError) -> Self {
        Self {
            reply: Err(err),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Assistant for ScriptedAssistant {
    async fn summarize(&self, text: &str) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(("summarize", text.to_string()));
        self.reply.clone()
    }

    async fn chat(&self, message: &str) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(("chat", message.to_string()));
        self.reply.clone()
    }
}

pub struct FixedOcr(pub &'static str);

impl OcrEngine for FixedOcr {
    fn recognize(&self, _image: &DynamicImage) -> Result<String, DocBriefError> {
        Ok(self.0.to_string())
    }
}

/// PDF extractor with a canned outcome. Records each staged path and
/// whether it existed while extraction ran.
pub struct FakeExtractor {
    pub outcome: Result<String, String>,
    pub seen: Mutex<Vec<(PathBuf, bool)>>,
}

impl FakeExtractor {
    pub fn reading(text: &str) -> Self {
        Self {
            outcome: Ok(text.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn unreadable(detail: &str) -> Self {
        Self {
            outcome: Err(detail.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn staged(&self) -> Vec<(PathBuf, bool)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextExtractor for FakeExtractor {
    async fn extract(&self, pdf_path: &Path) -> Result<String, DocBriefError> {
        self.seen
            .lock()
            .unwrap()
            .push((pdf_path.to_path_buf(), pdf_path.exists()));
        match &self.outcome {
            Ok(text) => Ok(text.clone()),
            Err(detail) => Err(DocBriefError::DocumentOpen {
                path: pdf_path.to_path_buf(),
                detail: detail.clone(),
            }),
        }
    }
}

/// Store whose writes always fail.
pub struct BrokenStore;

#[async_trait]
impl ConversationStore for BrokenStore {
    async fn record_turn(
        &self,
        _profile: &UserProfile,
        _message_text: &str,
    ) -> Result<MessageHandle, StoreError> {
        Err(StoreError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn record_response(
        &self,
        _handle: MessageHandle,
        _response_text: &str,
    ) -> Result<(), StoreError> {
        Err(StoreError::Sqlx(sqlx::Error::PoolTimedOut))
    }
}

pub fn png_bytes() -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

pub fn message() -> Message {
    Message {
        message_id: 1,
        from: Some(User {
            id: 42,
            is_bot: false,
            first_name: "Анна".into(),
            last_name: None,
            username: Some("anna".into()),
        }),
        chat: Chat { id: 42 },
        text: None,
        caption: None,
        document: None,
        photo: None,
    }
}

pub fn text_update(update_id: i64, text: &str) -> Update {
    Update {
        update_id,
        message: Some(Message {
            text: Some(text.into()),
            ..message()
        }),
    }
}

pub fn photo_message(file_id: &str) -> Message {
    Message {
        photo: Some(vec![PhotoSize {
            file_id: file_id.into(),
            width: 8,
            height: 8,
            file_size: None,
        }]),
        ..message()
    }
}
