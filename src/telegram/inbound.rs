//! Classification of incoming Telegram messages.
//!
//! Every message the bot reacts to becomes exactly one [`Inbound`] variant;
//! anything else (stickers, voice, service messages) yields `None` and is
//! ignored.

use crate::store::UserProfile;
use crate::telegram::types::{Message, PhotoSize, User};

/// Commands the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Help,
    Info,
}

impl BotCommand {
    /// Parse a `/command` or `/command@botname` token. Case-sensitive like
    /// Telegram's own command matching.
    fn parse(text: &str) -> Option<Self> {
        let token = text.split_whitespace().next()?.strip_prefix('/')?;
        let name = token.split('@').next().unwrap_or(token);
        match name {
            "start" => Some(BotCommand::Start),
            "help" => Some(BotCommand::Help),
            "info" => Some(BotCommand::Info),
            _ => None,
        }
    }

    /// Keyboard buttons arrive as plain text.
    fn from_button(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "инфо" => Some(BotCommand::Info),
            "помощь" => Some(BotCommand::Help),
            _ => None,
        }
    }
}

/// An uploaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub file_id: String,
    /// Empty when Telegram reports no name.
    pub file_name: String,
    pub caption: Option<String>,
}

/// An uploaded photo, reduced to its largest available size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub file_id: String,
    pub caption: Option<String>,
}

/// The closed set of things a user can send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Command(BotCommand),
    Document(DocumentUpload),
    Photo(PhotoUpload),
    Text(String),
}

impl Inbound {
    /// Classify a message. Documents win over photos, photos over text.
    pub fn from_message(message: &Message) -> Option<Self> {
        if let Some(document) = &message.document {
            return Some(Inbound::Document(DocumentUpload {
                file_id: document.file_id.clone(),
                file_name: document.file_name.clone().unwrap_or_default(),
                caption: message.caption.clone(),
            }));
        }

        if let Some(photo) = message.photo.as_deref().and_then(largest_photo) {
            return Some(Inbound::Photo(PhotoUpload {
                file_id: photo.file_id.clone(),
                caption: message.caption.clone(),
            }));
        }

        let text = message.text.as_deref()?;
        let command = if text.starts_with('/') {
            BotCommand::parse(text)
        } else {
            BotCommand::from_button(text)
        };

        Some(match command {
            Some(command) => Inbound::Command(command),
            None => Inbound::Text(text.to_string()),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Inbound::Command(_) => "command",
            Inbound::Document(_) => "document",
            Inbound::Photo(_) => "photo",
            Inbound::Text(_) => "text",
        }
    }
}

/// Largest photo by pixel area; the last entry wins ties, matching the
/// order Telegram sends sizes in.
pub fn largest_photo(sizes: &[PhotoSize]) -> Option<&PhotoSize> {
    sizes
        .iter()
        .max_by_key(|p| u64::from(p.width) * u64::from(p.height))
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            telegram_id: user.id,
            username: user.username.clone(),
            first_name: Some(user.first_name.clone()),
            last_name: user.last_name.clone(),
        }
    }
}

/// A classified message with the routing data the handler needs.
#[derive(Debug, Clone)]
pub struct Incoming {
    pub chat_id: i64,
    pub sender: Option<UserProfile>,
    pub inbound: Inbound,
}

impl Incoming {
    pub fn from_message(message: &Message) -> Option<Self> {
        Some(Self {
            chat_id: message.chat.id,
            sender: message.from.as_ref().map(UserProfile::from),
            inbound: Inbound::from_message(message)?,
        })
    }
}
