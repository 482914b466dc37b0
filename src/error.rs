//! Error types for the docbrief library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`DocBriefError`]: the update cannot be served: bad upload, unreadable
//!   PDF, OCR engine missing, Telegram API refusal. The bot reports it to the
//!   user as an advisory or a generic error message and moves on.
//!
//! * [`LlmError`]: the LLM endpoint failed or answered in an unexpected
//!   shape. Never propagated to the receive loop: its `Display` form is the
//!   text the user receives instead of a summary.
//!
//! * [`StoreError`]: persistence failed. Raised after the user already got
//!   their reply, so it only ever costs us the conversation record.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the processing of a single update.
#[derive(Debug, Error)]
pub enum DocBriefError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The uploaded document is not a PDF (by file name or magic bytes).
    #[error("'{file_name}' is not a PDF document")]
    NotAPdf { file_name: String },

    /// The file is not a valid document container and cannot be opened.
    #[error("Cannot open document '{path}': {detail}")]
    DocumentOpen { path: PathBuf, detail: String },

    /// The PDF is encrypted; the bot has no way to ask for a password.
    #[error("PDF '{path}' is encrypted and requires a password")]
    PasswordRequired { path: PathBuf },

    /// The uploaded photo could not be decoded as an image.
    #[error("Image could not be decoded: {detail}")]
    UnrecognizableImage { detail: String },

    // ── PDF / OCR errors ──────────────────────────────────────────────────
    /// pdfium returned an error while reading or rendering a page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfiumBindingFailed(String),

    /// The OCR executable could not be started.
    #[error("OCR engine '{command}' is unavailable: {detail}\nIs Tesseract installed?")]
    OcrUnavailable { command: String, detail: String },

    /// The OCR engine ran but reported a failure.
    #[error("OCR failed: {detail}")]
    OcrFailed { detail: String },

    // ── Transport errors ──────────────────────────────────────────────────
    /// HTTP request to the Telegram Bot API failed.
    #[error("Telegram HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Bot API answered `ok: false`.
    #[error("Telegram API call '{method}' failed: {description}")]
    TelegramApi { method: String, description: String },

    // ── Persistence ───────────────────────────────────────────────────────
    #[error(transparent)]
    Store(#[from] StoreError),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write a scratch file.
    #[error("Temporary file error: {source}")]
    TempFile {
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocBriefError {
    /// True for problems with what the user sent rather than with the bot.
    ///
    /// Input errors get a plain advisory reply; everything else is reported
    /// as a generic error carrying the detail.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DocBriefError::NotAPdf { .. }
                | DocBriefError::DocumentOpen { .. }
                | DocBriefError::PasswordRequired { .. }
                | DocBriefError::UnrecognizableImage { .. }
        )
    }
}

/// A failed LLM call.
///
/// The display text is what the user sees in place of the reply, so every
/// variant starts with the same prefix and carries the raw detail.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LlmError {
    /// Connection failure, timeout, or the body could not be read.
    #[error("Ошибка LLM: {0}")]
    Transport(String),

    /// The endpoint answered with something that is not JSON.
    #[error("Ошибка LLM: {detail} (body: {body})")]
    MalformedBody { body: String, detail: String },

    /// Valid JSON without `choices[0].message.content`.
    #[error("Ошибка LLM: {body}")]
    UnexpectedResponse { body: String },
}

/// Persistence errors raised by a [`crate::store::ConversationStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A bot response referenced a user message that does not exist.
    #[error("user message {0} not found")]
    UnknownMessage(i64),
}
