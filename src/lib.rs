//! # docbrief
//!
//! A Telegram assistant that reads what users send it (PDF documents,
//! photographs of text, plain messages), asks an LLM for a short answer and
//! records every conversation turn in PostgreSQL.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Telegram update
//!  │
//!  ├─ 1. Classify  Command / Document / Photo / Text
//!  ├─ 2. Stage     download into a private temp directory
//!  ├─ 3. Extract   PDF text layer via pdfium, OCR (Tesseract) as fallback
//!  ├─ 4. Ask       bounded prompt to an OpenAI-compatible endpoint
//!  ├─ 5. Clean     strip <think> blocks and parenthetical asides
//!  ├─ 6. Reply     send the answer back to the chat
//!  └─ 7. Record    upsert user, append message, append reply
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docbrief::pipeline::extract::extract_text;
//! use docbrief::pipeline::ocr::TesseractOcr;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ocr = Arc::new(TesseractOcr::bilingual());
//!     let text = extract_text(Path::new("scan.pdf"), ocr, None).await?;
//!     println!("{}", text);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docbrief` binary (clap + anyhow + dotenvy + tracing-subscriber) |
//!
//! ## Runtime requirements
//!
//! * a pdfium shared library (system-wide, or `PDFIUM_LIB_PATH`);
//! * the `tesseract` executable with the `rus` and `eng` language data;
//! * optionally a PostgreSQL database. Without one, turns are kept in memory.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod bot;
pub mod config;
pub mod digest;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod store;
pub mod telegram;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use bot::{BotContext, ReceiveLoop};
pub use config::{BotConfig, BotConfigBuilder, DatabaseConfig};
pub use digest::{Digest, Digester, PhotoDigest};
pub use error::{DocBriefError, LlmError, StoreError};
pub use pipeline::llm::{Assistant, LlmClient};
pub use pipeline::ocr::{OcrEngine, TesseractOcr};
pub use store::{ConversationStore, InMemoryStore, PgConversationStore};
pub use telegram::{ChatTransport, TelegramClient};
