//! Digest entry points: downloaded upload in, summary out.
//!
//! These functions wire the pipeline stages together for one document or
//! one photo. They own the scoped temporary file, so by the time a digest
//! returns (on any path) nothing is left on disk.
//!
//! Errors split the same way the pipeline does: a [`DocBriefError`] means
//! the upload could not be turned into text, while an LLM failure is part of
//! a successful digest, carried as `Err` inside [`Digest::summary`].

use crate::error::{DocBriefError, LlmError};
use crate::pipeline::extract::{PdfiumExtractor, TextExtractor};
use crate::pipeline::input::{check_pdf_magic, ScopedUpload};
use crate::pipeline::llm::Assistant;
use crate::pipeline::ocr::{recognize_image, OcrEngine, Recognition};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Summary of one upload plus timing.
#[derive(Debug, Clone)]
pub struct Digest {
    pub summary: Result<String, LlmError>,
    pub stats: DigestStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestStats {
    /// Characters recovered from the upload, before truncation.
    pub extracted_chars: usize,
    pub extract_ms: u64,
    pub llm_ms: u64,
}

/// Outcome of digesting a photo.
#[derive(Debug, Clone)]
pub enum PhotoDigest {
    /// OCR ran but found nothing; no LLM call was made.
    NoText,
    Summarized(Digest),
}

/// Shared collaborators of the digest functions.
#[derive(Clone)]
pub struct Digester {
    pub ocr: Arc<dyn OcrEngine>,
    pub assistant: Arc<dyn Assistant>,
    pub extractor: Arc<dyn TextExtractor>,
}

impl Digester {
    pub fn new(
        ocr: Arc<dyn OcrEngine>,
        assistant: Arc<dyn Assistant>,
        pdfium_lib: Option<PathBuf>,
    ) -> Self {
        let extractor = Arc::new(PdfiumExtractor::new(Arc::clone(&ocr), pdfium_lib));
        Self {
            ocr,
            assistant,
            extractor,
        }
    }

    /// Replace the PDF text extractor.
    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Extract the text of a downloaded PDF and summarise it.
    pub async fn document(&self, file_name: &str, bytes: &[u8]) -> Result<Digest, DocBriefError> {
        check_pdf_magic(file_name, bytes)?;

        let upload = ScopedUpload::write(file_name, bytes).await?;

        let extract_start = Instant::now();
        let extracted = self.extractor.extract(upload.path()).await;
        let extract_ms = extract_start.elapsed().as_millis() as u64;
        drop(upload);
        let text = extracted?;

        info!(
            "Extracted {} chars from '{}' in {}ms",
            text.chars().count(),
            file_name,
            extract_ms
        );

        Ok(self.summarize(&text, extract_ms).await)
    }

    /// Recognise the text in a downloaded photo and summarise it.
    pub async fn photo(&self, bytes: Vec<u8>) -> Result<PhotoDigest, DocBriefError> {
        let extract_start = Instant::now();
        let recognition = recognize_image(Arc::clone(&self.ocr), bytes).await?;
        let extract_ms = extract_start.elapsed().as_millis() as u64;

        match recognition {
            Recognition::NoText => Ok(PhotoDigest::NoText),
            Recognition::Text(text) => Ok(PhotoDigest::Summarized(
                self.summarize(&text, extract_ms).await,
            )),
        }
    }

    async fn summarize(&self, text: &str, extract_ms: u64) -> Digest {
        let llm_start = Instant::now();
        let summary = self.assistant.summarize(text).await;
        let llm_ms = llm_start.elapsed().as_millis() as u64;
        debug!("Summary call finished in {}ms (ok: {})", llm_ms, summary.is_ok());

        Digest {
            summary,
            stats: DigestStats {
                extracted_chars: text.chars().count(),
                extract_ms,
                llm_ms,
            },
        }
    }
}
