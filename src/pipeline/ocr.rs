//! Optical character recognition.
//!
//! [`OcrEngine`] is the seam between the pipeline and whatever does the
//! recognising; [`TesseractOcr`] drives the Tesseract command-line tool, the
//! same binary the bot has always used, with the bilingual `rus+eng` profile.
//!
//! Photos go through [`recognize_image`], which decodes the upload, runs
//! the engine on the blocking pool and separates "found text" from "found
//! nothing" so the caller never sends an empty prompt to the LLM.

use crate::config::BILINGUAL_OCR_PROFILE;
use crate::error::DocBriefError;
use image::DynamicImage;
use std::process::Command;
use std::sync::Arc;
use tracing::{debug, info};

/// Recognises text in a raster image.
///
/// Implementations are blocking; async callers go through
/// `spawn_blocking`.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<String, DocBriefError>;
}

/// Outcome of recognising a photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognition {
    /// Recognised text, as returned by the engine.
    Text(String),
    /// The engine ran but the output trims to empty.
    NoText,
}

/// Decode `bytes` as an image and run OCR on it.
///
/// No pre-filtering, rotation correction or denoising is applied.
pub async fn recognize_image(
    ocr: Arc<dyn OcrEngine>,
    bytes: Vec<u8>,
) -> Result<Recognition, DocBriefError> {
    tokio::task::spawn_blocking(move || {
        let image = image::load_from_memory(&bytes).map_err(|e| {
            DocBriefError::UnrecognizableImage {
                detail: e.to_string(),
            }
        })?;
        debug!("Decoded photo → {}x{} px", image.width(), image.height());

        let text = ocr.recognize(&image)?;
        if text.trim().is_empty() {
            info!("OCR found no text in photo");
            Ok(Recognition::NoText)
        } else {
            info!("OCR recognised {} chars in photo", text.chars().count());
            Ok(Recognition::Text(text))
        }
    })
    .await
    .map_err(|e| DocBriefError::Internal(format!("OCR task panicked: {}", e)))?
}

/// Tesseract command-line engine.
///
/// Each call writes the image to a uniquely named temporary PNG and runs
/// `<command> <png> stdout -l <languages>`.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    command: String,
    languages: String,
}

impl TesseractOcr {
    pub fn new(command: impl Into<String>, languages: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            languages: languages.into(),
        }
    }

    /// Tesseract on `PATH` with the Russian + English profile.
    pub fn bilingual() -> Self {
        Self::new("tesseract", BILINGUAL_OCR_PROFILE)
    }

    pub fn languages(&self) -> &str {
        &self.languages
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &DynamicImage) -> Result<String, DocBriefError> {
        let scratch = tempfile::Builder::new()
            .prefix("docbrief-ocr-")
            .suffix(".png")
            .tempfile()
            .map_err(|source| DocBriefError::TempFile { source })?;

        image
            .save_with_format(scratch.path(), image::ImageFormat::Png)
            .map_err(|e| DocBriefError::OcrFailed {
                detail: format!("could not write scratch image: {}", e),
            })?;

        let output = Command::new(&self.command)
            .arg(scratch.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.languages)
            .output()
            .map_err(|e| DocBriefError::OcrUnavailable {
                command: self.command.clone(),
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DocBriefError::OcrFailed {
                detail: format!(
                    "exit code {}: {}",
                    output.status.code().unwrap_or(-1),
                    stderr.trim()
                ),
            });
        }

        Ok(strip_page_break(&String::from_utf8_lossy(&output.stdout)).to_string())
    }
}

/// Tesseract terminates each page with a form feed; it carries no text.
fn strip_page_break(text: &str) -> &str {
    text.trim_end_matches('\u{c}')
}
