//! Text extraction: text layer first, OCR as the fallback.
//!
//! A scanned PDF carries no text layer; only then are pages rendered and
//! OCR'd. OCR runs when the concatenated text layer trims to empty, never on
//! a judgement of text quality.
//!
//! The algorithm is written against [`PageSource`] so it can be exercised
//! without a pdfium library; [`crate::pipeline::render::PdfiumPages`] is the
//! production implementation.

use crate::error::DocBriefError;
use crate::pipeline::ocr::OcrEngine;
use crate::pipeline::render::{self, PdfiumPages, OCR_DPI};
use async_trait::async_trait;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Page-level access to an opened PDF.
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Text layer of the page at 0-based `index`. Empty for scanned pages.
    fn page_text(&self, index: usize) -> Result<String, DocBriefError>;

    /// Rasterise the page at 0-based `index` at `dpi`.
    fn render_page(&self, index: usize, dpi: u32) -> Result<DynamicImage, DocBriefError>;
}

/// Turns a staged PDF into text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, pdf_path: &Path) -> Result<String, DocBriefError>;
}

/// [`TextExtractor`] backed by pdfium, with `ocr` for scanned pages.
#[derive(Clone)]
pub struct PdfiumExtractor {
    ocr: Arc<dyn OcrEngine>,
    pdfium_lib: Option<PathBuf>,
}

impl PdfiumExtractor {
    pub fn new(ocr: Arc<dyn OcrEngine>, pdfium_lib: Option<PathBuf>) -> Self {
        Self { ocr, pdfium_lib }
    }
}

#[async_trait]
impl TextExtractor for PdfiumExtractor {
    async fn extract(&self, pdf_path: &Path) -> Result<String, DocBriefError> {
        extract_text(pdf_path, Arc::clone(&self.ocr), self.pdfium_lib.clone()).await
    }
}

/// Extract the best-effort text of the PDF at `pdf_path`.
///
/// Runs on the blocking pool: pdfium and the OCR engine are both blocking.
/// An empty result is valid and means nothing could be found.
pub async fn extract_text(
    pdf_path: &Path,
    ocr: Arc<dyn OcrEngine>,
    pdfium_lib: Option<PathBuf>,
) -> Result<String, DocBriefError> {
    let path = pdf_path.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let pdfium = render::bind_pdfium(pdfium_lib.as_deref())?;
        let document = render::open_document(&pdfium, &path)?;
        let pages = PdfiumPages::new(document);
        extract_from_pages(&pages, ocr.as_ref())
    })
    .await
    .map_err(|e| DocBriefError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Run the text-layer / OCR decision over an opened document.
///
/// * Text layer non-empty after trimming: the per-page text concatenated in
///   page order, untouched, and the OCR engine is never called.
/// * Otherwise: every page rendered at [`OCR_DPI`] and recognised, each
///   page's output followed by `\n`, in page order.
pub fn extract_from_pages(
    pages: &dyn PageSource,
    ocr: &dyn OcrEngine,
) -> Result<String, DocBriefError> {
    let total = pages.page_count();
    info!("PDF loaded: {} pages", total);

    let mut text = String::new();
    for idx in 0..total {
        text.push_str(&pages.page_text(idx)?);
    }

    if !text.trim().is_empty() {
        debug!("Text layer found: {} chars", text.chars().count());
        return Ok(text);
    }

    info!("No text layer, falling back to OCR on {} pages", total);
    let mut recognised = String::new();
    for idx in 0..total {
        let image = pages.render_page(idx, OCR_DPI)?;
        let page_text = ocr.recognize(&image)?;
        debug!("OCR page {}: {} chars", idx + 1, page_text.chars().count());
        recognised.push_str(&page_text);
        recognised.push('\n');
    }

    Ok(recognised)
}
