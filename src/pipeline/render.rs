//! pdfium access: bind the library, open documents, read text layers and
//! rasterise pages.
//!
//! Every document is opened inside `spawn_blocking` with its own binding;
//! the `Pdfium` value never outlives the blocking closure that uses it.
//!
//! Pages are rendered for Tesseract at a fixed DPI, so the pixel size
//! follows the physical page size.

use crate::error::DocBriefError;
use crate::pipeline::extract::PageSource;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::debug;

/// Resolution used when rasterising pages for OCR.
pub const OCR_DPI: u32 = 300;

/// PDF user-space units per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// Bind to pdfium, either at `lib_path` (a library file or the directory
/// containing it) or from the system library search path.
pub fn bind_pdfium(lib_path: Option<&Path>) -> Result<Pdfium, DocBriefError> {
    let bindings = match lib_path {
        Some(path) if path.is_dir() => {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(path))
        }
        Some(path) => Pdfium::bind_to_library(path),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| DocBriefError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// Open `pdf_path`, mapping pdfium's load errors onto input errors.
pub fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
) -> Result<PdfDocument<'a>, DocBriefError> {
    pdfium.load_pdf_from_file(pdf_path, None).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            DocBriefError::PasswordRequired {
                path: pdf_path.to_path_buf(),
            }
        } else {
            DocBriefError::DocumentOpen {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

/// A pdfium document seen through the [`PageSource`] interface.
pub struct PdfiumPages<'a> {
    document: PdfDocument<'a>,
}

impl<'a> PdfiumPages<'a> {
    pub fn new(document: PdfDocument<'a>) -> Self {
        Self { document }
    }

    fn page(&self, index: usize) -> Result<PdfPage<'a>, DocBriefError> {
        self.document
            .pages()
            .get(index as u16)
            .map_err(|e| DocBriefError::RasterisationFailed {
                page: index + 1,
                detail: format!("{:?}", e),
            })
    }
}

impl PageSource for PdfiumPages<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_text(&self, index: usize) -> Result<String, DocBriefError> {
        let page = self.page(index)?;
        let text = page.text().map_err(|e| DocBriefError::RasterisationFailed {
            page: index + 1,
            detail: format!("text layer: {:?}", e),
        })?;
        Ok(text.all())
    }

    fn render_page(&self, index: usize, dpi: u32) -> Result<DynamicImage, DocBriefError> {
        let page = self.page(index)?;
        let render_config =
            PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / POINTS_PER_INCH);

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            DocBriefError::RasterisationFailed {
                page: index + 1,
                detail: format!("{:?}", e),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            index + 1,
            image.width(),
            image.height()
        );
        Ok(image)
    }
}
