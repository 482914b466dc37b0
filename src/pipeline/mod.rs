//! Pipeline stages for turning uploads into summaries.
//!
//! Each submodule implements exactly one step.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──┬──▶ llm ──▶ sanitize
//! (staging)  (pdfium) │   (HTTP)   (cleanup)
//!                     │
//! photo ──▶ ocr ──────┘
//! ```
//!
//! 1. [`input`]:    stage a downloaded upload in a private temp directory
//! 2. [`render`]:   bind pdfium, read text layers, rasterise pages
//! 3. [`extract`]:  text layer first, OCR fallback for scanned PDFs
//! 4. [`ocr`]:      Tesseract engine and the photo recogniser
//! 5. [`llm`]:      the only stage with network I/O
//! 6. [`sanitize`]: strip reasoning tags and parenthetical asides

pub mod extract;
pub mod input;
pub mod llm;
pub mod ocr;
pub mod render;
pub mod sanitize;
