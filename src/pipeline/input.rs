//! Input staging: park a downloaded upload on disk for the duration of one
//! update.
//!
//! pdfium reads from a file-system path. Each upload goes into its own
//! `TempDir`, so two documents named `report.pdf` never share a path, and
//! the directory is removed when the [`ScopedUpload`] is dropped, on every
//! exit path including unwinding.

use crate::error::DocBriefError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// An upload written to a private temporary directory.
///
/// The `TempDir` is kept alive to prevent cleanup until processing completes.
#[derive(Debug)]
pub struct ScopedUpload {
    path: PathBuf,
    _temp_dir: TempDir,
}

impl ScopedUpload {
    /// Write `bytes` to a fresh temporary directory under `file_name`.
    ///
    /// Only the final path component of `file_name` is used, so a hostile
    /// name cannot escape the directory.
    pub async fn write(file_name: &str, bytes: &[u8]) -> Result<Self, DocBriefError> {
        let temp_dir = tempfile::Builder::new()
            .prefix("docbrief-")
            .tempdir()
            .map_err(|source| DocBriefError::TempFile { source })?;

        let path = temp_dir.path().join(safe_file_name(file_name));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| DocBriefError::TempFile { source })?;

        debug!("Staged upload at {} ({} bytes)", path.display(), bytes.len());

        Ok(Self {
            path,
            _temp_dir: temp_dir,
        })
    }

    /// Path of the staged file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// True when `file_name` ends in `.pdf`, ignoring case.
pub fn is_pdf_file_name(file_name: &str) -> bool {
    file_name.to_lowercase().ends_with(".pdf")
}

/// pdfium accepts a header anywhere in the first kilobyte.
const PDF_HEADER_WINDOW: usize = 1024;

/// Reject bytes with no `%PDF` header within the first [`PDF_HEADER_WINDOW`]
/// bytes. A BOM or stray line breaks before the header are tolerated.
pub fn check_pdf_magic(file_name: &str, bytes: &[u8]) -> Result<(), DocBriefError> {
    let head = &bytes[..bytes.len().min(PDF_HEADER_WINDOW)];
    if head.windows(4).any(|w| w == b"%PDF") {
        Ok(())
    } else {
        Err(DocBriefError::NotAPdf {
            file_name: file_name.to_string(),
        })
    }
}

fn safe_file_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("upload.bin")
        .to_string()
}
