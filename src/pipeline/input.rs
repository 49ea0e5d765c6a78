//! Input loading: turn a local text or PDF file into plain text.
//!
//! The pipeline itself only ever sees a `&str`; this module is the seam the
//! CLI uses to get one from disk. PDFs are recognised by extension or by
//! their `%PDF` magic bytes (extension-less exports are common), and text
//! extraction runs under `spawn_blocking` because the extractor is CPU-bound
//! and synchronous.

use crate::error::FlashgenError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read a local file into plain text.
///
/// `.pdf` files (by extension or `%PDF` magic) go through the PDF text
/// extractor; everything else is read as UTF-8.
pub async fn load_input(path: impl AsRef<Path>) -> Result<String, FlashgenError> {
    let path = path.as_ref().to_path_buf();

    let bytes = match tokio::fs::read(&path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(FlashgenError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(FlashgenError::FileNotFound { path });
        }
    };

    if is_pdf(&path, &bytes) {
        debug!("extracting text from PDF: {}", path.display());
        return extract_pdf_text(path, bytes).await;
    }

    String::from_utf8(bytes).map_err(|_| FlashgenError::UnsupportedInput { path })
}

fn is_pdf(path: &Path, bytes: &[u8]) -> bool {
    let by_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    by_extension || bytes.starts_with(b"%PDF")
}

async fn extract_pdf_text(path: PathBuf, bytes: Vec<u8>) -> Result<String, FlashgenError> {
    let display = path.clone();
    tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem(&bytes).map_err(|e| FlashgenError::PdfExtractFailed {
            path,
            detail: e.to_string(),
        })
    })
    .await
    .map_err(|e| FlashgenError::Internal(format!("join error extracting '{}': {e}", display.display())))?
}
