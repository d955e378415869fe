//! Text source: validate a PDF resume and read its text layer via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and must not run on a Tokio worker thread. Extraction is moved onto
//! the blocking pool.
//!
//! Magic bytes (`%PDF`) are checked before pdfium is even bound, so a wrong
//! upload is reported as [`ExtractionError::NotAPdf`] instead of a pdfium
//! parse error, and without needing the native library.

use crate::error::ExtractionError;
use pdfium_render::prelude::*;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Read a resume from disk, validating existence, permissions and PDF magic bytes.
pub async fn read_resume(path: impl AsRef<Path>) -> Result<Vec<u8>, ExtractionError> {
    let path = path.as_ref().to_path_buf();

    let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => ExtractionError::FileNotFound { path: path.clone() },
        ErrorKind::PermissionDenied => ExtractionError::PermissionDenied { path: path.clone() },
        _ => ExtractionError::Internal(format!("Failed to read '{}': {}", path.display(), e)),
    })?;

    check_pdf_magic(&bytes)?;
    debug!("Read resume {} ({} bytes)", path.display(), bytes.len());
    Ok(bytes)
}

/// Reject anything that does not start with `%PDF`.
pub fn check_pdf_magic(bytes: &[u8]) -> Result<(), ExtractionError> {
    if bytes.len() < PDF_MAGIC.len() || &bytes[..PDF_MAGIC.len()] != PDF_MAGIC {
        return Err(ExtractionError::NotAPdf {
            magic: bytes.iter().take(PDF_MAGIC.len()).copied().collect(),
        });
    }
    Ok(())
}

/// Extract the plain text of a PDF held in memory.
///
/// Pages are read in order, joined with a newline, and the result is trimmed
/// at both ends. The newline keeps the last word of one page from fusing with
/// the first word of the next; earlier versions of this tool concatenated
/// pages with no separator. A PDF without a text layer (a scanned image)
/// yields an empty string, which is not an error.
pub async fn extract_text(bytes: &[u8], password: Option<&str>) -> Result<String, ExtractionError> {
    check_pdf_magic(bytes)?;

    let bytes = bytes.to_vec();
    let password = password.map(str::to_string);

    tokio::task::spawn_blocking(move || extract_text_blocking(&bytes, password.as_deref()))
        .await
        .map_err(|e| ExtractionError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Read a PDF from disk and extract its text.
pub async fn extract_text_from_file(
    path: impl AsRef<Path>,
    password: Option<&str>,
) -> Result<String, ExtractionError> {
    let bytes = read_resume(path).await?;
    extract_text(&bytes, password).await
}

/// Blocking implementation of text extraction.
fn extract_text_blocking(bytes: &[u8], password: Option<&str>) -> Result<String, ExtractionError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, password)
        .map_err(|e| {
            let err_str = format!("{:?}", e);
            if err_str.contains("Password") || err_str.contains("password") {
                if password.is_some() {
                    ExtractionError::WrongPassword
                } else {
                    ExtractionError::PasswordRequired
                }
            } else {
                ExtractionError::CorruptPdf { detail: err_str }
            }
        })?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut texts = Vec::with_capacity(pages.len() as usize);
    for (idx, page) in pages.iter().enumerate() {
        let text = page
            .text()
            .map_err(|e| ExtractionError::PageTextFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?
            .all();
        debug!("Page {}: {} chars of text", idx + 1, text.len());
        texts.push(text);
    }

    Ok(join_pages(&texts))
}

/// Join page texts in order with a newline and trim the ends.
fn join_pages(pages: &[String]) -> String {
    pages.join("\n").trim().to_string()
}

/// Bind pdfium from `PDFIUM_LIB_PATH` when set, otherwise from the system library path.
fn bind_pdfium() -> Result<Pdfium, ExtractionError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(p) if !p.is_empty() => {
            let lib = PathBuf::from(p);
            debug!("Binding pdfium from {}", lib.display());
            Pdfium::bind_to_library(&lib)
        }
        _ => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| ExtractionError::PdfiumBindingFailed(e.to_string()))?;

    Ok(Pdfium::new(bindings))
}
