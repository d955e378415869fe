//! Error types for the resume2jobs library.
//!
//! Errors fall into two groups that match two failure postures:
//!
//! * **Fatal**: the search cannot start at all. [`JobSearchError`] (and the
//!   [`ExtractionError`] it wraps) is returned as `Err(..)` from the
//!   top-level `search*` functions. An unreadable resume stops the pipeline
//!   before any language-model call is made.
//!
//! * **Non-fatal**: [`InferenceError`] and [`ScrapeError`] describe a stage
//!   that failed while the rest of the pipeline carried on. They are stored
//!   inside results ([`crate::pipeline::skills::SkillExtraction`],
//!   [`crate::pipeline::scrape::ScrapeReport`]) and surfaced as notices, so a
//!   flaky model or a blocked listing page degrades the answer instead of
//!   aborting it.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors returned by the top-level search entry points.
#[derive(Debug, Error)]
pub enum JobSearchError {
    /// The resume could not be read or parsed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// No language-model provider could be constructed (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// The resume document could not be turned into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Input file was not found at the given path.
    #[error("Resume not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The bytes do not start with the `%PDF` signature.
    #[error("Document is not a valid PDF (first bytes: {magic:?})")]
    NotAPdf { magic: Vec<u8> },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF is corrupt: {detail}")]
    CorruptPdf { detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired,

    /// A password was provided but it is wrong.
    #[error("Wrong password for encrypted PDF")]
    WrongPassword,

    /// A page was found but its text layer could not be read.
    #[error("Text extraction failed for page {page}: {detail}")]
    PageTextFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install libpdfium for your platform, or set PDFIUM_LIB_PATH to the\n\
directory (or file) containing an existing copy.\n"
    )]
    PdfiumBindingFailed(String),

    /// Reading the file or joining the extraction task failed.
    #[error("Internal extraction error: {0}")]
    Internal(String),
}

/// The language-model call failed.
///
/// Recovered by the pipeline as an empty reply: the skill list comes back
/// empty and the caller sees "could not extract skills", never this error
/// as a crash.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum InferenceError {
    /// The provider rejected the credentials (401/403).
    #[error("Authentication error from provider '{provider}': {detail}")]
    Auth { provider: String, detail: String },

    /// The provider returned HTTP 429.
    #[error("Rate limit exceeded for provider '{provider}'")]
    RateLimited { provider: String },

    /// No reply within the configured timeout.
    #[error("LLM call timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Any other provider or network failure.
    #[error("LLM API error: {message}")]
    Api { message: String },

    /// No provider could be resolved from the environment.
    #[error("No LLM provider configured: {detail}")]
    NotConfigured { detail: String },
}

/// Fetching the listing page failed.
///
/// Recovered as an empty listing sequence plus a surfaced warning.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ScrapeError {
    /// Connection refused, DNS failure, reset, unreadable body, …
    #[error("Failed to fetch '{url}': {detail}")]
    Transport { url: String, detail: String },

    /// The request exceeded the configured timeout.
    #[error("Request to '{url}' timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    /// The server answered with a non-success status.
    #[error("HTTP {status} from '{url}'")]
    HttpStatus { url: String, status: u16 },

    /// The HTTP client itself could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl ScrapeError {
    /// Whether a second attempt has a reasonable chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            ScrapeError::Transport { .. } | ScrapeError::Timeout { .. } => true,
            ScrapeError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            ScrapeError::Client(_) => false,
        }
    }
}
