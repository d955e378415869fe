//! Pipeline stages for a resume-to-jobs search.
//!
//! Each submodule implements exactly one step, so each can be tested alone
//! and the I/O-bound ones can be replaced by fakes.
//!
//! ## Data Flow
//!
//! ```text
//! text ──▶ skills ──▶ normalize ──▶ query ──▶ scrape
//! (pdfium)  (LLM)     (pure)        (pure)    (HTTP + HTML)
//! ```
//!
//! 1. [`text`]: validate the PDF and read its text layer; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 2. [`skills`]: one language-model call with a timeout; failure becomes
//!    an empty reply
//! 3. [`normalize`]: turn the free-form reply into a clean keyword list
//! 4. [`query`]: map filters and keywords to the search URL
//! 5. [`scrape`]: fetch the listing page with one retry and pull out the
//!    job cards

pub mod normalize;
pub mod query;
pub mod scrape;
pub mod skills;
pub mod text;
