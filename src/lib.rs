//! # resume2jobs
//!
//! Turn a PDF resume into a list of matching LinkedIn job postings.
//!
//! A language model reads the resume text and names the candidate's top
//! skills. Those skills become the keywords of a public LinkedIn job search,
//! and the result page is scraped into structured listings.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Text      page text via pdfium (spawn_blocking), joined and trimmed
//!  ├─ 2. Skills    one LLM call, reply normalised through a fallback chain
//!  ├─ 3. Query     skills + filters → search URL (no network)
//!  └─ 4. Scrape    GET the search page, extract job cards
//! ```
//!
//! Stages 2 and 4 never abort a search: a failed model call yields no skills
//! and a failed fetch yields no listings, each with a [`Notice`] explaining
//! why.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resume2jobs::{search, DatePosted, ExperienceLevel, SearchConfig, SearchFilters};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / GEMINI_API_KEY
//!     let config = SearchConfig::default();
//!     let filters = SearchFilters::new(Some(ExperienceLevel::EntryLevel), Some(DatePosted::PastWeek));
//!     let outcome = search("resume.pdf", &filters, &config).await?;
//!     println!("skills: {}", outcome.skills.join(", "));
//!     for job in &outcome.listings {
//!         println!("{} | {} | {}", job.title, job.company, job.link);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `resume2jobs` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! resume2jobs = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod search;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{SearchConfig, SearchConfigBuilder, DEFAULT_MODEL, DEFAULT_USER_AGENT};
pub use error::{ExtractionError, InferenceError, JobSearchError, ScrapeError};
pub use output::{JobListing, Notice, SearchOutcome, SearchStats};
pub use pipeline::normalize::{normalize, normalize_detailed, Normalized, ParseTier};
pub use pipeline::query::{
    build_search_url, build_search_url_with_base, DatePosted, ExperienceLevel, SearchFilters,
    SearchUrl,
};
pub use pipeline::scrape::{parse_listings, scrape, ListingScraper, ScrapeReport};
pub use pipeline::skills::{
    extract_skills, ProviderModel, SkillExtraction, SkillModel, UnconfiguredModel,
};
pub use pipeline::text::{extract_text, extract_text_from_file};
pub use progress::{NoopProgressCallback, ProgressCallback, SearchProgressCallback, Stage};
pub use search::{
    resolve_model, resolve_model_for_search, search, search_from_bytes, search_from_text,
    search_sync,
};
