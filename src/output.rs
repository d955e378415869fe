//! Result types handed back to the presentation layer.
//!
//! A [`SearchOutcome`] is the response half of one search: everything the
//! pipeline produced plus the [`Notice`]s it raised along the way. It owns
//! all its data and holds no reference back into the pipeline.

use crate::error::ScrapeError;
use crate::pipeline::normalize::ParseTier;
use crate::pipeline::query::SearchUrl;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One job card from the listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListing {
    pub title: String,
    pub company: String,
    pub location: String,
    /// Absolute link to the posting.
    pub link: String,
}

/// A recovered failure worth showing to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// No skills could be determined; the listing search was skipped.
    SkillsUnavailable { reason: String },
    /// The model reply was not a clean list and a lower fallback tier was used.
    ParseDegraded { tier: ParseTier },
    /// The listing page could not be fetched.
    ScrapeFailed { error: ScrapeError },
    /// Some cards were missing fields and were left out.
    PartialScrape { dropped: usize, kept: usize },
    /// The page was fetched but held no job cards.
    NoListings,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::SkillsUnavailable { reason } => {
                write!(f, "Could not extract skills from the resume ({reason})")
            }
            Notice::ParseDegraded { tier } => {
                write!(f, "Model reply was not a clean list; used {tier} fallback")
            }
            Notice::ScrapeFailed { error } => write!(f, "Job search failed: {error}"),
            Notice::PartialScrape { dropped, kept } => write!(
                f,
                "{dropped} job card(s) were incomplete and skipped ({kept} kept)"
            ),
            Notice::NoListings => f.write_str("No job listings found for these skills"),
        }
    }
}

/// Timing for one search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchStats {
    pub text_duration_ms: u64,
    pub llm_duration_ms: u64,
    pub scrape_duration_ms: u64,
    pub total_duration_ms: u64,
    /// HTTP attempts made for the listing page (0 when the scrape was skipped).
    pub scrape_attempts: u32,
}

/// Everything one search produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Concatenated page text of the resume.
    pub resume_text: String,
    /// Normalised skill keywords; empty means "could not determine skills".
    pub skills: Vec<String>,
    /// Which normaliser tier produced `skills`.
    pub parse_tier: ParseTier,
    /// The query URL, built even when the scrape was skipped.
    pub search_url: SearchUrl,
    /// Listings in page order.
    pub listings: Vec<JobListing>,
    /// Cards dropped for missing fields.
    pub dropped_cards: usize,
    /// Soft failures, in the order they were raised.
    pub notices: Vec<Notice>,
    pub stats: SearchStats,
}

impl SearchOutcome {
    /// `true` when no notice was raised.
    pub fn is_clean(&self) -> bool {
        self.notices.is_empty()
    }

    /// The scrape failure, if any.
    pub fn scrape_error(&self) -> Option<&ScrapeError> {
        self.notices.iter().find_map(|n| match n {
            Notice::ScrapeFailed { error } => Some(error),
            _ => None,
        })
    }
}
