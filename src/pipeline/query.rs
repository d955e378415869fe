//! Query construction: filters + skills → LinkedIn job-search URL.
//!
//! A pure string builder with no network access. The percent-encoding is
//! deliberately minimal: spaces inside a skill become `%20` and nothing else
//! is escaped, which is what the search page has always been fed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Base of the public job-search page, ready for `keywords=`.
pub const LINKEDIN_JOBS_SEARCH_URL: &str = "https://www.linkedin.com/jobs/search/?";

/// Trailing parameter identifying where the search came from.
pub const ORIGIN_MARKER: &str = "&origin=JOB_SEARCH_PAGE_JOB_FILTER";

/// Separator placed between keywords.
pub const KEYWORD_SEPARATOR: &str = "%20OR%20";

/// Seniority filter (`f_E`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExperienceLevel {
    Internship,
    EntryLevel,
    Associate,
    MidSeniorLevel,
    Director,
    Executive,
}

impl ExperienceLevel {
    pub const ALL: [ExperienceLevel; 6] = [
        ExperienceLevel::Internship,
        ExperienceLevel::EntryLevel,
        ExperienceLevel::Associate,
        ExperienceLevel::MidSeniorLevel,
        ExperienceLevel::Director,
        ExperienceLevel::Executive,
    ];

    /// The label shown to users, which is also the lookup key.
    pub fn label(self) -> &'static str {
        match self {
            ExperienceLevel::Internship => "Internship",
            ExperienceLevel::EntryLevel => "Entry level",
            ExperienceLevel::Associate => "Associate",
            ExperienceLevel::MidSeniorLevel => "Mid-Senior level",
            ExperienceLevel::Director => "Director",
            ExperienceLevel::Executive => "Executive",
        }
    }

    /// The `f_E` value.
    pub fn code(self) -> &'static str {
        match self {
            ExperienceLevel::Internship => "1",
            ExperienceLevel::EntryLevel => "2",
            ExperienceLevel::Associate => "3",
            ExperienceLevel::MidSeniorLevel => "4",
            ExperienceLevel::Director => "5",
            ExperienceLevel::Executive => "6",
        }
    }

    /// Exact, case-sensitive label lookup.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.label() == label)
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Recency filter (`f_TPR`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DatePosted {
    #[default]
    AnyTime,
    PastMonth,
    PastWeek,
    Past24Hours,
}

impl DatePosted {
    pub const ALL: [DatePosted; 4] = [
        DatePosted::AnyTime,
        DatePosted::PastMonth,
        DatePosted::PastWeek,
        DatePosted::Past24Hours,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DatePosted::AnyTime => "Any time",
            DatePosted::PastMonth => "Past month",
            DatePosted::PastWeek => "Past week",
            DatePosted::Past24Hours => "Past 24 hours",
        }
    }

    /// The `f_TPR` value; empty for "Any time", which adds no filter.
    pub fn code(self) -> &'static str {
        match self {
            DatePosted::AnyTime => "",
            DatePosted::PastMonth => "r2592000",
            DatePosted::PastWeek => "r604800",
            DatePosted::Past24Hours => "r86400",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.label() == label)
    }
}

impl fmt::Display for DatePosted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The filters chosen for one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub experience: Option<ExperienceLevel>,
    pub date_posted: Option<DatePosted>,
}

impl SearchFilters {
    pub fn new(experience: Option<ExperienceLevel>, date_posted: Option<DatePosted>) -> Self {
        Self {
            experience,
            date_posted,
        }
    }
}

/// A fully built search URL. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchUrl(String);

impl SearchUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SearchUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SearchUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Build the search URL from label strings.
///
/// Unknown or absent labels add no filter; the function cannot fail.
///
/// ```rust
/// use resume2jobs::build_search_url;
///
/// let skills = vec!["machine_learning".to_string(), "python".to_string()];
/// let url = build_search_url(Some("Entry level"), Some("Past week"), &skills);
/// assert_eq!(
///     url.as_str(),
///     "https://www.linkedin.com/jobs/search/?keywords=machine_learning%20OR%20python\
///      &f_E=2&f_TPR=r604800&origin=JOB_SEARCH_PAGE_JOB_FILTER"
/// );
/// ```
pub fn build_search_url(
    experience: Option<&str>,
    recency: Option<&str>,
    skills: &[String],
) -> SearchUrl {
    build_search_url_with_base(LINKEDIN_JOBS_SEARCH_URL, experience, recency, skills)
}

/// [`build_search_url`] against a caller-supplied base (which must end in `?` or `&`).
pub fn build_search_url_with_base(
    base: &str,
    experience: Option<&str>,
    recency: Option<&str>,
    skills: &[String],
) -> SearchUrl {
    let filters = SearchFilters {
        experience: experience.and_then(ExperienceLevel::from_label),
        date_posted: recency.and_then(DatePosted::from_label),
    };
    build_from_filters(base, &filters, skills)
}

/// Build the search URL from typed filters.
pub fn build_from_filters(base: &str, filters: &SearchFilters, skills: &[String]) -> SearchUrl {
    let keywords = join_keywords(skills);
    let mut url = format!("{base}keywords={keywords}");

    let exp = filters.experience.map(ExperienceLevel::code).unwrap_or("");
    if !exp.is_empty() {
        url.push_str("&f_E=");
        url.push_str(exp);
    }

    let tpr = filters.date_posted.map(DatePosted::code).unwrap_or("");
    if !tpr.is_empty() {
        url.push_str("&f_TPR=");
        url.push_str(tpr);
    }

    url.push_str(ORIGIN_MARKER);
    SearchUrl(url)
}

fn join_keywords(skills: &[String]) -> String {
    skills
        .iter()
        .map(|s| s.replace(' ', "%20"))
        .collect::<Vec<_>>()
        .join(KEYWORD_SEPARATOR)
}
