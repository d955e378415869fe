//! Listing scrape: fetch the search page and pull out the job cards.
//!
//! ## Failure posture
//!
//! [`ListingScraper::scrape`] never returns `Err`. A transport failure or a
//! non-success status ends up in [`ScrapeReport::error`] next to an empty
//! listing list, and a card that lacks one of its fields is dropped and
//! counted rather than failing the batch. Callers that prefer a plain
//! `Result` can use [`ScrapeReport::into_result`].
//!
//! ## Retry
//!
//! Transport errors, timeouts, 429 and 5xx get `scrape_max_retries` extra
//! attempts (default 1) with exponential backoff starting at
//! `retry_backoff_ms`. Other statuses (403, 404, LinkedIn's 999) fail at once.

use crate::config::SearchConfig;
use crate::error::ScrapeError;
use crate::output::JobListing;
use crate::pipeline::query::SearchUrl;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

static CARD: Lazy<Selector> = Lazy::new(|| Selector::parse("div.base-card").unwrap());
static TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h3.base-search-card__title").unwrap());
static COMPANY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h4.base-search-card__subtitle").unwrap());
static LOCATION: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.job-search-card__location").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a.base-card__full-link").unwrap());

/// Result of one scrape.
#[derive(Debug, Clone, Default)]
pub struct ScrapeReport {
    /// Listings in page order. Empty when `error` is set.
    pub listings: Vec<JobListing>,
    /// Cards skipped because a field was missing.
    pub dropped_cards: usize,
    /// HTTP attempts made.
    pub attempts: u32,
    /// Why the page could not be fetched, if it could not.
    pub error: Option<ScrapeError>,
}

impl ScrapeReport {
    fn failed(error: ScrapeError, attempts: u32) -> Self {
        Self {
            listings: Vec::new(),
            dropped_cards: 0,
            attempts,
            error: Some(error),
        }
    }

    /// `Err` when the page could not be fetched, otherwise the listings.
    pub fn into_result(self) -> Result<Vec<JobListing>, ScrapeError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.listings),
        }
    }
}

/// Cards parsed out of one HTML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedListings {
    pub listings: Vec<JobListing>,
    pub dropped_cards: usize,
}

/// HTTP client for the listing page.
pub struct ListingScraper {
    client: Client,
    timeout_secs: u64,
    max_retries: u32,
    retry_backoff_ms: u64,
}

impl ListingScraper {
    /// Build a scraper with the configured user agent and timeout.
    pub fn new(config: &SearchConfig) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.scrape_timeout_secs))
            .build()
            .map_err(|e| ScrapeError::Client(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs: config.scrape_timeout_secs,
            max_retries: config.scrape_max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
        })
    }

    /// Fetch `url` and extract its job cards.
    pub async fn scrape(&self, url: &SearchUrl) -> ScrapeReport {
        info!("Fetching job listings: {}", url);

        let mut attempts = 0u32;
        let mut last_err: Option<ScrapeError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = backoff_ms(self.retry_backoff_ms, attempt);
                warn!(
                    "Listing fetch: retry {}/{} after {}ms",
                    attempt, self.max_retries, backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }
            attempts += 1;

            match self.fetch(url.as_str()).await {
                Ok(html) => {
                    let parsed = parse_listings(&html);
                    info!(
                        "Extracted {} job listings ({} cards dropped)",
                        parsed.listings.len(),
                        parsed.dropped_cards
                    );
                    return ScrapeReport {
                        listings: parsed.listings,
                        dropped_cards: parsed.dropped_cards,
                        attempts,
                        error: None,
                    };
                }
                Err(e) => {
                    warn!("Listing fetch: attempt {} failed: {}", attempts, e);
                    let transient = e.is_transient();
                    last_err = Some(e);
                    if !transient {
                        break;
                    }
                }
            }
        }

        let err = last_err.unwrap_or_else(|| ScrapeError::Transport {
            url: url.to_string(),
            detail: "no attempt made".into(),
        });
        ScrapeReport::failed(err, attempts)
    }

    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| self.transport_error(url, e))
    }

    fn transport_error(&self, url: &str, e: reqwest::Error) -> ScrapeError {
        if e.is_timeout() {
            ScrapeError::Timeout {
                url: url.to_string(),
                secs: self.timeout_secs,
            }
        } else {
            ScrapeError::Transport {
                url: url.to_string(),
                detail: e.to_string(),
            }
        }
    }
}

/// Delay before retry number `attempt` (1-based): `base * 2^(attempt-1)`, saturating.
fn backoff_ms(base: u64, attempt: u32) -> u64 {
    2u64.checked_pow(attempt.saturating_sub(1))
        .map_or(u64::MAX, |factor| base.saturating_mul(factor))
}

/// Build a one-off scraper from `config` and run it.
pub async fn scrape(url: &SearchUrl, config: &SearchConfig) -> ScrapeReport {
    match ListingScraper::new(config) {
        Ok(scraper) => scraper.scrape(url).await,
        Err(e) => {
            warn!("Cannot scrape: {}", e);
            ScrapeReport::failed(e, 0)
        }
    }
}

/// Extract every complete job card from a search-results page, in page order.
pub fn parse_listings(html: &str) -> ParsedListings {
    let document = Html::parse_document(html);
    let mut parsed = ParsedListings::default();

    for (idx, card) in document.select(&CARD).enumerate() {
        match parse_card(card) {
            Some(listing) => parsed.listings.push(listing),
            None => {
                debug!("Dropping job card {}: missing field", idx + 1);
                parsed.dropped_cards += 1;
            }
        }
    }

    parsed
}

fn parse_card(card: ElementRef<'_>) -> Option<JobListing> {
    let link = card
        .select(&LINK)
        .next()?
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty())?;

    Some(JobListing {
        title: text_of(card, &TITLE)?,
        company: text_of(card, &COMPANY)?,
        location: text_of(card, &LOCATION)?,
        link: link.to_string(),
    })
}

fn text_of(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(title: &str, company: &str, location: &str, link: Option<&str>) -> String {
        let anchor = link
            .map(|href| format!(r#"<a class="base-card__full-link absolute" href="{href}"><span class="sr-only">{title}</span></a>"#))
            .unwrap_or_default();
        format!(
            r#"<li><div class="base-card relative job-search-card">
                {anchor}
                <div class="base-search-card__info">
                  <h3 class="base-search-card__title">
                        {title}
                  </h3>
                  <h4 class="base-search-card__subtitle">
                    <a class="hidden-nested-link" href="https://www.linkedin.com/company/x">{company}</a>
                  </h4>
                  <div class="base-search-card__metadata">
                    <span class="job-search-card__location">
                      {location}
                    </span>
                  </div>
                </div>
              </div></li>"#
        )
    }

    fn page(cards: &[String]) -> String {
        format!(
            "<html><body><ul class=\"jobs-search__results-list\">{}</ul></body></html>",
            cards.join("\n")
        )
    }

    #[test]
    fn test_extracts_trimmed_fields() {
        let html = page(&[card(
            "Rust Engineer",
            "Acme",
            "Berlin, Germany",
            Some("https://www.linkedin.com/jobs/view/1"),
        )]);
        let parsed = parse_listings(&html);
        assert_eq!(parsed.dropped_cards, 0);
        assert_eq!(
            parsed.listings,
            vec![JobListing {
                title: "Rust Engineer".into(),
                company: "Acme".into(),
                location: "Berlin, Germany".into(),
                link: "https://www.linkedin.com/jobs/view/1".into(),
            }]
        );
    }

    #[test]
    fn test_card_missing_link_is_dropped_order_kept() {
        let html = page(&[
            card("A", "Co A", "Paris", Some("https://x/1")),
            card("B", "Co B", "Lyon", None),
            card("C", "Co C", "Nice", Some("https://x/3")),
        ]);
        let parsed = parse_listings(&html);
        assert_eq!(parsed.dropped_cards, 1);
        let titles: Vec<_> = parsed.listings.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, ["A", "C"]);
    }

    #[test]
    fn test_card_missing_company_is_dropped() {
        let broken = r#"<div class="base-card">
            <a class="base-card__full-link" href="https://x/9"></a>
            <h3 class="base-search-card__title">Solo</h3>
            <span class="job-search-card__location">Remote</span>
        </div>"#;
        let html = page(&[broken.to_string(), card("Ok", "Co", "Rome", Some("https://x/2"))]);
        let parsed = parse_listings(&html);
        assert_eq!(parsed.dropped_cards, 1);
        assert_eq!(parsed.listings.len(), 1);
        assert_eq!(parsed.listings[0].title, "Ok");
    }

    #[test]
    fn test_empty_href_counts_as_missing() {
        let html = page(&[card("A", "Co", "Oslo", Some("  "))]);
        let parsed = parse_listings(&html);
        assert!(parsed.listings.is_empty());
        assert_eq!(parsed.dropped_cards, 1);
    }

    #[test]
    fn test_page_without_cards() {
        let parsed = parse_listings("<html><body><p>Sign in to continue</p></body></html>");
        assert_eq!(parsed, ParsedListings::default());
    }

    #[test]
    fn test_backoff_doubles_and_saturates() {
        assert_eq!(backoff_ms(500, 1), 500);
        assert_eq!(backoff_ms(500, 2), 1000);
        assert_eq!(backoff_ms(500, 4), 4000);
        assert_eq!(backoff_ms(500, 64), u64::MAX);
        assert_eq!(backoff_ms(u64::MAX, 3), u64::MAX);
    }

    #[test]
    fn test_into_result() {
        let ok = ScrapeReport {
            listings: vec![],
            dropped_cards: 0,
            attempts: 1,
            error: None,
        };
        assert!(ok.into_result().unwrap().is_empty());

        let failed = ScrapeReport::failed(
            ScrapeError::HttpStatus {
                url: "u".into(),
                status: 403,
            },
            1,
        );
        assert!(matches!(
            failed.into_result(),
            Err(ScrapeError::HttpStatus { status: 403, .. })
        ));
    }
}
