//! Search entry points: resume in, skills and job listings out.
//!
//! Every entry point runs the same four stages in order (text, skills,
//! query, scrape) and differs only in where the resume text comes from.
//! Nothing is shared between calls; each search builds its own scraper
//! client and owns its [`SearchOutcome`].
//!
//! Only an unreadable resume, an unusable named provider or a bad config
//! return `Err`. Everything else is reported as a [`Notice`] on the outcome.

use crate::config::{SearchConfig, DEFAULT_MODEL};
use crate::error::JobSearchError;
use crate::output::{Notice, SearchOutcome, SearchStats};
use crate::pipeline::query::{build_from_filters, SearchFilters};
use crate::pipeline::scrape;
use crate::pipeline::skills::{extract_skills, ProviderModel, SkillModel, UnconfiguredModel};
use crate::pipeline::text;
use crate::progress::Stage;
use edgequake_llm::ProviderFactory;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Run a full search for the PDF resume at `path`.
///
/// # Errors
/// Returns `Err` only when an explicitly named provider cannot be created or
/// the resume cannot be read as a PDF. With no provider configured at all,
/// the outcome carries a `SkillsUnavailable` notice. A failed model call or listing fetch is reported
/// through [`SearchOutcome::notices`] instead.
pub async fn search(
    path: impl AsRef<Path>,
    filters: &SearchFilters,
    config: &SearchConfig,
) -> Result<SearchOutcome, JobSearchError> {
    let total_start = Instant::now();
    let path = path.as_ref();
    info!("Starting search for {}", path.display());

    let model = resolve_model_for_search(config)?;

    let reporter = Reporter::new(config);
    reporter.start(Stage::ExtractText);
    let text_start = Instant::now();
    let resume_text = text::extract_text_from_file(path, config.password.as_deref()).await?;
    let text_duration_ms = text_start.elapsed().as_millis() as u64;
    reporter.complete(Stage::ExtractText, &format!("{} chars", resume_text.len()));

    run_stages(
        reporter,
        model,
        resume_text,
        text_duration_ms,
        filters,
        config,
        total_start,
    )
    .await
}

/// Run a full search for a PDF resume held in memory.
///
/// ```rust,no_run
/// use resume2jobs::{search_from_bytes, SearchConfig, SearchFilters};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = std::fs::read("resume.pdf")?;
/// let outcome = search_from_bytes(&bytes, &SearchFilters::default(), &SearchConfig::default()).await?;
/// for job in &outcome.listings {
///     println!("{} at {}", job.title, job.company);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search_from_bytes(
    bytes: &[u8],
    filters: &SearchFilters,
    config: &SearchConfig,
) -> Result<SearchOutcome, JobSearchError> {
    let total_start = Instant::now();
    let model = resolve_model_for_search(config)?;

    let reporter = Reporter::new(config);
    reporter.start(Stage::ExtractText);
    let text_start = Instant::now();
    let resume_text = text::extract_text(bytes, config.password.as_deref()).await?;
    let text_duration_ms = text_start.elapsed().as_millis() as u64;
    reporter.complete(Stage::ExtractText, &format!("{} chars", resume_text.len()));

    run_stages(
        reporter,
        model,
        resume_text,
        text_duration_ms,
        filters,
        config,
        total_start,
    )
    .await
}

/// Run the search from already extracted resume text, skipping the PDF stage.
pub async fn search_from_text(
    resume_text: impl Into<String>,
    filters: &SearchFilters,
    config: &SearchConfig,
) -> Result<SearchOutcome, JobSearchError> {
    let total_start = Instant::now();
    let model = resolve_model_for_search(config)?;
    run_stages(
        Reporter::new(config),
        model,
        resume_text.into(),
        0,
        filters,
        config,
        total_start,
    )
    .await
}

/// Synchronous wrapper around [`search`].
///
/// Creates a temporary tokio runtime internally.
pub fn search_sync(
    path: impl AsRef<Path>,
    filters: &SearchFilters,
    config: &SearchConfig,
) -> Result<SearchOutcome, JobSearchError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| JobSearchError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(search(path, filters, config))
}

/// Resolve the skill model, from most-specific to least-specific:
///
/// 1. `config.skill_model`, used as-is.
/// 2. `config.provider_name` with `config.model` (or the default model).
/// 3. `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`, when both are set.
/// 4. OpenAI, when `OPENAI_API_KEY` is set.
/// 5. Whatever `ProviderFactory::from_env` detects.
pub fn resolve_model(config: &SearchConfig) -> Result<Arc<dyn SkillModel>, JobSearchError> {
    if let Some(ref model) = config.skill_model {
        return Ok(Arc::clone(model));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_model(name, model, config);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_model(&prov, &model, config);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_model("openai", model, config);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| not_configured(&e.to_string()))?;

    // from_env falls back to a canned mock provider when nothing is set.
    if llm_provider.name().eq_ignore_ascii_case("mock") {
        return Err(not_configured("no API key or provider variable is set"));
    }

    info!("Using auto-detected provider {}", llm_provider.name());
    Ok(Arc::new(ProviderModel::new(llm_provider, "auto", config)))
}

/// Like [`resolve_model`], but an empty environment is not fatal.
///
/// When auto-detection finds no provider, the returned model fails every
/// call with [`crate::error::InferenceError::NotConfigured`]. The search
/// then still reads the resume and reports a `SkillsUnavailable` notice
/// instead of an `Err`. A provider that was named explicitly and cannot be
/// created stays fatal.
pub fn resolve_model_for_search(
    config: &SearchConfig,
) -> Result<Arc<dyn SkillModel>, JobSearchError> {
    match resolve_model(config) {
        Err(JobSearchError::ProviderNotConfigured { provider, hint }) if provider == "auto" => {
            warn!("No LLM provider configured; skills will be unavailable");
            debug!("{}", hint);
            Ok(Arc::new(UnconfiguredModel::new(
                "set OPENAI_API_KEY or ANTHROPIC_API_KEY, or pass --provider",
            )))
        }
        other => other,
    }
}

fn not_configured(detail: &str) -> JobSearchError {
    JobSearchError::ProviderNotConfigured {
        provider: "auto".to_string(),
        hint: format!(
            "No LLM provider could be auto-detected from environment.\n\
            Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass --provider.\n\
            Error: {}",
            detail
        ),
    }
}

fn create_model(
    provider_name: &str,
    model: &str,
    config: &SearchConfig,
) -> Result<Arc<dyn SkillModel>, JobSearchError> {
    let provider = ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        JobSearchError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })?;
    info!("Using {} / {}", provider_name, model);
    Ok(Arc::new(ProviderModel::new(provider, provider_name, config)))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Forwards stage events and notices to the configured callback and keeps
/// the notices for the outcome.
struct Reporter<'a> {
    config: &'a SearchConfig,
    notices: Vec<Notice>,
}

impl<'a> Reporter<'a> {
    fn new(config: &'a SearchConfig) -> Self {
        Self {
            config,
            notices: Vec::new(),
        }
    }

    fn start(&self, stage: Stage) {
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_stage_start(stage);
        }
    }

    fn complete(&self, stage: Stage, summary: &str) {
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_stage_complete(stage, summary);
        }
    }

    fn notice(&mut self, notice: Notice) {
        warn!("{}", notice);
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_notice(&notice);
        }
        self.notices.push(notice);
    }
}

async fn run_stages(
    mut reporter: Reporter<'_>,
    model: Arc<dyn SkillModel>,
    resume_text: String,
    text_duration_ms: u64,
    filters: &SearchFilters,
    config: &SearchConfig,
    total_start: Instant,
) -> Result<SearchOutcome, JobSearchError> {
    // ── Step 1: Skills ───────────────────────────────────────────────────
    reporter.start(Stage::ExtractSkills);
    let extraction = extract_skills(model.as_ref(), &resume_text, config).await;
    if extraction.tier.is_degraded() {
        reporter.notice(Notice::ParseDegraded {
            tier: extraction.tier,
        });
    }
    if extraction.skills.is_empty() {
        let reason = if !extraction.model_called {
            "resume contains no extractable text".to_string()
        } else if let Some(ref e) = extraction.error {
            e.to_string()
        } else {
            "model reply contained no skills".to_string()
        };
        reporter.notice(Notice::SkillsUnavailable { reason });
    }
    reporter.complete(
        Stage::ExtractSkills,
        &format!("{} skills", extraction.skills.len()),
    );

    // ── Step 2: Query ────────────────────────────────────────────────────
    reporter.start(Stage::BuildQuery);
    let search_url = build_from_filters(&config.search_base_url, filters, &extraction.skills);
    reporter.complete(Stage::BuildQuery, search_url.as_str());

    // ── Step 3: Listings ─────────────────────────────────────────────────
    let mut listings = Vec::new();
    let mut dropped_cards = 0;
    let mut scrape_attempts = 0;
    let mut scrape_duration_ms = 0;

    if !extraction.skills.is_empty() {
        reporter.start(Stage::Scrape);
        let scrape_start = Instant::now();
        let report = scrape::scrape(&search_url, config).await;
        scrape_duration_ms = scrape_start.elapsed().as_millis() as u64;
        scrape_attempts = report.attempts;

        match report.error {
            Some(error) => reporter.notice(Notice::ScrapeFailed { error }),
            None => {
                if report.dropped_cards > 0 {
                    reporter.notice(Notice::PartialScrape {
                        dropped: report.dropped_cards,
                        kept: report.listings.len(),
                    });
                } else if report.listings.is_empty() {
                    reporter.notice(Notice::NoListings);
                }
                listings = report.listings;
                dropped_cards = report.dropped_cards;
            }
        }
        reporter.complete(Stage::Scrape, &format!("{} listings", listings.len()));
    }

    let stats = SearchStats {
        text_duration_ms,
        llm_duration_ms: extraction.duration_ms,
        scrape_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        scrape_attempts,
    };

    info!(
        "Search complete: {} skills, {} listings, {}ms total",
        extraction.skills.len(),
        listings.len(),
        stats.total_duration_ms
    );

    Ok(SearchOutcome {
        resume_text,
        skills: extraction.skills,
        parse_tier: extraction.tier,
        search_url,
        listings,
        dropped_cards,
        notices: reporter.notices,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InferenceError;
    use async_trait::async_trait;

    const PROVIDER_VARS: &[&str] = &[
        "EDGEQUAKE_LLM_PROVIDER",
        "EDGEQUAKE_MODEL",
        "OLLAMA_HOST",
        "OLLAMA_MODEL",
        "LMSTUDIO_HOST",
        "LMSTUDIO_MODEL",
        "ANTHROPIC_API_KEY",
        "GEMINI_API_KEY",
        "GOOGLE_API_KEY",
        "MISTRAL_API_KEY",
        "AZURE_OPENAI_CONTENTGEN_API_KEY",
        "AZURE_OPENAI_API_KEY",
        "XAI_API_KEY",
        "HF_TOKEN",
        "HUGGINGFACE_TOKEN",
        "OPENROUTER_API_KEY",
        "OPENAI_API_KEY",
    ];

    struct Fixed;

    #[async_trait]
    impl SkillModel for Fixed {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, InferenceError> {
            Ok("[]".into())
        }
    }

    #[test]
    fn explicit_model_wins() {
        let model: Arc<dyn SkillModel> = Arc::new(Fixed);
        let config = SearchConfig::builder()
            .skill_model(Arc::clone(&model))
            .provider_name("openai")
            .build()
            .unwrap();
        let resolved = resolve_model(&config).unwrap();
        assert!(Arc::ptr_eq(&resolved, &model));
    }

    #[tokio::test]
    async fn empty_text_skips_model_and_scrape() {
        let config = SearchConfig::builder()
            .skill_model(Arc::new(Fixed))
            .search_base_url("http://127.0.0.1:9/jobs?")
            .build()
            .unwrap();
        let outcome = search_from_text("   ", &SearchFilters::default(), &config)
            .await
            .unwrap();
        assert!(outcome.skills.is_empty());
        assert!(outcome.listings.is_empty());
        assert_eq!(outcome.stats.scrape_attempts, 0);
        assert!(matches!(
            outcome.notices.as_slice(),
            [Notice::SkillsUnavailable { reason }] if reason.contains("no extractable text")
        ));
        assert!(outcome.search_url.as_str().contains("keywords=&origin="));
    }

    #[tokio::test]
    async fn no_provider_configured_reports_missing_skills() {
        for var in PROVIDER_VARS {
            std::env::remove_var(var);
        }
        let config = SearchConfig::builder()
            .search_base_url("http://127.0.0.1:9/jobs?")
            .build()
            .unwrap();

        assert!(matches!(
            resolve_model(&config),
            Err(JobSearchError::ProviderNotConfigured { ref provider, .. }) if provider == "auto"
        ));

        let outcome = search_from_text("Rust developer, Tokio", &SearchFilters::default(), &config)
            .await
            .unwrap();
        assert_eq!(outcome.resume_text, "Rust developer, Tokio");
        assert!(outcome.skills.is_empty());
        assert!(outcome.listings.is_empty());
        assert_eq!(outcome.stats.scrape_attempts, 0);
        assert!(matches!(
            outcome.notices.as_slice(),
            [Notice::SkillsUnavailable { reason }] if reason.contains("No LLM provider configured")
        ));
        assert!(outcome.search_url.as_str().contains("keywords=&origin="));
    }
}
