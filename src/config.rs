//! Configuration types for a resume-to-jobs search.
//!
//! Every knob of a search lives in [`SearchConfig`], built through
//! [`SearchConfigBuilder`]. One struct is easy to clone into the pipeline
//! and to print for diagnostics.
//!
//! Collaborators (the language model and the progress sink) are injected here
//! too, so the composition root owns their lifecycle and tests can swap in
//! fakes without touching any global state.

use crate::error::JobSearchError;
use crate::pipeline::query::LINKEDIN_JOBS_SEARCH_URL;
use crate::pipeline::skills::SkillModel;
use crate::progress::ProgressCallback;
use std::fmt;
use std::sync::Arc;

/// Desktop Chrome user agent. The listing site serves an empty or blocked page
/// to default HTTP client identifiers.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Upper bound for [`SearchConfig::scrape_max_retries`].
pub const MAX_SCRAPE_RETRIES: u32 = 5;

/// Model used when a provider is named without one.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Configuration for one resume-to-jobs search.
///
/// Built via [`SearchConfig::builder()`] or [`SearchConfig::default()`].
///
/// # Example
/// ```rust
/// use resume2jobs::SearchConfig;
///
/// let config = SearchConfig::builder()
///     .model("gpt-4.1-mini")
///     .llm_timeout_secs(30)
///     .scrape_max_retries(2)
///     .build()
///     .unwrap();
/// assert_eq!(config.scrape_max_retries, 2);
/// ```
#[derive(Clone)]
pub struct SearchConfig {
    /// LLM model identifier, e.g. "gpt-4.1-nano". If None, uses [`DEFAULT_MODEL`].
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `skill_model`, the provider is auto-detected from the environment.
    pub provider_name: Option<String>,

    /// Pre-constructed skill model. Takes precedence over `provider_name`.
    pub skill_model: Option<Arc<dyn SkillModel>>,

    /// Sampling temperature for the skill extraction call. Default: 0.3.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 256.
    ///
    /// A dozen snake_case keywords in list syntax fit in well under 150 tokens.
    pub max_tokens: usize,

    /// Timeout for the language-model call in seconds. Default: 60.
    pub llm_timeout_secs: u64,

    /// Custom skill-extraction instruction. If None, uses
    /// [`crate::prompts::SKILL_EXTRACTION_PROMPT`].
    pub system_prompt: Option<String>,

    /// PDF user password for encrypted resumes.
    pub password: Option<String>,

    /// User-Agent header sent with the listing request.
    pub user_agent: String,

    /// Timeout for each listing request in seconds. Default: 30.
    pub scrape_timeout_secs: u64,

    /// Retries after a transient listing-request failure. Default: 1.
    pub scrape_max_retries: u32,

    /// Initial retry delay in milliseconds, doubled per attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Base of the search URL; the `keywords=` parameter is appended directly.
    /// Default: [`LINKEDIN_JOBS_SEARCH_URL`].
    pub search_base_url: String,

    /// Optional progress sink for stage events and notices.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            skill_model: None,
            temperature: 0.3,
            max_tokens: 256,
            llm_timeout_secs: 60,
            system_prompt: None,
            password: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            scrape_timeout_secs: 30,
            scrape_max_retries: 1,
            retry_backoff_ms: 500,
            search_base_url: LINKEDIN_JOBS_SEARCH_URL.to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("skill_model", &self.skill_model.as_ref().map(|_| "<dyn SkillModel>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.user_agent)
            .field("scrape_timeout_secs", &self.scrape_timeout_secs)
            .field("scrape_max_retries", &self.scrape_max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("search_base_url", &self.search_base_url)
            .finish()
    }
}

impl SearchConfig {
    /// Create a new builder for `SearchConfig`.
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SearchConfig`].
#[derive(Debug)]
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn skill_model(mut self, model: Arc<dyn SkillModel>) -> Self {
        self.config.skill_model = Some(model);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn llm_timeout_secs(mut self, secs: u64) -> Self {
        self.config.llm_timeout_secs = secs;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn scrape_timeout_secs(mut self, secs: u64) -> Self {
        self.config.scrape_timeout_secs = secs;
        self
    }

    pub fn scrape_max_retries(mut self, n: u32) -> Self {
        self.config.scrape_max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn search_base_url(mut self, base: impl Into<String>) -> Self {
        self.config.search_base_url = base.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SearchConfig, JobSearchError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(JobSearchError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.llm_timeout_secs == 0 || c.scrape_timeout_secs == 0 {
            return Err(JobSearchError::InvalidConfig(
                "Timeouts must be ≥ 1 second".into(),
            ));
        }
        if c.scrape_max_retries > MAX_SCRAPE_RETRIES {
            return Err(JobSearchError::InvalidConfig(format!(
                "scrape_max_retries must be ≤ {}, got {}",
                MAX_SCRAPE_RETRIES, c.scrape_max_retries
            )));
        }
        if c.user_agent.trim().is_empty() {
            return Err(JobSearchError::InvalidConfig(
                "User agent must not be empty".into(),
            ));
        }
        let base = &c.search_base_url;
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(JobSearchError::InvalidConfig(format!(
                "Search base URL must be http(s), got '{}'",
                base
            )));
        }
        if !(base.ends_with('?') || base.ends_with('&')) {
            return Err(JobSearchError::InvalidConfig(format!(
                "Search base URL must end with '?' or '&', got '{}'",
                base
            )));
        }
        Ok(self.config)
    }
}
