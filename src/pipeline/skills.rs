//! Skill extraction: one language-model call, then normalisation.
//!
//! The model sits behind the [`SkillModel`] trait and is passed in
//! explicitly. [`ProviderModel`] adapts any `edgequake_llm` provider; tests
//! use in-memory fakes.
//!
//! [`extract_skills`] never fails. A model error or timeout is logged and
//! treated as an empty reply, which normalises to an empty skill list. The
//! caller shows that as "could not extract skills".

use crate::config::SearchConfig;
use crate::error::InferenceError;
use crate::pipeline::normalize::{normalize_detailed, ParseTier};
use crate::prompts::{skill_prompt, SKILL_EXTRACTION_PROMPT};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// A language model that can answer one instruction + input pair.
#[async_trait]
pub trait SkillModel: Send + Sync {
    /// Send `system` as the instruction and `user` as the input; return the raw reply.
    async fn complete(&self, system: &str, user: &str) -> Result<String, InferenceError>;
}

/// [`SkillModel`] backed by an `edgequake_llm` provider.
pub struct ProviderModel {
    provider: Arc<dyn LLMProvider>,
    label: String,
    temperature: f32,
    max_tokens: usize,
}

impl ProviderModel {
    /// Wrap `provider`; `label` names it in errors and logs.
    pub fn new(provider: Arc<dyn LLMProvider>, label: impl Into<String>, config: &SearchConfig) -> Self {
        Self {
            provider,
            label: label.into(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    fn options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        }
    }
}

#[async_trait]
impl SkillModel for ProviderModel {
    async fn complete(&self, system: &str, user: &str) -> Result<String, InferenceError> {
        let messages = vec![ChatMessage::system(system), ChatMessage::user(user)];
        let options = self.options();

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| classify_provider_error(&self.label, &e.to_string()))?;

        debug!(
            "{}: {} input tokens, {} output tokens",
            self.label, response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content)
    }
}

/// Stand-in used when no provider is configured: every call fails with
/// [`InferenceError::NotConfigured`], so the search still runs the text
/// stage and reports missing skills instead of aborting.
pub struct UnconfiguredModel {
    detail: String,
}

impl UnconfiguredModel {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[async_trait]
impl SkillModel for UnconfiguredModel {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, InferenceError> {
        Err(InferenceError::NotConfigured {
            detail: self.detail.clone(),
        })
    }
}

/// Map a provider error message onto an [`InferenceError`] kind.
fn classify_provider_error(provider: &str, message: &str) -> InferenceError {
    let lower = message.to_lowercase();
    if lower.contains("401")
        || lower.contains("403")
        || lower.contains("unauthorized")
        || lower.contains("api key")
        || lower.contains("authentication")
    {
        InferenceError::Auth {
            provider: provider.to_string(),
            detail: message.to_string(),
        }
    } else if lower.contains("429") || lower.contains("rate limit") {
        InferenceError::RateLimited {
            provider: provider.to_string(),
        }
    } else {
        InferenceError::Api {
            message: message.to_string(),
        }
    }
}

/// Outcome of the skill-extraction stage.
#[derive(Debug, Clone)]
pub struct SkillExtraction {
    /// Normalised skills; may be empty.
    pub skills: Vec<String>,
    /// Normaliser tier that produced `skills`.
    pub tier: ParseTier,
    /// The model's reply as received (empty on failure or skip).
    pub raw_reply: String,
    /// Why the model call failed, if it did.
    pub error: Option<InferenceError>,
    /// `false` when the call was skipped because the resume had no text.
    pub model_called: bool,
    pub duration_ms: u64,
}

/// Ask the model for skills and return its raw reply.
///
/// Applies `config.llm_timeout_secs`; a late reply becomes
/// [`InferenceError::Timeout`].
pub async fn request_skills(
    model: &dyn SkillModel,
    resume_text: &str,
    config: &SearchConfig,
) -> Result<String, InferenceError> {
    let system = config
        .system_prompt
        .as_deref()
        .unwrap_or(SKILL_EXTRACTION_PROMPT);
    let prompt = skill_prompt(resume_text);
    let secs = config.llm_timeout_secs;

    match tokio::time::timeout(Duration::from_secs(secs), model.complete(system, &prompt)).await {
        Ok(result) => result,
        Err(_) => Err(InferenceError::Timeout { secs }),
    }
}

/// Extract a normalised skill list from resume text. Never fails.
pub async fn extract_skills(
    model: &dyn SkillModel,
    resume_text: &str,
    config: &SearchConfig,
) -> SkillExtraction {
    let start = Instant::now();

    if resume_text.trim().is_empty() {
        warn!("Empty resume text provided, skipping skill extraction");
        return SkillExtraction {
            skills: Vec::new(),
            tier: ParseTier::Empty,
            raw_reply: String::new(),
            error: None,
            model_called: false,
            duration_ms: 0,
        };
    }

    let (raw_reply, error) = match request_skills(model, resume_text, config).await {
        Ok(reply) => (reply, None),
        Err(e) => {
            warn!("Skill extraction failed: {}", e);
            (String::new(), Some(e))
        }
    };

    let normalized = normalize_detailed(&raw_reply);
    let duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Extracted {} skills ({}) in {}ms",
        normalized.skills.len(),
        normalized.tier,
        duration_ms
    );

    SkillExtraction {
        skills: normalized.skills,
        tier: normalized.tier,
        raw_reply,
        error,
        model_called: true,
        duration_ms,
    }
}
