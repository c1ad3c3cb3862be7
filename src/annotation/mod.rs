/*!
 * Cultural note generation.
 *
 * Each subtitle line goes through up to two requests:
 * 1. note extraction, answered with a short explanation or `-`
 * 2. classification of the note into one vocabulary label
 *
 * The outcome is a tagged `Annotation` so callers can tell "no note needed"
 * apart from "request failed" without inspecting strings.
 */

pub mod category;
pub mod prompts;

use log::warn;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::Config;
use crate::errors::{AnnotationError, ProviderError};
use crate::providers::{CompletionRequest, CompletionResponse, Provider, TokenUsage};

pub use category::{Category, CategoryVocabulary};
pub use prompts::{clean_note, AnnotationPrompts, PromptTemplate};

/// Category column value of failed lines
pub const ERROR_CATEGORY: &str = "Error";

/// Result of annotating one line
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    /// The line needs no explanation
    NotNeeded,
    /// A note and its category
    Noted { note: String, category: String },
    /// One of the requests failed
    Failed(AnnotationError),
}

impl Annotation {
    /// Value of the note column
    pub fn note_text(&self) -> String {
        match self {
            Annotation::NotNeeded => String::new(),
            Annotation::Noted { note, .. } => note.clone(),
            Annotation::Failed(e) => format!("Error: {}", e),
        }
    }

    /// Value of the category column
    pub fn category_label(&self) -> &str {
        match self {
            Annotation::NotNeeded => "",
            Annotation::Noted { category, .. } => category,
            Annotation::Failed(_) => ERROR_CATEGORY,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Annotation::Failed(_))
    }
}

/// One subtitle line with its annotation
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    pub subtitle: String,
    pub annotation: Annotation,
}

impl AnnotationRecord {
    pub fn new(subtitle: impl Into<String>, annotation: Annotation) -> Self {
        Self {
            subtitle: subtitle.into(),
            annotation,
        }
    }

    pub fn note(&self) -> String {
        self.annotation.note_text()
    }

    pub fn category(&self) -> &str {
        self.annotation.category_label()
    }
}

/// Request parameters for both prompts
#[derive(Debug, Clone)]
pub struct AnnotationOptions {
    pub model: String,
    pub extraction_max_tokens: u32,
    pub classification_max_tokens: u32,
    pub temperature: f32,
    pub request_timeout: Duration,
    pub strict_categories: bool,
}

impl AnnotationOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.provider.get_model(),
            extraction_max_tokens: config.annotation.extraction_max_tokens,
            classification_max_tokens: config.annotation.classification_max_tokens,
            temperature: config.annotation.temperature,
            request_timeout: Duration::from_secs(config.provider.timeout_secs),
            strict_categories: config.annotation.strict_categories,
        }
    }
}

impl Default for AnnotationOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

// @struct: Running totals of provider-reported tokens, shared across requests
#[derive(Debug, Default)]
struct UsageCounter {
    prompt_tokens: AtomicU64,
    completion_tokens: AtomicU64,
}

impl UsageCounter {
    fn record(&self, response: &CompletionResponse) {
        if let Some(tokens) = response.prompt_tokens {
            self.prompt_tokens.fetch_add(tokens, Ordering::Relaxed);
        }
        if let Some(tokens) = response.completion_tokens {
            self.completion_tokens.fetch_add(tokens, Ordering::Relaxed);
        }
    }

    fn snapshot(&self) -> TokenUsage {
        TokenUsage {
            prompt_tokens: self.prompt_tokens.load(Ordering::Relaxed),
            completion_tokens: self.completion_tokens.load(Ordering::Relaxed),
        }
    }
}

/// Produces cultural notes through a text-generation provider
#[derive(Debug, Clone)]
pub struct AnnotationGenerator {
    provider: Arc<dyn Provider>,
    prompts: AnnotationPrompts,
    vocabulary: CategoryVocabulary,
    options: AnnotationOptions,
    usage: Arc<UsageCounter>,
}

impl AnnotationGenerator {
    pub fn new(
        provider: Arc<dyn Provider>,
        vocabulary: CategoryVocabulary,
        target_language: &str,
        options: AnnotationOptions,
    ) -> Self {
        Self {
            provider,
            prompts: AnnotationPrompts::new(&vocabulary, target_language),
            vocabulary,
            options,
            usage: Arc::new(UsageCounter::default()),
        }
    }

    /// Build from the application config; the note language must resolve
    pub fn from_config(provider: Arc<dyn Provider>, config: &Config) -> anyhow::Result<Self> {
        let language = crate::language_utils::resolve_language_name(&config.target_language)?;
        Ok(Self::new(
            provider,
            CategoryVocabulary::new(&config.annotation.categories),
            &language,
            AnnotationOptions::from_config(config),
        ))
    }

    pub fn vocabulary(&self) -> &CategoryVocabulary {
        &self.vocabulary
    }

    /// Tokens the provider has reported so far, over every request of this generator
    pub fn reported_usage(&self) -> TokenUsage {
        self.usage.snapshot()
    }

    /// Annotate one subtitle line. Never fails; errors become `Annotation::Failed`.
    pub async fn annotate(&self, subtitle_line: &str) -> Annotation {
        let line = subtitle_line.trim();
        if line.is_empty() {
            return Annotation::NotNeeded;
        }

        let raw_note = match self
            .request(self.prompts.extraction(line), self.options.extraction_max_tokens)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!("Note extraction failed for '{}': {}", line, e);
                return Annotation::Failed(AnnotationError::Extraction(e));
            }
        };

        let Some(note) = clean_note(&raw_note) else {
            return Annotation::NotNeeded;
        };

        let raw_category = match self
            .request(self.prompts.classification(&note), self.options.classification_max_tokens)
            .await
        {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!("Note classification failed for '{}': {}", line, e);
                return Annotation::Failed(AnnotationError::Classification(e));
            }
        };

        // A blank label would be indistinguishable from "no note needed"
        if raw_category.is_empty() {
            warn!("Empty category returned for '{}'", line);
            return Annotation::Failed(AnnotationError::Classification(ProviderError::EmptyResponse));
        }

        match self.vocabulary.resolve(&raw_category) {
            Some(label) => Annotation::Noted {
                note,
                category: label.to_string(),
            },
            None if self.options.strict_categories => {
                warn!("Rejected category '{}' for '{}'", raw_category, line);
                Annotation::Failed(AnnotationError::UnknownCategory(raw_category))
            }
            None => {
                warn!("Category '{}' is outside the vocabulary, keeping it as returned", raw_category);
                Annotation::Noted {
                    note,
                    category: raw_category,
                }
            }
        }
    }

    async fn request(&self, prompt: String, max_tokens: u32) -> Result<String, ProviderError> {
        let request = CompletionRequest::new(&self.options.model, prompt)
            .max_tokens(max_tokens)
            .temperature(self.options.temperature);

        let timeout = self.options.request_timeout;
        match tokio::time::timeout(timeout, self.provider.complete(request)).await {
            Ok(result) => result.map(|response| {
                self.usage.record(&response);
                response.text
            }),
            Err(_) => Err(ProviderError::Timeout(timeout.as_secs())),
        }
    }
}
