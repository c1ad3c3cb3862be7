use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::annotation::Category;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Language the cultural notes are written in (ISO code or English name)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Text-generation provider
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Annotation prompt and dispatch settings
    #[serde(default)]
    pub annotation: AnnotationConfig,

    /// Archive extraction settings
    #[serde(default)]
    pub archives: ArchiveConfig,

    /// Seasons to process, folder and display name paired positionally
    #[serde(default)]
    pub seasons: Vec<SeasonConfig>,

    /// Season processing settings
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// Cost estimation settings
    #[serde(default)]
    pub cost: CostConfig,

    /// Cross-season report outputs
    #[serde(default)]
    pub report: ReportConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Text-generation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    // @provider: OpenAI
    #[default]
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl ProviderKind {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    // @returns: Environment variable consulted when no key is configured
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::LMStudio => None,
        }
    }

    fn default_model(&self) -> String {
        match self {
            Self::OpenAI => "gpt-4o".to_string(),
            Self::Anthropic => "claude-3-5-haiku-latest".to_string(),
            // Placeholder; users should set to the loaded model name in LM Studio
            Self::LMStudio => "local-model".to_string(),
        }
    }

    fn default_endpoint(&self) -> String {
        match self {
            Self::OpenAI => "https://api.openai.com/v1".to_string(),
            Self::Anthropic => "https://api.anthropic.com".to_string(),
            Self::LMStudio => "http://localhost:1234/v1".to_string(),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider connection settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type", default)]
    pub kind: ProviderKind,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key, falls back to the provider's environment variable
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds per request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param kind: Provider enum
    // @returns: Provider config with defaults
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            model: kind.default_model(),
            endpoint: kind.default_endpoint(),
            kind,
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Get the model, falling back to the provider default
    pub fn get_model(&self) -> String {
        if self.model.is_empty() {
            self.kind.default_model()
        } else {
            self.model.clone()
        }
    }

    /// Get the endpoint, falling back to the provider default
    pub fn get_endpoint(&self) -> String {
        if self.endpoint.is_empty() {
            self.kind.default_endpoint()
        } else {
            self.endpoint.clone()
        }
    }

    /// Get the API key from the config or the provider's environment variable
    pub fn get_api_key(&self) -> String {
        if !self.api_key.is_empty() {
            return self.api_key.clone();
        }
        self.kind
            .api_key_env_var()
            .and_then(|var| std::env::var(var).ok())
            .unwrap_or_default()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::new(ProviderKind::default())
    }
}

/// Annotation prompt settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AnnotationConfig {
    /// Output limit for the note extraction prompt
    #[serde(default = "default_extraction_max_tokens")]
    pub extraction_max_tokens: u32,

    /// Output limit for the classification prompt
    #[serde(default = "default_classification_max_tokens")]
    pub classification_max_tokens: u32,

    /// Sampling temperature for both prompts
    #[serde(default)]
    pub temperature: f32,

    /// Maximum number of lines annotated at the same time
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    /// Reject classification replies outside of the vocabulary
    #[serde(default)]
    pub strict_categories: bool,

    /// Closed category vocabulary
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            extraction_max_tokens: default_extraction_max_tokens(),
            classification_max_tokens: default_classification_max_tokens(),
            temperature: 0.0,
            concurrent_requests: default_concurrent_requests(),
            strict_categories: false,
            categories: default_categories(),
        }
    }
}

/// Archive extraction settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ArchiveConfig {
    /// Directory scanned for archives (immediate entries only)
    #[serde(default = "default_archive_source")]
    pub source_dir: PathBuf,

    /// Directory receiving one subdirectory per archive
    #[serde(default = "default_archive_output")]
    pub output_dir: PathBuf,

    /// Substring an archive name must contain
    #[serde(default)]
    pub name_filter: String,

    /// Archive extension without the dot
    #[serde(default = "default_archive_extension")]
    pub extension: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            source_dir: default_archive_source(),
            output_dir: default_archive_output(),
            name_filter: String::new(),
            extension: default_archive_extension(),
        }
    }
}

/// One season: its subtitle folder and display name
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SeasonConfig {
    /// Folder holding the season's subtitle files
    pub folder: PathBuf,

    /// Name used as the season column in reports
    pub name: String,

    /// Explicit result table path; derived from the folder when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl SeasonConfig {
    pub fn new(folder: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            name: name.into(),
            output: None,
        }
    }

    /// Result table path: the explicit one, or `<folder>/<folder name>_notes.xlsx`
    pub fn table_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| crate::file_utils::FileManager::season_table_path(&self.folder))
    }
}

/// Season processing settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProcessingConfig {
    /// Share of each episode's lines to annotate, in (0, 100]
    #[serde(default = "default_percentage")]
    pub percentage: f64,

    /// Worksheet written by the season processor and read by the aggregator
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// Render the per-season bar chart next to the table
    #[serde(default = "default_true")]
    pub render_charts: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            percentage: default_percentage(),
            sheet_name: default_sheet_name(),
            render_charts: true,
        }
    }
}

/// Cost estimation settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CostConfig {
    /// Dollars per million tokens
    #[serde(default = "default_rate_per_million_tokens")]
    pub rate_per_million_tokens: f64,

    /// Factor applied to the subtitle token count (prompt plus completion)
    #[serde(default = "default_token_multiplier")]
    pub token_multiplier: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            rate_per_million_tokens: default_rate_per_million_tokens(),
            token_multiplier: default_token_multiplier(),
        }
    }
}

impl CostConfig {
    /// Estimated dollar cost for a token total
    pub fn estimate(&self, total_tokens: u64) -> f64 {
        (total_tokens as f64 * self.token_multiplier) / 1_000_000.0 * self.rate_per_million_tokens
    }
}

/// Cross-season report outputs
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReportConfig {
    /// Category count matrix spreadsheet
    #[serde(default = "default_matrix_path")]
    pub matrix_path: PathBuf,

    /// Heatmap image
    #[serde(default = "default_heatmap_path")]
    pub heatmap_path: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            matrix_path: default_matrix_path(),
            heatmap_path: default_heatmap_path(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_target_language() -> String {
    "ru".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_extraction_max_tokens() -> u32 {
    120
}

fn default_classification_max_tokens() -> u32 {
    20
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_categories() -> Vec<String> {
    Category::ALL.iter().map(|c| c.label().to_string()).collect()
}

fn default_archive_source() -> PathBuf {
    PathBuf::from(".")
}

fn default_archive_output() -> PathBuf {
    PathBuf::from("extracted_srt")
}

fn default_archive_extension() -> String {
    "zip".to_string()
}

fn default_percentage() -> f64 {
    100.0
}

fn default_sheet_name() -> String {
    "Sheet1".to_string()
}

fn default_true() -> bool {
    true
}

fn default_rate_per_million_tokens() -> f64 {
    1.25
}

fn default_token_multiplier() -> f64 {
    2.0
}

fn default_matrix_path() -> PathBuf {
    PathBuf::from("all_categories.xlsx")
}

fn default_heatmap_path() -> PathBuf {
    PathBuf::from("category_heatmap.png")
}

impl Config {
    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = crate::file_utils::FileManager::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path.display(), e))
    }

    /// Save the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        crate::file_utils::FileManager::write_to_file(path, &json)
    }

    /// Validate the settings every command relies on.
    ///
    /// Extraction and the cross-season report never call a provider, so
    /// provider settings and API keys are not checked here.
    pub fn validate_offline(&self) -> Result<()> {
        crate::report::table::check_sheet_name(&self.processing.sheet_name)?;

        if self.report.matrix_path.as_os_str().is_empty() || self.report.heatmap_path.as_os_str().is_empty() {
            return Err(anyhow!("Report matrix and heatmap paths must not be empty"));
        }

        Ok(())
    }

    /// Validate the configuration for annotation runs, including provider settings
    pub fn validate(&self) -> Result<()> {
        self.validate_offline()?;

        crate::language_utils::resolve_language_name(&self.target_language)?;

        if !(self.processing.percentage > 0.0 && self.processing.percentage <= 100.0) {
            return Err(anyhow!(
                "Percentage must be in (0, 100], got {}",
                self.processing.percentage
            ));
        }

        if self.annotation.categories.iter().all(|c| c.trim().is_empty()) {
            return Err(anyhow!("Category vocabulary must not be empty"));
        }

        if self.annotation.concurrent_requests == 0 {
            return Err(anyhow!("concurrent_requests must be at least 1"));
        }

        if self.cost.rate_per_million_tokens < 0.0 || self.cost.token_multiplier < 0.0 {
            return Err(anyhow!("Cost settings must not be negative"));
        }

        url::Url::parse(&self.provider.get_endpoint())
            .map_err(|e| anyhow!("Invalid provider endpoint '{}': {}", self.provider.get_endpoint(), e))?;

        // Hosted providers need a key; LM Studio runs locally
        if self.provider.kind.api_key_env_var().is_some() && self.provider.get_api_key().is_empty() {
            return Err(anyhow!(
                "API key is required for {} provider (config or {})",
                self.provider.kind.display_name(),
                self.provider.kind.api_key_env_var().unwrap_or_default()
            ));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            target_language: default_target_language(),
            provider: ProviderConfig::default(),
            annotation: AnnotationConfig::default(),
            archives: ArchiveConfig::default(),
            seasons: Vec::new(),
            processing: ProcessingConfig::default(),
            cost: CostConfig::default(),
            report: ReportConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
