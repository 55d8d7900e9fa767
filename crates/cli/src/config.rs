//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub feeds: Vec<FeedConfig>,

    #[serde(default)]
    pub pipeline: PipelineSettings,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub validation: ValidationConfig,
}

/// One feed source entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub category: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub dry_run: bool,

    #[serde(default = "default_inter_item_delay")]
    pub inter_item_delay_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// "free_text" or "bilingual"
    #[serde(default = "default_mode")]
    pub mode: String,

    /// "top_n" or "latest"
    #[serde(default = "default_fetch_mode")]
    pub fetch_mode: String,

    #[serde(default = "default_items_per_feed")]
    pub items_per_feed: usize,

    #[serde(default = "default_quality_attempts")]
    pub quality_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    #[serde(default)]
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_gemini_api_key_env")]
    pub api_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_max_latin_ratio_ko")]
    pub max_latin_ratio_ko: f64,

    #[serde(default = "default_max_non_ascii_ratio_en")]
    pub max_non_ascii_ratio_en: f64,
}

// Default value functions
fn default_db_path() -> PathBuf {
    PathBuf::from("./feedpress.sqlite")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_inter_item_delay() -> u64 {
    7
}

fn default_mode() -> String {
    "free_text".to_string()
}

fn default_fetch_mode() -> String {
    "top_n".to_string()
}

fn default_items_per_feed() -> usize {
    4
}

fn default_quality_attempts() -> u32 {
    3
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash-lite".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    4096
}

fn default_timeout() -> u64 {
    60
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    5000
}

fn default_gemini_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_max_latin_ratio_ko() -> f64 {
    0.15
}

fn default_max_non_ascii_ratio_en() -> f64 {
    0.05
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_log_level(),
            dry_run: false,
            inter_item_delay_secs: default_inter_item_delay(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            fetch_mode: default_fetch_mode(),
            items_per_feed: default_items_per_feed(),
            quality_attempts: default_quality_attempts(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_timeout(),
            retry_attempts: default_retry_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            gemini: GeminiConfig::default(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_gemini_api_key_env(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_latin_ratio_ko: default_max_latin_ratio_ko(),
            max_non_ascii_ratio_en: default_max_non_ascii_ratio_en(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("FEEDPRESS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# feedpress configuration

[general]
db_path = "./feedpress.sqlite"
log_level = "info"
dry_run = false
# Pause after each stored post, for upstream provider rate limits
inter_item_delay_secs = 7

[[feeds]]
category = "DEV"
url = "https://news.hada.io/rss/topic/%EA%B0%9C%EB%B0%9C"

[[feeds]]
category = "AI-ML"
url = "https://news.hada.io/rss/topic/AI"

[pipeline]
mode = "free_text"  # free_text, bilingual
fetch_mode = "top_n"  # top_n, latest
items_per_feed = 4
quality_attempts = 3

[llm]
provider = "gemini"  # gemini, stub
model = "gemini-2.5-flash-lite"
temperature = 0.7
max_output_tokens = 4096
timeout_secs = 60
retry_attempts = 3
backoff_base_ms = 5000

[llm.gemini]
api_key_env = "GEMINI_API_KEY"

[validation]
max_latin_ratio_ko = 0.15
max_non_ascii_ratio_en = 0.05
"#
        .to_string()
    }
}
