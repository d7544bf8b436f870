//! Configuration system for Abaco.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment.
//! Configuration is loaded from `~/.config/abaco/config.toml` and/or `abaco.toml`
//! in the working directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for the Abaco runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub pipeline: PipelineConfig,
    pub output: OutputConfig,
}

/// Configuration for the text-generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Model identifier sent in the request body.
    pub model: String,
    /// Environment variable name containing the bearer token.
    pub api_key_env: String,
    /// Optional base URL override for the chat-completion endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Default temperature for generation.
    pub temperature: f32,
    /// Maximum tokens to generate in a response.
    pub max_tokens: usize,
    /// Per-attempt request timeout in seconds.
    pub timeout_secs: u64,
    /// Retry policy for transient failures.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            model: "grok-1.5-sonnet".to_string(),
            api_key_env: "GROK_API_KEY".to_string(),
            base_url: None,
            temperature: 0.7,
            max_tokens: 2048,
            timeout_secs: 60,
            retry: RetryConfig::default(),
        }
    }
}

/// Retry policy for the backend client: bounded attempts with exponential
/// backoff plus jitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Base delay in milliseconds; the delay before attempt n (n >= 2) is
    /// `base_delay_ms * 2^(n-2)` plus up to one second of jitter.
    pub base_delay_ms: u64,
    /// Whether to add random jitter to each computed delay.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 1_000,
            jitter: true,
        }
    }
}

/// Configuration for the data-quality pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Score below which remediation is triggered.
    pub warn_threshold: f64,
    /// Hard floor; scores below it are REJECTED.
    pub reject_threshold: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            warn_threshold: 85.0,
            reject_threshold: 70.0,
        }
    }
}

impl PipelineConfig {
    /// View this section as the thresholds passed into scoring.
    pub fn thresholds(&self) -> crate::types::QualityThresholds {
        crate::types::QualityThresholds {
            warn: self.warn_threshold,
            reject: self.reject_threshold,
        }
    }
}

/// Configuration for run-result persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for persisted run results. Defaults to `outputs/` in the
    /// working directory.
    pub dir: PathBuf,
    /// Optional path to the domain knowledge base JSON file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_base: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("outputs"),
            knowledge_base: None,
        }
    }
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with `ABACO_`)
/// 2. Working-directory config (`abaco.toml`)
/// 3. User config (`~/.config/abaco/config.toml`)
/// 4. Built-in defaults
pub fn load_config(workdir: Option<&Path>) -> Result<AppConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    // User-level config
    if let Some(config_dir) = directories::ProjectDirs::from("com", "abaco", "abaco") {
        let user_config = config_dir.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    // Working-directory config
    if let Some(dir) = workdir {
        let local_config = dir.join("abaco.toml");
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }
    }

    // Environment variables (ABACO_BACKEND__MODEL, ABACO_PIPELINE__WARN_THRESHOLD, etc.)
    figment = figment.merge(Env::prefixed("ABACO_").split("__"));

    figment.extract().map_err(Box::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.backend.model, "grok-1.5-sonnet");
        assert_eq!(config.backend.api_key_env, "GROK_API_KEY");
        assert_eq!(config.backend.timeout_secs, 60);
        assert_eq!(config.backend.retry.max_attempts, 5);
        assert_eq!(config.backend.retry.base_delay_ms, 1_000);
        assert_eq!(config.pipeline.warn_threshold, 85.0);
        assert_eq!(config.pipeline.reject_threshold, 70.0);
        assert_eq!(config.output.dir, PathBuf::from("outputs"));
    }

    #[test]
    fn test_pipeline_config_as_thresholds() {
        let config = PipelineConfig {
            warn_threshold: 90.0,
            reject_threshold: 60.0,
        };
        let thresholds = config.thresholds();
        assert_eq!(thresholds.warn, 90.0);
        assert_eq!(thresholds.reject, 60.0);
    }

    #[test]
    fn test_load_config_reads_local_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("abaco.toml"),
            "[backend]\nmodel = \"grok-2\"\n\n[pipeline]\nwarn_threshold = 92.5\n",
        )
        .unwrap();

        let config = load_config(Some(dir.path())).unwrap();
        assert_eq!(config.backend.model, "grok-2");
        assert_eq!(config.pipeline.warn_threshold, 92.5);
        // Untouched sections keep their defaults
        assert_eq!(config.pipeline.reject_threshold, 70.0);
        assert_eq!(config.backend.retry.max_attempts, 5);
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = AppConfig::default();
        let rendered = toml::to_string(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.backend.model, config.backend.model);
        assert_eq!(parsed.pipeline.warn_threshold, config.pipeline.warn_threshold);
    }
}
