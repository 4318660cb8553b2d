//! Configuration for personad.
//!
//! Loads settings from a TOML file or uses defaults; the deployment
//! knobs that change per environment also honor env variable overrides.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Default config file path
pub const CONFIG_PATH: &str = "/etc/personad/config.toml";

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP listener
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Deployment environment label reported by the test endpoint
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Whether to attach the permissive CORS layer
    #[serde(default = "default_cors_enabled")]
    pub cors_enabled: bool,
}

fn default_bind_addr() -> String {
    "127.0.0.1:7171".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_cors_enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            environment: default_environment(),
            cors_enabled: default_cors_enabled(),
        }
    }
}

/// Generation backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the Ollama API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used when the request does not override it
    #[serde(default = "default_model")]
    pub model: String,

    /// Hard timeout for one completion call
    #[serde(default = "default_generate_timeout")]
    pub generate_timeout_secs: u64,

    /// Timeout for the availability probe
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_base_url() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_model() -> String {
    "llama2".to_string()
}

fn default_generate_timeout() -> u64 {
    30
}

fn default_probe_timeout() -> u64 {
    5
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    800
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            generate_timeout_secs: default_generate_timeout(),
            probe_timeout_secs: default_probe_timeout(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Confidence constants attached to results. These are fixed labels,
/// not a calibrated score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_live_confidence")]
    pub live_confidence: f64,

    #[serde(default = "default_mock_confidence")]
    pub mock_confidence: f64,
}

fn default_live_confidence() -> f64 {
    0.85
}

fn default_mock_confidence() -> f64 {
    0.7
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            live_confidence: default_live_confidence(),
            mock_confidence: default_mock_confidence(),
        }
    }
}

/// Fixed-window rate limit budgets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    #[serde(default = "default_max_general")]
    pub max_general: u32,

    #[serde(default = "default_max_sensitive")]
    pub max_sensitive: u32,

    #[serde(default = "default_max_auth")]
    pub max_auth: u32,
}

fn default_window_secs() -> u64 {
    900
}

fn default_max_general() -> u32 {
    100
}

fn default_max_sensitive() -> u32 {
    5
}

fn default_max_auth() -> u32 {
    10
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            max_general: default_max_general(),
            max_sensitive: default_max_sensitive(),
            max_auth: default_max_auth(),
        }
    }
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonadConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl PersonadConfig {
    /// Load from the default path, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_PATH))
    }

    /// Load from a specific path; missing or unparseable files fall
    /// back to defaults with a warning. Env overrides apply last.
    pub fn load_from(path: &Path) -> Self {
        let mut config = match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Invalid config at {}: {}. Using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                info!("No config at {}, using defaults", path.display());
                Self::default()
            }
        };
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("OLLAMA_BASE_URL") {
            if !url.is_empty() {
                self.backend.base_url = url;
            }
        }
        if let Ok(model) = std::env::var("PERSONAD_MODEL") {
            if !model.is_empty() {
                self.backend.model = model;
            }
        }
        if let Ok(env) = std::env::var("PERSONAD_ENV") {
            if !env.is_empty() {
                self.server.environment = env;
            }
        }
    }

    /// True when both Treblle keys are present in the environment.
    pub fn treblle_configured() -> bool {
        let has = |k: &str| std::env::var(k).map(|v| !v.is_empty()).unwrap_or(false);
        has("TREBLLE_API_KEY") && has("TREBLLE_PROJECT_ID")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let config = PersonadConfig::default();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:11434");
        assert_eq!(config.backend.model, "llama2");
        assert_eq!(config.backend.generate_timeout_secs, 30);
        assert_eq!(config.backend.probe_timeout_secs, 5);
        assert_eq!(config.scoring.live_confidence, 0.85);
        assert_eq!(config.scoring.mock_confidence, 0.7);
        assert_eq!(config.rate_limit.max_general, 100);
    }

    #[test]
    fn partial_toml_fills_remaining_defaults() {
        let parsed: PersonadConfig = toml::from_str(
            r#"
            [backend]
            model = "qwen2.5:7b-instruct"
            generate_timeout_secs = 10
            "#,
        )
        .unwrap();
        assert_eq!(parsed.backend.model, "qwen2.5:7b-instruct");
        assert_eq!(parsed.backend.generate_timeout_secs, 10);
        assert_eq!(parsed.backend.probe_timeout_secs, 5);
        assert_eq!(parsed.server.environment, "development");
    }

    #[test]
    fn load_from_reads_file_and_survives_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nenvironment = \"production\"").unwrap();
        let config = PersonadConfig::load_from(file.path());
        assert_eq!(config.server.environment, "production");

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        writeln!(bad, "not toml at all {{{{").unwrap();
        let config = PersonadConfig::load_from(bad.path());
        assert_eq!(config.backend.model, "llama2");
    }
}
