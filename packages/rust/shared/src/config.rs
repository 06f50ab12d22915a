//! Application configuration for TrendLens.
//!
//! User config lives at `~/.trendlens/trendlens.toml`.
//! CLI flags override config file values, which override defaults.
//! API keys are never stored in config — only the names of the environment
//! variables that hold them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrendLensError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "trendlens.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".trendlens";

// ---------------------------------------------------------------------------
// Config structs (matching trendlens.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Trend source (hot-list) provider settings.
    #[serde(default = "default_trends")]
    pub trends: ProviderConfig,

    /// Context search provider settings.
    #[serde(default = "default_search")]
    pub search: ProviderConfig,

    /// Narrative synthesis provider settings.
    #[serde(default = "default_synthesis")]
    pub synthesis: ProviderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            defaults: DefaultsConfig::default(),
            trends: default_trends(),
            search: default_search(),
            synthesis: default_synthesis(),
        }
    }
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Maximum number of topics to enrich per run.
    #[serde(default = "default_max_topics")]
    pub max_topics: usize,

    /// Delay in ms after each processed topic, to respect provider rate limits.
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,

    /// Path of the intermediate snapshot file.
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: String,

    /// Directory the rendered report is written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Filename prefix for the rendered report (`<prefix>_<YYYYMMDD>.html`).
    #[serde(default = "default_report_prefix")]
    pub report_prefix: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            max_topics: default_max_topics(),
            pacing_ms: default_pacing_ms(),
            snapshot_file: default_snapshot_file(),
            output_dir: default_output_dir(),
            report_prefix: default_report_prefix(),
        }
    }
}

fn default_max_topics() -> usize {
    10
}
fn default_pacing_ms() -> u64 {
    1000
}
fn default_snapshot_file() -> String {
    "analysis_data.json".into()
}
fn default_output_dir() -> String {
    ".".into()
}
fn default_report_prefix() -> String {
    "trend_report".into()
}

/// One provider endpoint: where to call it and which env var holds the key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider endpoint URL.
    pub endpoint: String,

    /// Name of the env var holding the API key (never store the key itself).
    pub api_key_env: String,
}

fn default_trends() -> ProviderConfig {
    ProviderConfig {
        endpoint: "https://apis.tianapi.com/weibohot/index".into(),
        api_key_env: "TIANAPI_KEY".into(),
    }
}

fn default_search() -> ProviderConfig {
    ProviderConfig {
        endpoint: "https://qianfan.baidubce.com/v2/ai_search/web_search".into(),
        api_key_env: "QIANFAN_API_KEY".into(),
    }
}

fn default_synthesis() -> ProviderConfig {
    ProviderConfig {
        endpoint: "https://qianfan.baidubce.com/v2/ai_search/chat/completions".into(),
        api_key_env: "QIANFAN_API_KEY".into(),
    }
}

// ---------------------------------------------------------------------------
// Pipeline config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime pipeline configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum number of topics to enrich per run.
    pub max_topics: usize,
    /// Delay in ms after each processed topic.
    pub pacing_ms: u64,
    /// Path of the intermediate snapshot file.
    pub snapshot_file: String,
    /// Directory the rendered report is written to.
    pub output_dir: String,
    /// Filename prefix for the rendered report.
    pub report_prefix: String,
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_topics: config.defaults.max_topics,
            pacing_ms: config.defaults.pacing_ms,
            snapshot_file: config.defaults.snapshot_file.clone(),
            output_dir: config.defaults.output_dir.clone(),
            report_prefix: config.defaults.report_prefix.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.trendlens/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| TrendLensError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.trendlens/trendlens.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TrendLensError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        TrendLensError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| TrendLensError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| TrendLensError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| TrendLensError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that every provider's API key env var is set and non-empty.
pub fn validate_api_keys(config: &AppConfig) -> Result<()> {
    for (section, provider) in [
        ("trends", &config.trends),
        ("search", &config.search),
        ("synthesis", &config.synthesis),
    ] {
        let var_name = &provider.api_key_env;
        match std::env::var(var_name) {
            Ok(val) if !val.is_empty() => {}
            _ => {
                return Err(TrendLensError::config(format!(
                    "API key for [{section}] not found. Set the {var_name} environment variable."
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("max_topics"));
        assert!(toml_str.contains("TIANAPI_KEY"));
        assert!(toml_str.contains("QIANFAN_API_KEY"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.max_topics, 10);
        assert_eq!(parsed.defaults.pacing_ms, 1000);
        assert_eq!(parsed.trends.api_key_env, "TIANAPI_KEY");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
max_topics = 5

[search]
endpoint = "https://search.example.com/v1"
api_key_env = "MY_SEARCH_KEY"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.max_topics, 5);
        assert_eq!(config.defaults.pacing_ms, 1000);
        assert_eq!(config.search.api_key_env, "MY_SEARCH_KEY");
        assert!(config.synthesis.endpoint.contains("chat/completions"));
    }

    #[test]
    fn pipeline_config_from_app_config() {
        let app = AppConfig::default();
        let pipeline = PipelineConfig::from(&app);
        assert_eq!(pipeline.max_topics, 10);
        assert_eq!(pipeline.pacing_ms, 1000);
        assert_eq!(pipeline.snapshot_file, "analysis_data.json");
        assert_eq!(pipeline.report_prefix, "trend_report");
    }

    #[test]
    fn api_key_validation() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.trends.api_key_env = "TL_TEST_NONEXISTENT_KEY_12345".into();
        let result = validate_api_keys(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key for [trends]"));
    }
}
