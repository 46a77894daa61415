//! Configuration and source factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use perfreport_core::model::DEFAULT_PERIOD_DAYS;
use perfreport_core::pipeline::PipelineConfig;
use perfreport_core::retry::RetryPolicy;
use perfreport_core::traits::Sources;

use crate::dataset::DatasetStore;
use crate::http::HttpStore;

/// Environment variable that overrides the HTTP source's API token.
pub const TOKEN_ENV_VAR: &str = "PERFREPORT_API_TOKEN";

/// Where records are read from.
///
/// Note: Custom Debug impl masks the API token to prevent accidental exposure in logs.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    Dataset {
        path: PathBuf,
    },
    Http {
        base_url: String,
        #[serde(default)]
        api_token: Option<String>,
    },
}

impl std::fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceConfig::Dataset { path } => {
                f.debug_struct("Dataset").field("path", path).finish()
            }
            SourceConfig::Http {
                base_url,
                api_token,
            } => f
                .debug_struct("Http")
                .field("base_url", base_url)
                .field("api_token", &api_token.as_ref().map(|_| "***"))
                .finish(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Dataset {
            path: PathBuf::from("perfreport-data.json"),
        }
    }
}

/// Top-level perfreport configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerfreportConfig {
    #[serde(default)]
    pub source: SourceConfig,
    /// Attempts per read, including the first.
    #[serde(default = "default_attempts")]
    pub max_attempts: u32,
    /// Base delay between attempts; attempt `n` waits `n` times this.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Upper bound on aggregation before falling back. 0 disables it.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Report window when no dates are given.
    #[serde(default = "default_period_days")]
    pub default_period_days: i64,
    /// Output directory for rendered reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_attempts() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    250
}
fn default_timeout() -> u64 {
    30
}
fn default_period_days() -> i64 {
    DEFAULT_PERIOD_DAYS
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./reports")
}

impl Default for PerfreportConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            max_attempts: default_attempts(),
            retry_delay_ms: default_retry_delay(),
            timeout_secs: default_timeout(),
            default_period_days: default_period_days(),
            output_dir: default_output_dir(),
        }
    }
}

impl PerfreportConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            retry: self.retry_policy(),
            timeout: (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_source_config(config: &SourceConfig) -> SourceConfig {
    match config {
        SourceConfig::Dataset { path } => SourceConfig::Dataset {
            path: PathBuf::from(resolve_env_vars(&path.to_string_lossy())),
        },
        SourceConfig::Http {
            base_url,
            api_token,
        } => SourceConfig::Http {
            base_url: resolve_env_vars(base_url),
            api_token: api_token.as_ref().map(|t| resolve_env_vars(t)),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `perfreport.toml` in the current directory
/// 2. `~/.config/perfreport/config.toml`
///
/// Environment variable override: `PERFREPORT_API_TOKEN`.
pub fn load_config() -> Result<PerfreportConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<PerfreportConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("perfreport.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            parse_config(&path)?
        }
        None => PerfreportConfig::default(),
    };

    config.source = resolve_source_config(&config.source);
    if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
        if let SourceConfig::Http { api_token, .. } = &mut config.source {
            *api_token = Some(token);
        }
    }

    Ok(config)
}

fn parse_config(path: &Path) -> Result<PerfreportConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let config = toml::from_str::<PerfreportConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))?;
    if config.max_attempts == 0 {
        anyhow::bail!("invalid config {}: max_attempts must be at least 1", path.display());
    }
    if config.default_period_days <= 0 {
        anyhow::bail!(
            "invalid config {}: default_period_days must be positive",
            path.display()
        );
    }
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("perfreport"))
}

/// Create the collaborator set for a source configuration.
pub fn create_sources(config: &PerfreportConfig) -> Result<Sources> {
    match &config.source {
        SourceConfig::Dataset { path } => {
            let store = DatasetStore::open(path)?;
            Ok(Sources::from_store(Arc::new(store)))
        }
        SourceConfig::Http {
            base_url,
            api_token,
        } => {
            let timeout = Duration::from_secs(if config.timeout_secs > 0 {
                config.timeout_secs
            } else {
                crate::http::DEFAULT_TIMEOUT_SECS
            });
            let store = HttpStore::new(base_url, api_token.clone(), timeout);
            Ok(Sources::from_store(Arc::new(store)))
        }
    }
}
