//! Sink configuration and factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use worksim_core::traits::SubmissionSink;

use crate::file::FileSink;
use crate::http::HttpSink;

/// Where finished attempts are delivered.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SinkConfig {
    Http {
        base_url: String,
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default = "default_timeout")]
        timeout_secs: u64,
    },
    File {
        dir: PathBuf,
    },
}

impl std::fmt::Debug for SinkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkConfig::Http {
                base_url,
                api_key,
                timeout_secs,
            } => f
                .debug_struct("Http")
                .field("base_url", base_url)
                .field("api_key", &api_key.as_ref().map(|_| "***"))
                .field("timeout_secs", timeout_secs)
                .finish(),
            SinkConfig::File { dir } => f.debug_struct("File").field("dir", dir).finish(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// Top-level worksim configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorksimConfig {
    /// Submission sink. Falls back to a file sink under `output_dir`.
    #[serde(default)]
    pub sink: Option<SinkConfig>,
    /// Directory holding category TOML files.
    #[serde(default = "default_catalog_dir")]
    pub catalog_dir: PathBuf,
    /// Directory for attempt reports and file-sink payloads.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Fixed seed for score jitter.
    #[serde(default)]
    pub jitter_seed: Option<u64>,
    /// Overrides the sum of the category's task limits.
    #[serde(default)]
    pub time_limit_secs: Option<u64>,
}

fn default_catalog_dir() -> PathBuf {
    PathBuf::from("./catalogs")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./worksim-results")
}

impl Default for WorksimConfig {
    fn default() -> Self {
        Self {
            sink: None,
            catalog_dir: default_catalog_dir(),
            output_dir: default_output_dir(),
            jitter_seed: None,
            time_limit_secs: None,
        }
    }
}

impl WorksimConfig {
    /// The configured sink, or the file sink fallback.
    pub fn effective_sink(&self) -> SinkConfig {
        self.sink.clone().unwrap_or_else(|| SinkConfig::File {
            dir: self.output_dir.join("submissions"),
        })
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
    }
    result
}

fn resolve_sink_config(config: SinkConfig) -> SinkConfig {
    match config {
        SinkConfig::Http {
            base_url,
            api_key,
            timeout_secs,
        } => SinkConfig::Http {
            base_url: resolve_env_vars(&base_url),
            api_key: api_key
                .map(|k| resolve_env_vars(&k))
                .filter(|k| !k.is_empty()),
            timeout_secs,
        },
        SinkConfig::File { dir } => SinkConfig::File { dir },
    }
}

/// Apply `WORKSIM_SINK_URL` / `WORKSIM_API_KEY` style overrides.
///
/// A URL override switches the sink to HTTP. A key override only applies to
/// an HTTP sink.
fn apply_overrides(config: &mut WorksimConfig, url: Option<String>, key: Option<String>) {
    if let Some(url) = url {
        let (api_key, timeout_secs) = match config.sink.take() {
            Some(SinkConfig::Http {
                api_key,
                timeout_secs,
                ..
            }) => (api_key, timeout_secs),
            _ => (None, default_timeout()),
        };
        config.sink = Some(SinkConfig::Http {
            base_url: url,
            api_key,
            timeout_secs,
        });
    }

    if let Some(key) = key {
        if let Some(SinkConfig::Http { api_key, .. }) = config.sink.as_mut() {
            *api_key = Some(key);
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `worksim.toml` in the current directory
/// 2. `~/.config/worksim/config.toml`
///
/// Environment variable overrides: `WORKSIM_SINK_URL`, `WORKSIM_API_KEY`.
pub fn load_config() -> Result<WorksimConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<WorksimConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("worksim.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            parse_config_file(&path)?
        }
        None => WorksimConfig::default(),
    };

    apply_overrides(
        &mut config,
        std::env::var("WORKSIM_SINK_URL").ok(),
        std::env::var("WORKSIM_API_KEY").ok(),
    );
    config.sink = config.sink.take().map(resolve_sink_config);

    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<WorksimConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<WorksimConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("worksim"))
}

/// Create the sink described by the configuration.
pub fn create_sink(config: &WorksimConfig) -> Result<Arc<dyn SubmissionSink>> {
    match config.effective_sink() {
        SinkConfig::Http {
            base_url,
            api_key,
            timeout_secs,
        } => {
            if base_url.trim().is_empty() {
                anyhow::bail!("http sink requires a base_url");
            }
            Ok(Arc::new(HttpSink::with_timeout(
                &base_url,
                api_key,
                timeout_secs,
            )?))
        }
        SinkConfig::File { dir } => Ok(Arc::new(FileSink::new(dir))),
    }
}
