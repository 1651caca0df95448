use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use drisk_core::{UnknownFieldPolicy, DEFAULT_SUMMARY_LIMIT, DEFAULT_TOP_K, DEFAULT_TREND_THRESHOLD};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE: &str = "drisk.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub model: ModelConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    /// Historical sprint CSV
    pub history: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    pub artifact: PathBuf,
    /// JSON array of feature column names, in model input order
    pub feature_schema: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub top_k: usize,
    pub trend_threshold: f64,
    pub summary_limit: usize,
    pub unknown_action_fields: UnknownFieldPolicy,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            history: PathBuf::from("data/raw/project_delivery_risk.csv"),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact: PathBuf::from("models/delivery_risk_model.json"),
            feature_schema: PathBuf::from("models/feature_columns.json"),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            trend_threshold: DEFAULT_TREND_THRESHOLD,
            summary_limit: DEFAULT_SUMMARY_LIMIT,
            unknown_action_fields: UnknownFieldPolicy::default(),
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "history={} model={} schema={}",
            self.data.history.display(),
            self.model.artifact.display(),
            self.model.feature_schema.display()
        )
    }
}

pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    toml::from_str::<Config>(text).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// An explicit path must exist; otherwise `./drisk.toml` is used when
/// present and defaults apply when it is not.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let local = PathBuf::from(CONFIG_FILE);
            if !local.exists() {
                log::debug!("no {CONFIG_FILE} found, using defaults");
                return Ok(Config::default());
            }
            local
        }
    };

    let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config = parse_config(&text, &path)?;
    log::info!("loaded config from {}: {config}", path.display());
    Ok(config)
}
