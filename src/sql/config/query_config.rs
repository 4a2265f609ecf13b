use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// Environment variable overriding [`QueryConfig::listagg_separator`]
pub const ENV_LISTAGG_SEPARATOR: &str = "VELOQUERY_LISTAGG_SEPARATOR";
/// Environment variable overriding [`QueryConfig::position_falsy_as_null`]
pub const ENV_POSITION_FALSY_AS_NULL: &str = "VELOQUERY_POSITION_FALSY_AS_NULL";
/// Environment variable overriding [`QueryConfig::random_seed`]
pub const ENV_RANDOM_SEED: &str = "VELOQUERY_RANDOM_SEED";

/// Per-query evaluation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Separator placed between values by `LISTAGG`
    pub listagg_separator: String,
    /// When true, LEAD/LAG/FIRST_VALUE/LAST_VALUE/NTH_VALUE return NULL for
    /// any falsy value (`0`, `""`, `false`), not only for out-of-range positions
    pub position_falsy_as_null: bool,
    /// Seed for `RANDOM`; unseeded runs draw from the thread RNG
    pub random_seed: Option<u64>,
    /// Emit debug logs when a stage materializes its input
    pub log_materialization: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            listagg_separator: ",".to_string(),
            position_falsy_as_null: false,
            random_seed: None,
            log_materialization: true,
        }
    }
}

/// Errors that can occur while loading a [`QueryConfig`]
#[derive(Error, Debug)]
pub enum QueryConfigError {
    #[error("YAML parsing error in {}: {}", .file.display(), .error)]
    ParseError {
        file: PathBuf,
        error: serde_yaml::Error,
    },

    #[error("IO error reading {}: {}", .file.display(), .error)]
    IoError {
        file: PathBuf,
        error: std::io::Error,
    },

    #[error("Invalid value '{value}' for {variable}")]
    InvalidEnvValue { variable: String, value: String },
}

impl QueryConfig {
    /// Parse a configuration from YAML text; absent keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self, QueryConfigError> {
        serde_yaml::from_str(yaml).map_err(|error| QueryConfigError::ParseError {
            file: PathBuf::from("<inline>"),
            error,
        })
    }

    /// Load a configuration from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, QueryConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|error| QueryConfigError::IoError {
            file: path.to_path_buf(),
            error,
        })?;
        serde_yaml::from_str(&content).map_err(|error| QueryConfigError::ParseError {
            file: path.to_path_buf(),
            error,
        })
    }

    /// Defaults overridden by `VELOQUERY_*` environment variables
    pub fn from_env() -> Result<Self, QueryConfigError> {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from a variable lookup (the environment, or a map in tests)
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, QueryConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(separator) = lookup(ENV_LISTAGG_SEPARATOR) {
            self.listagg_separator = separator;
        }
        if let Some(raw) = lookup(ENV_POSITION_FALSY_AS_NULL) {
            self.position_falsy_as_null = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(QueryConfigError::InvalidEnvValue {
                        variable: ENV_POSITION_FALSY_AS_NULL.to_string(),
                        value: raw,
                    });
                }
            };
        }
        if let Some(raw) = lookup(ENV_RANDOM_SEED) {
            let seed = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| QueryConfigError::InvalidEnvValue {
                    variable: ENV_RANDOM_SEED.to_string(),
                    value: raw.clone(),
                })?;
            self.random_seed = Some(seed);
        }
        Ok(self)
    }
}

/// Process-wide default configuration, read from the environment once.
///
/// Invalid environment values are logged and the defaults are used instead.
pub fn global_config() -> &'static QueryConfig {
    static GLOBAL: OnceLock<QueryConfig> = OnceLock::new();
    GLOBAL.get_or_init(|| match QueryConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Ignoring query configuration from environment: {}", e);
            QueryConfig::default()
        }
    })
}
