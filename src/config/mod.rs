use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Run configuration. The file is shared with the model trainer, so unknown tables and keys are ignored.
#[derive(Deserialize, Debug, PartialEq)]
pub struct Config {
    pub global: GlobalConfig,
    pub preprocessor: PreprocessorConfig,
}

#[derive(Deserialize, Debug, PartialEq)]
pub struct GlobalConfig {
    pub server_num: usize,
}

#[derive(Deserialize, Debug, PartialEq)]
pub struct PreprocessorConfig {
    /// Transactions starting at or before this time are dropped. Same unit as "Start Time".
    pub warmup_time: f64,
}

#[derive(Debug)]
pub enum ConfigError {
    IO(String, std::io::Error),
    Parse(String, toml::de::Error),
    InvalidWarmup(f64),
}

impl std::error::Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IO(path, err) => write!(f, "could not read config \"{}\": {}", path, err),
            ConfigError::Parse(path, err) => write!(f, "invalid config \"{}\": {}", path, err),
            ConfigError::InvalidWarmup(v) => write!(f, "preprocessor.warmup_time must be finite, got {}", v),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IO(source.clone(), e))?;

        Config::from_toml(&content, &source)
    }

    pub fn from_toml(content: &str, source: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::Parse(source.to_string(), e))?;

        if !config.preprocessor.warmup_time.is_finite() {
            return Err(ConfigError::InvalidWarmup(config.preprocessor.warmup_time));
        }

        Ok(config)
    }
}
