use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Toml(err.message().to_owned())
    }
}

/// Knobs for a [`Resolver`](crate::Resolver).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Nested facade queries allowed before resolution gives up with
    /// [`ResolveError::ResolutionTooDeep`](crate::ResolveError::ResolutionTooDeep).
    pub max_depth: usize,

    pub logging: LoggingConfig,
}

impl ResolverConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 256;

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// A level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    pub level: String,

    /// Emit logs as JSON lines.
    pub json: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    /// `RUST_LOG`, when set, wins over the configured level.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        if let Ok(filter) = tracing_subscriber::EnvFilter::try_from_default_env() {
            return filter;
        }
        let level = match self.level.trim() {
            "" => Self::default_level(),
            "warning" => "warn".to_owned(),
            other => other.to_ascii_lowercase(),
        };
        tracing_subscriber::EnvFilter::try_new(level).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        })
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
        }
    }
}

/// Installs a global stderr subscriber for `config`.
///
/// Returns `false` when a global subscriber was already set; the library
/// itself never calls this.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_writer(std::io::stderr);
    if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = ResolverConfig::from_toml_str("max_depth = 32\n").unwrap();
        assert_eq!(
            config,
            ResolverConfig {
                max_depth: 32,
                logging: LoggingConfig::default(),
            }
        );
    }

    #[test]
    fn logging_table_is_read() {
        let config = ResolverConfig::from_toml_str(
            r#"
            [logging]
            level = "debug"
            json = true
            "#,
        )
        .unwrap();
        assert_eq!(config.max_depth, ResolverConfig::DEFAULT_MAX_DEPTH);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn wrong_value_type_is_a_toml_error() {
        let err = ResolverConfig::from_toml_str("max_depth = \"deep\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)), "{err:?}");
    }
}
