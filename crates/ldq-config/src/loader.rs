//! Loading configuration files.

use crate::config::QueryConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use tracing::debug;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.yaml` / `.yml`
    Yaml,
    /// `.json`
    Json,
}

impl ConfigFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Lowercase format name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Self::Toml => "toml",
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }
}

/// Reads and validates [`QueryConfig`] files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a configuration file, choosing the format by extension
    pub async fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<QueryConfig> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let config = Self::load_from_str(&content, format)?;
        debug!(path = %path.display(), format = format.name(), "Loaded query config");
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn load_from_str(content: &str, format: ConfigFormat) -> ConfigResult<QueryConfig> {
        let config = Self::parse(content, format)?;
        config.validate()?;
        Ok(config)
    }

    fn parse(content: &str, format: ConfigFormat) -> ConfigResult<QueryConfig> {
        let parse_error = |message: String| ConfigError::Parse {
            format: format.name(),
            message,
        };

        match format {
            #[cfg(feature = "toml")]
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
            #[cfg(feature = "yaml")]
            ConfigFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))
            }
            ConfigFormat::Json => {
                serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))
            }
            #[allow(unreachable_patterns)]
            other => Err(ConfigError::UnsupportedFormat(format!(
                "{} (feature disabled)",
                other.name()
            ))),
        }
    }
}
