//! Platform configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default remote endpoint for report metadata
pub const DEFAULT_METADATA_ENDPOINT: &str = "https://your-lab-backend.com/api/report-logs";

/// Platform configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Keep drafts after successful report generation
    pub debug_mode: bool,
    /// Remote endpoint receiving report metadata
    pub metadata_endpoint: String,
    /// Location of the JSON file store
    pub store_path: PathBuf,
    /// Simulated latency of the placeholder summary generator
    pub generation_delay_ms: u64,
}

impl PlatformConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With debug mode
    #[inline]
    #[must_use]
    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    /// With metadata endpoint
    #[inline]
    #[must_use]
    pub fn with_metadata_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.metadata_endpoint = endpoint.into();
        self
    }

    /// With store path
    #[inline]
    #[must_use]
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    /// With generation delay
    #[inline]
    #[must_use]
    pub fn with_generation_delay_ms(mut self, delay_ms: u64) -> Self {
        self.generation_delay_ms = delay_ms;
        self
    }

    /// Generation delay as a duration
    #[inline]
    #[must_use]
    pub fn generation_delay(&self) -> Duration {
        Duration::from_millis(self.generation_delay_ms)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` on invalid TOML or wrong field types.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns `ConfigError::Io` if the file cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            debug_mode: false,
            metadata_endpoint: DEFAULT_METADATA_ENDPOINT.to_string(),
            store_path: PathBuf::from("lep-store.json"),
            generation_delay_ms: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let config = PlatformConfig::from_toml_str("").unwrap();
        assert_eq!(config, PlatformConfig::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let config = PlatformConfig::from_toml_str("debug_mode = true\ngeneration_delay_ms = 5").unwrap();
        assert!(config.debug_mode);
        assert_eq!(config.generation_delay(), Duration::from_millis(5));
        assert_eq!(config.metadata_endpoint, DEFAULT_METADATA_ENDPOINT);
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = PlatformConfig::from_toml_str("debug_mode = \"yes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = PlatformConfig::load("/nonexistent/lep.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn builder_methods() {
        let config = PlatformConfig::new()
            .with_debug_mode(true)
            .with_metadata_endpoint("http://localhost/logs")
            .with_store_path("/tmp/s.json");
        assert!(config.debug_mode);
        assert_eq!(config.metadata_endpoint, "http://localhost/logs");
        assert_eq!(config.store_path, PathBuf::from("/tmp/s.json"));
    }
}
