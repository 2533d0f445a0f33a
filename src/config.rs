// Tue Jan 13 2026 - Alex

use crate::pattern::{Notation, DEFAULT_WILDCARD};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Wildcard text written into NORM signatures.
    pub custom_wildcard: String,
    /// Read `custom_wildcard` back as a wildcard when parsing NORM input.
    /// Only worth disabling when the custom wildcard can look like a byte.
    pub scan_custom_wildcard: bool,
    /// Report the match closest to the reference address after a search.
    pub navigate_to_nearest: bool,
    pub notation: Notation,
    pub chunk_size: usize,
    pub parallel: bool,
    pub threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            custom_wildcard: DEFAULT_WILDCARD.to_string(),
            scan_custom_wildcard: true,
            navigate_to_nearest: false,
            notation: Notation::Norm,
            chunk_size: 0x10000,
            parallel: false,
            threads: num_cpus::get(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn with_custom_wildcard(mut self, wildcard: &str) -> Self {
        self.custom_wildcard = wildcard.to_string();
        self
    }

    pub fn with_notation(mut self, notation: Notation) -> Self {
        self.notation = notation;
        self
    }

    /// The alias to substitute while parsing NORM text, if any.
    pub fn scan_alias(&self) -> Option<&str> {
        (self.scan_custom_wildcard && self.custom_wildcard != DEFAULT_WILDCARD)
            .then_some(self.custom_wildcard.as_str())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let wildcard = &self.custom_wildcard;
        if wildcard.is_empty() {
            return Err(ConfigError::Invalid("custom_wildcard must not be empty".to_string()));
        }
        if wildcard.chars().count() > 8 {
            return Err(ConfigError::Invalid("custom_wildcard must be at most 8 characters".to_string()));
        }
        if wildcard.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid("custom_wildcard must not contain whitespace".to_string()));
        }
        if wildcard.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::Invalid(format!(
                "custom_wildcard '{}' is indistinguishable from a byte",
                wildcard
            )));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid("chunk_size must be greater than 0".to_string()));
        }
        if self.threads == 0 {
            return Err(ConfigError::Invalid("threads must be greater than 0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.custom_wildcard, "?");
        assert_eq!(config.notation, Notation::Norm);
        assert_eq!(config.scan_alias(), None);
    }

    #[test]
    fn test_scan_alias() {
        let config = Config::new().with_custom_wildcard("??");
        assert_eq!(config.scan_alias(), Some("??"));

        let config = Config { scan_custom_wildcard: false, ..config };
        assert_eq!(config.scan_alias(), None);
    }

    #[test]
    fn test_invalid_wildcards() {
        for wildcard in ["", "a b", "FF", "0", "too-long-wildcard"] {
            let config = Config::new().with_custom_wildcard(wildcard);
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))), "{:?}", wildcard);
        }
        assert!(Config::new().with_custom_wildcard("**").validate().is_ok());
    }

    #[test]
    fn test_load_partial_json() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), r#"{"custom_wildcard": "**", "notation": "code", "threads": 2}"#).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.custom_wildcard, "**");
        assert_eq!(config.notation, Notation::Code);
        assert_eq!(config.threads, 2);
        assert!(config.scan_custom_wildcard);
        assert_eq!(config.chunk_size, 0x10000);
    }

    #[test]
    fn test_load_rejects_invalid() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), r#"{"chunk_size": 0}"#).unwrap();
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Invalid(_))));

        fs::write(file.path(), "not json").unwrap();
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = Config::new().with_custom_wildcard("**").with_notation(Notation::Code);
        config.save(file.path()).unwrap();
        assert_eq!(Config::load(file.path()).unwrap(), config);
    }
}
