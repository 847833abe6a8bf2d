//! Service configuration
//!
//! Deployment config is a flat `key=value` text file: `#` starts a comment,
//! whitespace around keys and values is trimmed, later duplicates win.
//! Lines without `=` or with an empty key are skipped.

use std::path::Path;

use rustc_hash::FxHashMap;

use crate::errors::ConfigError;

/// Parsed key=value settings with typed accessors
#[derive(Clone, Debug, Default)]
pub struct Settings {
    values: FxHashMap<String, String>,
}

impl Settings {
    /// Parse settings from config file text
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut values = FxHashMap::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            values.insert(key.to_string(), value.trim().to_string());
        }
        Self { values }
    }

    /// Load settings from a file on disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    /// Check whether a key is present
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// String value, or the default when the key is absent
    #[must_use]
    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.values
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    /// Float value; absent or unparseable values fall back to the default
    #[must_use]
    pub fn get_f64(&self, key: &str, default: f64) -> f64 {
        self.values
            .get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Unsigned value; absent or unparseable values fall back to the default
    #[must_use]
    pub fn get_u64(&self, key: &str, default: u64) -> u64 {
        self.values
            .get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Count value; absent or unparseable values fall back to the default
    #[must_use]
    pub fn get_usize(&self, key: &str, default: usize) -> usize {
        self.values
            .get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// String value that must be present
    pub fn require_string(&self, key: &str) -> Result<String, ConfigError> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }

    /// Float value that must be present and parse
    pub fn require_f64(&self, key: &str) -> Result<f64, ConfigError> {
        let raw = self
            .values
            .get(key)
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))?;
        raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.clone(),
        })
    }
}
