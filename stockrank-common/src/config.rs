//! Configuration file handling.
//!
//! stockrank reads a single JSON file at `~/.stockrank/config.json`. Each
//! crate owns the typed section it cares about; this module only knows how
//! to find the file, read it, layer an override file on top, and parse
//! environment overrides.
//!
//! # Configuration Priority
//!
//! 1. Command line flags (applied by the binary)
//! 2. Environment variables (`STOCKRANK_*` prefix)
//! 3. Explicit config file values
//! 4. Default values

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result, ResultExt};
use crate::validation::{Validate, ValidationError, ValidationResult};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "STOCKRANK_";

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".stockrank"),
        |dirs| dirs.home_dir().join(".stockrank"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Logging configuration shared by every binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,

    /// Additional module targets to quiet down to `warn`.
    #[serde(default)]
    pub excluded_targets: Vec<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            excluded_targets: Vec::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_level".into(),
                reason: format!("'{}' is not one of {:?}", self.log_level, LEVELS),
            });
        }
        if !matches!(self.log_format.as_str(), "json" | "pretty" | "text") {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_format".into(),
                reason: format!("'{}' is not json or pretty", self.log_format),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load a JSON file and return its contents as a Value.
/// Returns None if the file doesn't exist.
pub fn load_json_file(path: &Path) -> Result<Option<Value>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .context(format!("Failed to read {}", path.display()))?;

    let value: Value = serde_json::from_str(&content)
        .context(format!("Failed to parse {}", path.display()))?;

    Ok(Some(value))
}

/// Deep merge two JSON values.
/// Source values override target values, with object merging at each level.
pub fn merge_json(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, source_value) in source_map {
                match target_map.get_mut(&key) {
                    Some(target_value) => merge_json(target_value, source_value),
                    None => {
                        target_map.insert(key, source_value);
                    }
                }
            }
        }
        (target, source) => {
            *target = source;
        }
    }
}

/// Load a typed configuration.
///
/// Reads `path` (or the default config path), then merges `config.local.json`
/// from the same directory on top when present. A missing base file yields
/// the type's defaults.
pub fn load_layered<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    let base_path = path.map_or_else(config_path, Path::to_path_buf);

    let Some(mut merged) = load_json_file(&base_path)? else {
        if path.is_some() {
            return Err(Error::Config(format!(
                "config file {} does not exist",
                base_path.display()
            )));
        }
        tracing::info!(path = %base_path.display(), "Config file not found, using defaults");
        return Ok(T::default());
    };

    let local_path = base_path.with_file_name("config.local.json");
    if let Some(local) = load_json_file(&local_path)? {
        tracing::debug!(path = %local_path.display(), "Merging local config overrides");
        merge_json(&mut merged, local);
    }

    serde_json::from_value(merged).context(format!("Failed to decode {}", base_path.display()))
}

/// Read `STOCKRANK_<key>` and parse it, ignoring unset or unparsable values.
pub fn env_override<T: FromStr>(key: &str) -> Option<T> {
    let name = format!("{}{}", ENV_PREFIX, key);
    match std::env::var(&name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(variable = %name, value = %raw, "Ignoring unparsable override");
                None
            }
        },
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    struct Sample {
        #[serde(default)]
        observability: ObservabilityConfig,
        #[serde(default)]
        size: Option<u32>,
    }

    #[test]
    fn test_merge_json_objects() {
        let mut target = json!({
            "a": 1,
            "b": { "x": 10, "y": 20 }
        });
        let source = json!({
            "b": { "y": 25, "z": 30 },
            "c": 3
        });

        merge_json(&mut target, source);

        assert_eq!(target["a"], 1);
        assert_eq!(target["b"]["x"], 10);
        assert_eq!(target["b"]["y"], 25);
        assert_eq!(target["b"]["z"], 30);
        assert_eq!(target["c"], 3);
    }

    #[test]
    fn test_merge_json_overwrite_non_object() {
        let mut target = json!({ "a": [1, 2, 3] });
        merge_json(&mut target, json!({ "a": [4, 5] }));
        assert_eq!(target["a"], json!([4, 5]));
    }

    #[test]
    fn test_load_layered_with_local_override() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("config.json");
        fs::write(&base, r#"{"size": 10, "observability": {"log_level": "debug"}}"#).unwrap();
        fs::write(dir.path().join("config.local.json"), r#"{"size": 20}"#).unwrap();

        let loaded: Sample = load_layered(Some(&base)).unwrap();
        assert_eq!(loaded.size, Some(20));
        assert_eq!(loaded.observability.log_level, "debug");
        assert_eq!(loaded.observability.log_format, "pretty");
    }

    #[test]
    fn test_load_layered_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let result: Result<Sample> = load_layered(Some(&missing));
        assert!(result.unwrap_err().is_config());
    }

    #[test]
    fn test_load_layered_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("config.json");
        fs::write(&base, "{ not json").unwrap();
        let result: Result<Sample> = load_layered(Some(&base));
        assert!(result.is_err());
    }

    #[test]
    fn test_observability_validation() {
        assert!(ObservabilityConfig::default().validate().is_ok());

        let bad_level = ObservabilityConfig {
            log_level: "loud".into(),
            ..Default::default()
        };
        assert!(bad_level.validate().is_err());

        let bad_format = ObservabilityConfig {
            log_format: "xml".into(),
            ..Default::default()
        };
        assert!(bad_format.validate().is_err());
    }

    #[test]
    fn test_config_path_under_config_dir() {
        assert!(config_path().starts_with(config_dir()));
        assert!(config_path().ends_with("config.json"));
    }
}
