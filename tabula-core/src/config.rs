//! Engine configuration.
//!
//! Every field has a default, so an empty file (or no file) is valid.
//! Values load from TOML first, then `TABULA_*` environment variables
//! override them.

use crate::{ConfigError, WeekNumbering};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub codec: CodecConfig,
    pub schema: SchemaConfig,
    pub edit: EditConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    pub week_numbering: WeekNumbering,
    /// ISO 4217 code for payment-tracking cells that carry none.
    pub default_currency: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            week_numbering: WeekNumbering::Iso,
            default_currency: "USD".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaConfig {
    pub name_required: bool,
    pub name_max_length: usize,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            name_required: true,
            name_max_length: 255,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditConfig {
    /// Ignore blur; only an explicit commit ends the edit.
    pub deferred_commit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    pub recent_limit: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { recent_limit: 5 }
    }
}

impl EngineConfig {
    /// Load from an optional TOML file, apply environment overrides, validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;

        tracing::info!(
            week_numbering = %config.codec.week_numbering,
            default_currency = %config.codec.default_currency,
            deferred_commit = config.edit.deferred_commit,
            recent_limit = config.metrics.recent_limit,
            "Engine configuration loaded"
        );
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("TABULA_WEEK_NUMBERING") {
            self.codec.week_numbering = value.parse().map_err(|reason| ConfigError::InvalidValue {
                field: "codec.week_numbering",
                reason,
            })?;
        }
        if let Some(value) = lookup("TABULA_DEFAULT_CURRENCY") {
            self.codec.default_currency = value.trim().to_uppercase();
        }
        if let Some(value) = lookup("TABULA_DEFERRED_COMMIT") {
            self.edit.deferred_commit = parse_flag(&value).ok_or_else(|| ConfigError::InvalidValue {
                field: "edit.deferred_commit",
                reason: format!("expected true or false, got {value:?}"),
            })?;
        }
        if let Some(value) = lookup("TABULA_NAME_MAX_LENGTH") {
            self.schema.name_max_length = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "schema.name_max_length",
                reason: format!("expected a positive integer, got {value:?}"),
            })?;
        }
        if let Some(value) = lookup("TABULA_RECENT_LIMIT") {
            self.metrics.recent_limit = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "metrics.recent_limit",
                reason: format!("expected a positive integer, got {value:?}"),
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let currency = &self.codec.default_currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::InvalidValue {
                field: "codec.default_currency",
                reason: "must be a three-letter uppercase currency code".to_string(),
            });
        }
        if self.schema.name_max_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "schema.name_max_length",
                reason: "must be > 0".to_string(),
            });
        }
        if self.metrics.recent_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "metrics.recent_limit",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert!(config.validate().is_ok());
        assert_eq!(config.metrics.recent_limit, 5);
        assert_eq!(config.schema.name_max_length, 255);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = EngineConfig::from_toml_str(
            r#"
            [codec]
            week_numbering = "legacy"

            [edit]
            deferred_commit = true
            "#,
        )
        .unwrap();
        assert_eq!(config.codec.week_numbering, WeekNumbering::Legacy);
        assert_eq!(config.codec.default_currency, "USD");
        assert!(config.edit.deferred_commit);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = EngineConfig::from_toml_str("[codec]\nweek_start = \"sunday\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[metrics]\nrecent_limit = 10").unwrap();
        let config = EngineConfig::from_path(file.path()).unwrap();
        assert_eq!(config.metrics.recent_limit, 10);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EngineConfig::from_path(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TABULA_WEEK_NUMBERING", "legacy"),
            ("TABULA_DEFAULT_CURRENCY", "eur"),
            ("TABULA_DEFERRED_COMMIT", "1"),
            ("TABULA_RECENT_LIMIT", "8"),
        ]
        .into_iter()
        .collect();

        let mut config = EngineConfig::default();
        config
            .apply_env_from(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.codec.week_numbering, WeekNumbering::Legacy);
        assert_eq!(config.codec.default_currency, "EUR");
        assert!(config.edit.deferred_commit);
        assert_eq!(config.metrics.recent_limit, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_env_value_reports_field() {
        let mut config = EngineConfig::default();
        let err = config
            .apply_env_from(|k| (k == "TABULA_DEFERRED_COMMIT").then(|| "maybe".to_string()))
            .unwrap_err();
        match err {
            ConfigError::InvalidValue { field, .. } => assert_eq!(field, "edit.deferred_commit"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let mut config = EngineConfig::default();
        config.metrics.recent_limit = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.codec.default_currency = "dollars".to_string();
        assert!(config.validate().is_err());
    }
}
