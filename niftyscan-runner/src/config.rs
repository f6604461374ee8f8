//! Serializable screener configuration.
//!
//! Every section is optional in the TOML file; missing sections and fields
//! fall back to the defaults below.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use niftyscan_core::data::universe::DEFAULT_COLUMN;
use niftyscan_core::data::FetchRequest;
use niftyscan_core::signals::{default_cutoff, EntryRule, SignalRules};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration for a screening session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenerConfig {
    pub universe: UniverseConfig,
    pub fetch: FetchConfig,
    pub session: SessionConfig,
    pub rules: SignalRules,
}

/// Where the instrument list lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseConfig {
    pub path: PathBuf,
    pub column: String,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("nifty_stocks.csv"),
            column: DEFAULT_COLUMN.to_string(),
        }
    }
}

/// Market data retrieval settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub range_days: u32,
    pub interval_minutes: u32,
    pub adjust: bool,
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// Fetch instruments on the rayon pool instead of one after another.
    pub parallel: bool,
    /// Read `{data_dir}/{symbol}.csv` instead of calling Yahoo.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let request = FetchRequest::default();
        Self {
            range_days: request.range_days,
            interval_minutes: request.interval_minutes,
            adjust: request.adjust,
            timeout_secs: 30,
            max_retries: 0,
            parallel: false,
            data_dir: None,
        }
    }
}

impl FetchConfig {
    pub fn request(&self) -> FetchRequest {
        FetchRequest {
            range_days: self.range_days,
            interval_minutes: self.interval_minutes,
            adjust: self.adjust,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Trading-session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Bars earlier than this time of day are ignored.
    pub cutoff: NaiveTime,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cutoff: default_cutoff(),
        }
    }
}

impl ScreenerConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fetch = &self.fetch;
        if fetch.range_days == 0 {
            return Err(ConfigError::Invalid("fetch.range_days must be > 0".into()));
        }
        if !FetchRequest::SUPPORTED_INTERVALS.contains(&fetch.interval_minutes) {
            return Err(ConfigError::Invalid(format!(
                "fetch.interval_minutes must be one of {:?}, got {}",
                FetchRequest::SUPPORTED_INTERVALS,
                fetch.interval_minutes
            )));
        }
        if fetch.timeout_secs == 0 {
            return Err(ConfigError::Invalid("fetch.timeout_secs must be > 0".into()));
        }
        if self.universe.column.trim().is_empty() {
            return Err(ConfigError::Invalid("universe.column must not be empty".into()));
        }
        if !self.rules.exit_spread.is_finite() || self.rules.exit_spread < 0.0 {
            return Err(ConfigError::Invalid(
                "rules.exit_spread must be a non-negative number".into(),
            ));
        }
        check_rule("rules.call", &self.rules.call)?;
        check_rule("rules.put", &self.rules.put)?;
        Ok(())
    }
}

fn check_rule(section: &str, rule: &EntryRule) -> Result<(), ConfigError> {
    if !rule.momentum.is_ordered() {
        return Err(ConfigError::Invalid(format!(
            "{section}.momentum: min must not exceed max"
        )));
    }
    if !rule.williams.is_ordered() {
        return Err(ConfigError::Invalid(format!(
            "{section}.williams: min must not exceed max"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        let config = ScreenerConfig::from_toml("").unwrap();
        assert_eq!(config, ScreenerConfig::default());
        assert_eq!(config.fetch.request(), FetchRequest::default());
        assert_eq!(config.session.cutoff, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(config.universe.column, "Stock");
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = ScreenerConfig::default();
        config.fetch.parallel = true;
        config.fetch.data_dir = Some(PathBuf::from("bars"));
        let text = config.to_toml().unwrap();
        let parsed = ScreenerConfig::from_toml(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_sections_override_only_named_fields() {
        let text = r#"
[fetch]
interval_minutes = 15
parallel = true

[session]
cutoff = "09:30:00"

[rules]
exit_spread = 7.5
"#;
        let config = ScreenerConfig::from_toml(text).unwrap();
        assert_eq!(config.fetch.interval_minutes, 15);
        assert_eq!(config.fetch.range_days, 5);
        assert!(config.fetch.parallel);
        assert_eq!(config.session.cutoff, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(config.rules.exit_spread, 7.5);
        assert_eq!(config.rules.call, EntryRule::call());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unsupported_interval_is_rejected() {
        let config = ScreenerConfig::from_toml("[fetch]\ninterval_minutes = 7\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn zero_range_is_rejected() {
        let config = ScreenerConfig::from_toml("[fetch]\nrange_days = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn inverted_rule_range_is_rejected() {
        let mut config = ScreenerConfig::default();
        config.rules.put.momentum.min = 50.0;
        config.rules.put.momentum.max = 10.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn from_file_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScreenerConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
