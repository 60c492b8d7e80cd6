//! Configuration management for shiftlog
//!
//! This module handles loading and validating configuration from environment
//! variables (`SHIFTLOG_*`) and TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::analytics::SpikePolicy;
use crate::calendar::BusinessCalendar;
use crate::session::PendingInputs;

/// Configuration values that fail validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },

    #[error("{field} must be greater than 0")]
    Zero { field: &'static str },

    #[error("Unknown log format {0:?} (expected text or json)")]
    LogFormat(String),

    #[error("Unknown key {key:?} in {table}")]
    UnknownKey { table: &'static str, key: String },
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub calendar: CalendarConfig,
    pub parser: ParserConfig,
    pub notes: NotesConfig,
    pub analytics: AnalyticsConfig,
    pub session: SessionConfig,
    pub translation: TranslationConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub access: AccessConfig,
}

/// Business day resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Hour (0-23) before which a timestamp belongs to the previous day
    pub cutoff_hour: u32,

    /// Offset of the venue's local time from UTC, in minutes
    pub utc_offset_minutes: i32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            cutoff_hour: 11,
            utc_offset_minutes: 0,
        }
    }
}

/// Report parsing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Additional label variants keyed by label key (`cash`, `walk_in`, ...)
    pub extra_labels: HashMap<String, Vec<String>>,
}

/// Notes section extraction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesConfig {
    /// Additional headings keyed by section key (`staff`, `soldout`, ...)
    pub extra_section_headings: HashMap<String, Vec<String>>,
}

/// Phrase ranking and spikes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub spike_min_count: u32,
    pub spike_min_delta: u32,

    /// Maximum phrases per ranked list
    pub rank_limit: usize,

    pub extra_stopwords: Vec<String>,
}

impl AnalyticsConfig {
    #[must_use]
    pub fn spike_policy(&self) -> SpikePolicy {
        SpikePolicy::new(self.spike_min_count, self.spike_min_delta)
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            spike_min_count: 2,
            spike_min_delta: 2,
            rank_limit: 10,
            extra_stopwords: Vec::new(),
        }
    }
}

/// Multi-turn input state
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Pending inputs older than this are discarded
    pub pending_ttl_minutes: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pending_ttl_minutes: 30,
        }
    }
}

/// Phrase annotation service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub enabled: bool,

    /// LibreTranslate-compatible `/translate` endpoint
    pub endpoint: String,

    /// Target language code
    pub target_lang: String,

    pub timeout_ms: u64,

    pub api_key: Option<String>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::from("http://localhost:5000/translate"),
            target_lang: String::from("en"),
            timeout_ms: 2000,
            api_key: None,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database path (`:memory:` for a throwaway database)
    pub sqlite_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from("data/shiftlog.db"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

/// Who may submit reports and notes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Empty list allows everyone
    pub allowed_user_ids: Vec<i64>,
}

impl AccessConfig {
    /// Whether a sender may submit
    ///
    /// With an allow-list configured, unidentified senders are denied.
    #[must_use]
    pub fn is_allowed(&self, user_id: Option<i64>) -> bool {
        if self.allowed_user_ids.is_empty() {
            return true;
        }
        user_id.is_some_and(|id| self.allowed_user_ids.contains(&id))
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn env_list<T: std::str::FromStr>(name: &str) -> Option<Vec<T>> {
    std::env::var(name).ok().map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse().ok())
            .collect()
    })
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to defaults. Synonym tables
    /// are only configurable from a file.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let calendar = CalendarConfig {
            cutoff_hour: env_parse("SHIFTLOG_CUTOFF_HOUR").unwrap_or(defaults.calendar.cutoff_hour),
            utc_offset_minutes: env_parse("SHIFTLOG_UTC_OFFSET_MINUTES")
                .unwrap_or(defaults.calendar.utc_offset_minutes),
        };

        let analytics = AnalyticsConfig {
            spike_min_count: env_parse("SHIFTLOG_SPIKE_MIN_COUNT")
                .unwrap_or(defaults.analytics.spike_min_count),
            spike_min_delta: env_parse("SHIFTLOG_SPIKE_MIN_DELTA")
                .unwrap_or(defaults.analytics.spike_min_delta),
            rank_limit: env_parse("SHIFTLOG_RANK_LIMIT").unwrap_or(defaults.analytics.rank_limit),
            extra_stopwords: env_list("SHIFTLOG_EXTRA_STOPWORDS").unwrap_or_default(),
        };

        let session = SessionConfig {
            pending_ttl_minutes: env_parse("SHIFTLOG_PENDING_TTL_MINUTES")
                .unwrap_or(defaults.session.pending_ttl_minutes),
        };

        let translation = TranslationConfig {
            enabled: env_parse("SHIFTLOG_TRANSLATION_ENABLED")
                .unwrap_or(defaults.translation.enabled),
            endpoint: std::env::var("SHIFTLOG_TRANSLATION_URL")
                .unwrap_or(defaults.translation.endpoint),
            target_lang: std::env::var("SHIFTLOG_TRANSLATION_TARGET")
                .unwrap_or(defaults.translation.target_lang),
            timeout_ms: env_parse("SHIFTLOG_TRANSLATION_TIMEOUT_MS")
                .unwrap_or(defaults.translation.timeout_ms),
            api_key: std::env::var("SHIFTLOG_TRANSLATION_API_KEY").ok(),
        };

        let storage = StorageConfig {
            sqlite_path: std::env::var("SHIFTLOG_SQLITE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage.sqlite_path),
        };

        let logging = LoggingConfig {
            level: std::env::var("SHIFTLOG_LOG_LEVEL").unwrap_or(defaults.logging.level),
            format: std::env::var("SHIFTLOG_LOG_FORMAT").unwrap_or(defaults.logging.format),
        };

        let access = AccessConfig {
            allowed_user_ids: env_list("SHIFTLOG_ALLOWED_USER_IDS").unwrap_or_default(),
        };

        Ok(Self {
            calendar,
            parser: defaults.parser,
            notes: defaults.notes,
            analytics,
            session,
            translation,
            storage,
            logging,
            access,
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.calendar.cutoff_hour > 23 {
            return Err(ConfigError::OutOfRange {
                field: "cutoff_hour",
                min: 0,
                max: 23,
                value: i64::from(self.calendar.cutoff_hour),
            });
        }

        // FixedOffset accepts strictly less than a day
        if self.calendar.utc_offset_minutes.unsigned_abs() >= 24 * 60 {
            return Err(ConfigError::OutOfRange {
                field: "utc_offset_minutes",
                min: -(24 * 60 - 1),
                max: 24 * 60 - 1,
                value: i64::from(self.calendar.utc_offset_minutes),
            });
        }

        if self.analytics.rank_limit == 0 {
            return Err(ConfigError::Zero { field: "rank_limit" });
        }

        if self.session.pending_ttl_minutes == 0 {
            return Err(ConfigError::Zero {
                field: "pending_ttl_minutes",
            });
        }

        if self.translation.enabled && self.translation.timeout_ms == 0 {
            return Err(ConfigError::Zero { field: "timeout_ms" });
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(ConfigError::LogFormat(self.logging.format.clone()));
        }

        for key in self.parser.extra_labels.keys() {
            if crate::parser::Label::from_key(key).is_none() {
                return Err(ConfigError::UnknownKey {
                    table: "parser.extra_labels",
                    key: key.clone(),
                });
            }
        }

        for key in self.notes.extra_section_headings.keys() {
            if crate::notes::Section::from_key(key).is_none() {
                return Err(ConfigError::UnknownKey {
                    table: "notes.extra_section_headings",
                    key: key.clone(),
                });
            }
        }

        Ok(())
    }

    /// Calendar with the configured cutoff and offset
    #[must_use]
    pub fn business_calendar(&self) -> BusinessCalendar {
        BusinessCalendar::with_offset_minutes(
            self.calendar.cutoff_hour,
            self.calendar.utc_offset_minutes,
        )
    }

    /// Empty pending-input store with the configured TTL
    #[must_use]
    pub fn pending_inputs(&self) -> PendingInputs {
        PendingInputs::with_ttl_minutes(self.session.pending_ttl_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.calendar.cutoff_hour, 11);
        assert_eq!(config.analytics.spike_policy(), SpikePolicy::new(2, 2));
        assert_eq!(config.analytics.rank_limit, 10);
    }

    #[test]
    fn test_invalid_cutoff_hour() {
        let mut config = Config::default();
        config.calendar.cutoff_hour = 24;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange { field: "cutoff_hour", .. }
        ));
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_label_key_rejected() {
        let mut config = Config::default();
        config
            .parser
            .extra_labels
            .insert("gratuity".into(), vec!["Propina extra".into()]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [calendar]
            cutoff_hour = 6

            [notes.extra_section_headings]
            complaints = ["Guest feedback"]
            "#,
        )
        .unwrap();

        assert_eq!(config.calendar.cutoff_hour, 6);
        assert_eq!(config.calendar.utc_offset_minutes, 0);
        assert_eq!(config.session.pending_ttl_minutes, 30);
        assert_eq!(
            config.notes.extra_section_headings["complaints"],
            vec!["Guest feedback".to_string()]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_access_allow_list() {
        let open = AccessConfig::default();
        assert!(open.is_allowed(None));
        assert!(open.is_allowed(Some(5)));

        let restricted = AccessConfig {
            allowed_user_ids: vec![5],
        };
        assert!(restricted.is_allowed(Some(5)));
        assert!(!restricted.is_allowed(Some(6)));
        assert!(!restricted.is_allowed(None));
    }

    #[test]
    fn test_pending_inputs_use_configured_ttl() {
        let mut config = Config::default();
        config.session.pending_ttl_minutes = 45;
        assert_eq!(config.pending_inputs().ttl(), chrono::Duration::minutes(45));
    }

    #[test]
    fn test_extreme_negative_offset_rejected() {
        let mut config = Config::default();
        config.calendar.utc_offset_minutes = i32::MIN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "utc_offset_minutes", .. })
        ));
    }
}
