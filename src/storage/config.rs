use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const MAX_LOOKBACK_HOURS: u32 = 24 * 366;
const MAX_LOOKAHEAD_DAYS: u32 = 366;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub google: GoogleConfig,
    pub calendars: CalendarsConfig,
    pub classifier: ClassifierConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub token_cache: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarsConfig {
    /// Calendar events are copied from.
    pub source: String,
    /// Calendar copies are written to.
    pub destination: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifierConfig {
    pub group_number: u32,
    pub subgroup: String,
    pub keywords: Vec<String>,
    pub location_keywords: Vec<String>,
    pub mandatory_keywords: Vec<String>,
    #[serde(default)]
    pub eligibility_rule: EligibilityRule,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityRule {
    /// Untagged events pass; tagged events need a group match. The class-half
    /// filter can veto either way.
    #[default]
    Standard,
    /// Tagged events need a group match; untagged events need a location or
    /// mandatory keyword. No class-half filter.
    LocationOrMandatory,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncConfig {
    pub lookback_hours: u32,
    pub lookahead_days: u32,
    pub correlation_tag: String,
    pub interval_minutes: u32,
}

impl SyncConfig {
    pub fn lookback(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.lookback_hours))
    }

    pub fn lookahead(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.lookahead_days))
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config.normalized())
    }

    pub fn load_or_create() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gcal-mirror")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.calendars.source.trim().is_empty() {
            return Err(ConfigError::Invalid("calendars.source is empty".to_string()));
        }
        if self.calendars.destination.trim().is_empty() {
            return Err(ConfigError::Invalid("calendars.destination is empty".to_string()));
        }
        if self.calendars.source == self.calendars.destination {
            return Err(ConfigError::Invalid(
                "calendars.source and calendars.destination must differ".to_string(),
            ));
        }
        if self.sync.correlation_tag.trim().is_empty() {
            return Err(ConfigError::Invalid("sync.correlation_tag is empty".to_string()));
        }
        if self.sync.lookahead_days == 0 {
            return Err(ConfigError::Invalid("sync.lookahead_days must be positive".to_string()));
        }
        if self.sync.lookahead_days > MAX_LOOKAHEAD_DAYS {
            return Err(ConfigError::Invalid(format!(
                "sync.lookahead_days must be at most {}",
                MAX_LOOKAHEAD_DAYS
            )));
        }
        if self.sync.lookback_hours > MAX_LOOKBACK_HOURS {
            return Err(ConfigError::Invalid(format!(
                "sync.lookback_hours must be at most {}",
                MAX_LOOKBACK_HOURS
            )));
        }
        Ok(())
    }

    fn normalized(mut self) -> Self {
        self.classifier.subgroup = self.classifier.subgroup.trim().to_lowercase();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = Self::config_dir();

        Self {
            google: GoogleConfig {
                client_id: String::new(),
                client_secret: String::new(),
                token_cache: config_dir.join("token.json"),
            },
            calendars: CalendarsConfig {
                source: String::new(),
                destination: "primary".to_string(),
            },
            classifier: ClassifierConfig {
                group_number: 0,
                subgroup: "a".to_string(),
                keywords: vec!["Group".to_string()],
                location_keywords: vec!["Carroll".to_string()],
                mandatory_keywords: ["Midterm", "Chapel", "SEQ", "MCQ", "Quiz"]
                    .iter()
                    .map(|k| k.to_string())
                    .collect(),
                eligibility_rule: EligibilityRule::Standard,
            },
            sync: SyncConfig {
                lookback_hours: 24,
                lookahead_days: 14,
                correlation_tag: "sourceEventId".to_string(),
                interval_minutes: 15,
            },
        }
    }
}
