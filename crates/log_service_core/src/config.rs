//! Service configuration loaded once at bootstrap.
//!
//! # Responsibility
//! - Resolve database location, collection name and logging options.
//! - Validate values that later become SQL identifiers or logger specs.
//!
//! # Invariants
//! - Configuration is read once and injected; nothing re-reads it per call.
//! - A `CollectionName` is always a safe SQL identifier.

use crate::logging::default_log_level;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const ENV_PREFIX: &str = "LOG_SERVICE";
const CONFIG_FILE_BASENAME: &str = "log_service";
const DEFAULT_DATABASE_PATH: &str = "log_service.sqlite3";
const DEFAULT_COLLECTION: &str = "logs";

static COLLECTION_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").expect("valid collection regex"));

#[derive(Debug)]
pub enum ConfigError {
    Load(config::ConfigError),
    InvalidCollectionName(String),
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load(err) => write!(f, "failed to load configuration: {err}"),
            Self::InvalidCollectionName(name) => write!(
                f,
                "invalid collection name `{name}`; expected [A-Za-z_][A-Za-z0-9_]* up to 63 chars"
            ),
            Self::InvalidLogLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(value: config::ConfigError) -> Self {
        Self::Load(value)
    }
}

/// Validated collection (table) name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionName(String);

impl CollectionName {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        if COLLECTION_NAME_RE.is_match(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(ConfigError::InvalidCollectionName(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CollectionName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bootstrap configuration for the log service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    /// SQLite database file. `:memory:` opens a private in-memory database.
    pub database_path: PathBuf,
    /// Collection holding log documents.
    pub collection: String,
    pub log_level: String,
    /// Rolling log file directory; stderr when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            collection: DEFAULT_COLLECTION.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl ServiceConfig {
    /// Loads configuration from defaults, an optional `log_service.*` file,
    /// `.env` and `LOG_SERVICE_*` process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::load(None)
    }

    /// Same layering as [`ServiceConfig::from_env`], with an explicit variable
    /// map standing in for the process environment.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::load(Some(vars))
    }

    fn load(vars: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let builder = config::Config::builder()
            .set_default("database_path", DEFAULT_DATABASE_PATH)?
            .set_default("collection", DEFAULT_COLLECTION)?
            .set_default("log_level", default_log_level())?
            .add_source(config::File::with_name(CONFIG_FILE_BASENAME).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).source(vars));

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that cannot be validated by deserialization alone.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.collection_name()?;
        crate::logging::normalize_level(&self.log_level)
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))?;
        Ok(())
    }

    pub fn collection_name(&self) -> Result<CollectionName, ConfigError> {
        CollectionName::parse(&self.collection)
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }
}

#[cfg(test)]
mod tests {
    use super::{default_log_level, CollectionName, ConfigError, ServiceConfig};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let config = ServiceConfig::from_vars(HashMap::new()).unwrap();
        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn default_log_level_follows_build_mode() {
        let config = ServiceConfig::from_vars(HashMap::new()).unwrap();
        assert_eq!(config.log_level, default_log_level());
    }

    #[test]
    fn prefixed_variables_override_defaults() {
        let config = ServiceConfig::from_vars(vars(&[
            ("LOG_SERVICE_COLLECTION", "audit_logs"),
            ("LOG_SERVICE_DATABASE_PATH", "/var/lib/logs.db"),
            ("LOG_SERVICE_LOG_LEVEL", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.collection, "audit_logs");
        assert_eq!(config.database_path, PathBuf::from("/var/lib/logs.db"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn unsafe_collection_name_is_rejected() {
        let err = ServiceConfig::from_vars(vars(&[(
            "LOG_SERVICE_COLLECTION",
            "logs; DROP TABLE logs",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCollectionName(_)));
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let config = ServiceConfig {
            log_level: "verbose".to_string(),
            ..ServiceConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLogLevel(level)) if level == "verbose"
        ));
    }

    #[test]
    fn collection_name_accepts_identifiers_only() {
        assert!(CollectionName::parse("logs").is_ok());
        assert!(CollectionName::parse("_logs_2024").is_ok());
        assert!(CollectionName::parse("").is_err());
        assert!(CollectionName::parse("2logs").is_err());
        assert!(CollectionName::parse("log-records").is_err());
        assert!(CollectionName::parse(&"a".repeat(64)).is_err());
    }
}
