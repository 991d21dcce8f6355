use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Where entries and accounts live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// SQLite file on this machine, no real accounts
    Local,
    /// Hosted REST table and auth service
    Remote,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Local => write!(f, "local"),
            Backend::Remote => write!(f, "remote"),
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Backend::Local),
            "remote" => Ok(Backend::Remote),
            _ => Err(format!(
                "Invalid backend '{}'. Valid options: local, remote",
                s
            )),
        }
    }
}

/// Hosted backend settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RemoteConfig {
    /// Project URL (e.g., "https://abc.example.co")
    pub url: Option<String>,
    /// Public API key sent with every request
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl RemoteConfig {
    /// Returns true if both url and api_key are set
    pub fn is_configured(&self) -> bool {
        self.url.is_some() && self.api_key.is_some()
    }

    /// The url and api key, or an error naming the missing setting.
    pub fn require(&self) -> Result<(&str, &str), ConfigError> {
        let url = self
            .url
            .as_deref()
            .ok_or(ConfigError::MissingSetting("remote.url"))?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ConfigError::MissingSetting("remote.api_key"))?;
        Ok((url, api_key))
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub backend: ConfigValue<Backend>,
    /// Path to the SQLite database (local backend)
    pub database_path: ConfigValue<PathBuf>,
    /// Where the signed-in session is kept between runs
    pub session_path: ConfigValue<PathBuf>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    pub remote: RemoteConfig,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    backend: Option<Backend>,
    database_path: Option<PathBuf>,
    session_path: Option<PathBuf>,
    remote: Option<RemoteConfig>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let data_dir = Self::default_data_dir();

        // Start with defaults
        let mut backend = ConfigValue::new(Backend::Local, ConfigSource::Default);
        let mut database_path =
            ConfigValue::new(data_dir.join("gymlog.db"), ConfigSource::Default);
        let mut session_path =
            ConfigValue::new(data_dir.join("session.yaml"), ConfigSource::Default);
        let mut config_file = None;
        let mut remote = RemoteConfig::default();

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            // Resolve relative paths against config file's directory
            let resolve = |p: PathBuf| {
                if p.is_relative() {
                    path.parent().map(|dir| dir.join(&p)).unwrap_or(p)
                } else {
                    p
                }
            };

            if let Some(b) = file_config.backend {
                backend = ConfigValue::new(b, ConfigSource::File);
            }
            if let Some(db_path) = file_config.database_path {
                database_path = ConfigValue::new(resolve(db_path), ConfigSource::File);
            }
            if let Some(s_path) = file_config.session_path {
                session_path = ConfigValue::new(resolve(s_path), ConfigSource::File);
            }
            if let Some(remote_config) = file_config.remote {
                remote = remote_config;
            }

            config_file = Some(path.clone());
        }

        // Apply environment variable overrides
        if let Ok(b) = std::env::var("GYMLOG_BACKEND") {
            let parsed = b.parse().map_err(ConfigError::InvalidValue)?;
            backend = ConfigValue::new(parsed, ConfigSource::Environment);
        }
        if let Ok(db_path) = std::env::var("GYMLOG_DATABASE_PATH") {
            database_path = ConfigValue::new(PathBuf::from(db_path), ConfigSource::Environment);
        }
        if let Ok(s_path) = std::env::var("GYMLOG_SESSION_PATH") {
            session_path = ConfigValue::new(PathBuf::from(s_path), ConfigSource::Environment);
        }
        if let Ok(url) = std::env::var("GYMLOG_REMOTE_URL") {
            remote.url = Some(url);
        }
        if let Ok(key) = std::env::var("GYMLOG_REMOTE_API_KEY") {
            remote.api_key = Some(key);
        }

        Ok(Self {
            backend,
            database_path,
            session_path,
            config_file,
            remote,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/gymlog/
    /// - macOS: ~/Library/Application Support/gymlog/
    /// - Windows: %APPDATA%/gymlog/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gymlog")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/gymlog/
    /// - macOS: ~/Library/Application Support/gymlog/
    /// - Windows: %APPDATA%/gymlog/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gymlog")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(String),
    MissingSetting(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(e) => write!(f, "{}", e),
            ConfigError::MissingSetting(key) => {
                write!(f, "Remote backend selected but '{}' is not set", key)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
