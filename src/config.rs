//! Configuration resolver: base URL, environment flags, endpoint paths and
//! the API key used for every request.
//!
//! Values come from the [`Cli`](crate::cli::Cli) (flags or environment). The
//! API key has no built-in default: if neither the flag nor the stored key
//! file supplies one, resolution fails and the client never starts.

use secrecy::{ExposeSecret, SecretString};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Cli;
use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_APP_ENV: &str = "development";

const APP_DIR: &str = "user-admin";
const API_KEY_FILE: &str = "api_key";

/// Backend endpoint paths, relative to the base URL.
pub mod endpoints {
    pub fn users() -> &'static str {
        "/api/user"
    }

    pub fn user_by_id(id: &str) -> String {
        format!("/api/user/{id}")
    }

    /// Reserved by the backend; no client operation calls it.
    pub fn health() -> &'static str {
        "/api/health"
    }
}

/// Deployment environment named by `APP_ENV`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
    Other(String),
}

impl Environment {
    pub fn parse(name: &str) -> Self {
        match name {
            "development" => Self::Development,
            "staging" => Self::Staging,
            "production" => Self::Production,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
            Self::Other(name) => name,
        }
    }
}

/// Resolved runtime configuration.
#[derive(Clone, Debug)]
pub struct Config {
    base_url: String,
    environment: Environment,
    api_key: SecretString,
}

impl Config {
    pub fn new(base_url: &str, environment: Environment, api_key: SecretString) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            base_url: trimmed.to_string(),
            environment,
            api_key,
        })
    }

    /// Build the configuration from parsed flags, reading the stored key file
    /// when no key was passed explicitly.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let key_path = config_file_path(API_KEY_FILE);
        let api_key = resolve_api_key(cli.api_key.as_deref(), &key_path)?;
        if cli.remember_key {
            store_api_key(&key_path, &api_key)?;
        }
        Self::new(&cli.api_url, Environment::parse(&cli.app_env), api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn is_staging(&self) -> bool {
        self.environment == Environment::Staging
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn debug_logs(&self) -> bool {
        self.is_development()
    }

    pub fn request_timeout(&self) -> Duration {
        if self.is_production() {
            Duration::from_millis(5000)
        } else {
            Duration::from_millis(10000)
        }
    }

    /// Absolute URL for an endpoint path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Pick the API key: explicit value first, then the key file. Blank values
/// count as absent.
pub fn resolve_api_key(explicit: Option<&str>, key_file: &Path) -> Result<SecretString, ConfigError> {
    if let Some(key) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
        return Ok(SecretString::from(key.to_string()));
    }
    match std::fs::read_to_string(key_file) {
        Ok(contents) => {
            let key = contents.trim();
            if key.is_empty() {
                Err(ConfigError::MissingApiKey(key_file.display().to_string()))
            } else {
                Ok(SecretString::from(key.to_string()))
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ConfigError::MissingApiKey(key_file.display().to_string()))
        }
        Err(e) => Err(ConfigError::Io(e)),
    }
}

/// Persist the key so later runs can omit `--api-key`.
pub fn store_api_key(key_file: &Path, key: &SecretString) -> Result<(), ConfigError> {
    if let Some(parent) = key_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(key_file, format!("{}\n", key.expose_secret()))?;
    Ok(())
}

/// Per-user location of a config file (`~/.config/user-admin/<name>` on Linux).
/// Falls back to the working directory when the platform has no config dir.
pub fn config_file_path(name: &str) -> PathBuf {
    match dirs::config_dir() {
        Some(dir) => dir.join(APP_DIR).join(name),
        None => PathBuf::from(name),
    }
}

/// Default log file location.
pub fn default_log_path() -> PathBuf {
    match dirs::cache_dir() {
        Some(dir) => dir.join(APP_DIR).join("user-admin.log"),
        None => PathBuf::from("user-admin.log"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(env: &str) -> Config {
        Config::new(DEFAULT_API_URL, Environment::parse(env), SecretString::from("k".to_string())).unwrap()
    }

    #[test]
    fn endpoint_paths() {
        assert_eq!(endpoints::users(), "/api/user");
        assert_eq!(endpoints::user_by_id("42"), "/api/user/42");
        assert_eq!(endpoints::health(), "/api/health");
    }

    #[test]
    fn environment_flags_and_timeout() {
        let dev = config("development");
        assert!(dev.is_development() && !dev.is_staging() && !dev.is_production());
        assert!(dev.debug_logs());
        assert_eq!(dev.request_timeout(), Duration::from_millis(10000));

        let staging = config("staging");
        assert!(staging.is_staging());
        assert!(!staging.debug_logs());
        assert_eq!(staging.request_timeout(), Duration::from_millis(10000));

        let prod = config("production");
        assert!(prod.is_production());
        assert!(!prod.debug_logs());
        assert_eq!(prod.request_timeout(), Duration::from_millis(5000));

        let other = config("qa");
        assert_eq!(other.environment(), &Environment::Other("qa".into()));
        assert!(!other.is_development() && !other.is_staging() && !other.is_production());
        assert_eq!(other.request_timeout(), Duration::from_millis(10000));
    }

    #[test]
    fn url_joins_without_double_slash() {
        let cfg = Config::new("http://api.local:8080/", Environment::Development, SecretString::from("k".to_string())).unwrap();
        assert_eq!(cfg.base_url(), "http://api.local:8080");
        assert_eq!(cfg.url(&endpoints::user_by_id("a1")), "http://api.local:8080/api/user/a1");
    }

    #[test]
    fn rejects_non_http_base_url() {
        let res = Config::new("localhost:3000", Environment::Development, SecretString::from("k".to_string()));
        assert!(matches!(res, Err(ConfigError::InvalidBaseUrl(_))));
    }

    #[test]
    fn api_key_prefers_explicit_then_file_then_fails() {
        let dir = tempfile::tempdir().unwrap();
        let key_file = dir.path().join("api_key");

        let missing = resolve_api_key(None, &key_file);
        assert!(matches!(missing, Err(ConfigError::MissingApiKey(_))));

        std::fs::write(&key_file, "  stored-key \n").unwrap();
        let stored = resolve_api_key(None, &key_file).unwrap();
        assert_eq!(stored.expose_secret(), "stored-key");

        let explicit = resolve_api_key(Some("flag-key"), &key_file).unwrap();
        assert_eq!(explicit.expose_secret(), "flag-key");

        let blank = resolve_api_key(Some("   "), &key_file).unwrap();
        assert_eq!(blank.expose_secret(), "stored-key");
    }

    #[test]
    fn empty_key_file_fails_closed() {
        let dir = tempfile::tempdir().unwrap();
        let key_file = dir.path().join("api_key");
        std::fs::write(&key_file, "\n").unwrap();
        assert!(matches!(resolve_api_key(None, &key_file), Err(ConfigError::MissingApiKey(_))));
    }

    #[test]
    fn stored_key_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let key_file = dir.path().join("nested").join("api_key");
        store_api_key(&key_file, &SecretString::from("abc".to_string())).unwrap();
        assert_eq!(resolve_api_key(None, &key_file).unwrap().expose_secret(), "abc");
    }
}
