//! Command-line interface. Every flag has an environment fallback so the
//! binary can be configured from a `.env` file the same way as from the shell.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{DEFAULT_API_URL, DEFAULT_APP_ENV};

/// TUI to manage user records served by a REST backend.
#[derive(Debug, Clone, Parser)]
#[command(name = "user-admin", version, about)]
pub struct Cli {
    /// Base URL of the backend API.
    #[arg(long, env = "API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Deployment environment: development, staging or production.
    #[arg(long, env = "APP_ENV", default_value = DEFAULT_APP_ENV)]
    pub app_env: String,

    /// API key sent as X-API-Key. Falls back to the stored key file.
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Store the key given with --api-key for later runs.
    #[arg(long, requires = "api_key")]
    pub remember_key: bool,

    /// Write logs to this file instead of the default cache location.
    #[arg(long, env = "USER_ADMIN_LOG")]
    pub log_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_flags_override_defaults() {
        let cli = Cli::parse_from([
            "user-admin",
            "--api-url",
            "https://api.example.test",
            "--app-env",
            "production",
            "--api-key",
            "k-123",
            "--remember-key",
        ]);
        assert_eq!(cli.api_url, "https://api.example.test");
        assert_eq!(cli.app_env, "production");
        assert_eq!(cli.api_key.as_deref(), Some("k-123"));
        assert!(cli.remember_key);
    }

    #[test]
    fn remember_key_needs_a_key() {
        let res = Cli::try_parse_from(["user-admin", "--remember-key"]);
        // API_KEY may be present in the environment; only assert when it is not.
        if std::env::var_os("API_KEY").is_none() {
            assert!(res.is_err());
        }
    }
}
