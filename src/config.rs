//! Runtime configuration
//!
//! All settings come from environment variables (optionally loaded from a
//! `.env` file by the binary). The resulting [`Config`] is injected into the
//! application state, so handlers never consult the environment directly.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8080;

/// Default timeout for the reachability HEAD request
pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Server configuration
///
/// # Environment Variables
///
/// - `PORT` - Server port number (default: 8080)
/// - `WEBSITES_DB` - Path to the website records file (default: "websites.json")
/// - `USERS_DB` - Path to the admin credential file (default: "users.json")
/// - `VERIFY_TIMEOUT_SECS` - Reachability check timeout in seconds (default: 5)
/// - `AUTHORIZATION` - API token required on protected routes (default: unset, no check)
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub websites_path: PathBuf,
    pub users_path: PathBuf,
    pub verify_timeout: Duration,
    pub api_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            websites_path: PathBuf::from("websites.json"),
            users_path: PathBuf::from("users.json"),
            verify_timeout: DEFAULT_VERIFY_TIMEOUT,
            api_token: None,
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment
    ///
    /// Values that fail to parse fall back to their defaults, and an empty
    /// `AUTHORIZATION` value disables the token check.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);

        let websites_path = env::var("WEBSITES_DB")
            .map(PathBuf::from)
            .unwrap_or(defaults.websites_path);

        let users_path = env::var("USERS_DB")
            .map(PathBuf::from)
            .unwrap_or(defaults.users_path);

        let verify_timeout = env::var("VERIFY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.verify_timeout);

        let api_token = env::var("AUTHORIZATION")
            .ok()
            .filter(|token| !token.is_empty());

        Self {
            port,
            websites_path,
            users_path,
            verify_timeout,
            api_token,
        }
    }

    /// Returns the API token when the token check is enabled
    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref().filter(|token| !token.is_empty())
    }
}
