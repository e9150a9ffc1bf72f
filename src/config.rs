//! Configuration management for the DJ assistant.
//!
//! Values are read from environment variables. Before anything else runs,
//! [`load_env`] seeds the environment from an optional `.env` file in the
//! platform-specific local data directory, so the hierarchy is:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Built-in defaults

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use crate::{
    error::{Error, Result},
    utils,
};

pub const DEFAULT_AUTH_BASE: &str = "https://accounts.spotify.com";
pub const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";
pub const DEFAULT_REDIRECT_PORT: u16 = 43563;
pub const DEFAULT_REDIRECT_PATH: &str = "/callback";
pub const DEFAULT_LOGIN_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_EXPIRY_MARGIN_SECS: u64 = 30;
pub const DEFAULT_SCOPES: &str = "user-read-private";

/// Loads environment variables from `djassist/.env` in the local data directory.
///
/// The directory is created if needed. A missing `.env` file is fine; a file
/// that exists but cannot be parsed is reported.
///
/// The file is looked up in:
/// - Linux: `~/.local/share/djassist/.env`
/// - macOS: `~/Library/Application Support/djassist/.env`
/// - Windows: `%LOCALAPPDATA%/djassist/.env`
pub async fn load_env() -> std::result::Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("djassist/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if async_fs::metadata(&path).await.is_err() {
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| format!("{}: {}", path.display(), e))
}

fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed<T: FromStr>(name: &str, default: T) -> Result<T> {
    match var(name) {
        Some(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("{name} has an invalid value: {raw}"))),
        None => Ok(default),
    }
}

/// Default client id for `login`, from `SPOTIFY_CLIENT_ID`.
pub fn spotify_client_id() -> Option<String> {
    var("SPOTIFY_CLIENT_ID")
}

/// Requested scopes, from `SPOTIFY_SCOPES` (space or comma separated).
pub fn spotify_scopes() -> Vec<String> {
    utils::parse_scopes(&var("SPOTIFY_SCOPES").unwrap_or_else(|| DEFAULT_SCOPES.to_string()))
}

/// Base of the accounts service (`/authorize`, `/api/token`).
pub fn spotify_auth_base() -> String {
    var("SPOTIFY_AUTH_BASE").unwrap_or_else(|| DEFAULT_AUTH_BASE.to_string())
}

/// Base of the Web API used by the API client.
pub fn spotify_api_base() -> String {
    var("SPOTIFY_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}

/// Location of the settings document.
///
/// Defaults to `~/.dj-assistant/settings.json`, overridable with
/// `DJASSIST_SETTINGS_PATH`.
pub fn settings_path() -> PathBuf {
    if let Some(path) = var("DJASSIST_SETTINGS_PATH") {
        return PathBuf::from(path);
    }
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".dj-assistant/settings.json");
    path
}

/// Everything the credential manager needs to know about the provider and
/// the local redirect.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub auth_base: String,
    /// Must match the redirect URI registered with Spotify. `0` binds an
    /// ephemeral port, which only makes sense against a test provider.
    pub redirect_port: u16,
    pub redirect_path: String,
    /// Upper bound on waiting for the browser redirect.
    pub login_timeout: Duration,
    /// Subtracted from `expires_in` so a "valid" token has real lifetime left.
    pub expiry_margin_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            auth_base: DEFAULT_AUTH_BASE.to_string(),
            redirect_port: DEFAULT_REDIRECT_PORT,
            redirect_path: DEFAULT_REDIRECT_PATH.to_string(),
            login_timeout: Duration::from_secs(DEFAULT_LOGIN_TIMEOUT_SECS),
            expiry_margin_secs: DEFAULT_EXPIRY_MARGIN_SECS,
        }
    }
}

impl AuthConfig {
    pub fn from_env() -> Result<Self> {
        let mut redirect_path =
            var("DJASSIST_REDIRECT_PATH").unwrap_or_else(|| DEFAULT_REDIRECT_PATH.to_string());
        if !redirect_path.starts_with('/') {
            redirect_path.insert(0, '/');
        }

        Ok(Self {
            auth_base: spotify_auth_base(),
            redirect_port: parsed("DJASSIST_REDIRECT_PORT", DEFAULT_REDIRECT_PORT)?,
            redirect_path,
            login_timeout: Duration::from_secs(parsed(
                "DJASSIST_LOGIN_TIMEOUT_SECS",
                DEFAULT_LOGIN_TIMEOUT_SECS,
            )?),
            expiry_margin_secs: parsed("DJASSIST_EXPIRY_MARGIN_SECS", DEFAULT_EXPIRY_MARGIN_SECS)?,
        })
    }

    /// The redirect URI for a listener bound on `port`.
    pub fn redirect_uri(&self, port: u16) -> String {
        format!("http://localhost:{}{}", port, self.redirect_path)
    }
}
