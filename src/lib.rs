//! DJ Assistant Library
//!
//! Signs a DJ in to Spotify with the OAuth 2.0 Authorization Code flow and
//! PKCE, keeps the resulting credential encrypted at rest, renews the access
//! token when it expires, and uses it to look up tracks, audio features and
//! recommendations.
//!
//! # Modules
//!
//! - `api` - HTTP handlers of the local redirect listener
//! - `browser` - hand-off of the authorization URL to the system browser
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `crypto` - AES-256-GCM sealing of refresh tokens
//! - `error` - Error taxonomy shared by the library
//! - `management` - Install secret and credential lifecycle
//! - `server` - Single-use local HTTP listener for the OAuth redirect
//! - `settings` - Persistent JSON settings document
//! - `spotify` - Token endpoint and Web API clients
//! - `types` - Data structures and type definitions
//! - `utils` - PKCE generation and small helpers
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use djassist::{browser::SystemBrowser, config, management::CredentialManager, settings::JsonFileSettings};
//!
//! #[tokio::main]
//! async fn main() -> djassist::Res<()> {
//!     config::load_env().await?;
//!     let settings = Arc::new(JsonFileSettings::new(config::settings_path()));
//!     let manager = CredentialManager::new(settings, Arc::new(SystemBrowser), config::AuthConfig::from_env()?);
//!     let token = manager.get_access_token().await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod browser;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod management;
pub mod server;
pub mod settings;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::{Error, Result};

/// Boxed Result alias for command-line glue.
///
/// Library operations return the typed [`Result`]; command handlers mix
/// those with configuration and I/O failures and only need to report them.
///
/// ```
/// use djassist::Res;
///
/// async fn read_setting() -> Res<String> {
///     Ok("value".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational line with a blue `o` marker.
///
/// ```
/// info!("Token expires at {}", expiry);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success line with a green checkmark.
///
/// ```
/// success!("Signed in to Spotify");
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error line with a red `!` marker and exits with status 1.
///
/// Only for failures the command cannot recover from; nothing after the
/// call runs.
///
/// ```
/// error!("Cannot load environment. Err: {}", e);
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning line with a yellow `!` marker.
///
/// ```
/// warning!("Failed to open browser, open this URL manually:\n{}", url);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
