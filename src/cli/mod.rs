//! # CLI Module
//!
//! The command-line layer of the DJ assistant. Each command builds what it
//! needs from [`crate::config`], delegates to the library, and turns the
//! outcome into terminal output with the `info!`/`success!`/`warning!`/
//! `error!` macros.
//!
//! ## Commands
//!
//! ### Authentication
//!
//! - [`login`] - Spotify sign-in with PKCE through the system browser
//! - [`status`] - shows the stored credential without touching the network
//! - [`token`] - prints a valid access token, refreshing it if needed
//!
//! ### Catalogue
//!
//! - [`search`] - track search
//! - [`track`] - a single track by id
//! - [`features`] - audio features (tempo, key, energy) for tracks
//! - [`recommend`] - recommendations from seeds and tuning targets
//!
//! ### Settings
//!
//! - [`settings_get`] / [`settings_set`] - read and shallow-merge the settings
//!   document. The credential and install secret entries are off limits.
//!
//! ## Error Handling
//!
//! Failures that need a new sign-in point the user at `djassist login`;
//! everything else is printed once and the process exits with status 1.

mod auth;
mod settings;
mod tracks;

use std::sync::Arc;

pub use auth::login;
pub use auth::status;
pub use auth::token;
pub use settings::settings_get;
pub use settings::settings_set;
pub use tracks::features;
pub use tracks::recommend;
pub use tracks::search;
pub use tracks::track;

use crate::{
    browser::SystemBrowser,
    config::{self, AuthConfig},
    error,
    management::CredentialManager,
    settings::JsonFileSettings,
    spotify::SpotifyClient,
};

fn auth_config() -> AuthConfig {
    match AuthConfig::from_env() {
        Ok(c) => c,
        Err(e) => error!("{}", e),
    }
}

fn credential_manager_with(auth_config: AuthConfig) -> Arc<CredentialManager> {
    let settings = Arc::new(JsonFileSettings::new(config::settings_path()));
    Arc::new(CredentialManager::new(
        settings,
        Arc::new(SystemBrowser),
        auth_config,
    ))
}

fn credential_manager() -> Arc<CredentialManager> {
    credential_manager_with(auth_config())
}

fn spotify_client() -> SpotifyClient {
    SpotifyClient::new(&config::spotify_api_base(), credential_manager())
}

/// Prints a library error and exits, with login guidance where it applies.
fn fail(context: &str, err: crate::Error) -> ! {
    if err.requires_login() {
        error!("{}: {}\nRun `djassist login` to sign in again.", context, err);
    }
    error!("{}: {}", context, err);
}
