use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{config, error, info, success, utils, warning};

use super::{auth_config, credential_manager, credential_manager_with, fail};

/// Signs in to Spotify through the system browser.
///
/// `client_id` and `scopes` fall back to `SPOTIFY_CLIENT_ID` and
/// `SPOTIFY_SCOPES`; `timeout_secs` overrides `DJASSIST_LOGIN_TIMEOUT_SECS`.
/// A spinner runs while the browser round trip is pending.
pub async fn login(client_id: Option<String>, scopes: Vec<String>, timeout_secs: Option<u64>) {
    let Some(client_id) = client_id.or_else(config::spotify_client_id) else {
        error!("No client id given. Pass --client-id or set SPOTIFY_CLIENT_ID.");
    };
    let scopes = if scopes.is_empty() {
        config::spotify_scopes()
    } else {
        utils::parse_scopes(&scopes.join(" "))
    };

    let mut auth_config = auth_config();
    if let Some(secs) = timeout_secs {
        auth_config.login_timeout = Duration::from_secs(secs);
    }
    let manager = credential_manager_with(auth_config);

    let pb = ProgressBar::new_spinner();
    pb.set_message("Waiting for Spotify sign-in in your browser...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let outcome = manager.login(&client_id, &scopes).await;
    pb.finish_and_clear();

    match outcome {
        Ok(credential) => {
            success!("Signed in to Spotify.");
            info!(
                "Access token valid until {}",
                utils::format_millis(credential.access_expires_at)
            );
            if !credential.has_refresh_token {
                warning!("Spotify did not issue a refresh token; you will need to log in again when it expires.");
            }
        }
        Err(e) => error!("{}", e),
    }
}

/// Shows the stored credential. Never prints tokens.
pub async fn status() {
    let manager = credential_manager();
    match manager.current().await {
        Ok(Some(credential)) => {
            info!("Client id: {}", credential.client_id);
            let now = utils::now_millis();
            if now < credential.access_expires_at {
                info!(
                    "Access token valid until {}",
                    utils::format_millis(credential.access_expires_at)
                );
            } else {
                info!(
                    "Access token expired at {}",
                    utils::format_millis(credential.access_expires_at)
                );
            }
            if credential.has_refresh_token {
                info!("Refresh token: stored (encrypted)");
            } else {
                warning!("Refresh token: none");
            }
        }
        Ok(None) => warning!("Not signed in. Run `djassist login`."),
        Err(e) => fail("Cannot read credentials", e),
    }
}

/// Prints a valid access token to stdout, refreshing it first if it expired.
pub async fn token() {
    let manager = credential_manager();
    match manager.get_access_token().await {
        Ok(token) => println!("{}", token),
        Err(e) => fail("Cannot get an access token", e),
    }
}
