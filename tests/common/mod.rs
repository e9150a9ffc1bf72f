#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use djassist::{
    browser::BrowserLauncher,
    config::AuthConfig,
    management::CredentialManager,
    settings::{MemorySettings, SettingsStore},
};
use reqwest::Url;

/// What the fake browser does with the authorization URL it is handed.
#[derive(Debug, Clone)]
pub enum Redirect {
    /// Follows the redirect with `code` and the state from the URL.
    Approve(String),
    /// Follows the redirect with `code` but a forged state.
    ForgedState(String),
    /// Follows the redirect with an `error` parameter.
    Deny(String),
    /// Never redirects.
    Ignore,
}

/// Stands in for the system browser: records the URL and plays the provider's
/// redirect back to the local listener.
pub struct FakeBrowser {
    redirect: Redirect,
    delay: Duration,
    opened: Mutex<Vec<String>>,
}

impl FakeBrowser {
    pub fn new(redirect: Redirect) -> Arc<Self> {
        Arc::new(Self {
            redirect,
            delay: Duration::ZERO,
            opened: Mutex::new(Vec::new()),
        })
    }

    pub fn delayed(redirect: Redirect, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            redirect,
            delay,
            opened: Mutex::new(Vec::new()),
        })
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    pub fn last_url(&self) -> Url {
        Url::parse(self.opened().last().expect("browser was never opened")).unwrap()
    }
}

pub fn query_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

impl BrowserLauncher for FakeBrowser {
    fn open_external(&self, url: &str) -> std::io::Result<()> {
        self.opened.lock().unwrap().push(url.to_string());

        let auth_url = Url::parse(url).unwrap();
        let redirect_uri = query_param(&auth_url, "redirect_uri").unwrap();
        let state = query_param(&auth_url, "state").unwrap();

        let mut target = Url::parse(&redirect_uri).unwrap();
        // the listener binds IPv4 loopback only
        target.set_host(Some("127.0.0.1")).unwrap();
        match &self.redirect {
            Redirect::Approve(code) => {
                target
                    .query_pairs_mut()
                    .append_pair("code", code)
                    .append_pair("state", &state);
            }
            Redirect::ForgedState(code) => {
                target
                    .query_pairs_mut()
                    .append_pair("code", code)
                    .append_pair("state", "forged");
            }
            Redirect::Deny(error) => {
                target
                    .query_pairs_mut()
                    .append_pair("error", error)
                    .append_pair("state", &state);
            }
            Redirect::Ignore => return Ok(()),
        }

        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = reqwest::get(target).await;
        });
        Ok(())
    }
}

/// Auth config pointed at a mock provider, with an ephemeral redirect port.
pub fn test_config(auth_base: &str) -> AuthConfig {
    AuthConfig {
        auth_base: auth_base.to_string(),
        redirect_port: 0,
        redirect_path: "/callback".to_string(),
        login_timeout: Duration::from_secs(5),
        expiry_margin_secs: 30,
    }
}

pub fn manager(
    settings: Arc<MemorySettings>,
    browser: Arc<FakeBrowser>,
    config: AuthConfig,
) -> CredentialManager {
    let settings: Arc<dyn SettingsStore> = settings;
    CredentialManager::new(settings, browser, config)
}

pub fn token_body(access_token: &str, expires_in: u64, refresh_token: Option<&str>) -> String {
    let mut body = serde_json::json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": expires_in,
        "scope": "user-read-private",
    });
    if let Some(refresh_token) = refresh_token {
        body["refresh_token"] = serde_json::Value::String(refresh_token.to_string());
    }
    body.to_string()
}
