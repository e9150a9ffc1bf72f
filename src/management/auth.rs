use std::{
    fmt,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use reqwest::Url;
use tracing::{debug, info, warn};

use crate::{
    browser::BrowserLauncher,
    config::AuthConfig,
    crypto,
    error::{Error, Result},
    management::SecretStore,
    server::RedirectListener,
    settings::{SettingsMap, SettingsStore},
    spotify::token::TokenClient,
    types::{CredentialRecord, PkceSession, PublicCredential, TokenResponse},
    utils, warning,
};

/// Top-level settings key holding the credential record.
pub const CREDENTIAL_KEY: &str = "spotify";

/// Where the credential manager is in the sign-in lifecycle.
///
/// `LoggedOut -> AwaitingRedirect -> Exchanging -> Authenticated`, and
/// `Authenticated -> Refreshing -> Authenticated`. Any step can end in
/// `Failed`, which only a new login leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    LoggedOut,
    AwaitingRedirect,
    Exchanging,
    Authenticated,
    Refreshing,
    Failed(String),
}

impl AuthState {
    fn is_logging_in(&self) -> bool {
        matches!(self, AuthState::AwaitingRedirect | AuthState::Exchanging)
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthState::LoggedOut => write!(f, "logged out"),
            AuthState::AwaitingRedirect => write!(f, "waiting for the browser"),
            AuthState::Exchanging => write!(f, "exchanging the authorization code"),
            AuthState::Authenticated => write!(f, "signed in"),
            AuthState::Refreshing => write!(f, "refreshing the access token"),
            AuthState::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

fn lock(state: &Mutex<AuthState>) -> MutexGuard<'_, AuthState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A state the manager entered and still owns.
///
/// Moves only happen while the shared state still equals the owned one, so a
/// refresh that finishes late cannot overwrite a login that started since.
/// Dropping an unfinished transition (a cancelled future) records a failure.
struct Transition<'a> {
    state: &'a Mutex<AuthState>,
    owned: Option<AuthState>,
}

impl Transition<'_> {
    fn advance(&mut self, next: AuthState) {
        let mut state = lock(self.state);
        if self.owned.as_ref() == Some(&*state) {
            *state = next.clone();
            self.owned = Some(next);
        }
    }

    fn finish(mut self, next: AuthState) {
        self.advance(next);
        self.owned = None;
    }
}

impl Drop for Transition<'_> {
    fn drop(&mut self) {
        if let Some(owned) = self.owned.take() {
            let mut state = lock(self.state);
            if *state == owned {
                *state = AuthState::Failed("cancelled".to_string());
            }
        }
    }
}

/// Outcome of the last refresh exchange, kept behind the single-flight guard.
///
/// `generation` counts finished exchanges. A caller that queued behind an
/// exchange sees the generation move and takes that exchange's failure
/// instead of sending the same refresh token again.
#[derive(Default)]
struct RefreshFlight {
    generation: u64,
    failure: Option<Error>,
}

/// Owns the Spotify credential: signs in, keeps the access token valid and is
/// the only writer of the `spotify` settings entry.
pub struct CredentialManager {
    settings: Arc<dyn SettingsStore>,
    secrets: SecretStore,
    tokens: TokenClient,
    browser: Arc<dyn BrowserLauncher>,
    config: AuthConfig,
    state: Mutex<AuthState>,
    refresh: tokio::sync::Mutex<RefreshFlight>,
    refresh_generation: AtomicU64,
}

impl CredentialManager {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        browser: Arc<dyn BrowserLauncher>,
        config: AuthConfig,
    ) -> Self {
        CredentialManager {
            secrets: SecretStore::new(Arc::clone(&settings)),
            tokens: TokenClient::new(&config.auth_base),
            settings,
            browser,
            config,
            state: Mutex::new(AuthState::LoggedOut),
            refresh: tokio::sync::Mutex::new(RefreshFlight::default()),
            refresh_generation: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> AuthState {
        lock(&self.state).clone()
    }

    /// Runs the full PKCE sign-in and persists the resulting credential.
    ///
    /// Nothing is written unless the code exchange succeeds. Only one login
    /// may wait for the browser at a time.
    pub async fn login(&self, client_id: &str, scopes: &[String]) -> Result<PublicCredential> {
        let client_id = client_id.trim();
        if client_id.is_empty() {
            return Err(Error::Config(
                "a Spotify client id is required to log in".to_string(),
            ));
        }

        let mut transition = self.begin_login()?;
        let outcome = self.run_login(client_id, scopes, &mut transition).await;

        match &outcome {
            Ok(_) => {
                info!(client_id, "signed in to Spotify");
                transition.finish(AuthState::Authenticated);
            }
            Err(e) => {
                warn!(error = %e, "sign-in failed");
                transition.finish(AuthState::Failed(e.to_string()));
            }
        }
        outcome
    }

    /// Returns a usable access token, refreshing it first if it has expired.
    ///
    /// A token that is still fresh is returned without any network call.
    /// Concurrent callers share a single refresh exchange.
    pub async fn get_access_token(&self) -> Result<String> {
        let record = self.load_record().await?.ok_or(Error::NotAuthenticated)?;
        if record.is_fresh(utils::now_millis()) {
            return Ok(record.access_token);
        }

        let seen = self.refresh_generation.load(Ordering::Acquire);
        let mut flight = self.refresh.lock().await;
        if flight.generation != seen {
            if let Some(failure) = &flight.failure {
                debug!("sharing the failure of a concurrent refresh");
                return Err(failure.replay());
            }
        }

        // whoever held the guard before us may already have refreshed
        let record = self.load_record().await?.ok_or(Error::NotAuthenticated)?;
        if record.is_fresh(utils::now_millis()) {
            debug!("access token was refreshed by a concurrent caller");
            return Ok(record.access_token);
        }

        let transition = self.begin_refresh();
        let outcome = self.refresh_record(record).await;

        flight.generation += 1;
        flight.failure = outcome.as_ref().err().map(Error::replay);
        self.refresh_generation
            .store(flight.generation, Ordering::Release);
        match &outcome {
            Ok(_) => transition.finish(AuthState::Authenticated),
            Err(e) => {
                warn!(error = %e, "access token refresh failed");
                transition.finish(AuthState::Failed(e.to_string()));
            }
        }
        outcome
    }

    /// The public view of the stored credential, without touching the network.
    pub async fn current(&self) -> Result<Option<PublicCredential>> {
        Ok(self.load_record().await?.map(|record| record.public()))
    }

    fn begin_login(&self) -> Result<Transition<'_>> {
        let mut state = lock(&self.state);
        if state.is_logging_in() {
            return Err(Error::LoginInProgress);
        }
        *state = AuthState::AwaitingRedirect;
        Ok(Transition {
            state: &self.state,
            owned: Some(AuthState::AwaitingRedirect),
        })
    }

    fn begin_refresh(&self) -> Transition<'_> {
        let mut state = lock(&self.state);
        if state.is_logging_in() {
            return Transition {
                state: &self.state,
                owned: None,
            };
        }
        *state = AuthState::Refreshing;
        Transition {
            state: &self.state,
            owned: Some(AuthState::Refreshing),
        }
    }

    async fn run_login(
        &self,
        client_id: &str,
        scopes: &[String],
        transition: &mut Transition<'_>,
    ) -> Result<PublicCredential> {
        let pkce = utils::generate_pkce();

        let listener =
            RedirectListener::bind(&self.config.redirect_path, self.config.redirect_port).await?;
        let redirect_uri = self.config.redirect_uri(listener.port());
        let auth_url = self.authorization_url(client_id, scopes, &redirect_uri, &pkce)?;

        if let Err(e) = self.browser.open_external(auth_url.as_str()) {
            warn!(error = %e, "failed to open the browser");
            warning!(
                "Failed to open browser. Please navigate to the following URL manually:\n{}",
                auth_url
            );
        }

        debug!(%redirect_uri, "waiting for the authorization redirect");
        let params = match tokio::time::timeout(self.config.login_timeout, listener.wait()).await {
            Ok(received) => received?,
            Err(_) => return Err(Error::RedirectTimeout(self.config.login_timeout)),
        };

        if params.state() != Some(pkce.state.as_str()) {
            return Err(Error::StateMismatch);
        }
        if let Some(error) = params.error() {
            return Err(Error::AuthorizationDenied {
                error: error.to_string(),
                description: params.error_description().map(str::to_string),
            });
        }
        let code = params.code().ok_or_else(|| {
            Error::InvalidRedirect("the redirect did not include an authorization code".to_string())
        })?;

        transition.advance(AuthState::Exchanging);
        let grant = self
            .tokens
            .exchange_code(code, &redirect_uri, client_id, &pkce.verifier)
            .await?;

        // a refresh in flight must not land on top of the new record
        let mut flight = self.refresh.lock().await;
        let record = self.record_from_grant(client_id, grant).await?;
        self.store(&record).await?;
        flight.failure = None;
        Ok(record.public())
    }

    fn authorization_url(
        &self,
        client_id: &str,
        scopes: &[String],
        redirect_uri: &str,
        pkce: &PkceSession,
    ) -> Result<Url> {
        let base = format!("{}/authorize", self.config.auth_base.trim_end_matches('/'));
        let scope = scopes.join(" ");
        Url::parse_with_params(
            &base,
            &[
                ("client_id", client_id),
                ("response_type", "code"),
                ("redirect_uri", redirect_uri),
                ("code_challenge_method", "S256"),
                ("code_challenge", pkce.challenge.as_str()),
                ("state", pkce.state.as_str()),
                ("scope", scope.as_str()),
            ],
        )
        .map_err(|e| Error::Config(format!("invalid Spotify auth base {}: {}", base, e)))
    }

    async fn record_from_grant(
        &self,
        client_id: &str,
        grant: TokenResponse,
    ) -> Result<CredentialRecord> {
        let refresh_token_enc = match grant.refresh_token.as_deref().filter(|t| !t.is_empty()) {
            Some(refresh_token) => {
                let secret = self.secrets.get_or_create_secret().await?;
                Some(crypto::encrypt(refresh_token, &secret)?)
            }
            // keep a refresh token we already hold for this same client
            None => self
                .load_record()
                .await?
                .filter(|previous| previous.client_id == client_id)
                .and_then(|previous| previous.refresh_token_enc),
        };

        Ok(CredentialRecord {
            client_id: client_id.to_string(),
            access_token: grant.access_token,
            access_expires_at: self.expires_at(grant.expires_in),
            refresh_token_enc,
        })
    }

    async fn refresh_record(&self, record: CredentialRecord) -> Result<String> {
        let Some(blob) = record.refresh_token_enc.as_deref().filter(|b| !b.is_empty()) else {
            return Err(Error::reauth(Error::MissingRefreshToken));
        };

        let secret = self.secrets.get_or_create_secret().await?;
        let refresh_token = crypto::decrypt(blob, &secret).map_err(Error::reauth)?;

        debug!(client_id = %record.client_id, "refreshing the access token");
        let grant = self
            .tokens
            .refresh(&refresh_token, &record.client_id)
            .await
            .map_err(Error::reauth)?;

        // a rotated refresh token replaces the stored one, otherwise it stays as is
        let refresh_token_enc = match grant.refresh_token.as_deref().filter(|t| !t.is_empty()) {
            Some(rotated) => Some(crypto::encrypt(rotated, &secret)?),
            None => record.refresh_token_enc.clone(),
        };

        let updated = CredentialRecord {
            access_token: grant.access_token,
            access_expires_at: self.expires_at(grant.expires_in),
            refresh_token_enc,
            ..record
        };
        self.store(&updated).await?;
        Ok(updated.access_token)
    }

    fn expires_at(&self, expires_in: u64) -> i64 {
        let lifetime = expires_in.saturating_sub(self.config.expiry_margin_secs);
        let lifetime_ms = i64::try_from(lifetime)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000);
        utils::now_millis().saturating_add(lifetime_ms)
    }

    async fn load_record(&self) -> Result<Option<CredentialRecord>> {
        let settings = self.settings.load().await?;
        let Some(value) = settings.get(CREDENTIAL_KEY).filter(|v| !v.is_null()) else {
            return Ok(None);
        };

        match serde_json::from_value::<CredentialRecord>(value.clone()) {
            Ok(record) if !record.access_token.is_empty() => Ok(Some(record)),
            Ok(_) => Ok(None),
            Err(e) => {
                warn!(category = ?e.classify(), "ignoring malformed Spotify credentials");
                Ok(None)
            }
        }
    }

    async fn store(&self, record: &CredentialRecord) -> Result<()> {
        let value = serde_json::to_value(record).map_err(|e| Error::Settings(e.to_string()))?;
        let mut patch = SettingsMap::new();
        patch.insert(CREDENTIAL_KEY.to_string(), value);
        self.settings.save(patch).await?;
        debug!(client_id = %record.client_id, "credential record saved");
        Ok(())
    }
}
