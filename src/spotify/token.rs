use reqwest::Client;

use crate::{
    error::{Error, Result},
    types::TokenResponse,
};

/// Posts form-encoded grants to the provider's token endpoint.
///
/// Nothing here retries: authorization codes are single-use, and a rejected
/// refresh token will not start working on the second attempt.
#[derive(Debug, Clone)]
pub struct TokenClient {
    http: Client,
    token_url: String,
}

impl TokenClient {
    /// `auth_base` is the accounts service root, e.g. `https://accounts.spotify.com`.
    pub fn new(auth_base: &str) -> Self {
        Self::with_client(Client::new(), auth_base)
    }

    pub fn with_client(http: Client, auth_base: &str) -> Self {
        Self {
            http,
            token_url: format!("{}/api/token", auth_base.trim_end_matches('/')),
        }
    }

    /// Exchanges an authorization code plus its PKCE verifier for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        client_id: &str,
        code_verifier: &str,
    ) -> Result<TokenResponse> {
        self.grant(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", client_id),
            ("code_verifier", code_verifier),
        ])
        .await
    }

    /// Trades a refresh token for a new access token.
    ///
    /// The response may omit `refresh_token`, in which case the old one stays valid.
    pub async fn refresh(&self, refresh_token: &str, client_id: &str) -> Result<TokenResponse> {
        self.grant(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
        ])
        .await
    }

    async fn grant(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let grant_type = form
            .iter()
            .find(|(k, _)| *k == "grant_type")
            .map(|(_, v)| *v)
            .unwrap_or_default();

        let response = self
            .http
            .post(&self.token_url)
            .form(form)
            .send()
            .await
            .map_err(|e| Error::AuthExchange {
                status: e.status().map(|s| s.as_u16()),
                body: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| Error::AuthExchange {
            status: Some(status.as_u16()),
            body: e.to_string(),
        })?;

        if !status.is_success() {
            tracing::warn!(grant_type, status = status.as_u16(), "token grant rejected");
            return Err(Error::AuthExchange {
                status: Some(status.as_u16()),
                body,
            });
        }

        // the body holds live tokens, so only the parser position is reported
        serde_json::from_str::<TokenResponse>(&body).map_err(|e| Error::AuthExchange {
            status: Some(status.as_u16()),
            body: format!(
                "malformed token response (line {}, column {})",
                e.line(),
                e.column()
            ),
        })
    }
}
