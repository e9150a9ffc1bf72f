//! Error types for sign-in, credential storage and Spotify API calls.
//!
//! Every message here is written for the person at the terminal. None of
//! them carry tokens, verifiers or the install secret.

use std::time::Duration;

/// Errors raised by the authentication subsystem and the API client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("sign-in was rejected: the redirect did not carry the expected state, please try again")]
    StateMismatch,

    #[error("sign-in was not completed within {}s, please try again", .0.as_secs())]
    RedirectTimeout(Duration),

    #[error("a sign-in is already waiting for the browser, finish or cancel it first")]
    LoginInProgress,

    #[error("sign-in was not completed: {error}{}", .description.as_deref().map(|d| format!(" ({d})")).unwrap_or_default())]
    AuthorizationDenied {
        error: String,
        description: Option<String>,
    },

    #[error("sign-in was not completed: {0}")]
    InvalidRedirect(String),

    #[error("cannot listen for the sign-in redirect on port {port}: {source}")]
    ListenerBind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("redirect listener stopped: {0}")]
    Listener(String),

    #[error("token endpoint rejected the request ({}): {body}", .status.map(|s| s.to_string()).unwrap_or_else(|| "no response".to_string()))]
    AuthExchange { status: Option<u16>, body: String },

    #[error("stored refresh token failed its integrity check")]
    AuthTag,

    #[error("encryption failed: {0}")]
    Cipher(String),

    #[error("not signed in to Spotify")]
    NotAuthenticated,

    #[error("no refresh token is stored")]
    MissingRefreshToken,

    #[error("your Spotify sign-in is no longer usable, please log in again")]
    ReauthRequired(#[source] Box<Error>),

    #[error("settings error: {0}")]
    Settings(String),

    #[error("Spotify API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Wraps an error as "the stored credential cannot be used any more".
    pub fn reauth(source: Error) -> Self {
        Error::ReauthRequired(Box::new(source))
    }

    /// A copy of this error for callers that share one operation's outcome.
    ///
    /// Transport and socket errors cannot be cloned; they come back as the
    /// variant that carries the same message.
    pub(crate) fn replay(&self) -> Error {
        match self {
            Error::Config(msg) => Error::Config(msg.clone()),
            Error::StateMismatch => Error::StateMismatch,
            Error::RedirectTimeout(after) => Error::RedirectTimeout(*after),
            Error::LoginInProgress => Error::LoginInProgress,
            Error::AuthorizationDenied { error, description } => Error::AuthorizationDenied {
                error: error.clone(),
                description: description.clone(),
            },
            Error::InvalidRedirect(msg) => Error::InvalidRedirect(msg.clone()),
            Error::ListenerBind { .. } => Error::Listener(self.to_string()),
            Error::Listener(msg) => Error::Listener(msg.clone()),
            Error::AuthExchange { status, body } => Error::AuthExchange {
                status: *status,
                body: body.clone(),
            },
            Error::AuthTag => Error::AuthTag,
            Error::Cipher(msg) => Error::Cipher(msg.clone()),
            Error::NotAuthenticated => Error::NotAuthenticated,
            Error::MissingRefreshToken => Error::MissingRefreshToken,
            Error::ReauthRequired(source) => Error::reauth(source.replay()),
            Error::Settings(msg) => Error::Settings(msg.clone()),
            Error::Api { status, body } => Error::Api {
                status: *status,
                body: body.clone(),
            },
            Error::Http(e) => Error::AuthExchange {
                status: e.status().map(|s| s.as_u16()),
                body: e.to_string(),
            },
        }
    }

    /// True when the only way forward is a fresh, user-initiated login.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Error::NotAuthenticated | Error::ReauthRequired(_) | Error::StateMismatch
        )
    }
}

/// Result alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;
