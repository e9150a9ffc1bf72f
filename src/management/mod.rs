//! Credential lifecycle: the install secret and the Spotify credential record.

mod auth;
mod secret;

pub use auth::AuthState;
pub use auth::CREDENTIAL_KEY;
pub use auth::CredentialManager;
pub use secret::SECRET_KEY;
pub use secret::SecretStore;
