use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    error::Result,
    settings::{SettingsMap, SettingsStore},
    utils,
};

/// Top-level settings key holding the install secret.
pub const SECRET_KEY: &str = "cryptoSecret";

/// Random bytes behind a newly generated install secret.
const SECRET_BYTES: usize = 32;

/// Owns the per-install secret that refresh tokens are encrypted under.
///
/// The secret is generated on first use and written once. It is never
/// rotated: replacing it would make every stored refresh token undecryptable.
pub struct SecretStore {
    settings: Arc<dyn SettingsStore>,
    create: Mutex<()>,
}

impl SecretStore {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            settings,
            create: Mutex::new(()),
        }
    }

    /// Returns the stored secret, generating and persisting one if absent.
    pub async fn get_or_create_secret(&self) -> Result<String> {
        let _create = self.create.lock().await;

        let current = self.settings.load().await?;
        if let Some(Value::String(secret)) = current.get(SECRET_KEY) {
            if !secret.is_empty() {
                return Ok(secret.clone());
            }
        }

        let secret = utils::random_url_token(SECRET_BYTES);
        let mut patch = SettingsMap::new();
        patch.insert(SECRET_KEY.to_string(), Value::String(secret.clone()));
        self.settings.save(patch).await?;

        tracing::info!("generated a new install secret");
        Ok(secret)
    }
}
