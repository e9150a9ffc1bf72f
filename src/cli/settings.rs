use serde_json::Value;

use crate::{
    config, error,
    management::{CREDENTIAL_KEY, SECRET_KEY},
    settings::{JsonFileSettings, SettingsMap, SettingsStore},
    success,
};

/// Keys owned by the credential manager and the secret store.
const RESERVED_KEYS: [&str; 2] = [CREDENTIAL_KEY, SECRET_KEY];

/// Replaces reserved entries so credentials never reach the terminal.
pub fn redact(mut map: SettingsMap) -> SettingsMap {
    for key in RESERVED_KEYS {
        if let Some(value) = map.get_mut(key) {
            *value = Value::String("[REDACTED]".to_string());
        }
    }
    map
}

/// Prints the settings document with credentials redacted.
pub async fn settings_get() {
    let settings = JsonFileSettings::new(config::settings_path());
    match settings.load().await {
        Ok(map) => match serde_json::to_string_pretty(&Value::Object(redact(map))) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Cannot format settings: {}", e),
        },
        Err(e) => error!("{}", e),
    }
}

/// Sets one top-level key. `value` is parsed as JSON, falling back to a string.
pub async fn settings_set(key: String, value: String) {
    let key = key.trim().to_string();
    if key.is_empty() {
        error!("Setting key must not be empty.");
    }
    if RESERVED_KEYS.contains(&key.as_str()) {
        error!("`{}` is managed by `djassist login` and cannot be set directly.", key);
    }

    let value = serde_json::from_str::<Value>(&value).unwrap_or(Value::String(value));
    let mut patch = SettingsMap::new();
    patch.insert(key.clone(), value);

    let settings = JsonFileSettings::new(config::settings_path());
    match settings.save(patch).await {
        Ok(_) => success!("Saved `{}` to {}", key, settings.path().display()),
        Err(e) => error!("{}", e),
    }
}
