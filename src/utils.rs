use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::types::PkceSession;

/// Random bytes behind a PKCE code verifier (86 characters once encoded).
pub const VERIFIER_BYTES: usize = 64;

/// Random bytes behind the CSRF `state` parameter.
pub const STATE_BYTES: usize = 16;

/// Returns `len` bytes from the thread-local CSPRNG as unpadded base64url.
pub fn random_url_token(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::rng().fill(bytes.as_mut_slice());
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn generate_code_verifier() -> String {
    random_url_token(VERIFIER_BYTES)
}

/// `base64url(sha256(verifier))` without padding (the S256 method).
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

pub fn generate_state() -> String {
    random_url_token(STATE_BYTES)
}

/// Builds a fresh verifier/challenge/state triple for one login attempt.
pub fn generate_pkce() -> PkceSession {
    let verifier = generate_code_verifier();
    let challenge = generate_code_challenge(&verifier);
    PkceSession {
        verifier,
        challenge,
        state: generate_state(),
    }
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Splits a scope list on whitespace and commas, dropping empties and duplicates.
pub fn parse_scopes(input: &str) -> Vec<String> {
    let mut scopes: Vec<String> = Vec::new();
    for scope in input.split(|c: char| c.is_whitespace() || c == ',') {
        let scope = scope.trim();
        if !scope.is_empty() && !scopes.iter().any(|s| s == scope) {
            scopes.push(scope.to_string());
        }
    }
    scopes
}

/// Formats an epoch-millisecond timestamp in local time for terminal output.
pub fn format_millis(millis: i64) -> String {
    match chrono::DateTime::from_timestamp_millis(millis) {
        Some(dt) => dt
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => millis.to_string(),
    }
}
