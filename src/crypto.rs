//! AES-256-GCM sealing of refresh tokens.
//!
//! The key is `sha256(secret)`. Every call to [`seal`] draws a fresh 96-bit
//! nonce. Sealed blobs are laid out as `nonce(12) || tag(16) || ciphertext`
//! and stored as standard base64 by [`encrypt`].

use aes_gcm::{
    Aes256Gcm, Nonce, Tag,
    aead::{AeadCore, AeadInPlace, KeyInit, OsRng},
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Size of the GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

fn cipher_for(secret: &str) -> Result<Aes256Gcm> {
    let key = Sha256::digest(secret.as_bytes());
    Aes256Gcm::new_from_slice(&key).map_err(|e| Error::Cipher(e.to_string()))
}

/// Encrypts `plaintext` and returns the raw `nonce || tag || ciphertext` bytes.
pub fn seal(plaintext: &str, secret: &str) -> Result<Vec<u8>> {
    let cipher = cipher_for(secret)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let mut buffer = plaintext.as_bytes().to_vec();
    let tag = cipher
        .encrypt_in_place_detached(&nonce, b"", &mut buffer)
        .map_err(|_| Error::Cipher("plaintext could not be sealed".to_string()))?;

    let mut blob = Vec::with_capacity(NONCE_LEN + TAG_LEN + buffer.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&tag);
    blob.extend_from_slice(&buffer);
    Ok(blob)
}

/// Verifies and decrypts a blob produced by [`seal`].
///
/// Any truncation, bit flip or wrong secret fails with [`Error::AuthTag`];
/// corrupted plaintext is never returned.
pub fn open(blob: &[u8], secret: &str) -> Result<String> {
    if blob.len() < NONCE_LEN + TAG_LEN {
        return Err(Error::AuthTag);
    }

    let cipher = cipher_for(secret)?;
    let (nonce, rest) = blob.split_at(NONCE_LEN);
    let (tag, ciphertext) = rest.split_at(TAG_LEN);

    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(nonce),
            b"",
            &mut buffer,
            Tag::from_slice(tag),
        )
        .map_err(|_| Error::AuthTag)?;

    String::from_utf8(buffer).map_err(|_| Error::AuthTag)
}

/// [`seal`], encoded as standard base64 for storage in the settings document.
pub fn encrypt(plaintext: &str, secret: &str) -> Result<String> {
    Ok(BASE64.encode(seal(plaintext, secret)?))
}

/// Decodes and opens a blob produced by [`encrypt`].
pub fn decrypt(blob: &str, secret: &str) -> Result<String> {
    let raw = BASE64.decode(blob.trim()).map_err(|_| Error::AuthTag)?;
    open(&raw, secret)
}
