use base64::{Engine, engine::general_purpose::STANDARD};
use djassist::{
    Error,
    crypto::{self, NONCE_LEN, TAG_LEN},
};

const SECRET: &str = "install-secret-for-tests";

#[test]
fn test_encrypt_decrypt_round_trip() {
    let blob = crypto::encrypt("refresh-token-value", SECRET).unwrap();
    assert_eq!(crypto::decrypt(&blob, SECRET).unwrap(), "refresh-token-value");
}

#[test]
fn test_round_trip_empty_and_unicode() {
    for plaintext in ["", "Überfahrt – 東京 🎧"] {
        let blob = crypto::encrypt(plaintext, SECRET).unwrap();
        assert_eq!(crypto::decrypt(&blob, SECRET).unwrap(), plaintext);
    }
}

#[test]
fn test_ciphertext_does_not_contain_plaintext() {
    let blob = crypto::encrypt("AQBvery-secret-refresh", SECRET).unwrap();
    assert!(!blob.contains("AQBvery-secret-refresh"));

    let raw = STANDARD.decode(&blob).unwrap();
    assert_eq!(raw.len(), NONCE_LEN + TAG_LEN + "AQBvery-secret-refresh".len());
}

#[test]
fn test_same_plaintext_encrypts_differently() {
    let a = crypto::encrypt("same", SECRET).unwrap();
    let b = crypto::encrypt("same", SECRET).unwrap();
    assert_ne!(a, b);

    let nonce_a = &STANDARD.decode(&a).unwrap()[..NONCE_LEN];
    let nonce_b = &STANDARD.decode(&b).unwrap()[..NONCE_LEN];
    assert_ne!(nonce_a, nonce_b);
}

#[test]
fn test_any_flipped_bit_fails_authentication() {
    let raw = crypto::seal("refresh-token-value", SECRET).unwrap();

    for i in 0..raw.len() {
        let mut tampered = raw.clone();
        tampered[i] ^= 0x01;
        assert!(
            matches!(crypto::open(&tampered, SECRET), Err(Error::AuthTag)),
            "byte {} was not covered by the tag",
            i
        );
    }
}

#[test]
fn test_wrong_secret_fails_authentication() {
    let blob = crypto::encrypt("refresh-token-value", SECRET).unwrap();
    assert!(matches!(
        crypto::decrypt(&blob, "another-secret"),
        Err(Error::AuthTag)
    ));
}

#[test]
fn test_truncated_blob_fails_authentication() {
    let raw = crypto::seal("refresh-token-value", SECRET).unwrap();
    for len in [0, NONCE_LEN, NONCE_LEN + TAG_LEN - 1, raw.len() - 1] {
        assert!(matches!(
            crypto::open(&raw[..len], SECRET),
            Err(Error::AuthTag)
        ));
    }
}

#[test]
fn test_garbage_blob_fails_authentication() {
    assert!(matches!(
        crypto::decrypt("not base64 at all!", SECRET),
        Err(Error::AuthTag)
    ));
    assert!(matches!(crypto::decrypt("", SECRET), Err(Error::AuthTag)));
}
