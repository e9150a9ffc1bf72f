use std::collections::HashSet;

use djassist::utils::*;

fn is_url_safe(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[test]
fn test_generate_code_verifier() {
    let verifier = generate_code_verifier();

    // 64 random bytes, unpadded base64url
    assert_eq!(verifier.len(), 86);
    assert!(is_url_safe(&verifier));
    assert!(!verifier.contains('='));

    assert_ne!(verifier, generate_code_verifier());
}

#[test]
fn test_code_verifier_length_is_within_pkce_bounds() {
    for _ in 0..20 {
        let len = generate_code_verifier().len();
        assert!((43..=128).contains(&len));
    }
}

#[test]
fn test_generate_code_challenge_known_value() {
    assert_eq!(
        generate_code_challenge("hello"),
        "LPJNul-wow4m6DsqxbninhsWHlwfp0JecwQzYpOLmCQ"
    );
}

#[test]
fn test_generate_code_challenge_rfc7636_vector() {
    assert_eq!(
        generate_code_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
        "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
    );
}

#[test]
fn test_generate_code_challenge_is_deterministic() {
    let verifier = generate_code_verifier();
    let challenge = generate_code_challenge(&verifier);

    assert_eq!(challenge, generate_code_challenge(&verifier));
    assert_eq!(challenge.len(), 43);
    assert!(is_url_safe(&challenge));
}

#[test]
fn test_generate_state() {
    let state = generate_state();
    assert_eq!(state.len(), 22);
    assert!(is_url_safe(&state));

    let states: HashSet<String> = (0..100).map(|_| generate_state()).collect();
    assert_eq!(states.len(), 100);
}

#[test]
fn test_generate_pkce_links_verifier_and_challenge() {
    let pkce = generate_pkce();
    assert_eq!(pkce.challenge, generate_code_challenge(&pkce.verifier));
    assert_ne!(pkce.state, pkce.verifier);

    let other = generate_pkce();
    assert_ne!(pkce.verifier, other.verifier);
    assert_ne!(pkce.state, other.state);
}

#[test]
fn test_pkce_session_debug_hides_verifier() {
    let pkce = generate_pkce();
    let debug = format!("{:?}", pkce);
    assert!(!debug.contains(&pkce.verifier));
}

#[test]
fn test_parse_scopes() {
    assert_eq!(
        parse_scopes("user-read-private user-top-read"),
        vec!["user-read-private", "user-top-read"]
    );
    assert_eq!(
        parse_scopes(" user-read-private,playlist-modify-private ,, user-read-private "),
        vec!["user-read-private", "playlist-modify-private"]
    );
    assert!(parse_scopes("  , ").is_empty());
}

#[test]
fn test_format_millis() {
    assert_eq!(format_millis(0).len(), "1970-01-01 00:00:00".len());
    assert!(!format_millis(now_millis()).is_empty());
}
