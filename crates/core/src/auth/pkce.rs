//! PKCE (Proof Key for Code Exchange) implementation for OAuth 2.0
//!
//! Implements RFC 7636. Verifiers are drawn from the URL-safe alphabet
//! `[A-Za-z0-9_-]` using the thread-local CSPRNG.

use authkit_domain::constants::{
    PKCE_CHALLENGE_METHOD, PKCE_DEFAULT_VERIFIER_LEN, PKCE_VERIFIER_MAX_LEN,
    PKCE_VERIFIER_MIN_LEN,
};
use authkit_domain::{AuthError, PkceChallenge, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};

const VERIFIER_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Generate a cryptographically secure code verifier of exactly `length`
/// characters.
///
/// # Errors
/// Returns `AuthError::InvalidRequest` if `length` is outside 43..=128.
pub fn generate_code_verifier(length: usize) -> Result<String> {
    if !(PKCE_VERIFIER_MIN_LEN..=PKCE_VERIFIER_MAX_LEN).contains(&length) {
        return Err(AuthError::InvalidRequest(format!(
            "code verifier length must be between {PKCE_VERIFIER_MIN_LEN} and \
             {PKCE_VERIFIER_MAX_LEN}, got {length}"
        )));
    }
    Ok(random_verifier(length))
}

fn random_verifier(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(VERIFIER_ALPHABET[rng.gen_range(0..VERIFIER_ALPHABET.len())]))
        .collect()
}

/// Generate code challenge from verifier using SHA256
///
/// Per RFC 7636, the challenge is BASE64URL(SHA256(ASCII(code_verifier))).
#[must_use]
pub fn generate_code_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Fresh 64-character verifier, its challenge, and method `S256`.
#[must_use]
pub fn generate_pkce_challenge() -> PkceChallenge {
    let code_verifier = random_verifier(PKCE_DEFAULT_VERIFIER_LEN);
    let code_challenge = generate_code_challenge(&code_verifier);
    PkceChallenge {
        code_verifier,
        code_challenge,
        code_challenge_method: PKCE_CHALLENGE_METHOD.to_string(),
    }
}

/// Generate a random state token for CSRF protection
///
/// Returns a URL-safe base64-encoded random string of 32 bytes (43 characters).
#[must_use]
pub fn generate_state() -> String {
    let random_bytes: [u8; 32] = rand::thread_rng().gen();
    URL_SAFE_NO_PAD.encode(random_bytes)
}

/// Validate that the state returned in the callback matches the one sent.
///
/// Compares every byte regardless of where the first mismatch is.
#[must_use]
pub fn validate_state(expected: &str, actual: &str) -> bool {
    expected.len() == actual.len()
        && expected.bytes().zip(actual.bytes()).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}
