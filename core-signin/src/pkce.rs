//! PKCE Material Generation
//!
//! Implements the client-held secret side of RFC 7636: a random nonce
//! (carried as the OAuth `state` parameter), a code verifier, and the S256
//! code challenge derived from it.
//!
//! # Security
//!
//! All randomness comes from the platform CSPRNG via `rand::thread_rng`.
//! Verifiers and nonces are never logged.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fmt::Write as _;

/// Generate an opaque random value: 128 bits of cryptographically secure
/// randomness, hashed with SHA-256 over its decimal string representation,
/// returned as lowercase hex.
///
/// Used both for the `state` nonce and for code verifiers; the 64-character
/// hex form sits comfortably inside RFC 7636's 43-128 character window.
pub fn generate_nonce() -> String {
    let bits: u128 = rand::thread_rng().gen();
    let digest = Sha256::digest(bits.to_string().as_bytes());
    digest.iter().fold(String::with_capacity(64), |mut out, b| {
        let _ = write!(out, "{:02x}", b);
        out
    })
}

/// Compute the S256 code challenge for a verifier:
/// `BASE64URL(SHA256(code_verifier))`, padding stripped. Pure function.
pub fn code_challenge(code_verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(code_verifier.as_bytes()))
}

/// The full PKCE material for one authorization round-trip.
///
/// The verifier must survive the page navigation to the authorization
/// server, so the orchestrator persists it in durable storage before
/// redirecting; the nonce only travels in the URL.
#[derive(Clone)]
pub struct PkceMaterial {
    /// CSRF/replay correlation value, sent as the `state` parameter.
    pub nonce: String,
    /// Client-held secret, persisted across the redirect boundary.
    pub code_verifier: String,
    /// S256 challenge sent with the authorize request.
    pub code_challenge: String,
}

impl PkceMaterial {
    /// Generate fresh material for a new authorization attempt.
    pub fn generate() -> Self {
        let nonce = generate_nonce();
        let code_verifier = generate_nonce();
        let code_challenge = code_challenge(&code_verifier);
        Self {
            nonce,
            code_verifier,
            code_challenge,
        }
    }
}

// Verifier is a secret; keep it out of Debug output.
impl fmt::Debug for PkceMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PkceMaterial")
            .field("nonce", &self.nonce)
            .field("code_verifier", &"[REDACTED]")
            .field("code_challenge", &self.code_challenge)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonce_is_lowercase_hex() {
        let nonce = generate_nonce();
        assert_eq!(nonce.len(), 64);
        assert!(nonce.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_nonces_are_unique() {
        let a = generate_nonce();
        let b = generate_nonce();
        assert_ne!(a, b);
    }

    #[test]
    fn test_challenge_matches_rfc7636_vector() {
        // Appendix B of RFC 7636.
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert_eq!(
            code_challenge(verifier),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_challenge_is_deterministic() {
        let material = PkceMaterial::generate();
        assert_eq!(
            material.code_challenge,
            code_challenge(&material.code_verifier)
        );
        assert_eq!(
            code_challenge(&material.code_verifier),
            code_challenge(&material.code_verifier)
        );
    }

    #[test]
    fn test_challenge_is_url_safe_without_padding() {
        let challenge = code_challenge(&generate_nonce());
        assert!(!challenge.contains('+'));
        assert!(!challenge.contains('/'));
        assert!(!challenge.contains('='));
    }

    #[test]
    fn test_material_debug_redacts_verifier() {
        let material = PkceMaterial::generate();
        let debug_str = format!("{:?}", material);
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains(&material.code_verifier));
    }
}
