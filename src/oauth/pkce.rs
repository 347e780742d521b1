// ABOUTME: PKCE verifier/challenge generation and CSRF state tokens
// ABOUTME: Implements the S256 challenge method from RFC 7636
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::Rng;
use sha2::{Digest, Sha256};

/// Entropy of the code verifier in raw bytes (43 chars base64url-encoded)
const VERIFIER_ENTROPY_BYTES: usize = 32;

/// Entropy of the CSRF state token in raw bytes
const STATE_ENTROPY_BYTES: usize = 16;

/// `PKCE` (Proof Key for Code Exchange) parameters for one authorization
/// attempt
#[derive(Debug, Clone)]
pub struct PkceParams {
    /// Randomly generated code verifier (43-128 characters)
    pub code_verifier: String,
    /// SHA256 hash of the code verifier, base64url encoded
    pub code_challenge: String,
    /// Challenge method (always "S256")
    pub code_challenge_method: String,
}

impl PkceParams {
    /// Generate `PKCE` parameters with the `S256` challenge method
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; VERIFIER_ENTROPY_BYTES];
        rand::thread_rng().fill(&mut bytes[..]);
        let code_verifier = URL_SAFE_NO_PAD.encode(bytes);
        let code_challenge = code_challenge(&code_verifier);

        Self {
            code_verifier,
            code_challenge,
            code_challenge_method: "S256".into(),
        }
    }
}

/// S256 transform of a code verifier: base64url(SHA-256(verifier))
///
/// Pure and deterministic; must match the upstream's verification
/// byte-for-byte
#[must_use]
pub fn code_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Random hex state token for CSRF protection on the callback; unrelated to
/// the PKCE pair
#[must_use]
pub fn generate_state() -> String {
    let mut bytes = [0u8; STATE_ENTROPY_BYTES];
    rand::thread_rng().fill(&mut bytes[..]);
    hex::encode(bytes)
}
