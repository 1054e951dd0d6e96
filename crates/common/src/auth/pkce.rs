//! PKCE (Proof Key for Code Exchange) implementation for OAuth 2.0
//!
//! Implements RFC 7636 with the `S256` method. The verifier binds an
//! authorization code to the party that started the flow, so an intercepted
//! code is useless without it.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random bytes behind verifiers and state tokens.
const RANDOM_BYTES: usize = 32;

fn random_urlsafe() -> String {
    let mut bytes = [0_u8; RANDOM_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a cryptographically secure code verifier
///
/// Returns 32 random bytes encoded as URL-safe base64 without padding
/// (43 characters, inside the RFC 7636 43-128 range).
#[must_use]
pub fn generate_code_verifier() -> String {
    random_urlsafe()
}

/// Generate code challenge from verifier using SHA256
///
/// Per RFC 7636, the challenge is BASE64URL(SHA256(ASCII(code_verifier))).
#[must_use]
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Generate a random state token identifying one authorization attempt
#[must_use]
pub fn generate_state() -> String {
    random_urlsafe()
}

/// PKCE challenge pair for OAuth 2.0 authorization
///
/// The verifier stays with the caller until token exchange; the challenge
/// and state travel in the authorization URL.
#[derive(Clone)]
pub struct PKCEChallenge {
    /// Random string (43 chars, base64url encoded), secret until exchange
    pub code_verifier: String,

    /// SHA256 hash of `code_verifier` (base64url encoded)
    pub code_challenge: String,

    /// Random token tying the redirect back to this attempt
    pub state: String,
}

impl PKCEChallenge {
    /// Generate a new PKCE challenge with fresh random values
    ///
    /// # Examples
    /// ```
    /// use leadflow_common::auth::pkce::PKCEChallenge;
    ///
    /// let challenge = PKCEChallenge::generate();
    /// assert_eq!(challenge.code_verifier.len(), 43);
    /// assert_eq!(challenge.challenge_method(), "S256");
    /// ```
    #[must_use]
    pub fn generate() -> Self {
        let code_verifier = generate_code_verifier();
        let code_challenge = generate_code_challenge(&code_verifier);
        let state = generate_state();

        Self { code_verifier, code_challenge, state }
    }

    /// Get the challenge method (always "S256" for SHA256)
    #[must_use]
    pub const fn challenge_method(&self) -> &'static str {
        "S256"
    }
}

// Keep the verifier out of debug output.
impl std::fmt::Debug for PKCEChallenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PKCEChallenge")
            .field("code_verifier", &"***")
            .field("code_challenge", &self.code_challenge)
            .field("state", &self.state)
            .finish()
    }
}
