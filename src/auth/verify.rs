//! RSA PKCS#1 v1.5 signature verification over server-issued challenges.
//!
//! The digest input is `challenge ‖ payload`, challenge bytes first,
//! payload bytes exactly as received. That ordering is a wire contract
//! shared with the signing client and applies uniformly, including to
//! payload-less envelopes (where the digest covers the challenge alone).

use crate::auth::envelope::Envelope;
use crate::auth::nonce::NonceAuthority;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::signature::DigestVerifier;
use rsa::RsaPublicKey;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha512};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Why a verification attempt was rejected.
///
/// Every variant is terminal for the request and maps to the same
/// caller-visible denial; the distinction exists for server-side logs.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("challenge is past the staleness window")]
    StaleChallenge,

    #[error("challenge does not match the live value")]
    ChallengeMismatch,

    #[error("signature verification failed")]
    BadSignature,

    #[error("signed payload does not decode: {0}")]
    PayloadDecode(String),

    #[error("envelope is malformed: {0}")]
    MalformedEnvelope(String),
}

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("failed to read public key file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse public key: {0}")]
    Parse(#[from] rsa::pkcs8::spki::Error),
}

/// Load the process-wide verification key from an SPKI PEM file.
///
/// Called once at startup; a failure here must abort the process rather
/// than let it serve unauthenticated writes.
pub fn load_public_key(path: &Path) -> Result<VerifyingKey<Sha512>, KeyError> {
    let pem = std::fs::read_to_string(path)?;
    let key = RsaPublicKey::from_public_key_pem(&pem)?;
    Ok(VerifyingKey::new(key))
}

/// Decides whether an envelope was produced by the holder of the private
/// key against the live challenge, and hands back the decoded payload.
pub struct SignatureVerifier {
    key: VerifyingKey<Sha512>,
    authority: Arc<NonceAuthority>,
    stale_after: Duration,
}

impl SignatureVerifier {
    pub fn new(
        key: VerifyingKey<Sha512>,
        authority: Arc<NonceAuthority>,
        stale_after: Duration,
    ) -> Self {
        SignatureVerifier {
            key,
            authority,
            stale_after,
        }
    }

    /// Verify an envelope and decode its payload into `T`.
    ///
    /// Cheap identity checks run before any cryptographic work, and the
    /// payload is never interpreted before the signature covering it has
    /// been validated. An empty payload decodes to `T::default()`.
    pub fn verify<T>(&self, envelope: &Envelope) -> Result<T, AuthError>
    where
        T: DeserializeOwned + Default,
    {
        // A signature computed against an expired challenge can never
        // succeed; rotate and bail before spending a verification on it.
        if self.authority.is_older_than(self.stale_after) {
            self.authority.rotate();
            return Err(AuthError::StaleChallenge);
        }

        // Spend the challenge. The authority rotates win or lose.
        if !self.authority.consume(&envelope.challenge) {
            return Err(AuthError::ChallengeMismatch);
        }

        let signature = Signature::try_from(envelope.signature.as_slice())
            .map_err(|_| AuthError::BadSignature)?;

        let mut digest = Sha512::new();
        digest.update(&envelope.challenge);
        digest.update(&envelope.payload);

        self.key
            .verify_digest(digest, &signature)
            .map_err(|_| AuthError::BadSignature)?;

        // The signature covers the payload; only now is it trusted.
        if envelope.payload.is_empty() {
            return Ok(T::default());
        }
        serde_json::from_slice(&envelope.payload)
            .map_err(|e| AuthError::PayloadDecode(e.to_string()))
    }
}
