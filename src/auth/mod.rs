//! Nonce-challenge request authentication.
//!
//! A single trusted client proves authorship of write requests with an
//! RSA signature over a server-issued, time-bounded, single-use challenge.

pub mod envelope;
pub mod nonce;
pub mod verify;

pub use envelope::Envelope;
pub use nonce::{Challenge, NonceAuthority, CHALLENGE_LEN};
pub use verify::{load_public_key, AuthError, SignatureVerifier};
