//! The nonce authority: owner of the single live challenge.
//!
//! Exactly one challenge is live at any instant. It is replaced wholesale —
//! never mutated in place — whenever it is spent by a verification attempt,
//! read while stale, or explicitly rotated. An old value is never reachable
//! again once replaced.

use base64::{engine::general_purpose, Engine as _};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Challenge values are 64 bytes (512 bits) of CSPRNG output.
pub const CHALLENGE_LEN: usize = 64;

/// Current unix time in whole seconds.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// A server-issued anti-replay token. Immutable once issued.
#[derive(Clone)]
pub struct Challenge {
    pub value: [u8; CHALLENGE_LEN],
    /// Unix seconds at generation time.
    pub created_at: u64,
}

impl Challenge {
    /// Generate a fresh challenge.
    ///
    /// `rand::fill` draws from the OS RNG and panics if it fails; an
    /// authority that cannot obtain randomness must not keep serving.
    fn generate() -> Self {
        let mut value = [0u8; CHALLENGE_LEN];
        rand::fill(&mut value);
        Challenge {
            value,
            created_at: unix_now(),
        }
    }

    /// Age of this challenge, saturating at zero if the clock stepped back.
    pub fn age(&self) -> Duration {
        Duration::from_secs(unix_now().saturating_sub(self.created_at))
    }

    /// The value as standard base64, the wire encoding clients echo back.
    pub fn value_base64(&self) -> String {
        general_purpose::STANDARD.encode(self.value)
    }
}

/// Manages the live challenge and its freshness.
///
/// All operations take the single internal lock once and do their whole
/// read-modify-write inside it, so a rotation is never lost and a
/// comparison never observes a half-replaced value.
pub struct NonceAuthority {
    stale_after: Duration,
    live: Mutex<Challenge>,
}

impl NonceAuthority {
    /// Create the authority with an initial live challenge.
    pub fn new(stale_after: Duration) -> Self {
        NonceAuthority {
            stale_after,
            live: Mutex::new(Challenge::generate()),
        }
    }

    /// Return the live challenge, rotating first if it has gone stale.
    ///
    /// The caller never receives a challenge already too old to survive
    /// the verification window.
    pub fn current(&self) -> Challenge {
        let mut live = self.lock();
        if live.age() > self.stale_after {
            *live = Challenge::generate();
        }
        live.clone()
    }

    /// Replace the live challenge with a fresh one.
    pub fn rotate(&self) {
        *self.lock() = Challenge::generate();
    }

    /// Whether the live challenge is older than `d`.
    pub fn is_older_than(&self, d: Duration) -> bool {
        self.lock().age() > d
    }

    /// Compare `candidate` against the live value, then rotate regardless
    /// of the outcome and return the comparison result.
    ///
    /// A mismatch still burns the challenge: every issued value is worth
    /// exactly one guess, and a previously observed valid envelope can
    /// never be replayed.
    pub fn consume(&self, candidate: &[u8]) -> bool {
        let mut live = self.lock();
        let matched = candidate == live.value.as_slice();
        *live = Challenge::generate();
        matched
    }

    fn lock(&self) -> MutexGuard<'_, Challenge> {
        self.live.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Shift the live challenge's creation time into the past.
    #[cfg(test)]
    pub(crate) fn backdate(&self, secs: u64) {
        let mut live = self.lock();
        live.created_at = live.created_at.saturating_sub(secs);
    }

    /// Replace the live challenge with a known value, freshly stamped.
    #[cfg(test)]
    pub(crate) fn install(&self, value: [u8; CHALLENGE_LEN]) {
        *self.lock() = Challenge {
            value,
            created_at: unix_now(),
        };
    }
}
