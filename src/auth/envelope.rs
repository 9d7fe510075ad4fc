//! The signed request unit submitted by the client.
//!
//! Wire form is a JSON object with standard-base64 fields:
//! `{"payload": <base64 or null>, "nonce": <base64>, "sig": <base64>}`.
//! The field layout is a contract with the single trusted client and is
//! not renegotiated here.

use crate::auth::verify::AuthError;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;

/// The envelope as it appears on the wire, before base64 decoding.
#[derive(Deserialize)]
struct WireEnvelope {
    /// Serialized request data; absent or null for payload-less actions.
    #[serde(default)]
    payload: Option<String>,
    nonce: String,
    sig: String,
}

/// A decoded envelope: the payload bytes exactly as the client signed
/// them, the challenge value the client claims to be answering, and the
/// signature over `challenge ‖ payload`.
pub struct Envelope {
    pub payload: Vec<u8>,
    pub challenge: Vec<u8>,
    pub signature: Vec<u8>,
}

impl Envelope {
    /// Parse a request body as an envelope.
    pub fn from_json(body: &[u8]) -> Result<Self, AuthError> {
        let wire: WireEnvelope = serde_json::from_slice(body)
            .map_err(|e| AuthError::MalformedEnvelope(e.to_string()))?;

        let payload = match wire.payload {
            Some(encoded) => decode_field("payload", &encoded)?,
            None => Vec::new(),
        };

        Ok(Envelope {
            payload,
            challenge: decode_field("nonce", &wire.nonce)?,
            signature: decode_field("sig", &wire.sig)?,
        })
    }

    /// Build a payload-less envelope from detached form fields, as the
    /// multipart image upload submits them.
    pub fn detached(nonce_b64: &str, sig_b64: &str) -> Result<Self, AuthError> {
        Ok(Envelope {
            payload: Vec::new(),
            challenge: decode_field("nonce", nonce_b64)?,
            signature: decode_field("sig", sig_b64)?,
        })
    }
}

fn decode_field(name: &str, encoded: &str) -> Result<Vec<u8>, AuthError> {
    general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| AuthError::MalformedEnvelope(format!("field '{}': {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b64(bytes: &[u8]) -> String {
        general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn test_parse_full_envelope() {
        let body = serde_json::json!({
            "payload": b64(b"{\"title\":\"A\"}"),
            "nonce": b64(&[7u8; 64]),
            "sig": b64(&[9u8; 256]),
        });

        let envelope = Envelope::from_json(body.to_string().as_bytes()).unwrap();
        assert_eq!(envelope.payload, b"{\"title\":\"A\"}");
        assert_eq!(envelope.challenge, vec![7u8; 64]);
        assert_eq!(envelope.signature, vec![9u8; 256]);
    }

    #[test]
    fn test_null_payload_is_empty() {
        let body = serde_json::json!({
            "payload": null,
            "nonce": b64(&[7u8; 64]),
            "sig": b64(&[9u8; 256]),
        });

        let envelope = Envelope::from_json(body.to_string().as_bytes()).unwrap();
        assert!(envelope.payload.is_empty());
    }

    #[test]
    fn test_missing_payload_is_empty() {
        let body = serde_json::json!({
            "nonce": b64(&[7u8; 64]),
            "sig": b64(&[9u8; 256]),
        });

        let envelope = Envelope::from_json(body.to_string().as_bytes()).unwrap();
        assert!(envelope.payload.is_empty());
    }

    #[test]
    fn test_missing_signature_is_malformed() {
        let body = serde_json::json!({ "nonce": b64(&[7u8; 64]) });

        let result = Envelope::from_json(body.to_string().as_bytes());
        assert!(matches!(result, Err(AuthError::MalformedEnvelope(_))));
    }

    #[test]
    fn test_invalid_base64_is_malformed() {
        let body = serde_json::json!({
            "nonce": "not base64!!!",
            "sig": b64(&[9u8; 256]),
        });

        let result = Envelope::from_json(body.to_string().as_bytes());
        assert!(matches!(result, Err(AuthError::MalformedEnvelope(_))));
    }

    #[test]
    fn test_non_json_body_is_malformed() {
        let result = Envelope::from_json(b"just some bytes");
        assert!(matches!(result, Err(AuthError::MalformedEnvelope(_))));
    }

    #[test]
    fn test_detached_fields() {
        let envelope = Envelope::detached(&b64(&[7u8; 64]), &b64(&[9u8; 256])).unwrap();
        assert!(envelope.payload.is_empty());
        assert_eq!(envelope.challenge, vec![7u8; 64]);
    }
}
