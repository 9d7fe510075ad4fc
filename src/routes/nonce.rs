//! Challenge API endpoints.

use crate::error::AppError;
use crate::models::NonceResponse;
use crate::routes::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::time::Duration;

/// GET /nonce — Read the current challenge
///
/// The whole challenge is returned, creation time included, so the
/// client can tell when it is about to expire.
pub async fn read_nonce(State(state): State<AppState>) -> impl IntoResponse {
    let challenge = state.nonce.current();

    Json(NonceResponse {
        value: challenge.value_base64(),
        created: challenge.created_at,
    })
}

/// POST /nonce/rotate — Churn the challenge on client request
///
/// Useful when the client notices the challenge is near expiry and would
/// rather not risk it. Generating randomness on demand is an easy thing
/// to spam, so rotation is refused until the live challenge has reached
/// the cooldown age.
pub async fn rotate_nonce(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let cooldown = Duration::from_secs(state.config.rotate_cooldown_secs);

    if !state.nonce.is_older_than(cooldown) {
        return Err(AppError::Forbidden(
            "Challenge is not old enough to rotate".to_string(),
        ));
    }

    state.nonce.rotate();
    tracing::info!(action = "nonce_rotated", "Challenge rotated on client request");

    Ok(StatusCode::ACCEPTED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{NonceAuthority, SignatureVerifier};
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::Request;
    use base64::{engine::general_purpose, Engine as _};
    use rsa::pkcs1v15::VerifyingKey;
    use rsa::RsaPrivateKey;
    use std::sync::{Arc, OnceLock};
    use tower::ServiceExt;

    fn test_key() -> &'static RsaPrivateKey {
        static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
        KEY.get_or_init(|| {
            RsaPrivateKey::new(&mut rand_core::OsRng, 2048).expect("generate test key")
        })
    }

    /// Router + state wired for the challenge endpoints only; the Redis
    /// client is lazy and never actually connects here.
    fn test_app(rotate_cooldown_secs: u64) -> axum::Router {
        let config = Config {
            public_key_path: "unused".into(),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            image_dir: "unused".into(),
            max_body_bytes: 1_000_000,
            max_image_bytes: 50_000_000,
            challenge_stale_secs: 1_800,
            rotate_cooldown_secs,
        };

        let stale_after = Duration::from_secs(config.challenge_stale_secs);
        let nonce = Arc::new(NonceAuthority::new(stale_after));
        let verifier = Arc::new(SignatureVerifier::new(
            VerifyingKey::new(test_key().to_public_key()),
            nonce.clone(),
            stale_after,
        ));

        let state = AppState {
            redis: redis::Client::open(config.redis_url.as_str()).unwrap(),
            config: Arc::new(config),
            nonce,
            verifier,
        };

        crate::routes::api_router().with_state(state)
    }

    async fn get_nonce_value(app: &axum::Router) -> NonceResponse {
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/nonce").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_read_nonce_is_64_bytes_base64() {
        let app = test_app(600);
        let nonce = get_nonce_value(&app).await;

        let decoded = general_purpose::STANDARD.decode(&nonce.value).unwrap();
        assert_eq!(decoded.len(), 64);
        assert!(nonce.created > 0);
    }

    #[tokio::test]
    async fn test_read_nonce_is_stable_between_reads() {
        let app = test_app(600);
        let first = get_nonce_value(&app).await;
        let second = get_nonce_value(&app).await;
        assert_eq!(first.value, second.value);
    }

    #[tokio::test]
    async fn test_rotate_refused_during_cooldown() {
        let app = test_app(600);
        let before = get_nonce_value(&app).await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/nonce/rotate")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // Refusal must not have churned the challenge
        let after = get_nonce_value(&app).await;
        assert_eq!(before.value, after.value);
    }

    #[tokio::test]
    async fn test_rotate_honored_past_cooldown() {
        let app = test_app(0);
        let before = get_nonce_value(&app).await;

        // Zero cooldown: any challenge older than zero seconds qualifies
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/nonce/rotate")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let after = get_nonce_value(&app).await;
        assert_ne!(before.value, after.value);
    }
}
