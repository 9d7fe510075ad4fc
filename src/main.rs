//! Inkpost application entry point.
//!
//! Bootstraps the server:
//! 1. Load configuration from environment
//! 2. Load the admin public key (fatal if missing or unparsable)
//! 3. Create the nonce authority and signature verifier
//! 4. Connect to Redis and prepare the image directory
//! 5. Build router with API routes + static image serving
//! 6. Start Axum server

use inkpost::{
    auth::{load_public_key, NonceAuthority, SignatureVerifier},
    config::Config,
    middleware::log_requests,
    routes::{self, AppState},
    storage,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

#[tokio::main]
async fn main() {
    // Initialize tracing with env filter support (RUST_LOG)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config from environment
    let config = Config::from_env().expect("Failed to load config");
    tracing::info!("Starting inkpost on {}", config.bind_addr);

    // Serving without the verification key would accept unauthenticated
    // writes; refuse to start instead.
    let key = load_public_key(&config.public_key_path).expect("Failed to load public key");
    tracing::info!(path = %config.public_key_path.display(), "Public key loaded");

    let stale_after = Duration::from_secs(config.challenge_stale_secs);
    let nonce = Arc::new(NonceAuthority::new(stale_after));
    let verifier = Arc::new(SignatureVerifier::new(key, nonce.clone(), stale_after));

    // Connect to Redis and verify it is reachable before serving
    let redis_client = redis::Client::open(config.redis_url.as_str()).expect("Invalid Redis URL");
    redis_client
        .get_multiplexed_async_connection()
        .await
        .expect("Failed to connect to Redis");

    storage::images::init_image_dir(&config.image_dir)
        .await
        .expect("Failed to create image directory");

    // Build shared state
    let state = AppState {
        redis: redis_client,
        config: Arc::new(config.clone()),
        nonce,
        verifier,
    };

    // Build router:
    // - API routes (with state)
    // - Static image serving under /img
    // - Permissive CORS (the API is consumed cross-origin by the site)
    let app = routes::api_router()
        .nest_service("/img", ServeDir::new(&config.image_dir))
        .layer(axum::extract::DefaultBodyLimit::max(config.max_image_bytes))
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(log_requests))
        .with_state(state);

    // Bind to configured address
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind");
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
