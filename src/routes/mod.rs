//! API route handlers.

pub mod images;
pub mod nonce;
pub mod posts;
pub mod rsvps;

use crate::auth::{NonceAuthority, SignatureVerifier};
use crate::config::Config;
use crate::error::AppError;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub redis: redis::Client,
    pub config: Arc<Config>,
    pub nonce: Arc<NonceAuthority>,
    pub verifier: Arc<SignatureVerifier>,
}

/// Acquire a Redis connection for one request.
pub(crate) async fn connect(
    state: &AppState,
) -> Result<redis::aio::MultiplexedConnection, AppError> {
    state
        .redis
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| AppError::Internal(format!("Redis connection error: {}", e)))
}

async fn index() -> &'static str {
    "Welcome to the inkpost API. The post list lives at /posts.\n"
}

/// Build the API router with all endpoints.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        // Challenge endpoints
        .route("/nonce", get(nonce::read_nonce))
        .route("/nonce/rotate", post(nonce::rotate_nonce))
        // Post endpoints
        .route("/posts", get(posts::list_posts))
        .route("/posts/all", get(posts::list_all_posts))
        .route("/post", post(posts::create_post))
        .route(
            "/post/{id}",
            get(posts::show_post).delete(posts::delete_post),
        )
        // Image endpoints
        .route("/image", post(images::upload_image).delete(images::delete_image))
        .route("/images", get(images::list_images))
        // RSVP endpoints
        .route("/rsvp", post(rsvps::create_rsvp))
        .route(
            "/rsvp/{rescode}",
            get(rsvps::show_rsvp).post(rsvps::update_rsvp),
        )
        .route("/rsvps", get(rsvps::list_rsvps))
}
