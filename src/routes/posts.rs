//! Post API endpoints.

use crate::auth::nonce::unix_now;
use crate::auth::Envelope;
use crate::error::AppError;
use crate::models::{Post, PostInput};
use crate::routes::{connect, AppState};
use crate::storage;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

/// Derive a URL-safe slug from a post title: lowercased, spaces to
/// hyphens, everything outside `[a-z0-9-]` dropped, capped at 35 chars.
fn url_title(title: &str) -> String {
    let mut slug: String = title
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    slug.truncate(35);
    slug
}

/// GET /posts — List visible posts (public)
pub async fn list_posts(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut con = connect(&state).await?;
    let posts = storage::posts::get_visible_posts(&mut con).await?;
    Ok(Json(posts))
}

/// GET /posts/all — List every post, hidden ones included
///
/// Signed with an empty payload; the envelope proves the caller, the
/// request needs no other data.
pub async fn list_all_posts(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    if body.len() > state.config.max_body_bytes {
        return Err(AppError::BadRequest("Request body too large".to_string()));
    }

    let envelope = Envelope::from_json(&body)?;
    state.verifier.verify::<()>(&envelope)?;

    let mut con = connect(&state).await?;
    let posts = storage::posts::get_all_posts(&mut con).await?;
    Ok(Json(posts))
}

/// GET /post/{id} — Show one post (public)
pub async fn show_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut con = connect(&state).await?;
    let post = storage::posts::get_post(&mut con, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
    Ok(Json(post))
}

/// POST /post — Create a post
///
/// Signed payload of the form `{"title": t, "body": b, "markdown": m,
/// "isshort": bool}`, where `t` and `b` are pre-escaped HTML.
pub async fn create_post(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    if body.len() > state.config.max_body_bytes {
        return Err(AppError::BadRequest("Request body too large".to_string()));
    }

    let envelope = Envelope::from_json(&body)?;
    let input: PostInput = state.verifier.verify(&envelope)?;

    if input.title.is_empty() {
        return Err(AppError::BadRequest("Post title is required".to_string()));
    }

    // Authenticity is settled at this point; build the post for insertion.
    let post = Post {
        id: nanoid::nanoid!(12),
        isshort: input.isshort,
        urltitle: url_title(&input.title),
        title: input.title,
        visible: true,
        date: unix_now(),
        body: input.body,
        markdown: input.markdown,
    };

    let mut con = connect(&state).await?;
    storage::posts::store_post(&mut con, &post).await?;

    tracing::info!(action = "post_created", post_id = %post.id, urltitle = %post.urltitle, "Post created");

    Ok((StatusCode::CREATED, Json(post)))
}

/// DELETE /post/{id} — Hide a post
///
/// The ID rides in the URL, so the signed payload is empty.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    if body.len() > state.config.max_body_bytes {
        return Err(AppError::BadRequest("Request body too large".to_string()));
    }

    let envelope = Envelope::from_json(&body)?;
    state.verifier.verify::<()>(&envelope)?;

    let mut con = connect(&state).await?;
    if !storage::posts::hide_post(&mut con, &id).await? {
        return Err(AppError::Unprocessable(format!(
            "Could not find post with ID {} to delete",
            id
        )));
    }

    tracing::info!(action = "post_deleted", post_id = %id, "Post hidden");

    Ok(StatusCode::ACCEPTED)
}
