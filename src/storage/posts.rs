//! Post repository.
//!
//! Redis key patterns:
//! - `post:{id}` — post data (JSON)
//!
//! Deleting a post hides it (`visible = false`) rather than destroying
//! the record, so it stays reachable through the authenticated listing.

use crate::models::Post;
use redis::AsyncCommands;

/// Store a post, overwriting any previous version.
pub async fn store_post<C>(con: &mut C, post: &Post) -> Result<(), redis::RedisError>
where
    C: AsyncCommands,
{
    let key = format!("post:{}", post.id);
    super::set_json(con, &key, post).await
}

/// Get a post by ID.
pub async fn get_post<C>(con: &mut C, id: &str) -> Result<Option<Post>, redis::RedisError>
where
    C: AsyncCommands,
{
    let key = format!("post:{}", id);
    super::get_json(con, &key).await
}

/// All posts, hidden ones included, newest first.
pub async fn get_all_posts<C>(con: &mut C) -> Result<Vec<Post>, redis::RedisError>
where
    C: AsyncCommands,
{
    let keys = super::scan_keys(con, "post:*").await?;

    let mut posts = Vec::with_capacity(keys.len());
    for key in keys {
        if let Some(post) = super::get_json::<Post, _>(con, &key).await? {
            posts.push(post);
        }
    }
    posts.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(posts)
}

/// Only the posts the public listing shows, newest first.
pub async fn get_visible_posts<C>(con: &mut C) -> Result<Vec<Post>, redis::RedisError>
where
    C: AsyncCommands,
{
    let mut posts = get_all_posts(con).await?;
    posts.retain(|p| p.visible);
    Ok(posts)
}

/// Hide a post. Returns false if no post has the given ID.
pub async fn hide_post<C>(con: &mut C, id: &str) -> Result<bool, redis::RedisError>
where
    C: AsyncCommands,
{
    match get_post(con, id).await? {
        Some(mut post) => {
            post.visible = false;
            store_post(con, &post).await?;
            Ok(true)
        }
        None => Ok(false),
    }
}
