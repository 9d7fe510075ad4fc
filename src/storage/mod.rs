//! Redis storage layer for posts, images, and RSVPs.
//!
//! All functions are async and use redis::AsyncCommands.
//! Records are serialized to JSON for storage in Redis.

pub mod images;
pub mod posts;
pub mod rsvps;

use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Maximum number of keys returned by scan_keys to prevent unbounded memory allocation.
const SCAN_MAX_KEYS: usize = 10_000;

/// Scan for Redis keys matching a pattern using SCAN (non-blocking).
///
/// Unlike KEYS, SCAN does not block the Redis server during iteration.
/// Capped at SCAN_MAX_KEYS results to prevent unbounded memory growth.
pub async fn scan_keys<C>(con: &mut C, pattern: &str) -> Result<Vec<String>, redis::RedisError>
where
    C: AsyncCommands,
{
    let mut all_keys = Vec::new();
    let mut cursor: u64 = 0;
    loop {
        let (new_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(100)
            .query_async(con)
            .await?;
        all_keys.extend(keys);
        if all_keys.len() >= SCAN_MAX_KEYS {
            all_keys.truncate(SCAN_MAX_KEYS);
            break;
        }
        cursor = new_cursor;
        if cursor == 0 {
            break;
        }
    }
    Ok(all_keys)
}

/// Wrap a serialization failure as a RedisError so repository functions
/// have a single error type.
pub(crate) fn storage_err(context: &'static str, err: impl std::fmt::Display) -> redis::RedisError {
    redis::RedisError::from((
        redis::ErrorKind::TypeError,
        context,
        err.to_string(),
    ))
}

/// Fetch a key and deserialize its JSON value, None if absent.
pub(crate) async fn get_json<T, C>(con: &mut C, key: &str) -> Result<Option<T>, redis::RedisError>
where
    T: DeserializeOwned,
    C: AsyncCommands,
{
    let json: Option<String> = con.get(key).await?;
    match json {
        Some(data) => serde_json::from_str(&data)
            .map(Some)
            .map_err(|e| storage_err("JSON deserialize", e)),
        None => Ok(None),
    }
}

/// Serialize a value to JSON and store it under a key, no expiry.
pub(crate) async fn set_json<T, C>(con: &mut C, key: &str, value: &T) -> Result<(), redis::RedisError>
where
    T: Serialize,
    C: AsyncCommands,
{
    let json = serde_json::to_string(value).map_err(|e| storage_err("JSON serialize", e))?;
    con.set::<_, _, ()>(key, json).await
}
