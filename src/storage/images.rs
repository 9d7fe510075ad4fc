//! Image repository: metadata in Redis, bytes on disk.
//!
//! Redis key patterns:
//! - `image:{filename}` — image metadata (JSON)
//!
//! Files live flat in the configured image directory under their
//! checksum-derived names and are served statically from there.

use crate::models::Image;
use redis::AsyncCommands;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Error type for image file operations.
#[derive(Debug, thiserror::Error)]
pub enum ImageStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid image filename: {0}")]
    InvalidName(String),
}

/// Reject names that could escape the image directory.
fn image_path(dir: &Path, name: &str) -> Result<PathBuf, ImageStoreError> {
    if name.is_empty() {
        return Err(ImageStoreError::InvalidName("empty".to_string()));
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(ImageStoreError::InvalidName(name.to_string()));
    }
    Ok(dir.join(name))
}

/// Create the image directory if it doesn't exist.
pub async fn init_image_dir(dir: &Path) -> Result<(), ImageStoreError> {
    fs::create_dir_all(dir).await?;
    Ok(())
}

/// Write image bytes to disk.
///
/// Uses atomic write (write to temp file, then rename) to prevent partial reads.
pub async fn write_image_file(
    dir: &Path,
    name: &str,
    content: &[u8],
) -> Result<(), ImageStoreError> {
    let path = image_path(dir, name)?;

    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path).await?;
    file.write_all(content).await?;
    file.sync_all().await?;

    // Rename to final path (atomic on most filesystems)
    fs::rename(&temp_path, &path).await?;

    Ok(())
}

/// Delete an image file from disk.
///
/// Returns true if the file was deleted, false if it didn't exist.
pub async fn delete_image_file(dir: &Path, name: &str) -> Result<bool, ImageStoreError> {
    let path = image_path(dir, name)?;

    match fs::remove_file(&path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ImageStoreError::Io(e)),
    }
}

/// Store image metadata.
pub async fn store_image<C>(con: &mut C, image: &Image) -> Result<(), redis::RedisError>
where
    C: AsyncCommands,
{
    let key = format!("image:{}", image.filename);
    super::set_json(con, &key, image).await
}

/// Get image metadata by filename.
pub async fn get_image<C>(con: &mut C, filename: &str) -> Result<Option<Image>, redis::RedisError>
where
    C: AsyncCommands,
{
    let key = format!("image:{}", filename);
    super::get_json(con, &key).await
}

/// All image metadata, newest first.
pub async fn list_images<C>(con: &mut C) -> Result<Vec<Image>, redis::RedisError>
where
    C: AsyncCommands,
{
    let keys = super::scan_keys(con, "image:*").await?;

    let mut images = Vec::with_capacity(keys.len());
    for key in keys {
        if let Some(image) = super::get_json::<Image, _>(con, &key).await? {
            images.push(image);
        }
    }
    images.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(images)
}

/// Delete image metadata. Returns true if a record was removed.
pub async fn delete_image<C>(con: &mut C, filename: &str) -> Result<bool, redis::RedisError>
where
    C: AsyncCommands,
{
    let key = format!("image:{}", filename);
    let deleted: i32 = con.del(&key).await?;
    Ok(deleted > 0)
}
