//! Image API endpoints.

use crate::auth::nonce::unix_now;
use crate::auth::Envelope;
use crate::error::AppError;
use crate::models::{Image, ImageDeleteRequest};
use crate::routes::{connect, AppState};
use crate::storage;
use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sha2::{Digest, Sha256};

/// POST /image — Upload an image
///
/// Multipart form with fields `img` (the bytes), `Filename`, `Sig`, and
/// `Nonce`. The signature covers the challenge alone; the stored file is
/// renamed to its content checksum, so the bytes name themselves.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut img: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;
    let mut sig: Option<String> = None;
    let mut nonce: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart: {}", e)))?
    {
        let name = field
            .name()
            .ok_or_else(|| AppError::BadRequest("Field missing name".to_string()))?
            .to_string();

        match name.as_str() {
            "img" => {
                img = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Failed to read image: {}", e)))?
                        .to_vec(),
                );
            }
            "Filename" => {
                filename = Some(field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read filename: {}", e))
                })?);
            }
            "Sig" => {
                sig = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Failed to read sig: {}", e)))?,
                );
            }
            "Nonce" => {
                nonce = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Failed to read nonce: {}", e)))?,
                );
            }
            _ => {}
        }
    }

    let img = img.ok_or_else(|| AppError::BadRequest("Missing img field".to_string()))?;
    let filename =
        filename.ok_or_else(|| AppError::BadRequest("Missing Filename field".to_string()))?;
    let sig = sig.ok_or_else(|| AppError::BadRequest("Missing Sig field".to_string()))?;
    let nonce = nonce.ok_or_else(|| AppError::BadRequest("Missing Nonce field".to_string()))?;

    let envelope = Envelope::detached(&nonce, &sig)?;
    state.verifier.verify::<()>(&envelope)?;

    if img.len() > state.config.max_image_bytes {
        return Err(AppError::BadRequest(format!(
            "Image too large: {} bytes exceeds limit of {} bytes",
            img.len(),
            state.config.max_image_bytes
        )));
    }

    // Content-addressed name: checksum plus the original extension
    let checksum = hex::encode(Sha256::digest(&img));
    let extension = std::path::Path::new(&filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    let name = format!("{}{}", checksum, extension);

    let stem = filename
        .strip_suffix(&extension)
        .unwrap_or(&filename)
        .to_string();

    storage::images::write_image_file(&state.config.image_dir, &name, &img)
        .await
        .map_err(AppError::from)?;

    let image = Image {
        filename: name.clone(),
        title: stem.clone(),
        alttext: stem,
        url: format!("/img/{}", name),
        date: unix_now(),
    };

    let mut con = connect(&state).await?;
    storage::images::store_image(&mut con, &image).await?;

    tracing::info!(action = "image_uploaded", filename = %image.filename, "Image stored");

    Ok((StatusCode::CREATED, Json(image)))
}

/// GET /images — List image metadata (public)
pub async fn list_images(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut con = connect(&state).await?;
    let images = storage::images::list_images(&mut con).await?;
    Ok(Json(images))
}

/// DELETE /image — Delete an image
///
/// Signed payload `{"filename": f}`; removes both the file and its
/// metadata.
pub async fn delete_image(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    if body.len() > state.config.max_body_bytes {
        return Err(AppError::BadRequest("Request body too large".to_string()));
    }

    let envelope = Envelope::from_json(&body)?;
    let req: ImageDeleteRequest = state.verifier.verify(&envelope)?;

    let removed = storage::images::delete_image_file(&state.config.image_dir, &req.filename)
        .await
        .map_err(AppError::from)?;
    if !removed {
        return Err(AppError::BadRequest(format!(
            "No image file named {}",
            req.filename
        )));
    }

    let mut con = connect(&state).await?;
    storage::images::delete_image(&mut con, &req.filename).await?;

    tracing::info!(action = "image_deleted", filename = %req.filename, "Image removed");

    Ok(StatusCode::ACCEPTED)
}
