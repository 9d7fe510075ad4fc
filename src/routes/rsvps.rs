//! RSVP API endpoints for the event side of the site.
//!
//! Guests drive these themselves with their reservation codes, so none
//! of them require a signed envelope.

use crate::error::AppError;
use crate::models::{Rsvp, RsvpCreateForm, RsvpUpdateForm};
use crate::routes::{connect, AppState};
use crate::storage;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Form, Json,
};

/// GET /rsvp/{rescode} — Look up an RSVP
pub async fn show_rsvp(
    State(state): State<AppState>,
    Path(rescode): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut con = connect(&state).await?;
    let rsvp = storage::rsvps::get_rsvp(&mut con, &rescode)
        .await?
        .ok_or_else(|| AppError::NotFound("RSVP not found".to_string()))?;
    Ok(Json(rsvp))
}

/// POST /rsvp/{rescode} — Update an RSVP with new confirmations
///
/// Guests may not reserve more than their allotted spots.
pub async fn update_rsvp(
    State(state): State<AppState>,
    Path(rescode): Path<String>,
    Form(form): Form<RsvpUpdateForm>,
) -> Result<impl IntoResponse, AppError> {
    let mut con = connect(&state).await?;
    let mut rsvp = storage::rsvps::get_rsvp(&mut con, &rescode)
        .await?
        .ok_or_else(|| AppError::BadRequest("RSVP not found".to_string()))?;

    if form.monconfirm < 0
        || form.sunconfirm < 0
        || form.monconfirm > rsvp.numinvited
        || form.sunconfirm > rsvp.numinvited
    {
        return Err(AppError::BadRequest(
            "Confirmed spots exceed the invitation".to_string(),
        ));
    }

    rsvp.attending = form.attending;
    rsvp.monconfirm = form.monconfirm;
    rsvp.sunconfirm = form.sunconfirm;
    storage::rsvps::store_rsvp(&mut con, &rsvp).await?;

    tracing::info!(action = "rsvp_updated", rescode = %rescode, attending = rsvp.attending, "RSVP updated");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /rsvp — Create an RSVP
pub async fn create_rsvp(
    State(state): State<AppState>,
    Form(form): Form<RsvpCreateForm>,
) -> Result<impl IntoResponse, AppError> {
    if form.rescode.is_empty() || form.name.is_empty() {
        return Err(AppError::BadRequest(
            "Reservation code and name are required".to_string(),
        ));
    }
    if form.numinvited < 1 {
        return Err(AppError::BadRequest(
            "At least one guest must be invited".to_string(),
        ));
    }

    let mut con = connect(&state).await?;
    if storage::rsvps::get_rsvp(&mut con, &form.rescode).await?.is_some() {
        return Err(AppError::BadRequest(
            "Reservation code already exists".to_string(),
        ));
    }

    let rsvp = Rsvp {
        shortcode: form.rescode,
        name: form.name,
        attending: false,
        numinvited: form.numinvited,
        monconfirm: 0,
        sunconfirm: 0,
    };
    storage::rsvps::store_rsvp(&mut con, &rsvp).await?;

    tracing::info!(action = "rsvp_created", rescode = %rsvp.shortcode, "RSVP created");

    Ok((StatusCode::CREATED, Json(rsvp)))
}

/// GET /rsvps — List all RSVPs
pub async fn list_rsvps(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut con = connect(&state).await?;
    let rsvps = storage::rsvps::list_rsvps(&mut con).await?;
    Ok(Json(rsvps))
}
