//! RSVP repository.
//!
//! Redis key patterns:
//! - `rsvp:{rescode}` — RSVP data (JSON)

use crate::models::Rsvp;
use redis::AsyncCommands;

/// Store an RSVP, overwriting any previous version.
pub async fn store_rsvp<C>(con: &mut C, rsvp: &Rsvp) -> Result<(), redis::RedisError>
where
    C: AsyncCommands,
{
    let key = format!("rsvp:{}", rsvp.shortcode);
    super::set_json(con, &key, rsvp).await
}

/// Get an RSVP by reservation code.
pub async fn get_rsvp<C>(con: &mut C, rescode: &str) -> Result<Option<Rsvp>, redis::RedisError>
where
    C: AsyncCommands,
{
    let key = format!("rsvp:{}", rescode);
    super::get_json(con, &key).await
}

/// All RSVPs, in reservation-code order.
pub async fn list_rsvps<C>(con: &mut C) -> Result<Vec<Rsvp>, redis::RedisError>
where
    C: AsyncCommands,
{
    let keys = super::scan_keys(con, "rsvp:*").await?;

    let mut rsvps = Vec::with_capacity(keys.len());
    for key in keys {
        if let Some(rsvp) = super::get_json::<Rsvp, _>(con, &key).await? {
            rsvps.push(rsvp);
        }
    }
    rsvps.sort_by(|a, b| a.shortcode.cmp(&b.shortcode));
    Ok(rsvps)
}
