use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::listing::ListingId;

/// Emitted once a reservation has been paid and confirmed.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ReservationConfirmedEvent {
    pub event_id: Uuid,
    pub listing_id: ListingId,
    pub reference: String,
    pub total_price: i64,
    pub confirmed_at: DateTime<Utc>,
}

impl ReservationConfirmedEvent {
    pub fn new(listing_id: ListingId, reference: String, total_price: i64, confirmed_at: DateTime<Utc>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            listing_id,
            reference,
            total_price,
            confirmed_at,
        }
    }
}
