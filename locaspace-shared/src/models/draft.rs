use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::listing::ListingId;

/// Storage key of the reservation draft for a listing.
pub fn draft_key(listing_id: &ListingId) -> String {
    format!("reservation_draft_{}", listing_id)
}

/// Answers of the "dates" step as persisted in a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftDates {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub guests: u32,
}

/// Answers of the "personal information" step as persisted in a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftPersonal {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
}

/// In-progress reservation saved between visits.
///
/// Payment details are deliberately absent: only the first two steps are
/// ever written to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDraft {
    pub current_step: u8,
    pub dates: DraftDates,
    pub personal: DraftPersonal,
}
