use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use locaspace_shared::BookingRequest;

use crate::CoreResult;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Processing,
    Succeeded,
    Failed,
}

/// Outcome of a payment round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    /// Reservation reference shown to the guest (`RES` + 6 digits).
    pub reference: String,
    pub status: PaymentStatus,
    pub amount: i64,
    pub currency: String,
    pub completed_at: DateTime<Utc>,
}

/// Payment gateway used to confirm a reservation.
#[async_trait]
pub trait PaymentAdapter: Send + Sync {
    /// Charge the guest for the booking and report the outcome.
    async fn process_payment(&self, request: &BookingRequest) -> CoreResult<PaymentReceipt>;
}
