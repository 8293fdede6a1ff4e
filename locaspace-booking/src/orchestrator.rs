use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use locaspace_core::payment::{PaymentAdapter, PaymentReceipt, PaymentStatus};
use locaspace_core::{CoreError, CoreResult, ListingApi};
use locaspace_shared::BookingRequest;

/// `RES` followed by the last six decimal digits of the epoch timestamp.
pub fn reservation_reference(epoch_millis: i64) -> String {
    format!("RES{:06}", epoch_millis.rem_euclid(1_000_000))
}

/// Stand-in gateway: waits, then approves (or declines) every payment.
pub struct SimulatedPaymentGateway {
    delay: Duration,
    decline: bool,
}

impl SimulatedPaymentGateway {
    pub fn new(delay: Duration) -> Self {
        Self { delay, decline: false }
    }

    /// A gateway that declines every payment after the delay.
    pub fn failing(delay: Duration) -> Self {
        Self { delay, decline: true }
    }
}

#[async_trait]
impl PaymentAdapter for SimulatedPaymentGateway {
    async fn process_payment(&self, request: &BookingRequest) -> CoreResult<PaymentReceipt> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.decline {
            warn!(listing_id = %request.listing_id, "Simulated payment declined");
            return Err(CoreError::PaymentError("card declined".to_string()));
        }

        let now = Utc::now();
        Ok(PaymentReceipt {
            reference: reservation_reference(now.timestamp_millis()),
            status: PaymentStatus::Succeeded,
            amount: request.total_price,
            currency: "EUR".to_string(),
            completed_at: now,
        })
    }
}

/// Confirms the reservation through the backend `POST /bookings` call.
pub struct BackendPaymentAdapter {
    api: Arc<dyn ListingApi>,
}

impl BackendPaymentAdapter {
    pub fn new(api: Arc<dyn ListingApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PaymentAdapter for BackendPaymentAdapter {
    async fn process_payment(&self, request: &BookingRequest) -> CoreResult<PaymentReceipt> {
        let confirmation = self.api.create_booking(request).await?;
        info!(reference = %confirmation.reference, listing_id = %confirmation.listing_id, "Booking created");

        Ok(PaymentReceipt {
            reference: confirmation.reference,
            status: PaymentStatus::Succeeded,
            amount: confirmation.total_price,
            currency: "EUR".to_string(),
            completed_at: Utc::now(),
        })
    }
}
