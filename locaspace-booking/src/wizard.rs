use tracing::debug;

use locaspace_catalog::{PricingBreakdown, PricingConfig, PricingEngine};
use locaspace_core::CoreError;
use locaspace_shared::{BookingRequest, Listing, ListingId, ReservationDraft};

use crate::forms::{
    validate_dates, validate_payment, validate_personal, DateRules, DatesForm, FieldErrors, PaymentForm, PersonalForm,
};
use crate::steps::{step_descriptors, WizardStep, WizardStepDescriptor};

/// Outcome of a successful `next()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Moved to the given step.
    Moved(WizardStep),
    /// The payment step is complete; the caller must run the payment.
    PaymentRequired,
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Step is incomplete: {0}")]
    Invalid(FieldErrors),

    #[error("A payment is already being processed")]
    Busy,

    #[error("The reservation is already confirmed")]
    Finished,

    #[error("Payment can only be processed from the payment step")]
    NotAtPayment,

    #[error("Payment was declined")]
    PaymentDeclined,

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Product rules that are not plain field validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct WizardRules {
    pub reject_empty_stays: bool,
}

/// Synchronous state machine behind the reservation flow.
///
/// All I/O (draft storage, payment, notifications) lives in
/// [`crate::WizardController`]; this type only holds form values and
/// decides which transitions are allowed.
pub struct ReservationWizard {
    listing: Listing,
    step: WizardStep,
    dates: DatesForm,
    personal: PersonalForm,
    payment: PaymentForm,
    processing: bool,
    reference: Option<String>,
    rules: WizardRules,
    pricing: PricingEngine,
}

impl ReservationWizard {
    pub fn new(listing: Listing, pricing: PricingConfig, rules: WizardRules) -> Self {
        Self {
            listing,
            step: WizardStep::Dates,
            dates: DatesForm::default(),
            personal: PersonalForm::default(),
            payment: PaymentForm::default(),
            processing: false,
            reference: None,
            rules,
            pricing: PricingEngine::new(pricing),
        }
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn listing_id(&self) -> &ListingId {
        &self.listing.id
    }

    pub fn current_step(&self) -> WizardStep {
        self.step
    }

    pub fn steps(&self) -> Vec<WizardStepDescriptor> {
        step_descriptors(self.step)
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn is_complete(&self) -> bool {
        self.step == WizardStep::Confirmation
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn dates(&self) -> &DatesForm {
        &self.dates
    }

    pub fn personal(&self) -> &PersonalForm {
        &self.personal
    }

    pub fn payment(&self) -> &PaymentForm {
        &self.payment
    }

    // ------------------------------------------------------------------
    // Form updates
    // ------------------------------------------------------------------

    pub fn update_dates(&mut self, form: DatesForm) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.dates = form;
        Ok(())
    }

    pub fn update_personal(&mut self, form: PersonalForm) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.personal = form;
        Ok(())
    }

    pub fn update_payment(&mut self, form: PaymentForm) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.payment = form;
        Ok(())
    }

    fn ensure_editable(&self) -> Result<(), WizardError> {
        if self.is_complete() {
            return Err(WizardError::Finished);
        }
        if self.processing {
            return Err(WizardError::Busy);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Validation & transitions
    // ------------------------------------------------------------------

    /// Errors of one step's fields only.
    pub fn validate_step(&self, step: WizardStep) -> FieldErrors {
        match step {
            WizardStep::Dates => validate_dates(
                &self.dates,
                DateRules {
                    max_guests: self.listing.max_guests,
                    reject_empty_stays: self.rules.reject_empty_stays,
                },
            ),
            WizardStep::Personal => validate_personal(&self.personal),
            WizardStep::Payment => validate_payment(&self.payment),
            WizardStep::Confirmation => FieldErrors::new(),
        }
    }

    pub fn can_proceed(&self) -> bool {
        !self.processing && !self.is_complete() && self.validate_step(self.step).is_empty()
    }

    pub fn next(&mut self) -> Result<Transition, WizardError> {
        self.ensure_editable()?;

        let errors = self.validate_step(self.step);
        if !errors.is_empty() {
            return Err(WizardError::Invalid(errors));
        }

        if self.step == WizardStep::Payment {
            return Ok(Transition::PaymentRequired);
        }

        // Confirmation is only reachable through a successful payment.
        if let Some(next) = self.step.next().filter(|s| *s != WizardStep::Confirmation) {
            debug!(listing_id = %self.listing.id, from = ?self.step, to = ?next, "wizard next");
            self.step = next;
        }
        Ok(Transition::Moved(self.step))
    }

    /// Go back one step without validating. Staying on the first step is a
    /// no-op.
    pub fn previous(&mut self) -> Result<WizardStep, WizardError> {
        self.ensure_editable()?;
        if let Some(previous) = self.step.previous() {
            debug!(listing_id = %self.listing.id, from = ?self.step, to = ?previous, "wizard previous");
            self.step = previous;
        }
        Ok(self.step)
    }

    // ------------------------------------------------------------------
    // Drafts
    // ------------------------------------------------------------------

    /// Restore form values and the current step from a saved draft.
    ///
    /// A draft can never put the wizard on the confirmation step: a stale
    /// step 4 resumes on the payment step, and unknown steps are ignored.
    pub fn restore(&mut self, draft: ReservationDraft) {
        self.dates = draft.dates.into();
        self.personal = draft.personal.into();
        if let Some(step) = WizardStep::from_number(draft.current_step) {
            self.step = step.min(WizardStep::Payment);
        }
    }

    pub fn snapshot(&self) -> ReservationDraft {
        ReservationDraft {
            current_step: self.step.number(),
            dates: (&self.dates).into(),
            personal: (&self.personal).into(),
        }
    }

    // ------------------------------------------------------------------
    // Pricing
    // ------------------------------------------------------------------

    pub fn pricing(&self) -> PricingBreakdown {
        self.pricing
            .quote(self.listing.price_per_night, self.dates.start_date, self.dates.end_date)
    }

    pub fn total_nights(&self) -> i64 {
        self.pricing().nights
    }

    pub fn base_price(&self) -> i64 {
        self.pricing().base_price
    }

    pub fn service_fee(&self) -> i64 {
        self.pricing().service_fee
    }

    pub fn taxes(&self) -> i64 {
        self.pricing().taxes
    }

    pub fn total_price(&self) -> i64 {
        self.pricing().total
    }

    // ------------------------------------------------------------------
    // Payment
    // ------------------------------------------------------------------

    /// Payload of the create-booking call built from the current answers.
    pub fn booking_request(&self) -> Result<BookingRequest, WizardError> {
        let (Some(start_date), Some(end_date)) = (self.dates.start_date, self.dates.end_date) else {
            return Err(WizardError::Invalid(self.validate_step(WizardStep::Dates)));
        };
        let pricing = self.pricing();

        Ok(BookingRequest {
            listing_id: self.listing.id.clone(),
            start_date,
            end_date,
            guests: self.dates.guests,
            first_name: self.personal.first_name.trim().to_string(),
            last_name: self.personal.last_name.trim().to_string(),
            email: self.personal.email.trim().to_string(),
            phone: self.personal.phone.trim().to_string(),
            message: self.personal.message.trim().to_string(),
            nights: pricing.nights,
            total_price: pricing.total,
        })
    }

    /// Enter the processing state. Forward navigation is blocked until the
    /// payment completes or fails.
    pub fn begin_payment(&mut self) -> Result<BookingRequest, WizardError> {
        self.ensure_editable()?;
        if self.step != WizardStep::Payment {
            return Err(WizardError::NotAtPayment);
        }
        let errors = self.validate_step(WizardStep::Payment);
        if !errors.is_empty() {
            return Err(WizardError::Invalid(errors));
        }

        let request = self.booking_request()?;
        self.processing = true;
        Ok(request)
    }

    pub fn complete_payment(&mut self, reference: String) {
        self.processing = false;
        self.reference = Some(reference);
        self.step = WizardStep::Confirmation;
        // Card data is not kept past confirmation.
        self.payment = PaymentForm::default();
    }

    /// Leave the processing state and stay on the payment step.
    pub fn abort_payment(&mut self) {
        self.processing = false;
        self.step = WizardStep::Payment;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::forms::tests::{valid_dates, valid_payment, valid_personal};
    use chrono::{NaiveDate, Utc};
    use locaspace_shared::{DraftDates, DraftPersonal, ListingOwner, ListingStatus};

    pub(crate) fn listing(price: i64) -> Listing {
        Listing {
            id: ListingId::from(7),
            title: "Loft Canal Saint-Martin".to_string(),
            city: "Paris".to_string(),
            price_per_night: price,
            max_guests: Some(4),
            owner: ListingOwner {
                id: "host-1".to_string(),
                name: "Louis".to_string(),
                email: "louis@locaspace.fr".to_string(),
            },
            status: ListingStatus::Validated,
            created_at: Utc::now(),
        }
    }

    fn wizard() -> ReservationWizard {
        ReservationWizard::new(listing(100), PricingConfig::default(), WizardRules::default())
    }

    #[test]
    fn test_starts_on_dates_step() {
        let w = wizard();
        assert_eq!(w.current_step(), WizardStep::Dates);
        assert!(w.steps()[0].active);
        assert!(!w.can_proceed());
    }

    #[test]
    fn test_next_requires_valid_step() {
        let mut w = wizard();
        match w.next() {
            Err(WizardError::Invalid(errors)) => assert!(errors.has("startDate", "required")),
            other => panic!("expected invalid step, got {:?}", other),
        }
        assert_eq!(w.current_step(), WizardStep::Dates);

        w.update_dates(valid_dates()).unwrap();
        assert_eq!(w.next().unwrap(), Transition::Moved(WizardStep::Personal));
    }

    #[test]
    fn test_only_current_step_is_validated() {
        let mut w = wizard();
        w.update_dates(valid_dates()).unwrap();
        w.update_personal(PersonalForm {
            email: "broken".to_string(),
            ..valid_personal()
        })
        .unwrap();
        // Personal info is broken but we are still on the dates step.
        assert!(w.can_proceed());
        w.next().unwrap();
        assert!(!w.can_proceed());
    }

    #[test]
    fn test_payment_step_requests_payment() {
        let mut w = wizard();
        w.update_dates(valid_dates()).unwrap();
        w.next().unwrap();
        w.update_personal(valid_personal()).unwrap();
        w.next().unwrap();
        assert_eq!(w.current_step(), WizardStep::Payment);

        w.update_payment(valid_payment()).unwrap();
        assert_eq!(w.next().unwrap(), Transition::PaymentRequired);
        assert_eq!(w.current_step(), WizardStep::Payment);
    }

    #[test]
    fn test_previous_is_unconditional() {
        let mut w = wizard();
        assert_eq!(w.previous().unwrap(), WizardStep::Dates);

        w.update_dates(valid_dates()).unwrap();
        w.next().unwrap();
        w.update_personal(PersonalForm::default()).unwrap();
        assert_eq!(w.previous().unwrap(), WizardStep::Dates);
    }

    #[test]
    fn test_processing_blocks_navigation() {
        let mut w = wizard();
        w.restore(ReservationDraft {
            current_step: 3,
            dates: (&valid_dates()).into(),
            personal: (&valid_personal()).into(),
        });
        w.update_payment(valid_payment()).unwrap();

        let request = w.begin_payment().unwrap();
        assert_eq!(request.total_price, 345);
        assert!(w.is_processing());
        assert!(!w.can_proceed());
        assert!(matches!(w.next(), Err(WizardError::Busy)));
        assert!(matches!(w.begin_payment(), Err(WizardError::Busy)));

        w.abort_payment();
        assert!(!w.is_processing());
        assert_eq!(w.current_step(), WizardStep::Payment);
    }

    #[test]
    fn test_confirmation_is_terminal() {
        let mut w = wizard();
        w.restore(ReservationDraft {
            current_step: 3,
            dates: (&valid_dates()).into(),
            personal: (&valid_personal()).into(),
        });
        w.update_payment(valid_payment()).unwrap();
        w.begin_payment().unwrap();
        w.complete_payment("RES123456".to_string());

        assert!(w.is_complete());
        assert_eq!(w.reference(), Some("RES123456"));
        assert!(matches!(w.next(), Err(WizardError::Finished)));
        assert!(matches!(w.previous(), Err(WizardError::Finished)));
        assert!(w.steps()[..3].iter().all(|s| s.completed));
        assert_eq!(w.payment(), &PaymentForm::default());
    }

    #[test]
    fn test_begin_payment_outside_payment_step() {
        let mut w = wizard();
        assert!(matches!(w.begin_payment(), Err(WizardError::NotAtPayment)));
    }

    #[test]
    fn test_restore_and_snapshot_round_trip() {
        let draft = ReservationDraft {
            current_step: 2,
            dates: DraftDates {
                start_date: NaiveDate::from_ymd_opt(2024, 6, 1),
                end_date: NaiveDate::from_ymd_opt(2024, 6, 5),
                guests: 2,
            },
            personal: DraftPersonal {
                first_name: "A".to_string(),
                ..DraftPersonal::default()
            },
        };

        let mut w = wizard();
        w.restore(draft.clone());

        assert_eq!(w.snapshot(), draft);
        assert_eq!(w.current_step(), WizardStep::Personal);
        let steps = w.steps();
        assert!(steps[0].completed);
        assert!(steps[1].active);
        assert!(!steps[1].completed);
    }

    #[test]
    fn test_restore_never_lands_on_confirmation() {
        let mut w = wizard();
        w.restore(ReservationDraft {
            current_step: 4,
            dates: DraftDates::default(),
            personal: DraftPersonal::default(),
        });
        assert_eq!(w.current_step(), WizardStep::Payment);

        let mut w = wizard();
        w.restore(ReservationDraft {
            current_step: 9,
            dates: DraftDates::default(),
            personal: DraftPersonal::default(),
        });
        assert_eq!(w.current_step(), WizardStep::Dates);
    }

    #[test]
    fn test_pricing_getters() {
        let mut w = wizard();
        assert_eq!(w.total_nights(), 0);
        w.update_dates(valid_dates()).unwrap();
        assert_eq!(w.total_nights(), 3);
        assert_eq!(w.base_price(), 300);
        assert_eq!(w.service_fee(), 30);
        assert_eq!(w.taxes(), 15);
        assert_eq!(w.total_price(), 345);
    }

    #[test]
    fn test_empty_stays_rule() {
        let reversed = DatesForm {
            start_date: NaiveDate::from_ymd_opt(2024, 6, 4),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            guests: 1,
        };

        let mut permissive = wizard();
        permissive.update_dates(reversed.clone()).unwrap();
        assert!(permissive.can_proceed());
        assert_eq!(permissive.total_price(), 0);

        let mut strict = ReservationWizard::new(
            listing(100),
            PricingConfig::default(),
            WizardRules {
                reject_empty_stays: true,
            },
        );
        strict.update_dates(reversed).unwrap();
        assert!(!strict.can_proceed());
    }
}
