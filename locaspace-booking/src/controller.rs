use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use locaspace_catalog::{PricingBreakdown, PricingConfig};
use locaspace_core::{DraftStore, Notifier, PaymentAdapter, PaymentStatus, Toast};
use locaspace_shared::{Listing, ListingId, ReservationConfirmedEvent};

use crate::autosave::AutosaveTask;
use crate::forms::{DatesForm, FieldErrors, PaymentForm, PersonalForm};
use crate::steps::{WizardStep, WizardStepDescriptor};
use crate::wizard::{ReservationWizard, Transition, WizardError, WizardRules};

/// Collaborators of a mounted wizard.
#[derive(Clone)]
pub struct WizardDeps {
    pub drafts: Arc<dyn DraftStore>,
    pub payments: Arc<dyn PaymentAdapter>,
    pub notifier: Arc<dyn Notifier>,
}

#[derive(Debug, Clone)]
pub struct WizardSettings {
    pub autosave_interval: Duration,
    pub pricing: PricingConfig,
    pub reject_empty_stays: bool,
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self {
            autosave_interval: Duration::from_secs(30),
            pricing: PricingConfig::default(),
            reject_empty_stays: false,
        }
    }
}

/// Everything a client needs to render the wizard. Card data is left out.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardView {
    pub listing_id: ListingId,
    pub listing_title: String,
    pub current_step: u8,
    pub steps: Vec<WizardStepDescriptor>,
    pub dates: DatesForm,
    pub personal: PersonalForm,
    pub errors: FieldErrors,
    pub can_proceed: bool,
    pub processing: bool,
    pub pricing: PricingBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Drives one reservation wizard: draft recovery, autosave, payment.
///
/// Every state change goes through the inner mutex. The payment round trip
/// runs without holding it, so reads keep being served while `processing`
/// blocks navigation.
pub struct WizardController {
    wizard: Arc<Mutex<ReservationWizard>>,
    deps: WizardDeps,
    autosave_interval: Duration,
    autosave: std::sync::Mutex<Option<AutosaveTask>>,
    storage_failing: Arc<AtomicBool>,
}

impl WizardController {
    /// Build the wizard for `listing`, restore its draft if one exists and
    /// start the autosave timer.
    pub async fn mount(listing: Listing, deps: WizardDeps, settings: WizardSettings) -> Self {
        let rules = WizardRules {
            reject_empty_stays: settings.reject_empty_stays,
        };
        let wizard = ReservationWizard::new(listing, settings.pricing.clone(), rules);

        let controller = Self {
            wizard: Arc::new(Mutex::new(wizard)),
            deps,
            autosave_interval: settings.autosave_interval,
            autosave: std::sync::Mutex::new(None),
            storage_failing: Arc::new(AtomicBool::new(false)),
        };

        controller.load_saved_data().await;
        controller.start_autosave();
        let listing_id = controller.listing_id().await;
        info!(listing_id = %listing_id, "Reservation wizard mounted");
        controller
    }

    pub async fn listing_id(&self) -> ListingId {
        self.wizard.lock().await.listing_id().clone()
    }

    /// Restore the stored draft, if any. Storage errors leave the wizard on
    /// its current state.
    pub async fn load_saved_data(&self) {
        let mut wizard = self.wizard.lock().await;
        let listing_id = wizard.listing_id().clone();

        match self.deps.drafts.load_draft(&listing_id).await {
            Ok(Some(draft)) => {
                debug!(listing_id = %listing_id, step = draft.current_step, "Restoring reservation draft");
                wizard.restore(draft);
            }
            Ok(None) => {}
            Err(e) => warn!(listing_id = %listing_id, "Failed to load reservation draft: {}", e),
        }
    }

    fn start_autosave(&self) {
        let wizard = self.wizard.clone();
        let drafts = self.deps.drafts.clone();
        let notifier = self.deps.notifier.clone();
        let failing = self.storage_failing.clone();

        let task = AutosaveTask::spawn(self.autosave_interval, move || {
            let wizard = wizard.clone();
            let drafts = drafts.clone();
            let notifier = notifier.clone();
            let failing = failing.clone();
            async move {
                persist_draft(&wizard, drafts.as_ref(), notifier.as_ref(), &failing).await;
            }
        });

        if let Ok(mut slot) = self.autosave.lock() {
            *slot = Some(task);
        }
    }

    fn stop_autosave(&self) {
        if let Ok(mut slot) = self.autosave.lock() {
            if let Some(task) = slot.take() {
                task.cancel();
            }
        }
    }

    pub fn autosave_running(&self) -> bool {
        self.autosave
            .lock()
            .map(|slot| slot.as_ref().is_some_and(AutosaveTask::is_running))
            .unwrap_or(false)
    }

    /// Write the draft immediately, outside the autosave schedule.
    pub async fn save_now(&self) {
        persist_draft(
            &self.wizard,
            self.deps.drafts.as_ref(),
            self.deps.notifier.as_ref(),
            &self.storage_failing,
        )
        .await;
    }

    /// Stop background work. The stored draft is kept for the next visit.
    pub fn unmount(&self) {
        self.stop_autosave();
        debug!("Reservation wizard unmounted");
    }

    pub async fn view(&self) -> WizardView {
        let wizard = self.wizard.lock().await;
        WizardView {
            listing_id: wizard.listing_id().clone(),
            listing_title: wizard.listing().title.clone(),
            current_step: wizard.current_step().number(),
            steps: wizard.steps(),
            dates: wizard.dates().clone(),
            personal: wizard.personal().clone(),
            errors: wizard.validate_step(wizard.current_step()),
            can_proceed: wizard.can_proceed(),
            processing: wizard.is_processing(),
            pricing: wizard.pricing(),
            reference: wizard.reference().map(str::to_string),
        }
    }

    pub async fn update_dates(&self, form: DatesForm) -> Result<(), WizardError> {
        self.wizard.lock().await.update_dates(form)
    }

    pub async fn update_personal(&self, form: PersonalForm) -> Result<(), WizardError> {
        self.wizard.lock().await.update_personal(form)
    }

    pub async fn update_payment(&self, form: PaymentForm) -> Result<(), WizardError> {
        self.wizard.lock().await.update_payment(form)
    }

    /// Advance one step. On the payment step this runs the payment and
    /// only moves to the confirmation once it succeeded.
    pub async fn next(&self) -> Result<WizardStep, WizardError> {
        let transition = self.wizard.lock().await.next()?;
        match transition {
            Transition::Moved(step) => Ok(step),
            Transition::PaymentRequired => {
                self.process_payment().await?;
                Ok(WizardStep::Confirmation)
            }
        }
    }

    pub async fn previous(&self) -> Result<WizardStep, WizardError> {
        self.wizard.lock().await.previous()
    }

    /// Run the payment round trip for the current answers.
    pub async fn process_payment(&self) -> Result<ReservationConfirmedEvent, WizardError> {
        let request = self.wizard.lock().await.begin_payment()?;
        info!(listing_id = %request.listing_id, total = request.total_price, "Processing payment");

        let outcome = match self.deps.payments.process_payment(&request).await {
            Ok(receipt) if receipt.status == PaymentStatus::Succeeded => Ok(receipt),
            Ok(receipt) => {
                warn!(listing_id = %request.listing_id, status = ?receipt.status, "Payment not accepted");
                Err(WizardError::PaymentDeclined)
            }
            Err(e) => {
                warn!(listing_id = %request.listing_id, "Payment failed: {}", e);
                Err(WizardError::Core(e))
            }
        };

        let receipt = match outcome {
            Ok(receipt) => receipt,
            Err(e) => {
                self.wizard.lock().await.abort_payment();
                let message = match &e {
                    WizardError::Core(core) => core.user_message(),
                    _ => "The payment could not be completed.".to_string(),
                };
                self.deps.notifier.notify(Toast::error("Payment failed", message));
                return Err(e);
            }
        };

        self.wizard.lock().await.complete_payment(receipt.reference.clone());
        self.stop_autosave();

        if let Err(e) = self.deps.drafts.delete_draft(&request.listing_id).await {
            warn!(listing_id = %request.listing_id, "Failed to delete reservation draft: {}", e);
        }

        info!(listing_id = %request.listing_id, reference = %receipt.reference, "Reservation confirmed");
        self.deps.notifier.notify(Toast::success(
            "Reservation confirmed",
            format!("Your reference is {}.", receipt.reference),
        ));

        Ok(ReservationConfirmedEvent::new(
            request.listing_id,
            receipt.reference,
            request.total_price,
            receipt.completed_at,
        ))
    }
}

impl Drop for WizardController {
    fn drop(&mut self) {
        self.stop_autosave();
    }
}

/// Save the wizard's draft. One warning toast per streak of failures.
///
/// The wizard stays locked until the write returns, so a confirmation
/// cannot slip in between and have its draft deletion overwritten.
async fn persist_draft(
    wizard: &Mutex<ReservationWizard>,
    drafts: &dyn DraftStore,
    notifier: &dyn Notifier,
    failing: &AtomicBool,
) {
    let wizard = wizard.lock().await;
    if wizard.is_complete() {
        return;
    }
    let listing_id = wizard.listing_id().clone();
    let draft = wizard.snapshot();

    let saved = drafts.save_draft(&listing_id, &draft).await;
    drop(wizard);

    match saved {
        Ok(()) => {
            debug!(listing_id = %listing_id, step = draft.current_step, "Reservation draft saved");
            failing.store(false, Ordering::SeqCst);
        }
        Err(e) => {
            warn!(listing_id = %listing_id, "Failed to save reservation draft: {}", e);
            if !failing.swap(true, Ordering::SeqCst) {
                notifier.notify(Toast::warning("Draft not saved", e.user_message()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::tests::{valid_dates, valid_payment, valid_personal};
    use crate::orchestrator::SimulatedPaymentGateway;
    use crate::wizard::tests::listing;
    use async_trait::async_trait;
    use locaspace_core::{CoreError, CoreResult, RecordingNotifier, ToastLevel};
    use locaspace_shared::{DraftDates, DraftPersonal, ReservationDraft};
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryDrafts {
        drafts: Mutex<HashMap<String, ReservationDraft>>,
        broken: AtomicBool,
        /// When set, saves park until `release` is notified.
        hold_saves: AtomicBool,
        entered: tokio::sync::Notify,
        release: tokio::sync::Notify,
    }

    impl MemoryDrafts {
        fn check(&self) -> CoreResult<()> {
            if self.broken.load(Ordering::SeqCst) {
                Err(CoreError::StorageError("quota exceeded".to_string()))
            } else {
                Ok(())
            }
        }

        async fn get(&self, id: &ListingId) -> Option<ReservationDraft> {
            self.drafts.lock().await.get(id.as_str()).cloned()
        }
    }

    #[async_trait]
    impl DraftStore for MemoryDrafts {
        async fn load_draft(&self, listing_id: &ListingId) -> CoreResult<Option<ReservationDraft>> {
            self.check()?;
            Ok(self.get(listing_id).await)
        }

        async fn save_draft(&self, listing_id: &ListingId, draft: &ReservationDraft) -> CoreResult<()> {
            self.check()?;
            if self.hold_saves.load(Ordering::SeqCst) {
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.drafts
                .lock()
                .await
                .insert(listing_id.as_str().to_string(), draft.clone());
            Ok(())
        }

        async fn delete_draft(&self, listing_id: &ListingId) -> CoreResult<()> {
            self.check()?;
            self.drafts.lock().await.remove(listing_id.as_str());
            Ok(())
        }
    }

    struct Harness {
        drafts: Arc<MemoryDrafts>,
        notifier: Arc<RecordingNotifier>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                drafts: Arc::new(MemoryDrafts::default()),
                notifier: Arc::new(RecordingNotifier::new()),
            }
        }

        fn deps(&self, payments: SimulatedPaymentGateway) -> WizardDeps {
            WizardDeps {
                drafts: self.drafts.clone(),
                payments: Arc::new(payments),
                notifier: self.notifier.clone(),
            }
        }

        async fn mount(&self, payments: SimulatedPaymentGateway) -> WizardController {
            WizardController::mount(listing(100), self.deps(payments), WizardSettings::default()).await
        }
    }

    async fn fill_until_payment(controller: &WizardController) {
        controller.update_dates(valid_dates()).await.unwrap();
        controller.next().await.unwrap();
        controller.update_personal(valid_personal()).await.unwrap();
        controller.next().await.unwrap();
        controller.update_payment(valid_payment()).await.unwrap();
    }

    #[tokio::test]
    async fn test_mount_restores_draft() {
        let harness = Harness::new();
        harness
            .drafts
            .save_draft(
                &ListingId::from(7),
                &ReservationDraft {
                    current_step: 2,
                    dates: DraftDates {
                        start_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 1),
                        end_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 5),
                        guests: 2,
                    },
                    personal: DraftPersonal {
                        first_name: "A".to_string(),
                        ..DraftPersonal::default()
                    },
                },
            )
            .await
            .unwrap();

        let controller = harness.mount(SimulatedPaymentGateway::new(Duration::ZERO)).await;
        let view = controller.view().await;
        assert_eq!(view.current_step, 2);
        assert!(view.steps[0].completed);
        assert!(view.steps[1].active);
        assert_eq!(view.personal.first_name, "A");
        assert_eq!(view.pricing.nights, 4);
        assert!(controller.autosave_running());
    }

    #[tokio::test]
    async fn test_mount_survives_broken_storage() {
        let harness = Harness::new();
        harness.drafts.broken.store(true, Ordering::SeqCst);

        let controller = harness.mount(SimulatedPaymentGateway::new(Duration::ZERO)).await;
        assert_eq!(controller.view().await.current_step, 1);
    }

    #[tokio::test]
    async fn test_save_now_writes_draft_without_card_data() {
        let harness = Harness::new();
        let controller = harness.mount(SimulatedPaymentGateway::new(Duration::ZERO)).await;
        fill_until_payment(&controller).await;

        controller.save_now().await;

        let draft = harness.drafts.get(&ListingId::from(7)).await.unwrap();
        assert_eq!(draft.current_step, 3);
        assert_eq!(draft.personal.first_name, "Camille");
        let json = serde_json::to_string(&draft).unwrap();
        assert!(!json.contains("4242"));
    }

    #[tokio::test]
    async fn test_storage_failures_warn_once_per_streak() {
        let harness = Harness::new();
        let controller = harness.mount(SimulatedPaymentGateway::new(Duration::ZERO)).await;
        harness.drafts.broken.store(true, Ordering::SeqCst);

        controller.save_now().await;
        controller.save_now().await;
        assert_eq!(harness.notifier.count(ToastLevel::Warning), 1);

        harness.drafts.broken.store(false, Ordering::SeqCst);
        controller.save_now().await;
        harness.drafts.broken.store(true, Ordering::SeqCst);
        controller.save_now().await;
        assert_eq!(harness.notifier.count(ToastLevel::Warning), 2);
        assert_eq!(controller.view().await.current_step, 1);
    }

    #[tokio::test]
    async fn test_successful_payment_confirms_and_cleans_up() {
        let harness = Harness::new();
        let controller = harness.mount(SimulatedPaymentGateway::new(Duration::ZERO)).await;
        fill_until_payment(&controller).await;
        controller.save_now().await;
        assert!(harness.drafts.get(&ListingId::from(7)).await.is_some());

        assert_eq!(controller.next().await.unwrap(), WizardStep::Confirmation);

        let view = controller.view().await;
        assert_eq!(view.current_step, 4);
        assert!(!view.processing);
        assert!(view.reference.as_deref().is_some_and(|r| r.starts_with("RES")));
        assert!(harness.drafts.get(&ListingId::from(7)).await.is_none());
        assert!(!controller.autosave_running());
        assert_eq!(harness.notifier.count(ToastLevel::Success), 1);
    }

    #[tokio::test]
    async fn test_in_flight_save_cannot_revive_confirmed_draft() {
        let harness = Harness::new();
        let controller = Arc::new(harness.mount(SimulatedPaymentGateway::new(Duration::ZERO)).await);
        fill_until_payment(&controller).await;

        harness.drafts.hold_saves.store(true, Ordering::SeqCst);
        let saving = tokio::spawn({
            let controller = controller.clone();
            async move { controller.save_now().await }
        });
        harness.drafts.entered.notified().await;

        let paying = tokio::spawn({
            let controller = controller.clone();
            async move { controller.next().await }
        });
        tokio::task::yield_now().await;
        harness.drafts.hold_saves.store(false, Ordering::SeqCst);
        harness.drafts.release.notify_one();

        saving.await.unwrap();
        assert_eq!(paying.await.unwrap().unwrap(), WizardStep::Confirmation);
        assert!(harness.drafts.get(&ListingId::from(7)).await.is_none());
    }

    #[tokio::test]
    async fn test_failed_payment_stays_on_payment_step() {
        let harness = Harness::new();
        let controller = harness.mount(SimulatedPaymentGateway::failing(Duration::ZERO)).await;
        fill_until_payment(&controller).await;

        assert!(matches!(controller.next().await, Err(WizardError::Core(CoreError::PaymentError(_)))));

        let view = controller.view().await;
        assert_eq!(view.current_step, 3);
        assert!(!view.processing);
        assert!(view.reference.is_none());
        assert_eq!(harness.notifier.count(ToastLevel::Error), 1);
        assert!(controller.autosave_running());
    }

    #[tokio::test]
    async fn test_navigation_blocked_while_processing() {
        let harness = Harness::new();
        let controller = Arc::new(harness.mount(SimulatedPaymentGateway::new(Duration::from_millis(200))).await);
        fill_until_payment(&controller).await;

        let paying = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.process_payment().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let view = controller.view().await;
        assert!(view.processing);
        assert!(!view.can_proceed);
        assert!(matches!(controller.next().await, Err(WizardError::Busy)));
        assert!(matches!(controller.previous().await, Err(WizardError::Busy)));

        let event = paying.await.unwrap().unwrap();
        assert_eq!(event.total_price, 345);
        assert_eq!(controller.view().await.current_step, 4);
    }

    #[tokio::test]
    async fn test_unmount_stops_autosave() {
        let harness = Harness::new();
        let controller = harness.mount(SimulatedPaymentGateway::new(Duration::ZERO)).await;
        assert!(controller.autosave_running());
        controller.unmount();
        assert!(!controller.autosave_running());
    }
}
