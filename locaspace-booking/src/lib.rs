pub mod autosave;
pub mod controller;
pub mod forms;
pub mod orchestrator;
pub mod steps;
pub mod wizard;

pub use autosave::AutosaveTask;
pub use controller::{WizardController, WizardDeps, WizardSettings, WizardView};
pub use forms::{DatesForm, FieldErrors, PaymentForm, PersonalForm};
pub use orchestrator::{reservation_reference, BackendPaymentAdapter, SimulatedPaymentGateway};
pub use steps::{step_descriptors, WizardStep, WizardStepDescriptor};
pub use wizard::{ReservationWizard, Transition, WizardError, WizardRules};
