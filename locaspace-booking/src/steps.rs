use serde::{Deserialize, Serialize};

/// Steps of the reservation flow, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    Dates = 1,
    Personal = 2,
    Payment = 3,
    Confirmation = 4,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::Dates,
        WizardStep::Personal,
        WizardStep::Payment,
        WizardStep::Confirmation,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == n)
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Dates => "Dates",
            WizardStep::Personal => "Your details",
            WizardStep::Payment => "Payment",
            WizardStep::Confirmation => "Confirmation",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            WizardStep::Dates => "Choose your dates and number of guests",
            WizardStep::Personal => "Tell the host who is coming",
            WizardStep::Payment => "Pay securely",
            WizardStep::Confirmation => "Your reservation is confirmed",
        }
    }
}

/// Step indicator as shown above the wizard. Always derived from the
/// current step, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WizardStepDescriptor {
    pub id: u8,
    pub title: &'static str,
    pub description: &'static str,
    pub completed: bool,
    pub active: bool,
}

pub fn step_descriptors(current: WizardStep) -> Vec<WizardStepDescriptor> {
    WizardStep::ALL
        .into_iter()
        .map(|step| WizardStepDescriptor {
            id: step.number(),
            title: step.title(),
            description: step.description(),
            completed: step < current,
            active: step == current,
        })
        .collect()
}
