//! Wizard steps

use serde::Serialize;
use std::fmt;

/// Steps of the scheduling wizard, in order
///
/// A failed submission does not get its own step: the wizard stays in
/// [`WizardStep::Confirming`] with the failure recorded so the same drafts
/// can be submitted again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    SelectingDates,
    SelectingTimeSlots,
    EnteringDetails,
    Confirming,
    Submitted,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::SelectingDates,
        WizardStep::SelectingTimeSlots,
        WizardStep::EnteringDetails,
        WizardStep::Confirming,
        WizardStep::Submitted,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            WizardStep::SelectingDates => "Select dates",
            WizardStep::SelectingTimeSlots => "Select time slots",
            WizardStep::EnteringDetails => "Enter details",
            WizardStep::Confirming => "Confirm",
            WizardStep::Submitted => "Submitted",
        }
    }

    /// Following step, `None` once submitted
    pub fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::SelectingDates => Some(WizardStep::SelectingTimeSlots),
            WizardStep::SelectingTimeSlots => Some(WizardStep::EnteringDetails),
            WizardStep::EnteringDetails => Some(WizardStep::Confirming),
            WizardStep::Confirming => Some(WizardStep::Submitted),
            WizardStep::Submitted => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        *self == WizardStep::Submitted
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
