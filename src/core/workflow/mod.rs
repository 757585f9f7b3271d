//! Multi-appointment scheduling wizard
//!
//! ```text
//! SelectingDates -> SelectingTimeSlots -> EnteringDetails -> Confirming -> Submitted
//! ```
//!
//! Forward moves are guarded (a date, a draft, every draft complete). Backward
//! moves are free. A failed submission keeps the wizard in `Confirming`.

pub mod step;
pub mod submission;
pub mod wizard;

pub use step::WizardStep;
pub use submission::{CreatedDraft, SubmissionFailure, SubmissionMode, SubmissionReport};
pub use wizard::{SchedulingWorkflow, SlotView};
