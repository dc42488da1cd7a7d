pub mod auto_advance;
pub mod wizard_controller;
pub mod wizard_state;

pub use auto_advance::AutoAdvance;
pub use wizard_controller::WizardController;
pub use wizard_state::{Progress, StepOutcome, SubmissionStatus};
