pub use cleanup_task::start_cleanup_task;
pub use handlers::{get_wizard, start_wizard, wizard_action};
pub use service::WizardService;
pub use state::{WizardAction, WizardError, WizardSession, WizardState};

mod cleanup_task;
mod handlers;
pub mod service;
pub mod state;
pub mod store;
pub mod types;
