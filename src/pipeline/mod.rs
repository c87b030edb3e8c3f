pub mod orchestrator;
pub mod state;

pub use orchestrator::{Orchestrator, VALIDATION_MESSAGE};
pub use state::AppState;
