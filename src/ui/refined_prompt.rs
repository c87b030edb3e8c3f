use crate::pipeline::AppState;
use colored::*;

/// Shown once a refined prompt exists and nothing is in flight.
pub fn render(state: &AppState) -> Option<String> {
    if state.refined_prompt.is_empty() || state.loading {
        return None;
    }
    Some(format!(
        "{}\n   {}",
        "Refined Prompt:".bright_cyan().bold(),
        state.refined_prompt.italic()
    ))
}
