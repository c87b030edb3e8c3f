use crate::pipeline::AppState;
use colored::*;

pub fn render(state: &AppState) -> Option<String> {
    let message = state.error.as_deref()?;
    Some(format!(
        "{} {}\n   {}",
        "❌",
        "Error".red().bold(),
        message.red()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_without_error() {
        assert!(render(&AppState::new()).is_none());
    }

    #[test]
    fn shows_message() {
        let mut state = AppState::new();
        state.error = Some("Please enter a prompt.".into());
        assert!(render(&state).unwrap().contains("Please enter a prompt."));
    }
}
