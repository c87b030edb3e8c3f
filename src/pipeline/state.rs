use crate::models::EncodedImage;
use serde::Serialize;

/// Everything the views need to render one interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppState {
    pub initial_prompt: String,
    pub refined_prompt: String,
    pub generated_image: Option<EncodedImage>,
    pub loading: bool,
    pub error: Option<String>,
    pub stage: String,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_complete(&self) -> bool {
        !self.loading && self.error.is_none() && self.generated_image.is_some()
    }

    /// Alt text for the image: the refined prompt, else what the user typed.
    pub fn alt_text(&self) -> &str {
        if self.refined_prompt.is_empty() {
            &self.initial_prompt
        } else {
            &self.refined_prompt
        }
    }

    pub(crate) fn begin(&mut self) {
        self.loading = true;
        self.error = None;
        self.refined_prompt.clear();
        self.generated_image = None;
    }

    pub(crate) fn finish(&mut self) {
        self.loading = false;
        self.stage.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_clears_previous_results() {
        let mut state = AppState {
            initial_prompt: "a cat".into(),
            refined_prompt: "old".into(),
            generated_image: Some(EncodedImage::png("aGk=")),
            loading: false,
            error: Some("boom".into()),
            stage: String::new(),
        };
        state.begin();
        assert!(state.loading);
        assert!(state.refined_prompt.is_empty());
        assert!(state.generated_image.is_none());
        assert!(state.error.is_none());
        assert_eq!(state.initial_prompt, "a cat");
    }

    #[test]
    fn alt_text_prefers_refined_prompt() {
        let mut state = AppState::new();
        state.initial_prompt = "a cat".into();
        assert_eq!(state.alt_text(), "a cat");
        state.refined_prompt = "pixel cat".into();
        assert_eq!(state.alt_text(), "pixel cat");
    }
}
