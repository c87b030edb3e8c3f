use super::state::AppState;
use crate::{
    error::GenieError,
    logger,
    services::{ImageGenerator, PromptRefiner},
};
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

pub const VALIDATION_MESSAGE: &str = "Please enter a prompt.";

enum Admission {
    Busy,
    Rejected,
    Started(String),
}

/// Runs refine-then-generate for one submission at a time and publishes
/// every state transition on a watch channel.
pub struct Orchestrator {
    refiner: Arc<dyn PromptRefiner>,
    generator: Arc<dyn ImageGenerator>,
    state: watch::Sender<AppState>,
}

impl Orchestrator {
    pub fn new(refiner: Arc<dyn PromptRefiner>, generator: Arc<dyn ImageGenerator>) -> Self {
        let (state, _) = watch::channel(AppState::new());
        Self {
            refiner,
            generator,
            state,
        }
    }

    pub fn refiner_label(&self) -> &str {
        self.refiner.label()
    }

    pub fn generator_label(&self) -> &str {
        self.generator.label()
    }

    pub fn state(&self) -> AppState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    /// Replaces the prompt text. Ignored while a sequence is running, since
    /// the input is disabled then.
    pub fn set_prompt(&self, prompt: impl Into<String>) {
        let prompt = prompt.into();
        self.state.send_if_modified(|state| {
            if state.loading || state.initial_prompt == prompt {
                false
            } else {
                state.initial_prompt = prompt;
                true
            }
        });
    }

    /// Sets the prompt and submits it in one step. While another sequence is
    /// running, neither happens.
    pub async fn generate(&self, prompt: impl Into<String>) -> AppState {
        self.start(Some(prompt.into())).await
    }

    /// Validates the current prompt, then refines it and renders the result.
    /// Failures end up in `AppState::error`; a submission made while another
    /// is in flight is ignored.
    pub async fn submit(&self) -> AppState {
        self.start(None).await
    }

    async fn start(&self, prompt: Option<String>) -> AppState {
        let prompt = match self.admit(prompt) {
            Admission::Busy => {
                log::warn!("Submission ignored: a request is already in flight");
                return self.state();
            }
            Admission::Rejected => {
                log::warn!("Submission rejected: empty prompt");
                return self.state();
            }
            Admission::Started(prompt) => prompt,
        };

        let request_id = Uuid::new_v4().to_string();
        let request_id = request_id.as_str();
        log::info!(request_id = request_id; "Starting generation for prompt: {}", prompt);

        if let Err(e) = self.run(request_id, &prompt).await {
            log::error!(request_id = request_id; "Generation failed: {}", e);
            let message = e.user_message();
            self.state.send_modify(|state| state.error = Some(message));
        } else {
            log::info!(request_id = request_id; "Generation finished");
        }

        self.state.send_modify(AppState::finish);
        self.state()
    }

    /// Checks busy, then validation, then starts the sequence, all in one
    /// state update. A new prompt is only written once the busy check passed.
    fn admit(&self, prompt: Option<String>) -> Admission {
        let mut admission = Admission::Busy;
        self.state.send_if_modified(|state| {
            if state.loading {
                return false;
            }
            if let Some(prompt) = prompt {
                state.initial_prompt = prompt;
            }
            if state.initial_prompt.trim().is_empty() {
                state.error = Some(VALIDATION_MESSAGE.to_string());
                admission = Admission::Rejected;
                return true;
            }
            state.begin();
            admission = Admission::Started(state.initial_prompt.clone());
            true
        });
        admission
    }

    async fn run(&self, request_id: &str, prompt: &str) -> Result<(), GenieError> {
        let stage = format!("Refining prompt with {}...", self.refiner.label());
        self.state.send_modify(|state| state.stage = stage);

        let refined = {
            let _timer = logger::timer("prompt refinement", request_id);
            self.refiner.refine(prompt).await?
        };
        log::info!(request_id = request_id; "Refined prompt: {}", refined);

        let stage = format!("Generating pixel art with {}...", self.generator.label());
        self.state.send_modify(|state| {
            state.refined_prompt = refined.clone();
            state.stage = stage;
        });

        let image = {
            let _timer = logger::timer("image generation", request_id);
            self.generator.generate(&refined).await?
        };
        // An image that cannot be decoded is a failed generation, not a result.
        let bytes = image.decode()?;
        log::info!(
            request_id = request_id;
            "Received {} image ({} bytes)",
            image.mime_type,
            bytes.len()
        );

        self.state
            .send_modify(|state| state.generated_image = Some(image));
        Ok(())
    }
}
