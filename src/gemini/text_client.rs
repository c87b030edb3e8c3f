use super::GeminiTransport;
use crate::{
    error::{GenieError, Result},
    models::gemini::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig},
    services::{prompts, PromptRefiner},
};
use async_trait::async_trait;

#[derive(Clone)]
pub struct GeminiTextClient {
    transport: GeminiTransport,
    model: String,
}

impl GeminiTextClient {
    pub fn new(transport: GeminiTransport, model: &str) -> Self {
        Self {
            transport,
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn build_request(raw_prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user(raw_prompt.trim())],
            system_instruction: Some(Content::system(prompts::REFINEMENT_INSTRUCTION)),
            generation_config: Some(GenerationConfig {
                temperature: Some(0.7),
                max_output_tokens: None,
            }),
        }
    }

    pub fn parse_response(response: &GenerateContentResponse) -> Result<String> {
        match response.text() {
            Some(text) => prompts::clean_refined_prompt(&text),
            None => {
                let reason = response
                    .prompt_feedback
                    .as_ref()
                    .and_then(|feedback| feedback.block_reason.clone())
                    .or_else(|| {
                        response
                            .candidates
                            .first()
                            .and_then(|candidate| candidate.finish_reason.clone())
                    });
                Err(GenieError::Response(match reason {
                    Some(reason) => format!("Gemini returned no text ({})", reason),
                    None => "Gemini returned no text".to_string(),
                }))
            }
        }
    }
}

#[async_trait]
impl PromptRefiner for GeminiTextClient {
    fn label(&self) -> &str {
        "Gemini"
    }

    async fn refine(&self, raw_prompt: &str) -> Result<String> {
        log::info!("Refining prompt with model: {}", self.model);

        let url = self.transport.endpoint(&self.model, "generateContent");
        let request = Self::build_request(raw_prompt);
        let response: GenerateContentResponse = self.transport.post_json(&url, &request).await?;

        let refined = Self::parse_response(&response)?;
        log::debug!("Refined prompt: {}", refined);
        Ok(refined)
    }
}
