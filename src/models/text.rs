use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct TextGenerationRequest {
    pub prompt: String,
    pub system: Option<String>,
    pub max_tokens: Option<i32>,
    pub temperature: Option<f32>,
    pub model_id: Option<String>,
}

impl TextGenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            max_tokens: None,
            temperature: None,
            model_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TextGenerationResponse {
    pub text: String,
    pub model: String,
    pub finish_reason: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct TitanTextResponse {
    pub results: Vec<TitanTextResult>,
}

#[derive(Serialize, Deserialize)]
pub struct TitanTextResult {
    #[serde(rename = "outputText")]
    pub output_text: String,
    #[serde(rename = "completionReason")]
    pub completion_reason: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct AnthropicResponse {
    pub content: Vec<AnthropicContent>,
    pub stop_reason: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct AnthropicContent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize, Deserialize)]
pub struct LlamaResponse {
    pub generation: String,
    pub stop_reason: Option<String>,
}
