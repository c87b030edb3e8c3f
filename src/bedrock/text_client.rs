use super::invoke_json;
use crate::{
    error::{GenieError, Result},
    models::{
        AnthropicResponse, LlamaResponse, ModelCategory, ModelInfo, ModelProvider,
        TextGenerationRequest, TextGenerationResponse, TitanTextResponse,
    },
    services::{prompts, PromptRefiner},
};
use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client;
use serde_json::{json, Value};

#[derive(Clone)]
pub struct TextClient {
    client: Client,
    model_id: String,
}

impl TextClient {
    pub fn new(client: Client, model_id: &str) -> Self {
        Self {
            client,
            model_id: model_id.to_string(),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn supported_models() -> Vec<ModelInfo> {
        vec![
            ModelInfo::new(
                "amazon.titan-text-express-v1",
                "Titan Text Express",
                "Amazon",
                ModelCategory::Text,
            ),
            ModelInfo::new(
                "amazon.titan-text-lite-v1",
                "Titan Text Lite",
                "Amazon",
                ModelCategory::Text,
            ),
            ModelInfo::new(
                "anthropic.claude-3-haiku-20240307-v1:0",
                "Claude 3 Haiku",
                "Anthropic",
                ModelCategory::Text,
            ),
            ModelInfo::new(
                "anthropic.claude-3-5-sonnet-20240620-v1:0",
                "Claude 3.5 Sonnet",
                "Anthropic",
                ModelCategory::Text,
            ),
            ModelInfo::new(
                "meta.llama3-8b-instruct-v1:0",
                "Llama 3 8B Instruct",
                "Meta",
                ModelCategory::Text,
            ),
            ModelInfo::new(
                "mistral.mistral-7b-instruct-v0:2",
                "Mistral 7B Instruct",
                "Mistral",
                ModelCategory::Text,
            ),
            ModelInfo::new(
                "cohere.command-text-v14",
                "Command",
                "Cohere",
                ModelCategory::Text,
            ),
            ModelInfo::new(
                "ai21.j2-mid-v1",
                "Jurassic-2 Mid",
                "AI21",
                ModelCategory::Text,
            ),
        ]
    }

    pub fn build_request_payload(request: &TextGenerationRequest, model_id: &str) -> Result<Value> {
        let provider = ModelProvider::from_model_id(model_id).ok_or_else(|| {
            GenieError::Request(format!("Unsupported model ID: {}", model_id))
        })?;

        let max_tokens = request.max_tokens.unwrap_or(512);
        let temperature = request.temperature.unwrap_or(0.7);

        let flattened = || match &request.system {
            Some(system) => format!("{}\n\n{}", system, request.prompt),
            None => request.prompt.clone(),
        };

        let payload = match provider {
            ModelProvider::Anthropic => {
                let mut payload = json!({
                    "messages": [
                        {
                            "role": "user",
                            "content": request.prompt
                        }
                    ],
                    "max_tokens": max_tokens,
                    "temperature": temperature,
                    "anthropic_version": "bedrock-2023-05-31"
                });
                if let Some(system) = &request.system {
                    payload["system"] = json!(system);
                }
                payload
            }
            ModelProvider::Amazon => json!({
                "inputText": flattened(),
                "textGenerationConfig": {
                    "maxTokenCount": max_tokens,
                    "temperature": temperature,
                    "topP": 0.9
                }
            }),
            ModelProvider::Meta => json!({
                "prompt": flattened(),
                "max_gen_len": max_tokens,
                "temperature": temperature,
                "top_p": 0.9
            }),
            ModelProvider::Mistral => json!({
                "prompt": flattened(),
                "max_tokens": max_tokens,
                "temperature": temperature,
                "top_p": 0.9
            }),
            ModelProvider::Cohere => json!({
                "prompt": flattened(),
                "max_tokens": max_tokens,
                "temperature": temperature,
                "p": 0.9
            }),
            ModelProvider::AI21 => json!({
                "prompt": flattened(),
                "maxTokens": max_tokens,
                "temperature": temperature,
                "topP": 0.9
            }),
        };

        Ok(payload)
    }

    pub fn parse_response(body: &str, model_id: &str) -> Result<TextGenerationResponse> {
        let provider = ModelProvider::from_model_id(model_id).ok_or_else(|| {
            GenieError::Response(format!("Unexpected model type in response: {}", model_id))
        })?;
        let parse_err = |e: serde_json::Error| GenieError::Response(e.to_string());

        let (text, finish_reason) = match provider {
            ModelProvider::Amazon => {
                let response: TitanTextResponse = serde_json::from_str(body).map_err(parse_err)?;
                let first = response
                    .results
                    .into_iter()
                    .next()
                    .ok_or_else(|| GenieError::Response("No text generated".into()))?;
                (first.output_text, first.completion_reason)
            }
            ModelProvider::Anthropic => {
                let response: AnthropicResponse = serde_json::from_str(body).map_err(parse_err)?;
                let text = response
                    .content
                    .iter()
                    .filter(|block| block.kind == "text")
                    .map(|block| block.text.as_str())
                    .collect::<String>();
                (text, response.stop_reason)
            }
            ModelProvider::Meta => {
                let response: LlamaResponse = serde_json::from_str(body).map_err(parse_err)?;
                (response.generation, response.stop_reason)
            }
            ModelProvider::Mistral => {
                let json: Value = serde_json::from_str(body).map_err(parse_err)?;
                (
                    json["outputs"][0]["text"].as_str().unwrap_or("").to_string(),
                    json["outputs"][0]["stop_reason"].as_str().map(String::from),
                )
            }
            ModelProvider::Cohere => {
                let json: Value = serde_json::from_str(body).map_err(parse_err)?;
                (
                    json["generations"][0]["text"].as_str().unwrap_or("").to_string(),
                    json["generations"][0]["finish_reason"].as_str().map(String::from),
                )
            }
            ModelProvider::AI21 => {
                let json: Value = serde_json::from_str(body).map_err(parse_err)?;
                (
                    json["completions"][0]["data"]["text"]
                        .as_str()
                        .unwrap_or("")
                        .to_string(),
                    json["completions"][0]["finishReason"]["reason"]
                        .as_str()
                        .map(String::from),
                )
            }
        };

        Ok(TextGenerationResponse {
            text,
            model: model_id.to_string(),
            finish_reason,
        })
    }

    pub async fn generate(&self, request: TextGenerationRequest) -> Result<TextGenerationResponse> {
        let model_id = request.model_id.as_deref().unwrap_or(&self.model_id);
        let payload = Self::build_request_payload(&request, model_id)?;

        log::info!("Invoking model: {}", model_id);
        let body = invoke_json(&self.client, model_id, &payload).await?;

        let response = Self::parse_response(&body, model_id)?;
        if let Some(reason) = &response.finish_reason {
            log::debug!("Finish reason: {}", reason);
        }
        Ok(response)
    }

    /// Anthropic models take the instruction as a system prompt; everything
    /// else gets it folded into a single-turn prompt.
    pub fn refinement_request(&self, raw_prompt: &str) -> TextGenerationRequest {
        let mut request = if ModelProvider::from_model_id(&self.model_id)
            == Some(ModelProvider::Anthropic)
        {
            let mut request = TextGenerationRequest::new(raw_prompt.trim());
            request.system = Some(prompts::REFINEMENT_INSTRUCTION.to_string());
            request
        } else {
            TextGenerationRequest::new(prompts::refinement_prompt(raw_prompt))
        };
        request.max_tokens = Some(256);
        request.temperature = Some(0.7);
        request
    }
}

#[async_trait]
impl PromptRefiner for TextClient {
    fn label(&self) -> &str {
        "Bedrock"
    }

    async fn refine(&self, raw_prompt: &str) -> Result<String> {
        let response = self.generate(self.refinement_request(raw_prompt)).await?;
        prompts::clean_refined_prompt(&response.text)
    }
}
