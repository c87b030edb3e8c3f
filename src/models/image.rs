use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub model_id: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub num_images: Option<u32>,
}

impl ImageGenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model_id: None,
            width: None,
            height: None,
            num_images: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageGenerationResponse {
    pub image_data: String, // Base64 encoded
    pub mime_type: String,
    pub model: String,
}

#[derive(Serialize, Deserialize)]
pub struct TitanImageResponse {
    pub images: Vec<String>,
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct StabilityImageResponse {
    pub artifacts: Vec<StabilityArtifact>,
}

#[derive(Serialize, Deserialize)]
pub struct StabilityArtifact {
    pub base64: String,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}
