use crate::error::{GenieError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub category: ModelCategory,
}

impl ModelInfo {
    pub fn new(id: &str, name: &str, provider: &str, category: ModelCategory) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            provider: provider.to_string(),
            category,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelCategory {
    Text,
    Image,
}

/// Vendor family behind a Bedrock model id; decides the payload shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    Amazon,
    Anthropic,
    Cohere,
    AI21,
    Meta,
    Mistral,
}

impl ModelProvider {
    pub fn from_model_id(model_id: &str) -> Option<Self> {
        // Cross-region inference profiles look like "us.anthropic.claude-..."
        let id = model_id
            .split_once('.')
            .filter(|(prefix, _)| prefix.len() == 2)
            .map_or(model_id, |(_, rest)| rest);

        match id {
            id if id.starts_with("amazon.") => Some(ModelProvider::Amazon),
            id if id.starts_with("anthropic.") => Some(ModelProvider::Anthropic),
            id if id.starts_with("cohere.") => Some(ModelProvider::Cohere),
            id if id.starts_with("ai21.") => Some(ModelProvider::AI21),
            id if id.starts_with("meta.") => Some(ModelProvider::Meta),
            id if id.starts_with("mistral.") => Some(ModelProvider::Mistral),
            _ => None,
        }
    }
}

/// Base64 image text plus its MIME type, ready to be shown or written out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    pub data: String,
    pub mime_type: String,
}

impl EncodedImage {
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn png(data: impl Into<String>) -> Self {
        Self::new(data, "image/png")
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.data.trim())
            .map_err(|e| GenieError::Response(format!("Invalid base64 image data: {}", e)))
    }

    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_model_id() {
        assert_eq!(
            ModelProvider::from_model_id("amazon.titan-text-express-v1"),
            Some(ModelProvider::Amazon)
        );
        assert_eq!(
            ModelProvider::from_model_id("us.anthropic.claude-3-haiku-20240307-v1:0"),
            Some(ModelProvider::Anthropic)
        );
        assert_eq!(
            ModelProvider::from_model_id("meta.llama3-8b-instruct-v1:0"),
            Some(ModelProvider::Meta)
        );
        assert_eq!(ModelProvider::from_model_id("gpt-4o"), None);
    }

    #[test]
    fn encoded_image_helpers() {
        let image = EncodedImage::png("aGVsbG8=");
        assert_eq!(image.data_url(), "data:image/png;base64,aGVsbG8=");
        assert_eq!(image.decode().unwrap(), b"hello");
        assert_eq!(image.extension(), "png");
        assert_eq!(EncodedImage::new("", "image/jpeg").extension(), "jpg");
    }

    #[test]
    fn invalid_base64_is_a_response_error() {
        let err = EncodedImage::png("not base64!!").decode().unwrap_err();
        assert!(matches!(err, GenieError::Response(_)));
    }
}
