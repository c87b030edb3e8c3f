//! Capabilities the orchestrator consumes: prompt refinement and image
//! generation. Each backend implements both traits.

pub mod prompts;

use crate::{
    config::{Backend, Config},
    error::Result,
    gemini::GeminiClient,
    models::EncodedImage,
};
use async_trait::async_trait;
use std::sync::Arc;

#[cfg(not(feature = "bedrock"))]
use crate::error::GenieError;

/// Turns a raw idea into a style-targeted prompt.
#[async_trait]
pub trait PromptRefiner: Send + Sync {
    /// Short service name shown in progress labels, e.g. "Gemini".
    fn label(&self) -> &str;

    async fn refine(&self, raw_prompt: &str) -> Result<String>;
}

/// Renders a prompt into an encoded image.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    fn label(&self) -> &str;

    async fn generate(&self, refined_prompt: &str) -> Result<EncodedImage>;
}

/// Builds the refiner/generator pair for the configured backend.
pub async fn connect(
    config: &Config,
) -> Result<(Arc<dyn PromptRefiner>, Arc<dyn ImageGenerator>)> {
    match config.backend {
        Backend::Gemini => {
            let client = GeminiClient::new(config.gemini.clone())?;
            log::info!(
                "Using Gemini backend ({} / {})",
                client.text().model(),
                client.image().model()
            );
            let refiner: Arc<dyn PromptRefiner> = Arc::new(client.text().clone());
            let generator: Arc<dyn ImageGenerator> = Arc::new(client.image().clone());
            Ok((refiner, generator))
        }
        Backend::Bedrock => {
            #[cfg(feature = "bedrock")]
            {
                let client = crate::bedrock::BedrockClient::new(config.bedrock.clone()).await?;
                log::info!(
                    "Using Bedrock backend in {} ({} / {})",
                    config.bedrock.region_or_default(),
                    client.text().model_id(),
                    client.image().model_id()
                );
                let refiner: Arc<dyn PromptRefiner> = Arc::new(client.text().clone());
                let generator: Arc<dyn ImageGenerator> = Arc::new(client.image().clone());
                Ok((refiner, generator))
            }
            #[cfg(not(feature = "bedrock"))]
            {
                Err(GenieError::Config("Bedrock feature not enabled".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeminiConfig;

    #[tokio::test]
    async fn gemini_backend_needs_a_key() {
        let err = connect(&Config::new()).await.err().unwrap();
        assert!(matches!(err, crate::error::GenieError::Config(_)));
    }

    #[tokio::test]
    async fn gemini_backend_labels() {
        let config = Config::new().with_gemini(GeminiConfig::new().with_api_key("key"));
        let (refiner, generator) = connect(&config).await.unwrap();
        assert_eq!(refiner.label(), "Gemini");
        assert_eq!(generator.label(), "Imagen");
    }
}
