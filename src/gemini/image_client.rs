use super::GeminiTransport;
use crate::{
    error::{GenieError, Result},
    models::{
        gemini::{PredictInstance, PredictParameters, PredictRequest, PredictResponse},
        EncodedImage,
    },
    services::{prompts, ImageGenerator},
};
use async_trait::async_trait;

#[derive(Clone)]
pub struct GeminiImageClient {
    transport: GeminiTransport,
    model: String,
}

impl GeminiImageClient {
    pub fn new(transport: GeminiTransport, model: &str) -> Self {
        Self {
            transport,
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn build_request(prompt: &str) -> PredictRequest {
        PredictRequest {
            instances: vec![PredictInstance {
                prompt: prompts::with_style_suffix(prompt),
            }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: "1:1".to_string(),
                output_mime_type: "image/png".to_string(),
            },
        }
    }

    pub fn parse_response(response: PredictResponse) -> Result<EncodedImage> {
        if response.predictions.is_empty() {
            return Err(GenieError::Response("No images generated".into()));
        }

        let mut filtered = None;
        for prediction in response.predictions {
            match prediction.bytes_base64_encoded {
                Some(data) if !data.is_empty() => {
                    let mime_type = prediction
                        .mime_type
                        .unwrap_or_else(|| "image/png".to_string());
                    let image = EncodedImage::new(data, mime_type);
                    image.decode()?;
                    return Ok(image);
                }
                _ => filtered = filtered.or(prediction.rai_filtered_reason),
            }
        }

        Err(GenieError::Response(match filtered {
            Some(reason) => format!("Image was filtered: {}", reason),
            None => "No images generated".to_string(),
        }))
    }
}

#[async_trait]
impl ImageGenerator for GeminiImageClient {
    fn label(&self) -> &str {
        "Imagen"
    }

    async fn generate(&self, refined_prompt: &str) -> Result<EncodedImage> {
        log::info!("Generating image with model: {}", self.model);

        let url = self.transport.endpoint(&self.model, "predict");
        let request = Self::build_request(refined_prompt);
        let response: PredictResponse = self.transport.post_json(&url, &request).await?;

        let image = Self::parse_response(response)?;
        log::debug!("Image data length: {} characters", image.data.len());
        Ok(image)
    }
}
