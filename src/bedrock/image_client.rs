use super::invoke_json;
use crate::{
    error::{GenieError, Result},
    models::{
        EncodedImage, ImageGenerationRequest, ImageGenerationResponse, ModelCategory, ModelInfo,
        StabilityImageResponse, TitanImageResponse,
    },
    services::{prompts, ImageGenerator},
};
use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client;
use serde_json::{json, Value};

#[derive(Clone)]
pub struct ImageClient {
    client: Client,
    model_id: String,
    label: String,
}

impl ImageClient {
    pub fn new(client: Client, model_id: &str) -> Self {
        let label = if model_id.starts_with("stability.") {
            "Stable Diffusion"
        } else {
            "Titan Image Generator"
        };
        Self {
            client,
            model_id: model_id.to_string(),
            label: label.to_string(),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn supported_models() -> Vec<ModelInfo> {
        vec![
            ModelInfo::new(
                "amazon.titan-image-generator-v1",
                "Titan Image Generator G1",
                "Amazon",
                ModelCategory::Image,
            ),
            ModelInfo::new(
                "amazon.titan-image-generator-v2:0",
                "Titan Image Generator G1 v2",
                "Amazon",
                ModelCategory::Image,
            ),
            ModelInfo::new(
                "stability.stable-diffusion-xl-v1",
                "SDXL 1.0",
                "Stability AI",
                ModelCategory::Image,
            ),
        ]
    }

    pub fn build_request_payload(
        request: &ImageGenerationRequest,
        model_id: &str,
    ) -> Result<Value> {
        let width = request.width.unwrap_or(1024);
        let height = request.height.unwrap_or(1024);

        let payload = match model_id {
            id if id.starts_with("amazon.titan-image-generator") => json!({
                "taskType": "TEXT_IMAGE",
                "textToImageParams": {
                    "text": request.prompt,
                    "negativeText": "blurry, smooth gradients, anti-aliasing, photorealistic"
                },
                "imageGenerationConfig": {
                    "numberOfImages": request.num_images.unwrap_or(1),
                    "width": width,
                    "height": height,
                    "quality": "standard",
                    "cfgScale": 8.0
                }
            }),
            id if id.starts_with("stability.stable-diffusion-xl") => json!({
                "text_prompts": [{ "text": request.prompt, "weight": 1.0 }],
                "cfg_scale": 7,
                "steps": 30,
                "width": width,
                "height": height,
                "samples": request.num_images.unwrap_or(1),
                "style_preset": "pixel-art"
            }),
            _ => {
                return Err(GenieError::Request(format!(
                    "Unsupported image model: {}",
                    model_id
                )))
            }
        };

        Ok(payload)
    }

    pub fn parse_response(body: &str, model_id: &str) -> Result<ImageGenerationResponse> {
        let parse_err = |e: serde_json::Error| GenieError::Response(e.to_string());

        let image_data = if model_id.starts_with("stability.") {
            let response: StabilityImageResponse = serde_json::from_str(body).map_err(parse_err)?;
            response.artifacts.into_iter().next().map(|artifact| artifact.base64)
        } else {
            let response: TitanImageResponse = serde_json::from_str(body).map_err(parse_err)?;
            if let Some(error) = response.error.filter(|e| !e.is_empty()) {
                return Err(GenieError::Response(error));
            }
            response.images.into_iter().next()
        };

        let image = image_data
            .filter(|data| !data.is_empty())
            .map(EncodedImage::png)
            .ok_or_else(|| GenieError::Response("No images generated".into()))?;
        image.decode()?;

        Ok(ImageGenerationResponse {
            image_data: image.data,
            mime_type: image.mime_type,
            model: model_id.to_string(),
        })
    }

    pub async fn generate(
        &self,
        request: ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse> {
        let model_id = request.model_id.as_deref().unwrap_or(&self.model_id);
        let payload = Self::build_request_payload(&request, model_id)?;

        log::info!("Generating image with model: {}", model_id);
        let body = invoke_json(&self.client, model_id, &payload).await?;

        Self::parse_response(&body, model_id)
    }
}

#[async_trait]
impl ImageGenerator for ImageClient {
    fn label(&self) -> &str {
        &self.label
    }

    async fn generate(&self, refined_prompt: &str) -> Result<EncodedImage> {
        let request = ImageGenerationRequest::new(prompts::with_style_suffix(refined_prompt));
        let response = ImageClient::generate(self, request).await?;
        log::debug!("Image data length: {} characters", response.image_data.len());
        Ok(EncodedImage::new(response.image_data, response.mime_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titan_payload() {
        let mut request = ImageGenerationRequest::new("pixel art cat");
        request.width = Some(512);
        let payload =
            ImageClient::build_request_payload(&request, "amazon.titan-image-generator-v1")
                .unwrap();
        assert_eq!(payload["taskType"], "TEXT_IMAGE");
        assert_eq!(payload["textToImageParams"]["text"], "pixel art cat");
        assert_eq!(payload["imageGenerationConfig"]["width"], 512);
        assert_eq!(payload["imageGenerationConfig"]["height"], 1024);
    }

    #[test]
    fn stability_payload_uses_pixel_art_preset() {
        let request = ImageGenerationRequest::new("pixel art cat");
        let payload =
            ImageClient::build_request_payload(&request, "stability.stable-diffusion-xl-v1")
                .unwrap();
        assert_eq!(payload["style_preset"], "pixel-art");
        assert_eq!(payload["text_prompts"][0]["text"], "pixel art cat");
    }

    #[test]
    fn unsupported_model() {
        let request = ImageGenerationRequest::new("cat");
        assert!(ImageClient::build_request_payload(&request, "openai.dalle").is_err());
    }

    #[test]
    fn parses_image_responses() {
        let titan = r#"{"images":["aGVsbG8="],"error":null}"#;
        let response =
            ImageClient::parse_response(titan, "amazon.titan-image-generator-v1").unwrap();
        assert_eq!(response.image_data, "aGVsbG8=");

        let sdxl = r#"{"result":"success","artifacts":[{"seed":1,"base64":"aGk=","finishReason":"SUCCESS"}]}"#;
        let response =
            ImageClient::parse_response(sdxl, "stability.stable-diffusion-xl-v1").unwrap();
        assert_eq!(response.image_data, "aGk=");
    }

    #[test]
    fn titan_errors_surface() {
        let err = ImageClient::parse_response(
            r#"{"images":[],"error":"This request has been blocked by our content filters."}"#,
            "amazon.titan-image-generator-v1",
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Response error: This request has been blocked by our content filters."
        );

        let err = ImageClient::parse_response(r#"{"images":[]}"#, "amazon.titan-image-generator-v1")
            .unwrap_err();
        assert_eq!(err.to_string(), "Response error: No images generated");
    }

    #[test]
    fn rejects_undecodable_image_bytes() {
        let err = ImageClient::parse_response(
            r#"{"images":["not base64!!"]}"#,
            "amazon.titan-image-generator-v1",
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("Response error: Invalid base64 image data"));
    }

    #[test]
    fn every_listed_model_builds_a_payload() {
        let request = ImageGenerationRequest::new("pixel art cat");
        for model in ImageClient::supported_models() {
            assert!(ImageClient::build_request_payload(&request, &model.id).is_ok());
        }
    }
}
