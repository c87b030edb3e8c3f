pub mod image_client;
pub mod text_client;

use crate::{
    config::BedrockConfig,
    error::{GenieError, Result},
};
use aws_config::BehaviorVersion;
use aws_sdk_bedrockruntime::{
    config::{Credentials, Region},
    error::{DisplayErrorContext, ProvideErrorMetadata},
    primitives::Blob,
    Client,
};

pub use image_client::ImageClient;
pub use text_client::TextClient;

#[derive(Clone)]
pub struct BedrockClient {
    text_client: TextClient,
    image_client: ImageClient,
}

impl BedrockClient {
    pub async fn new(bedrock_config: BedrockConfig) -> Result<Self> {
        let loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(bedrock_config.region_or_default()));

        let loader = if let (Some(access_key), Some(secret_key)) =
            (&bedrock_config.access_key, &bedrock_config.secret_key)
        {
            loader.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "pixel-genie",
            ))
        } else {
            loader
        };

        let aws_config = loader.load().await;
        let client = Client::new(&aws_config);

        Ok(Self {
            text_client: TextClient::new(client.clone(), &bedrock_config.text_model),
            image_client: ImageClient::new(client, &bedrock_config.image_model),
        })
    }

    pub fn text(&self) -> &TextClient {
        &self.text_client
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }
}

/// Sends a JSON body to `InvokeModel` and returns the response body as text.
pub(crate) async fn invoke_json(
    client: &Client,
    model_id: &str,
    payload: &serde_json::Value,
) -> Result<String> {
    let request_json = serde_json::to_string(payload)?;
    log::debug!("Bedrock request payload for {}: {}", model_id, request_json);

    let response = client
        .invoke_model()
        .model_id(model_id)
        .content_type("application/json")
        .accept("application/json")
        .body(Blob::new(request_json.into_bytes()))
        .send()
        .await
        .map_err(|e| {
            log::error!("AWS SDK error details: {}", DisplayErrorContext(&e));

            if let Some(service_error) = e.as_service_error() {
                log::error!("Service error code: {:?}", service_error.code());
                GenieError::AwsServiceError(format!(
                    "{} - {}",
                    service_error.code().unwrap_or("unknown"),
                    service_error.message().unwrap_or("no message")
                ))
            } else {
                GenieError::AwsError(DisplayErrorContext(&e).to_string())
            }
        })?;

    String::from_utf8(response.body.into_inner())
        .map_err(|e| GenieError::Response(e.to_string()))
}
