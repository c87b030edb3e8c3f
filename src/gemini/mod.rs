pub mod image_client;
pub mod text_client;

use crate::{
    config::GeminiConfig,
    error::{GenieError, Result},
    models::gemini::ApiErrorEnvelope,
};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{de::DeserializeOwned, Serialize};

pub use image_client::GeminiImageClient;
pub use text_client::GeminiTextClient;

/// Authenticated JSON transport shared by the Gemini text and Imagen clients.
#[derive(Clone)]
pub struct GeminiTransport {
    http: reqwest::Client,
    headers: HeaderMap,
    base_url: String,
}

impl GeminiTransport {
    pub fn new(api_key: &str, base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key)
            .map_err(|e| GenieError::Config(format!("Invalid Gemini API key: {}", e)))?;
        headers.insert("x-goog-api-key", key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            http: reqwest::Client::new(),
            headers,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    pub async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        log::debug!("POST {}", url);

        let response = self
            .http
            .post(url)
            .headers(self.headers.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| GenieError::Request(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            log::error!("Gemini API returned {}: {}", status, text);
            return Err(api_error(status.as_u16(), &text));
        }

        serde_json::from_str(&text).map_err(|e| {
            log::error!("Unexpected Gemini response body: {}", text);
            GenieError::Response(format!("Could not parse Gemini response: {}", e))
        })
    }
}

/// Prefers the service's own `error.message` over the raw body.
pub fn api_error(status: u16, body: &str) -> GenieError {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.trim().is_empty() => {
            GenieError::Api(envelope.error.message)
        }
        _ if body.trim().is_empty() => GenieError::Api(format!("HTTP status {}", status)),
        _ => GenieError::Api(format!("HTTP status {}: {}", status, body.trim())),
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    text_client: GeminiTextClient,
    image_client: GeminiImageClient,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                GenieError::Config("Gemini API key is required (set GEMINI_API_KEY)".into())
            })?;

        let transport = GeminiTransport::new(api_key, &config.base_url)?;

        Ok(Self {
            text_client: GeminiTextClient::new(transport.clone(), &config.text_model),
            image_client: GeminiImageClient::new(transport, &config.image_model),
        })
    }

    pub fn text(&self) -> &GeminiTextClient {
        &self.text_client
    }

    pub fn image(&self) -> &GeminiImageClient {
        &self.image_client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_uses_service_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        let err = api_error(400, body);
        assert_eq!(err.to_string(), "API error: API key not valid.");
    }

    #[test]
    fn api_error_falls_back_to_status_and_body() {
        assert_eq!(
            api_error(503, "upstream busy").to_string(),
            "API error: HTTP status 503: upstream busy"
        );
        assert_eq!(api_error(500, "").to_string(), "API error: HTTP status 500");
    }

    #[test]
    fn endpoint_joins_model_and_method() {
        let transport = GeminiTransport::new("key", "https://example.test/v1beta/").unwrap();
        assert_eq!(
            transport.endpoint("gemini-2.5-flash", "generateContent"),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn client_requires_api_key() {
        let err = GeminiClient::new(GeminiConfig::new()).err().unwrap();
        assert!(matches!(err, GenieError::Config(_)));

        let err = GeminiClient::new(GeminiConfig::new().with_api_key("  ")).err().unwrap();
        assert!(matches!(err, GenieError::Config(_)));

        assert!(GeminiClient::new(GeminiConfig::new().with_api_key("key")).is_ok());
    }
}
