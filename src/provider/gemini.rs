use crate::{
    config::GeminiConfig,
    error::{EnhanceError, Result},
    provider::{GenerationBackend, GenerationRequest, ProviderError},
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

/// REST client for `models/{model}:generateContent`.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_base: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or(EnhanceError::MissingApiKey)?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| EnhanceError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, model)
    }

    fn build_payload(request: &GenerationRequest) -> Value {
        let mut parts = vec![json!({ "text": request.prompt })];
        if let Some(image) = &request.image {
            parts.push(json!({
                "inline_data": {
                    "mime_type": image.mime_type,
                    "data": STANDARD.encode(&image.data),
                }
            }));
        }

        json!({
            "contents": [{ "role": "user", "parts": parts }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "temperature": 0.9
            }
        })
    }

    fn extract_text(response: GeminiResponse) -> String {
        response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .filter_map(|content| content.parts)
            .flatten()
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("")
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn generate(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> std::result::Result<String, ProviderError> {
        let payload = Self::build_payload(request);

        log::debug!(
            "Invoking model: {} (image attached: {})",
            model,
            request.image.is_some()
        );

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProviderError::transport(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = ProviderError::from_response(status.as_u16(), &body);
            log::debug!(
                "Gemini returned {} for {}: {:?} {}",
                status,
                model,
                error.kind,
                error.message
            );
            return Err(error);
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::transport(format!("Gemini response parse error: {}", e)))?;

        Ok(Self::extract_text(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_a_config_error() {
        let result = GeminiClient::new(&GeminiConfig::new());
        assert!(matches!(result, Err(EnhanceError::MissingApiKey)));
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let config = GeminiConfig::new()
            .with_api_key("k")
            .with_api_base("http://localhost:9999/");
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint("gemini-2.0-flash"),
            "http://localhost:9999/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn payload_inlines_image_as_base64() {
        let request = GenerationRequest::text("describe").with_image("image/png", vec![1, 2, 3]);
        let payload = GeminiClient::build_payload(&request);
        let parts = payload["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[1]["inline_data"]["data"], "AQID");
        assert_eq!(
            payload["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn text_parts_are_concatenated() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"clean\":" }, { "text": "\"x\"}" }] }
            }]
        }))
        .unwrap();
        assert_eq!(GeminiClient::extract_text(response), "{\"clean\":\"x\"}");
    }
}
