use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::{Result, LinguaError};
use super::{TranslationProvider, build_prompt};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Client for the `generateContent` endpoint of the generative language API
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    config: ProviderConfig,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>, config: ProviderConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| LinguaError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            config,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    fn request_body(&self, prompt: String) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            },
        }
    }
}

/// First candidate's first text part, trimmed
fn extract_text(response: GenerateContentResponse) -> Result<String> {
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .map(|part| part.text.trim().to_string())
        .ok_or_else(|| LinguaError::Provider("Response contained no candidates".to_string()))?;

    if text.is_empty() {
        return Err(LinguaError::Provider("Empty translation received".to_string()));
    }
    Ok(text)
}

#[async_trait]
impl TranslationProvider for GeminiProvider {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
        source_language: &str,
    ) -> Result<String> {
        let prompt = build_prompt(text, target_language, source_language);
        let url = self.url();

        debug!("Sending translation request to: {}", url);

        let response = self.client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| LinguaError::Provider(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LinguaError::Provider(format!(
                "Generative API error {}: {}", status, error_text
            )));
        }

        let body: GenerateContentResponse = response.json().await
            .map_err(|e| LinguaError::Provider(format!("Failed to parse response: {}", e)))?;

        let translation = extract_text(body)?;
        debug!("Raw provider translation: {}", translation);
        Ok(translation)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<String> {
        extract_text(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_extracts_first_candidate_trimmed() {
        let text = parse(
            r#"{"candidates":[
                {"content":{"parts":[{"text":"  Bonjour \n"}],"role":"model"}},
                {"content":{"parts":[{"text":"Salut"}]}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(text, "Bonjour");
    }

    #[test]
    fn test_missing_candidates_is_error() {
        assert!(matches!(parse(r#"{"candidates":[]}"#), Err(LinguaError::Provider(_))));
        assert!(matches!(parse(r#"{"promptFeedback":{}}"#), Err(LinguaError::Provider(_))));
        assert!(matches!(parse(r#"{"candidates":[{}]}"#), Err(LinguaError::Provider(_))));
    }

    #[test]
    fn test_blank_text_is_error() {
        let result = parse(r#"{"candidates":[{"content":{"parts":[{"text":"   "}]}}]}"#);
        assert!(matches!(result, Err(LinguaError::Provider(_))));
    }

    #[test]
    fn test_request_shape() {
        let mut config = ProviderConfig::default();
        config.endpoint = "http://localhost:9000/v1beta/".to_string();
        config.model = "gemini-pro".to_string();
        let provider = GeminiProvider::new("secret", config).unwrap();

        assert_eq!(provider.url(), "http://localhost:9000/v1beta/models/gemini-pro:generateContent");

        let body = serde_json::to_value(provider.request_body("prompt".to_string())).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "prompt");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1000);
        assert!(body["generationConfig"]["temperature"].is_number());
        assert_eq!(provider.name(), "gemini");
    }
}
