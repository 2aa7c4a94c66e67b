//! Gemini API key provider (Generative Language API).

use anyhow::Result;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{Value, json};

use super::sse::GeminiSseParser;
use crate::config::Config;
use crate::core::driver::ModelClient;
use crate::providers::shared::{resolve_api_key, resolve_base_url};
use crate::providers::{
    GenerateRequest, ProviderError, ProviderErrorKind, ProviderResult, TextStream,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variables consulted for the API key, in order.
const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Gemini API configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Key from the config file. Environment fallbacks are consulted per request.
    pub api_key: Option<String>,
    pub base_url: String,
    pub max_output_tokens: Option<u32>,
}

impl GeminiConfig {
    /// Creates a new config from the loaded configuration and environment.
    ///
    /// Authentication resolution order (checked when a request is sent):
    /// 1. `[providers.gemini] api_key` in the config file
    /// 2. `GEMINI_API_KEY` environment variable
    /// 3. `API_KEY` environment variable
    ///
    /// Base URL: `GEMINI_BASE_URL`, then config, then the public endpoint.
    ///
    /// # Errors
    /// Returns an error if a configured base URL is malformed.
    pub fn from_config(config: &Config) -> Result<Self> {
        let gemini = &config.providers.gemini;
        let base_url = resolve_base_url(
            gemini.base_url.as_deref(),
            "GEMINI_BASE_URL",
            DEFAULT_BASE_URL,
            "Gemini",
        )?;

        Ok(Self {
            api_key: gemini.api_key.clone(),
            base_url,
            max_output_tokens: config.max_output_tokens,
        })
    }
}

/// Gemini client.
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn stream_url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.config.base_url, model
        )
    }
}

impl ModelClient for GeminiClient {
    async fn stream_generate(&self, request: GenerateRequest) -> ProviderResult<TextStream> {
        let api_key = resolve_api_key(self.config.api_key.as_deref(), API_KEY_ENV_VARS, "gemini")?;
        let body = build_request(&request, self.config.max_output_tokens);
        let url = self.stream_url(&request.model);

        tracing::debug!(model = %request.model, "opening Gemini stream");

        let response = self
            .http
            .post(&url)
            .headers(build_headers(&api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ProviderError::http_status(status.as_u16(), &error_body));
        }

        let parser = GeminiSseParser::new(Box::pin(response.bytes_stream()));
        Ok(parser.boxed())
    }
}

/// Builds the `streamGenerateContent` request body for a single user turn.
fn build_request(request: &GenerateRequest, max_output_tokens: Option<u32>) -> Value {
    let mut body = json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": request.prompt }]
        }],
        "systemInstruction": {
            "parts": [{ "text": request.system_instruction }]
        }
    });

    if let Some(max) = max_output_tokens {
        body["generationConfig"] = json!({ "maxOutputTokens": max });
    }

    body
}

fn build_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-goog-api-key",
        HeaderValue::from_str(api_key).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    headers.insert("accept", HeaderValue::from_static("text/event-stream"));
    headers.insert("content-type", HeaderValue::from_static("application/json"));
    headers.insert(
        "user-agent",
        HeaderValue::from_static(crate::providers::shared::USER_AGENT),
    );
    headers
}

/// Maps transport failures onto provider error kinds.
fn classify_reqwest_error(e: &reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::timeout(format!("Request timed out: {e}"))
    } else if e.is_connect() {
        ProviderError::timeout(format!("Connection failed: {e}"))
    } else if e.is_request() {
        ProviderError::new(ProviderErrorKind::HttpStatus, format!("Request error: {e}"))
    } else {
        ProviderError::new(ProviderErrorKind::HttpStatus, format!("Network error: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn request(prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: "gemini-test".to_string(),
            prompt: prompt.to_string(),
            system_instruction: "Be helpful.".to_string(),
        }
    }

    fn client_for(server: &MockServer, api_key: Option<&str>) -> GeminiClient {
        GeminiClient::new(GeminiConfig {
            api_key: api_key.map(str::to_string),
            base_url: server.uri(),
            max_output_tokens: None,
        })
    }

    fn sse_response(chunks: &[&str]) -> ResponseTemplate {
        let body: String = chunks
            .iter()
            .map(|text| {
                let chunk = json!({
                    "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
                });
                format!("data: {chunk}\n\n")
            })
            .collect();
        ResponseTemplate::new(200)
            .insert_header("content-type", "text/event-stream")
            .set_body_string(body)
    }

    #[test]
    fn test_build_request_shape() {
        let body = build_request(&request("How do I sort a Vec?"), None);
        assert_eq!(
            body["contents"][0]["parts"][0]["text"],
            json!("How do I sort a Vec?")
        );
        assert_eq!(body["contents"][0]["role"], json!("user"));
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            json!("Be helpful.")
        );
        assert!(body.get("generationConfig").is_none());

        let body = build_request(&request("x"), Some(256));
        assert_eq!(body["generationConfig"]["maxOutputTokens"], json!(256));
    }

    #[tokio::test]
    async fn test_stream_generate_yields_chunks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-test:streamGenerateContent"))
            .and(query_param("alt", "sse"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "hi"}]}]
            })))
            .respond_with(sse_response(&["Hel", "lo"]))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("test-key"));
        let stream = client.stream_generate(request("hi")).await.unwrap();
        let texts: Vec<String> = stream
            .map(|chunk| chunk.unwrap().text.unwrap_or_default())
            .collect()
            .await;

        assert_eq!(texts, vec!["Hel".to_string(), "lo".to_string()]);
    }

    #[tokio::test]
    async fn test_non_success_status_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string(
                r#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#,
            ))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("bad-key"));
        let Err(err) = client.stream_generate(request("hi")).await else {
            panic!("expected HTTP error");
        };
        assert_eq!(err.kind, ProviderErrorKind::HttpStatus);
        assert_eq!(err.message, "HTTP 403: API key not valid");
    }
}
