// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini generative language API.
//!
//! One attempt per call. Failures are reported to the caller and never
//! retried here.

use std::time::Duration;

use gemchat_core::{ChatError, TextStream};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::sse;
use crate::types::{ApiErrorResponse, GenerateContentRequest};

/// HTTP client bound to one API key and model.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    /// Creates a client. `base_url` is the versioned API root, e.g.
    /// `https://generativelanguage.googleapis.com/v1beta`.
    pub fn new(
        api_key: &str,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ChatError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(api_key)
                .map_err(|e| ChatError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/models/{}:{method}", self.base_url, self.model)
    }

    /// Sends a streaming request and returns the text deltas.
    pub async fn stream_generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<TextStream, ChatError> {
        let url = self.endpoint("streamGenerateContent");
        let response = self
            .client
            .post(&url)
            .query(&[("alt", "sse")])
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        debug!(status = %status, model = %self.model, "streaming response received");
        if !status.is_success() {
            return Err(error_from_body(status, response.text().await.unwrap_or_default()));
        }
        Ok(sse::parse_sse_stream(response, self.timeout))
    }

    fn transport_error(&self, e: reqwest::Error) -> ChatError {
        if e.is_timeout() {
            ChatError::Timeout {
                duration: self.timeout,
            }
        } else {
            ChatError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            }
        }
    }
}

/// Builds a provider error from a non-2xx response, preferring the API's own message.
fn error_from_body(status: reqwest::StatusCode, body: String) -> ChatError {
    let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(api_err) => format!(
            "Gemini API error ({} {}): {}",
            api_err.error.code, api_err.error.status, api_err.error.message
        ),
        Err(_) => format!("API returned {status}: {body}"),
    };
    ChatError::Provider {
        message,
        source: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Content, GenerationConfig, Part};
    use futures::StreamExt;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL: &str = "gemini-test";

    fn test_client(base_url: &str) -> GeminiClient {
        GeminiClient::new("test-api-key", MODEL, base_url, Duration::from_secs(5)).unwrap()
    }

    fn test_request() -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![Part::text("Hello")],
            }],
            system_instruction: None,
            generation_config: GenerationConfig {
                temperature: 1.0,
                top_p: 0.95,
                max_output_tokens: 256,
            },
            safety_settings: Vec::new(),
        }
    }

    fn sse_body(chunks: &[&str]) -> String {
        chunks
            .iter()
            .map(|text| {
                let chunk = serde_json::json!({
                    "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
                });
                format!("data: {chunk}\r\n\r\n")
            })
            .collect()
    }

    #[tokio::test]
    async fn stream_yields_deltas_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/models/{MODEL}:streamGenerateContent")))
            .and(query_param("alt", "sse"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse_body(&["Hel", "lo", " world"])),
            )
            .mount(&server)
            .await;

        let stream = test_client(&server.uri())
            .stream_generate_content(&test_request())
            .await
            .unwrap();
        let deltas: Vec<String> = stream.map(|r| r.unwrap()).collect().await;
        assert_eq!(deltas, vec!["Hel", "lo", " world"]);
    }

    #[tokio::test]
    async fn api_error_is_surfaced_without_retry() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}
        });
        Mock::given(method("POST"))
            .and(path(format!("/models/{MODEL}:streamGenerateContent")))
            .respond_with(ResponseTemplate::new(503).set_body_json(&body))
            .expect(1)
            .mount(&server)
            .await;

        let result = test_client(&server.uri())
            .stream_generate_content(&test_request())
            .await;
        let err = result.err().unwrap().to_string();
        assert!(err.contains("UNAVAILABLE"), "got: {err}");
        assert!(err.contains("overloaded"), "got: {err}");
    }

    #[tokio::test]
    async fn non_json_error_body_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let result = test_client(&server.uri())
            .stream_generate_content(&test_request())
            .await;
        let err = result.err().unwrap().to_string();
        assert!(err.contains("502"), "got: {err}");
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(sse_body(&["late"]))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client =
            GeminiClient::new("k", MODEL, server.uri(), Duration::from_millis(50)).unwrap();
        let result = client.stream_generate_content(&test_request()).await;
        let err = result.err().unwrap();
        assert!(matches!(err, ChatError::Timeout { .. }), "got: {err}");
    }

    #[tokio::test]
    async fn client_sends_api_key_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("x-goog-api-key", "test-api-key"))
            .and(header("content-type", "application/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse_body(&["ok"])),
            )
            .mount(&server)
            .await;

        let result = test_client(&server.uri())
            .stream_generate_content(&test_request())
            .await;
        assert!(result.is_ok(), "headers should match");
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = test_client("http://localhost:1/v1beta/");
        assert_eq!(
            client.endpoint("streamGenerateContent"),
            "http://localhost:1/v1beta/models/gemini-test:streamGenerateContent"
        );
    }
}
