// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSE parsing for `streamGenerateContent?alt=sse` responses.
//!
//! Every event carries a complete `GenerateContentResponse` JSON document
//! holding the next slice of text.

use std::time::Duration;

use eventsource_stream::{EventStreamError, Eventsource};
use futures::stream::StreamExt;
use gemchat_core::{ChatError, TextStream};

use crate::types::{ApiErrorResponse, GenerateContentResponse};

/// Turns a streaming HTTP response into a stream of text deltas.
///
/// Events without text are skipped. A body-read timeout surfaces as
/// [`ChatError::Timeout`] carrying `timeout`.
pub fn parse_sse_stream(response: reqwest::Response, timeout: Duration) -> TextStream {
    let events = response.bytes_stream().eventsource();

    let mapped = events.filter_map(move |result| async move {
        match result {
            Ok(event) => parse_event_data(&event.data).transpose(),
            Err(EventStreamError::Transport(e)) if e.is_timeout() => {
                Some(Err(ChatError::Timeout { duration: timeout }))
            }
            Err(e) => Some(Err(ChatError::Provider {
                message: format!("SSE stream error: {e}"),
                source: None,
            })),
        }
    });

    Box::pin(mapped)
}

/// Parses one event payload into its text delta.
///
/// Returns `Ok(None)` when the event carries no text (usage-only or
/// finish-only chunks).
pub fn parse_event_data(data: &str) -> Result<Option<String>, ChatError> {
    if data.trim().is_empty() {
        return Ok(None);
    }
    if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(data) {
        return Err(ChatError::Provider {
            message: format!(
                "Gemini API error ({} {}): {}",
                api_err.error.code, api_err.error.status, api_err.error.message
            ),
            source: None,
        });
    }
    let chunk: GenerateContentResponse =
        serde_json::from_str(data).map_err(|e| ChatError::Provider {
            message: format!("failed to parse stream chunk: {e}"),
            source: Some(Box::new(e)),
        })?;

    let text = chunk.text();
    if text.is_empty()
        && let Some(reason) = chunk.block_reason()
    {
        return Err(ChatError::Provider {
            message: reason,
            source: None,
        });
    }
    Ok((!text.is_empty()).then_some(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_chunk_yields_delta() {
        let data = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hi"}]}}]}"#;
        assert_eq!(parse_event_data(data).unwrap().as_deref(), Some("Hi"));
    }

    #[test]
    fn usage_only_chunk_is_skipped() {
        let data = r#"{"usageMetadata":{"promptTokenCount":4,"totalTokenCount":9}}"#;
        assert_eq!(parse_event_data(data).unwrap(), None);
    }

    #[test]
    fn finish_chunk_with_text_still_yields() {
        let data = r#"{"candidates":[{"content":{"parts":[{"text":"!"}]},"finishReason":"STOP"}]}"#;
        assert_eq!(parse_event_data(data).unwrap().as_deref(), Some("!"));
    }

    #[test]
    fn error_payload_becomes_provider_error() {
        let data = r#"{"error":{"code":429,"message":"Resource exhausted","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = parse_event_data(data).unwrap_err().to_string();
        assert!(err.contains("RESOURCE_EXHAUSTED"), "got: {err}");
        assert!(err.contains("Resource exhausted"), "got: {err}");
    }

    #[test]
    fn safety_block_becomes_provider_error() {
        let data = r#"{"candidates":[{"finishReason":"SAFETY"}]}"#;
        assert!(matches!(
            parse_event_data(data),
            Err(ChatError::Provider { .. })
        ));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_event_data("{not json").is_err());
    }
}
